use std::{
    cmp::Ordering,
    fmt::{Debug, Display, Formatter},
};

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Water level in the tunnel.
///
/// Unlike volumes, levels are floating-point: they only come out of the level model.
#[derive(Copy, Clone, Default, Deserialize, Serialize, derive_more::From, derive_more::FromStr)]
pub struct Metres(pub f64);

impl PartialOrd for Metres {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Metres {
    fn cmp(&self, other: &Self) -> Ordering {
        OrderedFloat(self.0).cmp(&OrderedFloat(other.0))
    }
}

impl PartialEq for Metres {
    fn eq(&self, other: &Self) -> bool {
        OrderedFloat(self.0).eq(&OrderedFloat(other.0))
    }
}

impl Eq for Metres {}

impl Display for Metres {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3} m", self.0)
    }
}

impl Debug for Metres {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}m", self.0)
    }
}
