use std::fmt::{Debug, Display, Formatter};

use crate::quantity::Quantity;

/// Water volume, or water flow within a single 15-minute step.
pub type CubicMetres = Quantity<1, 0, 0, 0>;

impl Display for CubicMetres {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1} m³", self.0)
    }
}

impl Debug for CubicMetres {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}m³", self.0.normalize())
    }
}
