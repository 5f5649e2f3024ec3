use std::fmt::{Debug, Formatter};

use chrono::TimeDelta;
use rust_decimal::Decimal;

use crate::quantity::Quantity;

pub type Hours = Quantity<0, 0, 1, 0>;

impl From<TimeDelta> for Hours {
    fn from(time_delta: TimeDelta) -> Self {
        Self(Decimal::from(time_delta.num_seconds()) / Decimal::from(3600))
    }
}

impl Debug for Hours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}h", self.0.normalize())
    }
}
