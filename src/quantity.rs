pub mod cost;
pub mod energy;
pub mod level;
pub mod power;
pub mod rate;
pub mod time;
pub mod volume;

use std::ops::{Div, Mul};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Exact decimal quantity tagged with its physical dimension.
///
/// Volumes and flows share the dimension: a flow is the volume moved within a single simulation step.
#[derive(
    Clone,
    Copy,
    Default,
    Deserialize,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::From,
    derive_more::FromStr,
    derive_more::Neg,
    derive_more::Sub,
    derive_more::SubAssign,
    derive_more::Sum,
)]
pub struct Quantity<const VOLUME: isize, const POWER: isize, const TIME: isize, const COST: isize>(
    pub Decimal,
);

impl<const VOLUME: isize, const POWER: isize, const TIME: isize, const COST: isize>
    Quantity<VOLUME, POWER, TIME, COST>
{
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn min(mut self, rhs: Self) -> Self {
        if rhs < self {
            self = rhs;
        }
        self
    }

    pub fn max(mut self, rhs: Self) -> Self {
        if rhs > self {
            self = rhs;
        }
        self
    }

    pub fn clamp(mut self, min: Self, max: Self) -> Self {
        if self < min {
            self = min;
        }
        if self > max {
            self = max;
        }
        self
    }

    #[must_use]
    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    #[must_use]
    pub fn round_dp(self, decimal_places: u32) -> Self {
        Self(self.0.round_dp(decimal_places))
    }

    /// Round to the nearest multiple of `step`, midpoints going away from zero.
    ///
    /// A zero step leaves the value untouched.
    #[must_use]
    pub fn round_to_multiple(self, step: Self) -> Self {
        if step.0.is_zero() {
            return self;
        }
        let n_steps =
            (self.0 / step.0).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        Self(n_steps * step.0)
    }
}

impl<const VOLUME: isize, const POWER: isize, const TIME: isize, const COST: isize> Mul<Decimal>
    for Quantity<VOLUME, POWER, TIME, COST>
{
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl<const VOLUME: isize, const POWER: isize, const TIME: isize, const COST: isize> Div<Decimal>
    for Quantity<VOLUME, POWER, TIME, COST>
{
    type Output = Self;

    fn div(self, rhs: Decimal) -> Self::Output {
        Self(self.0 / rhs)
    }
}
