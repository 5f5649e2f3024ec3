//! Pump classes and units.

use std::fmt::{Display, Formatter};

use chrono::{NaiveDateTime, TimeDelta};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    core::{Error, Result, interval::Interval},
    quantity::{power::Kilowatts, volume::CubicMetres},
};

#[derive(Debug, Hash, Deserialize, clap::ValueEnum, enumset::EnumSetType)]
#[serde(rename_all = "lowercase")]
pub enum PumpClass {
    Small,
    Large,
}

impl Display for PumpClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Small => write!(f, "Small"),
            Self::Large => write!(f, "Large"),
        }
    }
}

impl PumpClass {
    pub fn rating(self) -> Rating {
        match self {
            Self::Small => Rating {
                capacity: CubicMetres::from(Decimal::from(375)),
                power: Kilowatts::from(Decimal::from(250)),
            },
            Self::Large => Rating {
                capacity: CubicMetres::from(Decimal::from(750)),
                power: Kilowatts::from(Decimal::from(400)),
            },
        }
    }
}

/// Nameplate figures of a running pump.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Rating {
    /// Volume pumped out within a single step.
    pub capacity: CubicMetres,

    /// Electrical power draw.
    pub power: Kilowatts,
}

/// Single physical pump and its activation history.
///
/// The unit is a value: transitions return an updated copy and leave the original untouched.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PumpUnit {
    pub id: String,
    pub class: PumpClass,
    pub rating: Rating,

    /// Start of the current activation, [`None`] when the pump is off.
    running_since: Option<NaiveDateTime>,

    /// Closed activations, chronological and non-overlapping.
    activations: Vec<Interval>,
}

impl PumpUnit {
    pub fn new(id: impl Into<String>, class: PumpClass) -> Self {
        Self::with_rating(id, class, class.rating())
    }

    pub fn with_rating(id: impl Into<String>, class: PumpClass, rating: Rating) -> Self {
        Self { id: id.into(), class, rating, running_since: None, activations: Vec::new() }
    }

    pub const fn is_active(&self) -> bool {
        self.running_since.is_some()
    }

    pub const fn running_since(&self) -> Option<NaiveDateTime> {
        self.running_since
    }

    pub fn activations(&self) -> &[Interval] {
        &self.activations
    }

    pub fn capacity(&self) -> CubicMetres {
        if self.is_active() { self.rating.capacity } else { CubicMetres::ZERO }
    }

    pub fn power(&self) -> Kilowatts {
        if self.is_active() { self.rating.power } else { Kilowatts::ZERO }
    }

    /// Total duration of the closed activations, the ongoing one is not counted until it ends.
    pub fn cumulative_run_time(&self) -> TimeDelta {
        self.activations.iter().map(|activation| activation.len()).sum()
    }

    pub fn cumulative_run_minutes(&self) -> i64 {
        self.cumulative_run_time().num_minutes()
    }

    /// End of the last closed activation.
    pub fn last_stopped_at(&self) -> Option<NaiveDateTime> {
        self.activations.last().map(|activation| activation.end)
    }

    /// Whether the pump may be switched on at the given time without violating the minimum dwell.
    pub fn can_start(&self, at: NaiveDateTime, min_dwell: TimeDelta) -> bool {
        self.last_stopped_at().is_none_or(|stopped_at| at - stopped_at >= min_dwell)
    }

    /// Whether the pump may be switched off at the given time without violating the minimum dwell.
    pub fn can_stop(&self, at: NaiveDateTime, min_dwell: TimeDelta) -> bool {
        self.running_since.is_none_or(|since| at - since >= min_dwell)
    }

    /// Switch the pump on if it is off, and off if it is on.
    ///
    /// Switching off closes the current activation at `timestamp`.
    pub fn toggle(&self, timestamp: NaiveDateTime) -> Result<Self> {
        let last_transition = self.running_since.or_else(|| self.last_stopped_at());
        if let Some(last) = last_transition
            && timestamp < last
        {
            return Err(Error::InvalidTimestamp { id: self.id.clone(), timestamp, last });
        }

        let mut toggled = self.clone();
        match toggled.running_since.take() {
            Some(start) => toggled.activations.push(Interval::new(start, timestamp)),
            None => toggled.running_since = Some(timestamp),
        }
        Ok(toggled)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::dec;

    use super::*;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 11, 15).unwrap().and_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn test_capacity_and_power() {
        let pump = PumpUnit::new("1.2", PumpClass::Large);
        assert_eq!(pump.capacity(), CubicMetres::ZERO);
        assert_eq!(pump.power(), Kilowatts::ZERO);

        let pump = pump.toggle(at(0, 0)).unwrap();
        assert_eq!(pump.capacity(), CubicMetres::from(dec!(750)));
        assert_eq!(pump.power(), Kilowatts::from(dec!(400)));
    }

    #[test]
    fn test_small_rating() {
        let pump = PumpUnit::new("1.1", PumpClass::Small).toggle(at(0, 0)).unwrap();
        assert_eq!(pump.capacity(), CubicMetres::from(dec!(375)));
        assert_eq!(pump.power(), Kilowatts::from(dec!(250)));
    }

    #[test]
    fn test_cumulative_time() {
        let pump = PumpUnit::new("1", PumpClass::Large);
        assert!(!pump.is_active());

        let pump = pump.toggle(at(10, 0)).unwrap();
        assert!(pump.is_active());
        let pump = pump.toggle(at(10, 5)).unwrap();
        assert_eq!(pump.cumulative_run_minutes(), 5);

        let pump = pump.toggle(at(12, 0)).unwrap().toggle(at(13, 45)).unwrap();
        assert_eq!(pump.cumulative_run_minutes(), 110);
        assert_eq!(pump.activations().len(), 2);
    }

    #[test]
    fn test_on_off_on() {
        let pump = PumpUnit::new("1", PumpClass::Small)
            .toggle(at(1, 0))
            .unwrap()
            .toggle(at(3, 30))
            .unwrap()
            .toggle(at(4, 0))
            .unwrap();
        assert_eq!(pump.activations(), [Interval::new(at(1, 0), at(3, 30))]);
        assert_eq!(pump.activations()[0].len(), TimeDelta::minutes(150));
        assert_eq!(pump.running_since(), Some(at(4, 0)));

        // The open activation is not counted yet:
        assert_eq!(pump.cumulative_run_time(), TimeDelta::minutes(150));
    }

    #[test]
    fn test_toggle_leaves_original_untouched() {
        let pump = PumpUnit::new("1", PumpClass::Small);
        let toggled = pump.toggle(at(1, 0)).unwrap();
        assert!(!pump.is_active());
        assert_ne!(pump, toggled);
    }

    #[test]
    fn test_stopping_before_start_is_rejected() {
        let pump = PumpUnit::new("1", PumpClass::Large).toggle(at(5, 0)).unwrap();
        let error = pump.toggle(at(4, 45)).unwrap_err();
        assert!(matches!(error, Error::InvalidTimestamp { .. }));
    }

    #[test]
    fn test_starting_before_last_stop_is_rejected() {
        let pump = PumpUnit::new("1", PumpClass::Large)
            .toggle(at(5, 0))
            .unwrap()
            .toggle(at(6, 0))
            .unwrap();
        assert!(matches!(pump.toggle(at(5, 30)), Err(Error::InvalidTimestamp { .. })));
    }

    #[test]
    fn test_dwell() {
        let dwell = TimeDelta::hours(2);
        let pump = PumpUnit::new("1", PumpClass::Large);
        assert!(pump.can_start(at(0, 0), dwell));

        let pump = pump.toggle(at(0, 0)).unwrap();
        assert!(!pump.can_stop(at(1, 45), dwell));
        assert!(pump.can_stop(at(2, 0), dwell));

        let pump = pump.toggle(at(2, 0)).unwrap();
        assert!(!pump.can_start(at(3, 59), dwell));
        assert!(pump.can_start(at(4, 0), dwell));
    }
}
