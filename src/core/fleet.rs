//! Pump roster and the controller memory.

use chrono::NaiveDateTime;
use itertools::Itertools;

use crate::{
    core::{Error, Result, pattern::Pattern, pump::PumpUnit},
    quantity::{power::Kilowatts, volume::CubicMetres},
};

/// Fixed roster of pumps together with the controller's memory.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Fleet {
    units: Vec<PumpUnit>,

    /// Aggregate capacity the controller aimed for at the previous step.
    pub target_flow: Option<CubicMetres>,

    /// Exponentially smoothed inflow.
    pub smoothed_inflow: Option<CubicMetres>,

    /// Last time the tunnel was seen drained.
    pub last_drained_at: Option<NaiveDateTime>,

    /// Set when the daily drain is overdue.
    pub is_drain_pending: bool,
}

impl Fleet {
    pub fn try_new(units: Vec<PumpUnit>) -> Result<Self> {
        if units.is_empty() {
            return Err(Error::InvalidFleet("the roster is empty".to_string()));
        }
        if units.len() > Pattern::MAX_UNITS {
            return Err(Error::InvalidFleet(format!(
                "{} units exceed the supported maximum of {}",
                units.len(),
                Pattern::MAX_UNITS,
            )));
        }
        if let Some(duplicate) = units.iter().map(|unit| &unit.id).duplicates().next() {
            return Err(Error::InvalidFleet(format!("duplicate pump id `{duplicate}`")));
        }
        Ok(Self {
            units,
            target_flow: None,
            smoothed_inflow: None,
            last_drained_at: None,
            is_drain_pending: false,
        })
    }

    pub fn units(&self) -> &[PumpUnit] {
        &self.units
    }

    pub const fn len(&self) -> usize {
        self.units.len()
    }

    pub fn pattern(&self) -> Pattern {
        Pattern::from_states(self.units.iter().map(PumpUnit::is_active))
    }

    /// Capacity of the running units.
    pub fn total_capacity(&self) -> CubicMetres {
        self.units.iter().map(PumpUnit::capacity).sum()
    }

    /// Power draw of the running units.
    pub fn total_power(&self) -> Kilowatts {
        self.units.iter().map(PumpUnit::power).sum()
    }

    /// Capacity of the entire fleet running at once.
    pub fn max_capacity(&self) -> CubicMetres {
        self.units.iter().map(|unit| unit.rating.capacity).sum()
    }

    /// Capacity of the smallest single unit.
    pub fn min_unit_capacity(&self) -> CubicMetres {
        self.units.iter().map(|unit| unit.rating.capacity).min().unwrap_or(CubicMetres::ZERO)
    }

    /// Capacity the fleet would have when running the given pattern.
    pub fn capacity_of(&self, pattern: Pattern) -> CubicMetres {
        self.units
            .iter()
            .enumerate()
            .filter(|(index, _)| pattern.is_active(*index))
            .map(|(_, unit)| unit.rating.capacity)
            .sum()
    }

    /// Switch the units whose state differs from the pattern, leaving the others untouched.
    pub fn apply(&self, pattern: Pattern, timestamp: NaiveDateTime) -> Result<Self> {
        let units = self
            .units
            .iter()
            .enumerate()
            .map(|(index, unit)| {
                if unit.is_active() == pattern.is_active(index) {
                    Ok(unit.clone())
                } else {
                    unit.toggle(timestamp)
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            units,
            target_flow: self.target_flow,
            smoothed_inflow: self.smoothed_inflow,
            last_drained_at: self.last_drained_at,
            is_drain_pending: self.is_drain_pending,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::dec;

    use super::*;
    use crate::core::pump::PumpClass;

    fn fleet() -> Fleet {
        Fleet::try_new(vec![
            PumpUnit::new("small", PumpClass::Small),
            PumpUnit::new("large", PumpClass::Large),
        ])
        .unwrap()
    }

    #[test]
    fn test_capacities() {
        let fleet = fleet();
        assert_eq!(fleet.total_capacity(), CubicMetres::ZERO);
        assert_eq!(fleet.max_capacity(), CubicMetres::from(dec!(1125)));
        assert_eq!(fleet.min_unit_capacity(), CubicMetres::from(dec!(375)));
        assert_eq!(
            fleet.capacity_of(Pattern::from_states([false, true])),
            CubicMetres::from(dec!(750)),
        );
    }

    #[test]
    fn test_apply() {
        let timestamp = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let fleet = fleet();
        let applied = fleet.apply(Pattern::from_states([false, true]), timestamp).unwrap();
        assert_eq!(applied.pattern(), Pattern::from_states([false, true]));
        assert_eq!(applied.total_capacity(), CubicMetres::from(dec!(750)));
        assert_eq!(applied.total_power(), Kilowatts::from(dec!(400)));
        assert_eq!(applied.units()[0], fleet.units()[0]);
        assert_eq!(fleet.pattern(), Pattern::default());
    }

    #[test]
    fn test_apply_same_pattern_is_identity() {
        let timestamp = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let fleet = fleet();
        assert_eq!(fleet.apply(fleet.pattern(), timestamp).unwrap(), fleet);
    }

    #[test]
    fn test_duplicate_ids() {
        let result = Fleet::try_new(vec![
            PumpUnit::new("1", PumpClass::Small),
            PumpUnit::new("1", PumpClass::Large),
        ]);
        assert!(matches!(result, Err(Error::InvalidFleet(_))));
    }

    #[test]
    fn test_empty() {
        assert!(matches!(Fleet::try_new(Vec::new()), Err(Error::InvalidFleet(_))));
    }

    #[test]
    fn test_too_large() {
        let units = (0..=Pattern::MAX_UNITS)
            .map(|index| PumpUnit::new(index.to_string(), PumpClass::Small))
            .collect();
        assert!(matches!(Fleet::try_new(units), Err(Error::InvalidFleet(_))));
    }
}
