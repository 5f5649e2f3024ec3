use bon::Builder;
use chrono::{NaiveDateTime, TimeDelta};

use crate::{
    core::{fleet::Fleet, pattern::Pattern},
    quantity::volume::CubicMetres,
};

/// Exhaustive search for the activation pattern best matching the desired flow.
#[derive(Builder)]
pub struct Search<'a> {
    fleet: &'a Fleet,
    desired_flow: CubicMetres,
    timestamp: NaiveDateTime,

    /// Minimum time a unit stays in its state, [`None`] disables the constraint.
    min_dwell: Option<TimeDelta>,
}

/// Lexicographic pattern score, lower is better.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
struct Score {
    deviation: CubicMetres,
    n_toggled: u32,
    capacity_change: CubicMetres,
    n_active: u32,
}

impl Search<'_> {
    /// Best feasible non-empty pattern.
    ///
    /// Ties go to the first pattern in the bit-mask enumeration order.
    /// Returns [`None`] when the dwell constraints rule out every non-empty pattern.
    pub fn best(&self) -> Option<Pattern> {
        let current = self.fleet.pattern();
        let current_capacity = self.fleet.total_capacity();
        Pattern::all(self.fleet.len())
            .filter(|candidate| !candidate.is_empty())
            .filter(|candidate| self.is_feasible(current, *candidate))
            .min_by_key(|candidate| {
                let capacity = self.fleet.capacity_of(*candidate);
                Score {
                    deviation: (capacity - self.desired_flow).abs(),
                    n_toggled: current.n_toggled(*candidate),
                    capacity_change: (capacity - current_capacity).abs(),
                    n_active: candidate.n_active(),
                }
            })
    }

    fn is_feasible(&self, current: Pattern, candidate: Pattern) -> bool {
        let Some(min_dwell) = self.min_dwell else {
            return true;
        };
        self.fleet.units().iter().enumerate().all(|(index, unit)| {
            match (current.is_active(index), candidate.is_active(index)) {
                (false, true) => unit.can_start(self.timestamp, min_dwell),
                (true, false) => unit.can_stop(self.timestamp, min_dwell),
                _ => true,
            }
        })
    }
}
