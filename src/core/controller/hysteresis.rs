//! Volume threshold control.

use std::cmp::Reverse;

use bon::Builder;
use enumset::EnumSet;
use rust_decimal::Decimal;

use crate::{
    core::{
        Result,
        controller::{Controller, Observation, search::Search},
        fleet::Fleet,
        pump::{PumpClass, PumpUnit},
    },
    prelude::debug,
    quantity::volume::CubicMetres,
};

/// Single-tier volume-threshold controller.
///
/// Starts one unit above the upper threshold, stops one below the lower threshold,
/// and otherwise matches the inflow without looking at the dwell times.
#[derive(Copy, Clone, Debug, Builder)]
pub struct HysteresisController {
    #[builder(default = CubicMetres::from(Decimal::from(60_000)))]
    upper_volume: CubicMetres,

    #[builder(default = CubicMetres::from(Decimal::from(5_000)))]
    lower_volume: CubicMetres,

    /// Pump classes switched by the thresholds.
    #[builder(default = EnumSet::only(PumpClass::Large))]
    classes: EnumSet<PumpClass>,
}

impl Default for HysteresisController {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Controller for HysteresisController {
    fn decide(&self, fleet: &Fleet, observation: &Observation) -> Result<Fleet> {
        let current = fleet.pattern();
        let pattern = if observation.tank_volume > self.upper_volume {
            // Load balancing: the least used unit goes first.
            self.switchable(fleet, false)
                .min_by_key(|(_, unit)| unit.cumulative_run_minutes())
                .map_or(current, |(index, _)| current.with(index, true))
        } else if observation.tank_volume < self.lower_volume {
            if current.n_active() > 1 {
                self.switchable(fleet, true)
                    .min_by_key(|(_, unit)| Reverse(unit.cumulative_run_minutes()))
                    .map_or(current, |(index, _)| current.with(index, false))
            } else {
                current
            }
        } else {
            Search::builder()
                .fleet(fleet)
                .desired_flow(observation.inflow)
                .timestamp(observation.timestamp)
                .build()
                .best()
                .unwrap_or(current)
        };
        debug!(
            timestamp = %observation.timestamp,
            volume = ?observation.tank_volume,
            pattern = %pattern.display(fleet.len()),
            "decided",
        );

        let mut next = fleet.apply(pattern, observation.timestamp)?;
        next.target_flow = Some(next.total_capacity());
        Ok(next)
    }
}

impl HysteresisController {
    /// Units of the switched classes in the given state, along with their roster indices.
    fn switchable<'a>(
        &self,
        fleet: &'a Fleet,
        is_active: bool,
    ) -> impl Iterator<Item = (usize, &'a PumpUnit)> {
        let classes = self.classes;
        fleet
            .units()
            .iter()
            .enumerate()
            .filter(move |(_, unit)| classes.contains(unit.class) && unit.is_active() == is_active)
    }
}
