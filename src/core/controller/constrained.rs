//! Dwell-constrained capacity matching with a daily drain.

use bon::Builder;
use chrono::TimeDelta;
use rust_decimal::Decimal;

use crate::{
    core::{
        Error,
        Result,
        controller::{Controller, Observation, search::Search},
        fleet::Fleet,
        level::LevelModel,
        tank::safe_removal,
    },
    prelude::{debug, warn},
    quantity::{level::Metres, volume::CubicMetres},
};

/// Decimal places kept in the smoothed inflow.
const SMOOTHING_DECIMAL_PLACES: u32 = 6;

#[derive(Copy, Clone, Debug, Builder)]
pub struct ControllerConfig {
    /// Minimum time a pump stays on after a start, or off after a stop.
    #[builder(default = TimeDelta::hours(2))]
    pub min_dwell: TimeDelta,

    /// Inflow within a step above which the forced drain is postponed.
    #[builder(default = CubicMetres::from(Decimal::from(2000)))]
    pub rain_threshold: CubicMetres,

    /// Granularity of the target flow and its maximal change per step.
    #[builder(default = CubicMetres::from(Decimal::from(375)))]
    pub flow_increment: CubicMetres,

    /// Weight of the newest inflow in the exponential moving average.
    #[builder(default = Decimal::new(2, 1))]
    pub smoothing_factor: Decimal,

    /// Level at or below which the tunnel counts as drained.
    #[builder(default = Metres(0.5))]
    pub drain_level: Metres,

    /// The tunnel must be drained at least once within this period.
    #[builder(default = TimeDelta::hours(24))]
    pub drain_period: TimeDelta,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Dwell-constrained capacity-matching controller with a periodic drain.
#[derive(Copy, Clone, Builder)]
pub struct ActivationController {
    model: LevelModel,

    #[builder(default)]
    config: ControllerConfig,
}

impl Controller for ActivationController {
    fn decide(&self, fleet: &Fleet, observation: &Observation) -> Result<Fleet> {
        let level = self.model.level_from_volume(observation.tank_volume)?;
        let safe_removal = safe_removal(&self.model, observation.tank_volume, observation.inflow);

        let mut next = fleet.clone();
        self.update_drain(&mut next, level, observation);
        next.smoothed_inflow = Some(self.smooth(fleet.smoothed_inflow, observation.inflow));
        let desired_flow = self.desired_flow(&next, level, observation.inflow, safe_removal);

        let best = Search::builder()
            .fleet(fleet)
            .desired_flow(desired_flow)
            .timestamp(observation.timestamp)
            .min_dwell(self.config.min_dwell)
            .build()
            .best();
        let mut next = if let Some(pattern) = best {
            next.apply(pattern, observation.timestamp)?
        } else {
            let error = Error::InfeasibleControl { timestamp: observation.timestamp };
            warn!(%error, "holding the current pattern");
            next
        };
        next.target_flow = Some(next.total_capacity().min(safe_removal));
        debug!(
            timestamp = %observation.timestamp,
            ?level,
            ?desired_flow,
            pattern = %next.pattern().display(next.len()),
            is_drain_pending = next.is_drain_pending,
            "decided",
        );
        Ok(next)
    }
}

impl ActivationController {
    fn update_drain(&self, fleet: &mut Fleet, level: Metres, observation: &Observation) {
        if level <= self.config.drain_level {
            fleet.last_drained_at = Some(observation.timestamp);
            fleet.is_drain_pending = false;
        } else if fleet
            .last_drained_at
            .is_none_or(|drained_at| observation.timestamp - drained_at >= self.config.drain_period)
        {
            fleet.is_drain_pending = true;
        }
    }

    /// Exponential moving average of the inflow, seeded with the first observation.
    fn smooth(&self, smoothed_inflow: Option<CubicMetres>, inflow: CubicMetres) -> CubicMetres {
        let alpha = self.config.smoothing_factor;
        smoothed_inflow
            .map_or(inflow, |smoothed| smoothed * (Decimal::ONE - alpha) + inflow * alpha)
            .round_dp(SMOOTHING_DECIMAL_PLACES)
    }

    /// Aggregate capacity the fleet should aim for within the next step.
    ///
    /// Expects the drain bookkeeping and smoothed inflow to be already updated.
    fn desired_flow(
        &self,
        fleet: &Fleet,
        level: Metres,
        inflow: CubicMetres,
        safe_removal: CubicMetres,
    ) -> CubicMetres {
        let min_capacity = fleet.min_unit_capacity();
        let max_capacity = fleet.max_capacity();

        let desired_flow = if fleet.is_drain_pending
            && inflow < self.config.rain_threshold
            && level > self.config.drain_level
        {
            max_capacity
        } else {
            let increment = self.config.flow_increment;
            let baseline = fleet
                .smoothed_inflow
                .unwrap_or(inflow)
                .round_to_multiple(increment)
                .clamp(min_capacity, max_capacity);
            // Rate-limit from the previous target, or from what is running right now:
            let current = fleet.target_flow.unwrap_or_else(|| fleet.total_capacity());
            baseline
                .clamp(current - increment, current + increment)
                .clamp(min_capacity, max_capacity)
        };

        desired_flow.min(safe_removal.max(min_capacity))
    }
}
