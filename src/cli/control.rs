//! Controller, hysteresis, and tank tuning arguments.

use chrono::TimeDelta;
use clap::Parser;
use enumset::EnumSet;
use rust_decimal::Decimal;

use crate::{
    core::{
        controller::{HysteresisController, constrained::ControllerConfig},
        level::LevelModel,
        pump::PumpClass,
        tank::Tank,
    },
    prelude::*,
    quantity::{level::Metres, volume::CubicMetres},
};

#[derive(Parser)]
pub struct ControlArgs {
    /// Minimum time a pump stays on after a start, or off after a stop.
    #[clap(long, env = "MIN_DWELL", default_value = "2h")]
    min_dwell: humantime::Duration,

    /// Inflow per step above which the daily drain is postponed.
    #[clap(long = "rain-threshold-m3", env = "RAIN_THRESHOLD_M3", default_value = "2000")]
    rain_threshold: CubicMetres,

    /// Target flow granularity and its maximal change per step.
    #[clap(long = "flow-increment-m3", env = "FLOW_INCREMENT_M3", default_value = "375")]
    flow_increment: CubicMetres,

    /// Weight of the latest inflow in the smoothed estimate.
    #[clap(long, env = "SMOOTHING_FACTOR", default_value = "0.2")]
    smoothing_factor: Decimal,

    /// Level at or below which the tunnel counts as drained.
    #[clap(long = "drain-level-metres", env = "DRAIN_LEVEL_METRES", default_value = "0.5")]
    drain_level: Metres,

    /// The tunnel must be drained at least once within this period.
    #[clap(long, env = "DRAIN_PERIOD", default_value = "24h")]
    drain_period: humantime::Duration,
}

impl ControlArgs {
    pub fn config(&self) -> Result<ControllerConfig> {
        ensure!(
            self.smoothing_factor > Decimal::ZERO && self.smoothing_factor <= Decimal::ONE,
            "the smoothing factor must be within (0, 1]",
        );
        ensure!(self.flow_increment > CubicMetres::ZERO, "the flow increment must be positive");
        Ok(ControllerConfig::builder()
            .min_dwell(TimeDelta::from_std(self.min_dwell.into())?)
            .rain_threshold(self.rain_threshold)
            .flow_increment(self.flow_increment)
            .smoothing_factor(self.smoothing_factor)
            .drain_level(self.drain_level)
            .drain_period(TimeDelta::from_std(self.drain_period.into())?)
            .build())
    }
}

#[derive(Parser)]
pub struct HysteresisArgs {
    /// Volume above which one more pump is started.
    #[clap(long = "upper-volume-m3", env = "UPPER_VOLUME_M3", default_value = "60000")]
    upper_volume: CubicMetres,

    /// Volume below which one pump is stopped.
    #[clap(long = "lower-volume-m3", env = "LOWER_VOLUME_M3", default_value = "5000")]
    lower_volume: CubicMetres,

    /// Pump classes switched by the thresholds.
    #[clap(
        long = "hysteresis-classes",
        env = "HYSTERESIS_CLASSES",
        value_delimiter = ',',
        num_args = 1..,
        default_value = "large",
    )]
    classes: Vec<PumpClass>,
}

impl HysteresisArgs {
    pub fn controller(&self) -> Result<HysteresisController> {
        ensure!(
            self.lower_volume <= self.upper_volume,
            "the lower volume threshold must not exceed the upper one",
        );
        Ok(HysteresisController::builder()
            .upper_volume(self.upper_volume)
            .lower_volume(self.lower_volume)
            .classes(self.classes.iter().copied().collect::<EnumSet<_>>())
            .build())
    }
}

#[derive(Copy, Clone, Parser)]
pub struct TankArgs {
    /// Safety ceiling: the run halts as soon as the level gets above it.
    #[clap(long = "max-level-metres", env = "MAX_LEVEL_METRES", default_value = "8.0")]
    max_level: Metres,
}

impl TankArgs {
    pub fn tank(self, model: LevelModel) -> Result<Tank> {
        ensure!(
            self.max_level <= model.max_level(),
            "the safety ceiling of {} is above the modelled range (up to {})",
            self.max_level,
            model.max_level(),
        );
        Ok(Tank::builder().model(model).max_level(self.max_level).build())
    }
}
