//! Pump controllers.

pub mod constrained;
pub mod hysteresis;
mod search;

use chrono::NaiveDateTime;

pub use self::{constrained::ActivationController, hysteresis::HysteresisController};
use crate::{
    core::{Result, fleet::Fleet},
    quantity::volume::CubicMetres,
};

/// What the controller sees at the end of a step.
#[derive(Copy, Clone, Debug)]
pub struct Observation {
    pub timestamp: NaiveDateTime,

    /// Tank volume after the step.
    pub tank_volume: CubicMetres,

    /// Inflow within the step.
    pub inflow: CubicMetres,
}

/// Decides the fleet state for the next step.
pub trait Controller {
    fn decide(&self, fleet: &Fleet, observation: &Observation) -> Result<Fleet>;
}

#[derive(Copy, Clone, Debug, Default, clap::ValueEnum)]
pub enum ControllerKind {
    /// Dwell-constrained capacity matching with daily drain.
    #[default]
    Constrained,

    /// Volume thresholds only, without dwell constraints.
    Hysteresis,
}
