//! Tunnel water balance.

use bon::Builder;

use crate::{
    core::{Error, Result, fleet::Fleet, level::LevelModel},
    quantity::{level::Metres, volume::CubicMetres},
};

/// Water balance of the tunnel over a single step.
#[derive(Copy, Clone, Builder)]
pub struct Tank {
    model: LevelModel,

    /// Hard ceiling: exceeding it halts the simulation.
    #[builder(default = Metres(8.0))]
    max_level: Metres,
}

/// Outcome of a single step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TankStep {
    /// Volume actually pumped out.
    pub outflow: CubicMetres,

    pub volume_after: CubicMetres,
    pub level_after: Metres,
}

impl Tank {
    pub const fn max_level(&self) -> Metres {
        self.max_level
    }

    /// Volume that may be pumped out without dropping below the tunnel floor.
    pub fn safe_removal(&self, volume: CubicMetres, inflow: CubicMetres) -> CubicMetres {
        safe_removal(&self.model, volume, inflow)
    }

    /// Let the water in and pump out with the fleet's current capacity.
    pub fn step(
        &self,
        inflow: CubicMetres,
        volume: CubicMetres,
        fleet: &Fleet,
    ) -> Result<TankStep> {
        let requested_outflow = fleet.total_capacity();
        let outflow = requested_outflow.min(self.safe_removal(volume, inflow));
        let volume_after = (volume + inflow - outflow).max(self.model.min_volume());
        let level_after = self.model.level_from_volume(volume_after)?;
        if level_after > self.max_level {
            return Err(Error::SafetyLimitExceeded { level: level_after, ceiling: self.max_level });
        }
        Ok(TankStep { outflow, volume_after, level_after })
    }
}

/// Volume that may be removed within a step without dropping below the model's minimal volume.
pub fn safe_removal(model: &LevelModel, volume: CubicMetres, inflow: CubicMetres) -> CubicMetres {
    (volume + inflow - model.min_volume()).max(CubicMetres::ZERO)
}
