//! Development tools for the level model.

use clap::{Parser, Subcommand};

use crate::{
    core::level::LevelModel,
    prelude::*,
    quantity::{level::Metres, volume::CubicMetres},
};

#[derive(Parser)]
pub struct BurrowArgs {
    #[command(subcommand)]
    command: BurrowCommand,
}

impl BurrowArgs {
    pub fn run(&self) -> Result {
        let model = LevelModel::default();
        match self.command {
            BurrowCommand::Level { volume } => {
                let level = model.level_from_volume(volume)?;
                info!(%volume, %level, "converted");
                println!("{level}");
            }
            BurrowCommand::Volume { level } => {
                let volume = model.volume_from_level(level)?;
                info!(%level, %volume, "converted");
                println!("{volume}");
            }
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Subcommand)]
enum BurrowCommand {
    /// Convert a tank volume in cubic metres to the water level.
    Level { volume: CubicMetres },

    /// Convert a water level in metres to the tank volume.
    Volume { level: Metres },
}
