//! Scenario simulation.

use std::path::PathBuf;

use clap::Parser;

use crate::{
    cli::control::{ControlArgs, HysteresisArgs, TankArgs},
    core::{
        controller::{ActivationController, Controller, ControllerKind},
        level::LevelModel,
    },
    prelude::*,
    scenario::Scenario,
    simulation::Simulation,
    statistics::Statistics,
    tables::{build_pumps_table, build_steps_table, build_summary_table},
};

#[derive(Parser)]
pub struct SimulateArgs {
    /// Scenario TOML file with the initial volume, the pumps, and the inflows.
    #[clap(long, env = "SCENARIO_PATH")]
    scenario: PathBuf,

    #[clap(long, env = "CONTROLLER", value_enum, default_value = "constrained")]
    controller: ControllerKind,

    /// Print every step.
    #[clap(long)]
    steps: bool,

    #[clap(flatten)]
    tank: TankArgs,

    #[clap(flatten)]
    control: ControlArgs,

    #[clap(flatten)]
    hysteresis: HysteresisArgs,
}

impl SimulateArgs {
    #[instrument(skip_all, fields(controller = ?self.controller))]
    pub fn run(&self) -> Result {
        let scenario = Scenario::read_from(&self.scenario)?;
        let model = LevelModel::default();
        ensure!(
            scenario.initial_volume <= model.max_volume(),
            "the initial volume exceeds the tunnel capacity of {}",
            model.max_volume(),
        );
        let tank = self.tank.tank(model)?;

        let constrained;
        let hysteresis;
        let controller: &dyn Controller = match self.controller {
            ControllerKind::Constrained => {
                constrained = ActivationController::builder()
                    .model(model)
                    .config(self.control.config()?)
                    .build();
                &constrained
            }
            ControllerKind::Hysteresis => {
                hysteresis = self.hysteresis.controller()?;
                &hysteresis
            }
        };

        let outcome = Simulation::builder()
            .tank(tank)
            .controller(controller)
            .rows(&scenario.steps)
            .initial_volume(scenario.initial_volume)
            .fleet(scenario.fleet()?)
            .run()?;

        if self.steps {
            println!("{}", build_steps_table(&outcome.steps, outcome.fleet.len(), tank.max_level()));
        }
        let statistics = Statistics::new(&outcome.steps, &outcome.fleet);
        println!("{}", build_pumps_table(&statistics));
        println!("{}", build_summary_table(&statistics));
        Ok(())
    }
}
