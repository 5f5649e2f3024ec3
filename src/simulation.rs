use bon::Builder;
use chrono::{NaiveDateTime, TimeDelta};

use crate::{
    core::{
        controller::{Controller, Observation},
        fleet::Fleet,
        pattern::Pattern,
        tank::Tank,
    },
    prelude::*,
    quantity::{level::Metres, power::Kilowatts, rate::KilowattHourRate, volume::CubicMetres},
    scenario::Row,
};

/// Simulation step duration, the inflows and pump capacities are given per step.
pub const STEP: TimeDelta = TimeDelta::minutes(15);

/// Closed-loop run: the tank is stepped with the current fleet, then the controller reacts.
#[derive(Builder)]
#[builder(finish_fn(vis = ""))]
pub struct Simulation<'a> {
    tank: Tank,
    controller: &'a dyn Controller,
    rows: &'a [Row],
    initial_volume: CubicMetres,

    /// Initial fleet state.
    fleet: Fleet,
}

impl<S: simulation_builder::IsComplete> SimulationBuilder<'_, S> {
    pub fn run(self) -> Result<Outcome> {
        self.build().run()
    }
}

pub struct Outcome {
    pub steps: Vec<StepRecord>,

    /// Fleet after the last decision.
    pub fleet: Fleet,
}

#[derive(Copy, Clone, Debug)]
pub struct StepRecord {
    pub timestamp: NaiveDateTime,

    /// Tank volume after the step.
    pub volume: CubicMetres,

    /// Tank level after the step.
    pub level: Metres,

    pub inflow: CubicMetres,
    pub outflow: CubicMetres,

    /// Pumps that were running within the step.
    pub pumping: Pattern,

    /// Power drawn within the step.
    pub power: Kilowatts,

    /// Pumps decided for the next step.
    pub decision: Pattern,

    pub target_flow: Option<CubicMetres>,
    pub normal_rate: Option<KilowattHourRate>,
    pub high_rate: Option<KilowattHourRate>,
}

impl Simulation<'_> {
    #[instrument(skip_all, name = "Simulating…", fields(n_steps = self.rows.len()))]
    fn run(self) -> Result<Outcome> {
        let mut volume = self.initial_volume;
        let mut fleet = self.fleet;
        let mut steps = Vec::with_capacity(self.rows.len());

        for row in self.rows {
            let pumping = fleet.pattern();
            let power = fleet.total_power();
            let step = self
                .tank
                .step(row.inflow, volume, &fleet)
                .with_context(|| format!("the tank step at {} failed", row.timestamp))?;
            volume = step.volume_after;

            let observation =
                Observation { timestamp: row.timestamp, tank_volume: volume, inflow: row.inflow };
            fleet = self
                .controller
                .decide(&fleet, &observation)
                .with_context(|| format!("the decision at {} failed", row.timestamp))?;

            let record = StepRecord {
                timestamp: row.timestamp,
                volume,
                level: step.level_after,
                inflow: row.inflow,
                outflow: step.outflow,
                pumping,
                power,
                decision: fleet.pattern(),
                target_flow: fleet.target_flow,
                normal_rate: row.normal_rate,
                high_rate: row.high_rate,
            };
            trace!(
                timestamp = %record.timestamp,
                volume = %record.volume,
                level = %record.level,
                outflow = %record.outflow,
                decision = %record.decision.display(fleet.len()),
                "stepped",
            );
            steps.push(record);
        }

        for unit in fleet.units() {
            debug!(
                id = %unit.id,
                n_activations = unit.activations().len(),
                run_time = ?unit.cumulative_run_time(),
                "activation history",
            );
        }
        info!(n_steps = steps.len(), final_volume = %volume, "completed");
        Ok(Outcome { steps, fleet })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::{Decimal, dec};

    use super::*;
    use crate::{
        core::{
            Error,
            controller::{ActivationController, HysteresisController},
            level::LevelModel,
        },
        scenario::Scenario,
    };

    fn rows(inflows: impl IntoIterator<Item = Decimal>) -> Vec<Row> {
        let start = NaiveDate::from_ymd_opt(2024, 11, 15).unwrap().and_hms_opt(0, 0, 0).unwrap();
        inflows
            .into_iter()
            .enumerate()
            .map(|(index, inflow)| Row {
                timestamp: start + STEP * i32::try_from(index).unwrap(),
                inflow: CubicMetres::from(inflow),
                normal_rate: Some(KilowattHourRate::from(dec!(0.05))),
                high_rate: None,
            })
            .collect()
    }

    fn default_fleet() -> Fleet {
        Scenario::from_toml(
            r#"
            initial_volume = "350"

            [[steps]]
            timestamp = "2024-11-15T00:00:00"
            inflow = "0"
            "#,
        )
        .unwrap()
        .fleet()
        .unwrap()
    }

    fn simulate(controller: &dyn Controller, rows: &[Row]) -> Result<Outcome> {
        Simulation::builder()
            .tank(Tank::builder().model(LevelModel::default()).build())
            .controller(controller)
            .rows(rows)
            .initial_volume(CubicMetres::from(dec!(350)))
            .fleet(default_fleet())
            .run()
    }

    #[test]
    fn test_moderate_inflow_completes() {
        let controller = ActivationController::builder().model(LevelModel::default()).build();
        let rows = rows(vec![dec!(1500); 96]);
        let outcome = simulate(&controller, &rows).unwrap();
        assert_eq!(outcome.steps.len(), 96);
        assert!(outcome.steps.iter().all(|step| step.level <= Metres(8.0)));
    }

    /// The fleet decided at one step is the one pumping at the next step.
    #[test]
    fn test_decisions_lag_by_one_step() {
        let controller = ActivationController::builder().model(LevelModel::default()).build();
        let rows = rows(vec![dec!(1000); 16]);
        let outcome = simulate(&controller, &rows).unwrap();

        let first = &outcome.steps[0];
        assert!(first.pumping.is_empty());
        assert_eq!(first.outflow, CubicMetres::ZERO);
        assert_eq!(first.power, Kilowatts::ZERO);
        assert_eq!(first.volume, CubicMetres::from(dec!(1350)));

        for window in outcome.steps.windows(2) {
            assert_eq!(window[0].decision, window[1].pumping);
        }
        assert_eq!(outcome.steps.last().unwrap().decision, outcome.fleet.pattern());
    }

    #[test]
    fn test_volume_balance() {
        let controller = ActivationController::builder().model(LevelModel::default()).build();
        let rows = rows((0..48).map(|index| Decimal::from(index % 7 * 300)));
        let outcome = simulate(&controller, &rows).unwrap();

        let mut volume = CubicMetres::from(dec!(350));
        for step in &outcome.steps {
            assert!(step.outflow <= volume + step.inflow - CubicMetres::from(dec!(350)));
            volume = volume + step.inflow - step.outflow;
            assert_eq!(step.volume, volume);
        }
    }

    #[test]
    fn test_safety_limit_halts() {
        let controller = ActivationController::builder().model(LevelModel::default()).build();
        let rows = rows(vec![dec!(80000); 4]);
        let error = simulate(&controller, &rows).err().unwrap();
        assert!(matches!(error.downcast_ref::<Error>(), Some(Error::SafetyLimitExceeded { .. })));
    }

    #[test]
    fn test_hysteresis_controller() {
        let controller = HysteresisController::default();
        let rows = rows(vec![dec!(2000); 96]);
        let outcome = simulate(&controller, &rows).unwrap();

        // Idle until the volume rises above the lower threshold:
        assert!(outcome.steps[..3].iter().all(|step| step.pumping.is_empty()));
        assert!(outcome.steps[3..].iter().all(|step| !step.pumping.is_empty()));
    }
}
