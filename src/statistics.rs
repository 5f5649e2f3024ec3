use chrono::{NaiveDateTime, TimeDelta};
use itertools::{Itertools, MinMaxResult};
use rust_decimal::prelude::ToPrimitive;

use crate::{
    core::{fleet::Fleet, pump::PumpClass},
    quantity::{
        cost::Cost,
        energy::KilowattHours,
        level::Metres,
        power::Kilowatts,
        time::Hours,
    },
    simulation::{STEP, StepRecord},
};

/// Runs shorter than this are counted as short.
const SHORT_RUN: TimeDelta = TimeDelta::hours(2);

/// Run summary: energy and cost, runtime balance across the pumps, and extremes.
#[must_use]
pub struct Statistics {
    pub n_steps: usize,
    pub energy: KilowattHours,

    /// Cost of the energy at the normal tariff, the steps without the tariff are not counted.
    pub normal_cost: Cost,

    /// Cost of the energy at the high tariff, the steps without the tariff are not counted.
    pub high_cost: Cost,

    pub pumps: Vec<PumpStatistics>,
    pub run_time_balance: Option<RunTimeBalance>,

    /// Maximal total power draw and the first step it was reached at.
    pub max_power: Option<(NaiveDateTime, Kilowatts)>,

    /// Minimal total power draw and the first step it was reached at.
    pub min_power: Option<(NaiveDateTime, Kilowatts)>,

    pub peak_level: Option<(NaiveDateTime, Metres)>,
    pub final_level: Option<Metres>,
}

pub struct PumpStatistics {
    pub id: String,
    pub class: PumpClass,

    /// Start of the run still going on at the end.
    pub running_since: Option<NaiveDateTime>,

    pub run_time: TimeDelta,
    pub n_runs: usize,

    /// Number of contiguous runs shorter than two hours.
    pub n_short_runs: usize,
}

/// How evenly the runtime is spread across the pumps.
pub struct RunTimeBalance {
    pub min: TimeDelta,
    pub max: TimeDelta,

    /// Population standard deviation in hours.
    pub standard_deviation: f64,

    /// Zero is a perfectly even spread.
    pub gini: f64,
}

impl Statistics {
    pub fn new(steps: &[StepRecord], fleet: &Fleet) -> Self {
        let step_hours = Hours::from(STEP);
        let mut energy = KilowattHours::ZERO;
        let mut normal_cost = Cost::ZERO;
        let mut high_cost = Cost::ZERO;
        for step in steps {
            let step_energy = step.power * step_hours;
            energy += step_energy;
            if let Some(rate) = step.normal_rate {
                normal_cost += step_energy * rate;
            }
            if let Some(rate) = step.high_rate {
                high_cost += step_energy * rate;
            }
        }

        let pumps = fleet
            .units()
            .iter()
            .enumerate()
            .map(|(index, unit)| {
                let runs = steps
                    .iter()
                    .map(|step| step.pumping.is_active(index))
                    .dedup_with_count()
                    .filter(|(_, is_running)| *is_running)
                    .map(|(n_steps, _)| STEP * i32::try_from(n_steps).unwrap_or(i32::MAX))
                    .collect_vec();
                PumpStatistics {
                    id: unit.id.clone(),
                    class: unit.class,
                    running_since: unit.running_since(),
                    run_time: runs.iter().sum(),
                    n_runs: runs.len(),
                    n_short_runs: runs.iter().filter(|run| **run < SHORT_RUN).count(),
                }
            })
            .collect_vec();
        let run_time_balance = RunTimeBalance::new(&pumps);

        // `max_by_key` yields the last maximum, hence scanning backwards:
        let max_power = steps
            .iter()
            .rev()
            .max_by_key(|step| step.power)
            .map(|step| (step.timestamp, step.power));
        let min_power = steps
            .iter()
            .min_by_key(|step| step.power)
            .map(|step| (step.timestamp, step.power));
        let peak_level = steps
            .iter()
            .rev()
            .max_by_key(|step| step.level)
            .map(|step| (step.timestamp, step.level));

        Self {
            n_steps: steps.len(),
            energy,
            normal_cost,
            high_cost,
            pumps,
            run_time_balance,
            max_power,
            min_power,
            peak_level,
            final_level: steps.last().map(|step| step.level),
        }
    }
}

impl RunTimeBalance {
    fn new(pumps: &[PumpStatistics]) -> Option<Self> {
        let (min, max) = match pumps.iter().map(|pump| pump.run_time).minmax() {
            MinMaxResult::NoElements => return None,
            MinMaxResult::OneElement(run_time) => (run_time, run_time),
            MinMaxResult::MinMax(min, max) => (min, max),
        };
        let hours = pumps
            .iter()
            .map(|pump| Hours::from(pump.run_time).0.to_f64().unwrap_or_default())
            .collect_vec();
        Some(Self { min, max, standard_deviation: standard_deviation(&hours), gini: gini(&hours) })
    }
}

#[expect(clippy::cast_precision_loss)]
fn standard_deviation(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    (values.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / n).sqrt()
}

/// Gini coefficient of the values, zero for an empty or all-zero input.
#[expect(clippy::cast_precision_loss)]
fn gini(values: &[f64]) -> f64 {
    let total = values.iter().sum::<f64>();
    if values.is_empty() || total == 0.0 {
        return 0.0;
    }
    let n = values.len() as f64;
    let weighted_sum = values
        .iter()
        .copied()
        .sorted_by(f64::total_cmp)
        .enumerate()
        .map(|(index, value)| (index + 1) as f64 * value)
        .sum::<f64>();
    2.0 * weighted_sum / (n * total) - (n + 1.0) / n
}
