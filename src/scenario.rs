//! Scenario files.

use std::{fmt::Debug, fs, path::Path};

use chrono::NaiveDateTime;
use itertools::Itertools;
use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};

use crate::{
    core::{
        fleet::Fleet,
        pump::{PumpClass, PumpUnit, Rating},
    },
    prelude::*,
    quantity::{power::Kilowatts, rate::KilowattHourRate, volume::CubicMetres},
};

/// Simulation input: the initial tank volume, the roster, and the per-step measurements.
#[serde_as]
#[derive(Deserialize)]
pub struct Scenario {
    #[serde_as(as = "DisplayFromStr")]
    pub initial_volume: CubicMetres,

    /// Pump roster, the default one when omitted.
    #[serde(default)]
    pub pumps: Vec<PumpSpec>,

    pub steps: Vec<Row>,
}

/// Roster entry, the class rating applies unless overridden.
#[serde_as]
#[derive(Clone, Deserialize)]
pub struct PumpSpec {
    pub id: String,
    pub class: PumpClass,

    /// Volume pumped out within a single step.
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub capacity: Option<CubicMetres>,

    /// Electrical power draw while running.
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub power: Option<Kilowatts>,
}

impl PumpSpec {
    fn unit(&self) -> Result<PumpUnit> {
        let class_rating = self.class.rating();
        let rating = Rating {
            capacity: self.capacity.unwrap_or(class_rating.capacity),
            power: self.power.unwrap_or(class_rating.power),
        };
        ensure!(
            rating.capacity > CubicMetres::ZERO,
            "pump `{}` must have a positive capacity",
            self.id,
        );
        ensure!(rating.power >= Kilowatts::ZERO, "pump `{}` must not draw negative power", self.id);
        Ok(PumpUnit::with_rating(self.id.clone(), self.class, rating))
    }
}

/// Single 15-minute measurement.
#[serde_as]
#[derive(Copy, Clone, Deserialize)]
pub struct Row {
    #[serde_as(as = "DisplayFromStr")]
    pub timestamp: NaiveDateTime,

    /// Inflow to the tunnel within the step.
    #[serde_as(as = "DisplayFromStr")]
    pub inflow: CubicMetres,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub normal_rate: Option<KilowattHourRate>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub high_rate: Option<KilowattHourRate>,
}

impl Scenario {
    #[instrument(name = "Reading the scenario…")]
    pub fn read_from<P: AsRef<Path> + Debug>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read `{}`", path.display()))?;
        let scenario = Self::from_toml(&contents)
            .with_context(|| format!("invalid scenario `{}`", path.display()))?;
        info!(n_steps = scenario.steps.len(), n_pumps = scenario.pumps.len(), "loaded");
        Ok(scenario)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let scenario: Self = toml::from_str(contents)?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result {
        ensure!(!self.steps.is_empty(), "the scenario has no steps");
        ensure!(
            self.initial_volume >= CubicMetres::ZERO,
            "the initial volume must not be negative",
        );
        if let Some((previous, next)) = self
            .steps
            .iter()
            .tuple_windows()
            .find(|(previous, next)| next.timestamp <= previous.timestamp)
        {
            bail!(
                "timestamps must be strictly increasing, but {} follows {}",
                next.timestamp,
                previous.timestamp,
            );
        }
        Ok(())
    }

    /// Build the initial fleet, all pumps off.
    pub fn fleet(&self) -> Result<Fleet> {
        let units = if self.pumps.is_empty() {
            default_roster()
        } else {
            self.pumps.iter().map(PumpSpec::unit).collect::<Result<_>>()?
        };
        Ok(Fleet::try_new(units)?)
    }
}

/// Two stations, four pumps each: the first one small, the others large.
fn default_roster() -> Vec<PumpUnit> {
    (1..=2)
        .cartesian_product(1..=4)
        .map(|(station, number)| {
            let class = if number == 1 { PumpClass::Small } else { PumpClass::Large };
            PumpUnit::new(format!("{station}.{number}"), class)
        })
        .collect()
}
