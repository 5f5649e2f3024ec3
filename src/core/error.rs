//! Core errors.

use chrono::NaiveDateTime;

use crate::quantity::{level::Metres, volume::CubicMetres};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("level {level} is above the modelled range (up to {max})")]
    LevelOutOfDomain { level: Metres, max: Metres },

    #[error("volume {volume} is outside the modelled range [{min}, {max}]")]
    VolumeOutOfDomain { volume: CubicMetres, min: CubicMetres, max: CubicMetres },

    #[error("pump `{id}` cannot be toggled at {timestamp}, its last transition was at {last}")]
    InvalidTimestamp { id: String, timestamp: NaiveDateTime, last: NaiveDateTime },

    #[error("level {level} exceeds the safety ceiling of {ceiling}")]
    SafetyLimitExceeded { level: Metres, ceiling: Metres },

    #[error("no activation pattern satisfies the dwell constraints at {timestamp}")]
    InfeasibleControl { timestamp: NaiveDateTime },

    #[error("invalid fleet: {0}")]
    InvalidFleet(String),

    #[error("invalid level model: {0}")]
    InvalidLevelModel(&'static str),
}

#[cfg(test)]
impl Error {
    /// Whether the error comes from a level or volume outside of the modelled range.
    pub const fn is_domain(&self) -> bool {
        matches!(self, Self::LevelOutOfDomain { .. } | Self::VolumeOutOfDomain { .. })
    }
}
