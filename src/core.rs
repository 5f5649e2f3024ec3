pub mod controller;
pub mod error;
pub mod fleet;
pub mod interval;
pub mod level;
pub mod pattern;
pub mod pump;
pub mod tank;

pub use self::error::{Error, Result};
