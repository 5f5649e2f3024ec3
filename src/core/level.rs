//! Volume and level conversions for the tunnel geometry.

use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::{
    core::{Error, Result},
    quantity::{level::Metres, volume::CubicMetres},
};

/// Volume rounding in the decimal domain.
///
/// Near the tunnel bottom, a volume step `q` moves the level by up to `sqrt(q / curvature)`,
/// so nine places keep the round trip well within a micrometre.
const VOLUME_DECIMAL_PLACES: u32 = 9;

/// Piecewise tunnel geometry, mapping water levels to stored volumes and back.
///
/// The curve consists of four segments over the breakpoints `r1 < r2 < r3 < r4`:
///
/// - below `r1`, the tunnel bottom holds the constant minimal volume;
/// - `[r1, r2)`, the cross-section widens linearly, so the volume grows quadratically;
/// - `[r2, r3)`, constant cross-section with linear growth;
/// - `[r3, r4]`, the cross-section narrows again, mirroring the second segment up to the maximal volume.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LevelModel {
    r1: Metres,
    r2: Metres,
    r3: Metres,
    r4: Metres,
    min_volume: CubicMetres,

    /// Cubic metres per squared metre of level in the quadratic segments.
    curvature: f64,

    max_volume: CubicMetres,
}

impl Default for LevelModel {
    fn default() -> Self {
        Self::try_new(
            [Metres(0.4), Metres(5.9), Metres(8.6), Metres(14.1)],
            CubicMetres::from(Decimal::from(350)),
            2500.0,
        )
        .expect("the tunnel geometry should be valid")
    }
}

impl LevelModel {
    pub fn try_new(
        [r1, r2, r3, r4]: [Metres; 4],
        min_volume: CubicMetres,
        curvature: f64,
    ) -> Result<Self> {
        if !(r1 < r2 && r2 < r3 && r3 < r4) {
            return Err(Error::InvalidLevelModel("breakpoints must be strictly increasing"));
        }
        if !(curvature.is_finite() && curvature > 0.0) {
            return Err(Error::InvalidLevelModel("curvature must be positive"));
        }
        let mut model =
            Self { r1, r2, r3, r4, min_volume, curvature, max_volume: CubicMetres::ZERO };
        model.max_volume = round_volume(model.max_volume_f64())?;
        Ok(model)
    }

    pub const fn min_volume(&self) -> CubicMetres {
        self.min_volume
    }

    pub const fn max_volume(&self) -> CubicMetres {
        self.max_volume
    }

    /// Top of the modelled range.
    pub const fn max_level(&self) -> Metres {
        self.r4
    }

    /// Stored volume at the given level.
    ///
    /// Any level below the tunnel bottom maps onto the minimal volume.
    pub fn volume_from_level(&self, level: Metres) -> Result<CubicMetres> {
        if level > self.r4 {
            return Err(Error::LevelOutOfDomain { level, max: self.r4 });
        }
        if level < self.r1 {
            return Ok(self.min_volume);
        }
        let level = level.0;
        let volume = if level < self.r2.0 {
            self.curvature.mul_add((level - self.r1.0).powi(2), self.min_volume_f64())
        } else if level < self.r3.0 {
            self.slope().mul_add(level - self.r2.0, self.r2_volume_f64())
        } else {
            (-self.curvature).mul_add((self.r4.0 - level).powi(2), self.max_volume_f64())
        };
        round_volume(volume)
    }

    /// Water level at the given stored volume.
    ///
    /// The flat bottom is not invertible, the minimal volume maps onto `r1`.
    pub fn level_from_volume(&self, volume: CubicMetres) -> Result<Metres> {
        let out_of_domain =
            || Error::VolumeOutOfDomain { volume, min: self.min_volume, max: self.max_volume };
        if volume < self.min_volume || volume > self.max_volume {
            return Err(out_of_domain());
        }
        if volume == self.min_volume {
            return Ok(self.r1);
        }
        let volume = volume.0.to_f64().ok_or_else(out_of_domain)?;
        let level = if volume <= self.r2_volume_f64() {
            self.r1.0 + ((volume - self.min_volume_f64()) / self.curvature).sqrt()
        } else if volume <= self.r3_volume_f64() {
            self.r2.0 + (volume - self.r2_volume_f64()) / self.slope()
        } else {
            // The decimal upper bound may sit a rounding error above the floating-point one:
            self.r4.0 - ((self.max_volume_f64() - volume).max(0.0) / self.curvature).sqrt()
        };
        Ok(Metres(level))
    }

    fn min_volume_f64(&self) -> f64 {
        self.min_volume.0.to_f64().unwrap_or_default()
    }

    /// Volume growth rate in the linear segment, continuous with the quadratic one.
    const fn slope(&self) -> f64 {
        2.0 * self.curvature * (self.r2.0 - self.r1.0)
    }

    fn r2_volume_f64(&self) -> f64 {
        self.curvature.mul_add((self.r2.0 - self.r1.0).powi(2), self.min_volume_f64())
    }

    fn r3_volume_f64(&self) -> f64 {
        self.slope().mul_add(self.r3.0 - self.r2.0, self.r2_volume_f64())
    }

    fn max_volume_f64(&self) -> f64 {
        self.curvature.mul_add((self.r4.0 - self.r3.0).powi(2), self.r3_volume_f64())
    }
}

fn round_volume(volume: f64) -> Result<CubicMetres> {
    Decimal::try_from(volume)
        .map(|volume| CubicMetres::from(volume.round_dp(VOLUME_DECIMAL_PLACES)))
        .map_err(|_| Error::InvalidLevelModel("volume is not representable"))
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use rust_decimal::dec;

    use super::*;

    #[test]
    fn test_breakpoint_volumes() {
        let model = LevelModel::default();
        assert_eq!(model.min_volume(), CubicMetres::from(dec!(350)));
        assert_eq!(model.max_volume(), CubicMetres::from(dec!(225850)));
        assert_eq!(model.volume_from_level(Metres(5.9)).unwrap(), CubicMetres::from(dec!(75975)));
        assert_eq!(model.volume_from_level(Metres(8.6)).unwrap(), CubicMetres::from(dec!(150225)));
        assert_eq!(model.volume_from_level(Metres(14.1)).unwrap(), model.max_volume());
    }

    #[test]
    fn test_below_bottom() {
        let model = LevelModel::default();
        assert_eq!(model.volume_from_level(Metres(0.0)).unwrap(), model.min_volume());
        assert_eq!(model.volume_from_level(Metres(-3.0)).unwrap(), model.min_volume());
    }

    #[test]
    fn test_min_volume_maps_to_r1() {
        let model = LevelModel::default();
        assert_eq!(model.level_from_volume(model.min_volume()).unwrap(), Metres(0.4));
    }

    #[test]
    fn test_round_trip() {
        let model = LevelModel::default();
        for level in [0.4, 0.401, 3.15, 5.9, 7.25, 8.0, 8.6, 11.35, 14.0, 14.1] {
            let volume = model.volume_from_level(Metres(level)).unwrap();
            let level_back = model.level_from_volume(volume).unwrap();
            assert_abs_diff_eq!(level_back.0, level, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_round_trip_near_bottom() {
        let model = LevelModel::default();
        for offset in [1e-7, 1e-6, 5e-6, 1e-5, 1.4e-5, 1e-4] {
            let level = 0.4 + offset;
            let volume = model.volume_from_level(Metres(level)).unwrap();
            let level_back = model.level_from_volume(volume).unwrap();
            assert_abs_diff_eq!(level_back.0, level, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_just_above_min_volume() {
        let model = LevelModel::default();
        let level = model.level_from_volume(CubicMetres::from(dec!(350.000000001))).unwrap();
        assert!(level > Metres(0.4));
        assert_abs_diff_eq!(level.0, 0.4, epsilon = 1e-6);
    }

    #[test]
    fn test_monotonic() {
        let model = LevelModel::default();
        let mut previous_volume = CubicMetres::ZERO;
        let mut previous_level = Metres(f64::NEG_INFINITY);
        for i in 0..=1500 {
            let level = Metres(f64::from(i) * 0.01 - 0.5);
            if level > model.max_level() {
                break;
            }
            let volume = model.volume_from_level(level).unwrap();
            assert!(volume >= previous_volume, "volume decreased at {level:?}");
            previous_volume = volume;

            let level_back = model.level_from_volume(volume).unwrap();
            assert!(level_back >= previous_level, "level decreased at {volume:?}");
            previous_level = level_back;
        }
    }

    #[test]
    fn test_continuous_at_breakpoints() {
        let model = LevelModel::default();
        for breakpoint in [5.9, 8.6] {
            let below = model.volume_from_level(Metres(breakpoint - 1e-9)).unwrap();
            let at = model.volume_from_level(Metres(breakpoint)).unwrap();
            assert!((at - below).0 < dec!(0.001));
        }
    }

    #[test]
    fn test_level_above_range() {
        let error = LevelModel::default().volume_from_level(Metres(14.2)).unwrap_err();
        assert!(error.is_domain());
        assert!(matches!(error, Error::LevelOutOfDomain { .. }));
    }

    #[test]
    fn test_level_nan() {
        assert!(LevelModel::default().volume_from_level(Metres(f64::NAN)).is_err());
    }

    #[test]
    fn test_volume_outside_range() {
        let model = LevelModel::default();
        for volume in [dec!(349.99), dec!(0), dec!(225850.000001)] {
            let error = model.level_from_volume(CubicMetres::from(volume)).unwrap_err();
            assert!(matches!(error, Error::VolumeOutOfDomain { .. }));
        }
    }

    #[test]
    fn test_invalid_breakpoints() {
        let result = LevelModel::try_new(
            [Metres(1.0), Metres(1.0), Metres(2.0), Metres(3.0)],
            CubicMetres::from(dec!(350)),
            2500.0,
        );
        assert!(matches!(result, Err(Error::InvalidLevelModel(_))));
    }
}
