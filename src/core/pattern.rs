//! Fleet activation patterns.

use std::fmt::{Debug, Display, Formatter};

/// On/off states of the whole fleet, bit `i` standing for the unit `i` in roster order.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Pattern(u32);

impl Pattern {
    /// Largest roster for which the exhaustive search is allowed.
    pub const MAX_UNITS: usize = 16;

    /// All patterns over `n_units` in ascending bit-mask order, starting with all units off.
    pub fn all(n_units: usize) -> impl Iterator<Item = Self> {
        assert!(n_units <= Self::MAX_UNITS, "too many units for the exhaustive search");
        (0..(1_u32 << n_units)).map(Self)
    }

    pub fn from_states(states: impl IntoIterator<Item = bool>) -> Self {
        states
            .into_iter()
            .enumerate()
            .filter(|(_, is_active)| *is_active)
            .fold(Self::default(), |pattern, (index, _)| pattern.with(index, true))
    }

    pub const fn is_active(self, index: usize) -> bool {
        self.0 & (1 << index) != 0
    }

    #[must_use]
    pub const fn with(self, index: usize, is_active: bool) -> Self {
        if is_active { Self(self.0 | (1 << index)) } else { Self(self.0 & !(1 << index)) }
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn n_active(self) -> u32 {
        self.0.count_ones()
    }

    /// Number of units switching when going from `self` to `other`.
    pub const fn n_toggled(self, other: Self) -> u32 {
        (self.0 ^ other.0).count_ones()
    }
}

impl Debug for Pattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#b}", self.0)
    }
}

impl Pattern {
    /// Render the first `n_units` states as `●` (on) and `○` (off).
    pub const fn display(self, n_units: usize) -> impl Display {
        DisplayPattern { pattern: self, n_units }
    }
}

struct DisplayPattern {
    pattern: Pattern,
    n_units: usize,
}

impl Display for DisplayPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for index in 0..self.n_units {
            write!(f, "{}", if self.pattern.is_active(index) { '●' } else { '○' })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    #[test]
    fn test_all_in_mask_order() {
        let patterns = Pattern::all(2).collect_vec();
        assert_eq!(patterns, [Pattern(0b00), Pattern(0b01), Pattern(0b10), Pattern(0b11)]);
    }

    #[test]
    fn test_from_states() {
        let pattern = Pattern::from_states([true, false, true]);
        assert!(pattern.is_active(0));
        assert!(!pattern.is_active(1));
        assert!(pattern.is_active(2));
        assert_eq!(pattern.n_active(), 2);
    }

    #[test]
    fn test_n_toggled() {
        assert_eq!(Pattern(0b0110).n_toggled(Pattern(0b0011)), 2);
        assert_eq!(Pattern(0b0110).n_toggled(Pattern(0b0110)), 0);
    }

    #[test]
    fn test_with() {
        assert_eq!(Pattern::default().with(3, true), Pattern(0b1000));
        assert_eq!(Pattern(0b1010).with(1, false), Pattern(0b1000));
    }

    #[test]
    fn test_display() {
        assert_eq!(Pattern(0b101).display(4).to_string(), "●○●○");
    }
}
