//! Testimonial star rating.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A star rating between 1 and 5 inclusive.
///
/// Out-of-range input is clamped rather than rejected, and a missing rating
/// defaults to five stars.
///
/// ```
/// use lakeside_core::Rating;
///
/// assert_eq!(Rating::clamped(9).value(), 5);
/// assert_eq!(Rating::clamped(-3).value(), 1);
/// assert_eq!(Rating::from_input(None).value(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "i32", from = "i32")]
pub struct Rating(u8);

impl Rating {
    /// Lowest accepted rating.
    pub const MIN: u8 = 1;
    /// Highest accepted rating.
    pub const MAX: u8 = 5;

    /// Clamp an arbitrary integer into the 1..=5 range.
    #[must_use]
    pub fn clamped(value: i64) -> Self {
        let clamped = value.clamp(i64::from(Self::MIN), i64::from(Self::MAX));
        // Within 1..=5 after clamping
        Self(u8::try_from(clamped).unwrap_or(Self::MAX))
    }

    /// Rating from optional form input, defaulting to the maximum.
    #[must_use]
    pub fn from_input(value: Option<i64>) -> Self {
        value.map_or_else(Self::default, Self::clamped)
    }

    /// The numeric rating.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// One flag per star slot, `true` for filled stars.
    #[must_use]
    pub fn stars(self) -> Vec<bool> {
        (1..=Self::MAX).map(|slot| slot <= self.0).collect()
    }
}

impl Default for Rating {
    fn default() -> Self {
        Self(Self::MAX)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for Rating {
    fn from(value: i32) -> Self {
        Self::clamped(i64::from(value))
    }
}

impl From<Rating> for i32 {
    fn from(rating: Rating) -> Self {
        Self::from(rating.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_clamps_into_range() {
        assert_eq!(Rating::clamped(0).value(), 1);
        assert_eq!(Rating::clamped(3).value(), 3);
        assert_eq!(Rating::clamped(100).value(), 5);
    }

    #[test]
    fn test_missing_input_is_five_stars() {
        assert_eq!(Rating::from_input(None), Rating::default());
        assert_eq!(Rating::default().value(), 5);
    }

    #[test]
    fn test_stars() {
        assert_eq!(
            Rating::clamped(3).stars(),
            vec![true, true, true, false, false]
        );
        assert_eq!(Rating::clamped(5).stars(), vec![true; 5]);
    }

    #[test]
    fn test_deserialize_clamps() {
        let rating: Rating = serde_json::from_str("7").unwrap();
        assert_eq!(rating.value(), 5);
        assert_eq!(serde_json::to_string(&rating).unwrap(), "5");
    }
}
