//! Geographic coordinates for branch locations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing [`Coordinates`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordinatesError {
    #[error("latitude must be between -90 and 90 (got {0})")]
    LatitudeOutOfRange(Decimal),
    #[error("longitude must be between -180 and 180 (got {0})")]
    LongitudeOutOfRange(Decimal),
}

/// A latitude/longitude pair stored with seven decimal places.
///
/// Values are rounded to seven places on construction to match the
/// `NUMERIC(10, 7)` columns they are persisted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    latitude: Decimal,
    longitude: Decimal,
}

impl Coordinates {
    /// Decimal places kept for both axes.
    pub const SCALE: u32 = 7;

    /// Build coordinates, validating their ranges.
    ///
    /// # Errors
    ///
    /// Returns an error if latitude is outside -90..=90 or longitude is
    /// outside -180..=180.
    pub fn new(latitude: Decimal, longitude: Decimal) -> Result<Self, CoordinatesError> {
        if latitude < Decimal::from(-90) || latitude > Decimal::from(90) {
            return Err(CoordinatesError::LatitudeOutOfRange(latitude));
        }
        if longitude < Decimal::from(-180) || longitude > Decimal::from(180) {
            return Err(CoordinatesError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude: latitude.round_dp(Self::SCALE),
            longitude: longitude.round_dp(Self::SCALE),
        })
    }

    #[must_use]
    pub const fn latitude(&self) -> Decimal {
        self.latitude
    }

    #[must_use]
    pub const fn longitude(&self) -> Decimal {
        self.longitude
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_valid_coordinates() {
        let c = Coordinates::new(dec("5.6809"), dec("-0.2420")).unwrap();
        assert_eq!(c.latitude(), dec("5.6809"));
        assert_eq!(c.longitude(), dec("-0.2420"));
    }

    #[test]
    fn test_rounds_to_seven_places() {
        let c = Coordinates::new(dec("9.123456789"), dec("0")).unwrap();
        assert_eq!(c.latitude(), dec("9.1234568"));
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(
            Coordinates::new(dec("91"), dec("0")),
            Err(CoordinatesError::LatitudeOutOfRange(_))
        ));
        assert!(matches!(
            Coordinates::new(dec("0"), dec("-180.5")),
            Err(CoordinatesError::LongitudeOutOfRange(_))
        ));
    }
}
