//! Geographic coordinate types shared by all overlay domains.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Valid latitude range
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// A geographic position carried by every normalized feature.
///
/// Construction is validated: NaN or out-of-range components are rejected so
/// a `Loaded` layer cache can never contain an unplottable position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a validated position.
    ///
    /// Returns `None` if either component is non-finite or outside the
    /// supported range.
    pub fn new(lat: f64, lng: f64) -> Option<Self> {
        if !lat.is_finite() || !lng.is_finite() {
            return None;
        }
        if !(MIN_LAT..=MAX_LAT).contains(&lat) || !(MIN_LON..=MAX_LON).contains(&lng) {
            return None;
        }
        Some(Self { lat, lng })
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_position() {
        let pos = LatLng::new(40.0, -120.0).unwrap();
        assert_eq!(pos.lat, 40.0);
        assert_eq!(pos.lng, -120.0);
    }

    #[test]
    fn rejects_nan_components() {
        assert!(LatLng::new(f64::NAN, 0.0).is_none());
        assert!(LatLng::new(0.0, f64::NAN).is_none());
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(LatLng::new(91.0, 0.0).is_none());
        assert!(LatLng::new(-91.0, 0.0).is_none());
        assert!(LatLng::new(0.0, 181.0).is_none());
        assert!(LatLng::new(0.0, -180.5).is_none());
    }

    #[test]
    fn boundary_values_are_valid() {
        assert!(LatLng::new(MAX_LAT, MAX_LON).is_some());
        assert!(LatLng::new(MIN_LAT, MIN_LON).is_some());
    }
}
