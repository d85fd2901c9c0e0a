//! Geographic coordinate value type.

use serde::{Deserialize, Serialize};

use crate::error::{FieldErrors, HarrastusResult};

/// A point given as latitude and longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build a coordinate for storage, enforcing latitude in [-90, 90]
    /// and longitude in [-180, 180].
    pub fn checked(latitude: f64, longitude: f64) -> HarrastusResult<Self> {
        let mut errors = FieldErrors::new();
        if !(-90.0..=90.0).contains(&latitude) {
            errors.add("latitude", "Value must be within -90.0 and 90.0.");
        }
        if !(-180.0..=180.0).contains(&longitude) {
            errors.add("longitude", "Value must be within -180.0 and 180.0.");
        }
        errors.into_result()?;
        Ok(Self::new(latitude, longitude))
    }

    /// Imported and hand-entered data uses (0, 0) as a placeholder for
    /// "unknown".
    pub fn is_null_island(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }
}
