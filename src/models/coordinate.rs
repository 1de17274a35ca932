use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// A latitude/longitude pair in signed decimal degrees (WGS84).
///
/// Out-of-range values are representable; the codecs and the DMS formatter
/// reject them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct Coordinate {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Renders as `<latitude> <longitude>`, the decimal degree wire form.
impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.latitude, self.longitude)
    }
}
