//! Grid-reference and area-code providers used by the hub converter.
//!
//! The converter only talks to the [`MgrsCodec`] and [`PlusCodeCodec`]
//! traits; [`UtmUpsMgrs`] and [`OpenLocationCode`] are the default providers.

pub mod mgrs;
pub mod pluscode;

use validator::Validate;

use crate::error::{ConversionError, Result};
use crate::models::Coordinate;

pub use mgrs::UtmUpsMgrs;
pub use pluscode::OpenLocationCode;

/// Military Grid Reference System encoder/decoder.
pub trait MgrsCodec: Send + Sync {
    fn to_mgrs(&self, latitude: f64, longitude: f64) -> Result<String>;

    /// Decode a grid reference to the latitude/longitude of its south-west
    /// corner.
    fn to_lat_lon(&self, gridref: &str) -> Result<(f64, f64)>;
}

/// Open Location Code encoder/decoder.
pub trait PlusCodeCodec: Send + Sync {
    fn encode(&self, latitude: f64, longitude: f64) -> Result<String>;

    fn decode(&self, code: &str) -> Result<CodeArea>;
}

/// The area covered by a decoded plus code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CodeArea {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
    pub latitude_center: f64,
    pub longitude_center: f64,
    pub code_length: usize,
}

impl CodeArea {
    pub fn center(&self) -> Coordinate {
        Coordinate::new(self.latitude_center, self.longitude_center)
    }
}

/// Reject pairs outside lat [-90, 90] / lon [-180, 180] on behalf of `codec`.
pub(crate) fn validate_range(codec: &'static str, latitude: f64, longitude: f64) -> Result<()> {
    if !latitude.is_finite() || !longitude.is_finite() {
        return Err(ConversionError::codec(
            codec,
            format!("coordinate ({}, {}) is not finite", latitude, longitude),
        ));
    }

    Coordinate::new(latitude, longitude)
        .validate()
        .map_err(|e| {
            ConversionError::codec(
                codec,
                format!("coordinate ({}, {}) is out of range: {}", latitude, longitude, e),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_range() {
        assert!(validate_range("test", 0.0, 0.0).is_ok());
        assert!(validate_range("test", 90.0, -180.0).is_ok());

        let err = validate_range("test", 95.0, 0.0).unwrap_err();
        assert!(matches!(err, ConversionError::CodecFailure { codec: "test", .. }));
        assert!(validate_range("test", f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_code_area_center() {
        let area = CodeArea {
            south: 1.0,
            west: 2.0,
            north: 3.0,
            east: 4.0,
            latitude_center: 2.0,
            longitude_center: 3.0,
            code_length: 2,
        };
        assert_eq!(area.center(), Coordinate::new(2.0, 3.0));
    }
}
