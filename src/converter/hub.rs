use tracing::debug;

use crate::codecs::{MgrsCodec, OpenLocationCode, PlusCodeCodec, UtmUpsMgrs};
use crate::error::Result;
use crate::models::{Coordinate, Format};
use crate::utils::coordinates::{format_dms_pair, parse_dms_pair, parse_decimal_pair};

/// Moves coordinates into and out of decimal degrees, the hub every
/// conversion passes through.
pub struct HubConverter {
    mgrs: Box<dyn MgrsCodec>,
    pluscode: Box<dyn PlusCodeCodec>,
    strict_hemisphere: bool,
}

impl HubConverter {
    pub fn new(mgrs: Box<dyn MgrsCodec>, pluscode: Box<dyn PlusCodeCodec>) -> Self {
        Self {
            mgrs,
            pluscode,
            strict_hemisphere: false,
        }
    }

    pub fn with_strict_hemisphere(mut self, strict_hemisphere: bool) -> Self {
        self.strict_hemisphere = strict_hemisphere;
        self
    }

    pub fn with_mgrs_codec(mut self, mgrs: Box<dyn MgrsCodec>) -> Self {
        self.mgrs = mgrs;
        self
    }

    pub fn with_pluscode_codec(mut self, pluscode: Box<dyn PlusCodeCodec>) -> Self {
        self.pluscode = pluscode;
        self
    }

    pub fn strict_hemisphere(&self) -> bool {
        self.strict_hemisphere
    }

    /// Parse `text` in the `source` format into decimal degrees.
    pub fn to_hub(&self, text: &str, source: Format) -> Result<Coordinate> {
        let coordinate = match source {
            Format::Dms => parse_dms_pair(text, self.strict_hemisphere)?,
            Format::Dd => parse_decimal_pair(text)?,
            Format::PlusCode => self.pluscode.decode(text.trim())?.center(),
            Format::Mgrs => {
                let (latitude, longitude) = self.mgrs.to_lat_lon(text.trim())?;
                Coordinate::new(latitude, longitude)
            }
        };

        debug!(%source, %coordinate, "reached hub");
        Ok(coordinate)
    }

    /// Render a decimal degree coordinate in the `destination` format.
    pub fn from_hub(&self, coordinate: &Coordinate, destination: Format) -> Result<String> {
        match destination {
            Format::Dms => format_dms_pair(coordinate),
            Format::Dd => Ok(coordinate.to_string()),
            Format::PlusCode => self
                .pluscode
                .encode(coordinate.latitude, coordinate.longitude),
            Format::Mgrs => self.mgrs.to_mgrs(coordinate.latitude, coordinate.longitude),
        }
    }
}

impl Default for HubConverter {
    fn default() -> Self {
        Self::new(
            Box::new(UtmUpsMgrs::default()),
            Box::new(OpenLocationCode::default()),
        )
    }
}
