use std::fmt;

use crate::error::{ConversionError, Result};

/// A textual coordinate representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Degrees/minutes/seconds, e.g. `48°53'10.18"N 2°20'35.09"E`
    Dms,
    /// Signed decimal degrees, e.g. `-48.8866111111 -2.34330555556`
    Dd,
    /// Military Grid Reference System, e.g. `4QFJ1234567890`
    Mgrs,
    /// Open Location Code, e.g. `8FVC9G8F+6X`
    PlusCode,
}

impl Format {
    pub const ALL: [Format; 4] = [Format::Dms, Format::Dd, Format::Mgrs, Format::PlusCode];

    /// Look up a format by any of its accepted names.
    ///
    /// `openlocationcode` and `pluscode` are synonyms. Matching ignores case
    /// and surrounding whitespace.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "dms" => Some(Format::Dms),
            "dd" => Some(Format::Dd),
            "mgrs" => Some(Format::Mgrs),
            "openlocationcode" | "pluscode" => Some(Format::PlusCode),
            _ => None,
        }
    }

    /// Like [`Format::from_tag`], but rejects unknown names with an error
    /// naming the side of the conversion the tag was given for.
    pub fn parse(tag: &str, side: Side) -> Result<Self> {
        Self::from_tag(tag).ok_or_else(|| ConversionError::UnsupportedFormat {
            side,
            name: tag.to_string(),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Format::Dms => "dms",
            Format::Dd => "dd",
            Format::Mgrs => "mgrs",
            Format::PlusCode => "pluscode",
        }
    }

    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Format::Dms => &["dms"],
            Format::Dd => &["dd"],
            Format::Mgrs => &["mgrs"],
            Format::PlusCode => &["openlocationcode", "pluscode"],
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which end of a conversion a format tag belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Input,
    Output,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Input => f.write_str("input"),
            Side::Output => f.write_str("output"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    pub fn hemisphere(&self, negative: bool) -> Hemisphere {
        match (self, negative) {
            (Axis::Latitude, false) => Hemisphere::North,
            (Axis::Latitude, true) => Hemisphere::South,
            (Axis::Longitude, false) => Hemisphere::East,
            (Axis::Longitude, true) => Hemisphere::West,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    North,
    South,
    East,
    West,
}

impl Hemisphere {
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'N' => Some(Hemisphere::North),
            'S' => Some(Hemisphere::South),
            'E' => Some(Hemisphere::East),
            'W' => Some(Hemisphere::West),
            _ => None,
        }
    }

    pub fn letter(&self) -> char {
        match self {
            Hemisphere::North => 'N',
            Hemisphere::South => 'S',
            Hemisphere::East => 'E',
            Hemisphere::West => 'W',
        }
    }

    /// North and east are positive, south and west are negative.
    pub fn sign(&self) -> f64 {
        match self {
            Hemisphere::North | Hemisphere::East => 1.0,
            Hemisphere::South | Hemisphere::West => -1.0,
        }
    }
}
