use serde::Deserialize;
use serde_json::Value;

use super::format::{Format, Side};
use crate::error::{ConversionError, Result};

/// A single conversion: the coordinate text plus where it comes from and
/// where it is going.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub coordinates: String,
    pub from: Format,
    pub to: Format,
}

/// Wire shape of a request document. Every key is optional here so that a
/// missing key can be reported by name.
#[derive(Debug, Deserialize)]
struct RawRequest {
    coordinates: Option<String>,
    from: Option<String>,
    to: Option<String>,
}

impl ConversionRequest {
    pub fn new(coordinates: impl Into<String>, from: Format, to: Format) -> Self {
        Self {
            coordinates: coordinates.into(),
            from,
            to,
        }
    }

    /// Build a request from loosely typed parts, checking the input tag
    /// before the output tag.
    pub fn from_tags(coordinates: &str, from: &str, to: &str) -> Result<Self> {
        let from = Format::parse(from, Side::Input)?;
        let to = Format::parse(to, Side::Output)?;
        Ok(Self::new(coordinates, from, to))
    }

    /// Parse a JSON document of the form
    /// `{"coordinates": "...", "from": "...", "to": "..."}`.
    ///
    /// Empty documents such as `{}` or `null` are rejected as undecodable
    /// rather than reported as missing keys.
    pub fn from_json(body: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(body)?;
        match &document {
            Value::Object(map) if map.is_empty() => {
                return Err(ConversionError::InvalidDocument("empty object"))
            }
            Value::Object(_) => {}
            Value::Null => return Err(ConversionError::InvalidDocument("empty document")),
            _ => return Err(ConversionError::InvalidDocument("expected a JSON object")),
        }

        let raw: RawRequest = serde_json::from_value(document)?;

        let coordinates = raw
            .coordinates
            .ok_or(ConversionError::MissingField("coordinates"))?;
        let from = raw.from.ok_or(ConversionError::MissingField("from"))?;
        let to = raw.to.ok_or(ConversionError::MissingField("to"))?;

        Self::from_tags(&coordinates, &from, &to)
    }
}
