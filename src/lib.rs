//! Conversion of geographic coordinates between degrees/minutes/seconds,
//! decimal degrees, Open Location Code and MGRS.
//!
//! Every cross-format conversion is routed through decimal degrees: the
//! source text is parsed into a [`models::Coordinate`] and then rendered in the
//! destination format. Identity conversions return the input untouched.
//!
//! ```
//! use coordinate_converter::{Converter, Format};
//!
//! let converter = Converter::new();
//! let dd = converter
//!     .convert("48°53'10.18\"N 2°20'35.09\"E", Format::Dms, Format::Dd)
//!     .unwrap();
//! assert!(dd.starts_with("48.886"));
//! ```
pub mod cli;
pub mod codecs;
pub mod config;
pub mod converter;
pub mod error;
pub mod models;
pub mod processors;
pub mod utils;

pub use config::Settings;
pub use converter::Converter;
pub use error::{ConversionError, Result};
pub use models::{Axis, ConversionRequest, Coordinate, Format, Side};
