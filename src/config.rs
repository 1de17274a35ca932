//! Layered runtime settings.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. a TOML file (`coordinate-converter.toml` in the working directory, or
//!    the path given with `--config`)
//! 3. `COORDCONV_*` environment variables, e.g. `COORDCONV_PLUSCODE_LENGTH=11`
//!
//! Command line flags are applied on top by the CLI.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::codecs::OpenLocationCode;
use crate::error::Result;
use crate::utils::constants::{
    DEFAULT_CONFIG_FILE, DEFAULT_MGRS_PRECISION, DEFAULT_PLUSCODE_LENGTH, ENV_PREFIX,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Settings {
    /// Digits in generated plus codes; below ten only even lengths are valid
    #[validate(range(min = 2, max = 15))]
    pub pluscode_length: usize,

    /// Digits per axis in generated MGRS grid references
    #[validate(range(max = 5))]
    pub mgrs_precision: u8,

    /// Reject DMS axes that carry neither a hemisphere letter nor a sign
    pub strict_hemisphere: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pluscode_length: DEFAULT_PLUSCODE_LENGTH,
            mgrs_precision: DEFAULT_MGRS_PRECISION,
            strict_hemisphere: false,
        }
    }
}

impl Settings {
    /// Load settings from defaults, the config file and the environment.
    ///
    /// An explicitly given `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings: Settings = Config::builder()
            .set_default("pluscode_length", DEFAULT_PLUSCODE_LENGTH as i64)?
            .set_default("mgrs_precision", DEFAULT_MGRS_PRECISION as i64)?
            .set_default("strict_hemisphere", false)?
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        settings.check()?;
        Ok(settings)
    }

    /// Field ranges plus the plus code rule that short codes have an even
    /// number of digits.
    pub fn check(&self) -> Result<()> {
        self.validate()?;

        if !OpenLocationCode::is_valid_length(self.pluscode_length) {
            let mut errors = ValidationErrors::new();
            errors.add("pluscode_length", ValidationError::new("even_below_ten"));
            return Err(errors.into());
        }

        Ok(())
    }

    pub fn with_pluscode_length(mut self, pluscode_length: usize) -> Self {
        self.pluscode_length = pluscode_length;
        self
    }

    pub fn with_mgrs_precision(mut self, mgrs_precision: u8) -> Self {
        self.mgrs_precision = mgrs_precision;
        self
    }

    pub fn with_strict_hemisphere(mut self, strict_hemisphere: bool) -> Self {
        self.strict_hemisphere = strict_hemisphere;
        self
    }
}
