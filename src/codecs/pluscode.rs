use tracing::debug;

use super::{validate_range, CodeArea, PlusCodeCodec};
use crate::error::{ConversionError, Result};
use crate::utils::constants::{DEFAULT_PLUSCODE_LENGTH, MAX_PLUSCODE_LENGTH, MIN_PLUSCODE_LENGTH};

const CODEC: &str = "Open Location Code";

const ALPHABET: &[u8; 20] = b"23456789CFGHJMPQRVWX";
const SEPARATOR: char = '+';
const SEPARATOR_POSITION: usize = 8;
const PADDING: char = '0';

const ENCODING_BASE: i64 = 20;
const PAIR_CODE_LENGTH: usize = 10;
const GRID_CODE_LENGTH: usize = 5;
const GRID_COLUMNS: i64 = 4;
const GRID_ROWS: i64 = 5;

/// Integer units per degree once every pair and grid digit is applied.
const FINAL_LAT_PRECISION: i64 = 8000 * 3125;
const FINAL_LNG_PRECISION: i64 = 8000 * 1024;

/// Open Location Code ("plus code") provider producing codes of a fixed
/// length.
#[derive(Debug, Clone, Copy)]
pub struct OpenLocationCode {
    code_length: usize,
}

impl OpenLocationCode {
    /// Valid lengths are 2, 4, 6, 8 and anything from 10 to 15.
    pub fn new(code_length: usize) -> Result<Self> {
        if !Self::is_valid_length(code_length) {
            return Err(ConversionError::codec(
                CODEC,
                format!("invalid code length {}", code_length),
            ));
        }
        Ok(Self { code_length })
    }

    pub fn is_valid_length(code_length: usize) -> bool {
        (MIN_PLUSCODE_LENGTH..=MAX_PLUSCODE_LENGTH).contains(&code_length)
            && (code_length >= PAIR_CODE_LENGTH || code_length % 2 == 0)
    }

    pub fn code_length(&self) -> usize {
        self.code_length
    }

    /// Check the code's shape: a single separator at an even position no
    /// later than the eighth character, optional even-length padding right
    /// before it, and only alphabet characters otherwise.
    pub fn is_valid(code: &str) -> bool {
        let chars: Vec<char> = code.chars().map(|c| c.to_ascii_uppercase()).collect();

        let mut separators = chars
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == SEPARATOR)
            .map(|(i, _)| i);
        let separator = match (separators.next(), separators.next()) {
            (Some(position), None) => position,
            _ => return false,
        };

        if separator > SEPARATOR_POSITION || separator % 2 == 1 {
            return false;
        }

        if let Some(padding_start) = chars.iter().position(|c| *c == PADDING) {
            if separator < SEPARATOR_POSITION || padding_start == 0 || padding_start > separator {
                return false;
            }
            let padding = &chars[padding_start..separator];
            if padding.is_empty()
                || padding.iter().any(|c| *c != PADDING)
                || padding.len() % 2 == 1
                || separator != chars.len() - 1
            {
                return false;
            }
        }

        // A single character after the separator is not allowed.
        if chars.len() - separator - 1 == 1 {
            return false;
        }

        chars
            .iter()
            .all(|c| *c == SEPARATOR || *c == PADDING || digit_value(*c).is_some())
    }

    /// A valid code that is not shortened and whose first pair lies on the
    /// globe.
    pub fn is_full(code: &str) -> bool {
        if !Self::is_valid(code) {
            return false;
        }

        let mut chars = code.chars().map(|c| c.to_ascii_uppercase());
        if chars.clone().position(|c| c == SEPARATOR) != Some(SEPARATOR_POSITION) {
            return false;
        }

        let first_lat = chars.next().and_then(digit_value).unwrap_or(0);
        let first_lng = chars.next().and_then(digit_value).unwrap_or(0);
        first_lat * ENCODING_BASE < 180 && first_lng * ENCODING_BASE < 360
    }
}

impl Default for OpenLocationCode {
    fn default() -> Self {
        Self {
            code_length: DEFAULT_PLUSCODE_LENGTH,
        }
    }
}

fn digit_value(c: char) -> Option<i64> {
    ALPHABET
        .iter()
        .position(|&b| b as char == c)
        .map(|i| i as i64)
}

fn digit_char(value: i64) -> char {
    ALPHABET[value as usize] as char
}

impl PlusCodeCodec for OpenLocationCode {
    fn encode(&self, latitude: f64, longitude: f64) -> Result<String> {
        validate_range(CODEC, latitude, longitude)?;

        let mut lat_val = (latitude * FINAL_LAT_PRECISION as f64).round() as i64
            + 90 * FINAL_LAT_PRECISION;
        lat_val = lat_val.clamp(0, 180 * FINAL_LAT_PRECISION - 1);

        let mut lng_val = (longitude * FINAL_LNG_PRECISION as f64).round() as i64
            + 180 * FINAL_LNG_PRECISION;
        lng_val = lng_val.rem_euclid(360 * FINAL_LNG_PRECISION);

        let mut reversed = Vec::with_capacity(PAIR_CODE_LENGTH + GRID_CODE_LENGTH);

        if self.code_length > PAIR_CODE_LENGTH {
            for _ in 0..GRID_CODE_LENGTH {
                let index = (lat_val % GRID_ROWS) * GRID_COLUMNS + lng_val % GRID_COLUMNS;
                reversed.push(digit_char(index));
                lat_val /= GRID_ROWS;
                lng_val /= GRID_COLUMNS;
            }
        } else {
            lat_val /= GRID_ROWS.pow(GRID_CODE_LENGTH as u32);
            lng_val /= GRID_COLUMNS.pow(GRID_CODE_LENGTH as u32);
        }

        for _ in 0..PAIR_CODE_LENGTH / 2 {
            reversed.push(digit_char(lng_val % ENCODING_BASE));
            reversed.push(digit_char(lat_val % ENCODING_BASE));
            lat_val /= ENCODING_BASE;
            lng_val /= ENCODING_BASE;
        }

        let digits: String = reversed.iter().rev().take(self.code_length).collect();

        let code = if self.code_length < SEPARATOR_POSITION {
            let padding: String =
                std::iter::repeat(PADDING).take(SEPARATOR_POSITION - self.code_length).collect();
            format!("{}{}{}", digits, padding, SEPARATOR)
        } else {
            format!(
                "{}{}{}",
                &digits[..SEPARATOR_POSITION],
                SEPARATOR,
                &digits[SEPARATOR_POSITION..]
            )
        };

        debug!(latitude, longitude, code = %code, "encoded plus code");
        Ok(code)
    }

    fn decode(&self, code: &str) -> Result<CodeArea> {
        if !Self::is_full(code) {
            return Err(ConversionError::codec(
                CODEC,
                format!("'{}' is not a valid full Open Location Code", code),
            ));
        }

        let digits: Vec<i64> = code
            .chars()
            .filter(|c| *c != SEPARATOR && *c != PADDING)
            .filter_map(|c| digit_value(c.to_ascii_uppercase()))
            .take(PAIR_CODE_LENGTH + GRID_CODE_LENGTH)
            .collect();

        let mut south = -90 * FINAL_LAT_PRECISION;
        let mut west = -180 * FINAL_LNG_PRECISION;
        let mut lat_resolution = ENCODING_BASE * ENCODING_BASE * FINAL_LAT_PRECISION;
        let mut lng_resolution = ENCODING_BASE * ENCODING_BASE * FINAL_LNG_PRECISION;

        let pair_count = digits.len().min(PAIR_CODE_LENGTH);
        for pair in digits[..pair_count].chunks(2) {
            lat_resolution /= ENCODING_BASE;
            lng_resolution /= ENCODING_BASE;
            south += pair[0] * lat_resolution;
            if let Some(lng_digit) = pair.get(1) {
                west += lng_digit * lng_resolution;
            }
        }

        for value in &digits[pair_count..] {
            lat_resolution /= GRID_ROWS;
            lng_resolution /= GRID_COLUMNS;
            south += (value / GRID_COLUMNS) * lat_resolution;
            west += (value % GRID_COLUMNS) * lng_resolution;
        }

        let lat = |units: f64| units / FINAL_LAT_PRECISION as f64;
        let lng = |units: f64| units / FINAL_LNG_PRECISION as f64;

        Ok(CodeArea {
            south: lat(south as f64),
            west: lng(west as f64),
            north: lat((south + lat_resolution) as f64),
            east: lng((west + lng_resolution) as f64),
            latitude_center: lat(south as f64 + lat_resolution as f64 / 2.0).min(90.0),
            longitude_center: lng(west as f64 + lng_resolution as f64 / 2.0).min(180.0),
            code_length: digits.len(),
        })
    }
}
