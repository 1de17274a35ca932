use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};
use tracing::debug;

use super::{validate_range, MgrsCodec};
use crate::error::{ConversionError, Result};
use crate::utils::constants::{DEFAULT_MGRS_PRECISION, MAX_MGRS_PRECISION};

const CODEC: &str = "MGRS";

/// WGS84 ellipsoid
const SEMI_MAJOR_AXIS: f64 = 6_378_137.0;
const FLATTENING: f64 = 1.0 / 298.257_223_563;
const SCALE_FACTOR: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING: f64 = 10_000_000.0;

/// UTM covers 80°S up to (not including) 84°N; the polar caps use UPS.
const MIN_UTM_LAT: f64 = -80.0;
const MAX_UTM_LAT: f64 = 84.0;

const LATITUDE_BANDS: &[u8; 20] = b"CDEFGHJKLMNPQRSTUVWX";
const COLUMN_SETS: [&[u8; 8]; 3] = [b"STUVWXYZ", b"ABCDEFGH", b"JKLMNPQR"];
const ROW_LETTERS: &[u8; 20] = b"ABCDEFGHJKLMNPQRSTUV";

const SQUARE_SIZE: f64 = 100_000.0;
const ROW_CYCLE: f64 = 2_000_000.0;

/// Lowest northing, rounded down to a 100 km square, reached by each
/// latitude band. Used to recover the 2000 km row cycle a grid square sits
/// in.
const BAND_MIN_NORTHING: [f64; 20] = [
    1_100_000.0, // C
    2_000_000.0, // D
    2_800_000.0, // E
    3_700_000.0, // F
    4_600_000.0, // G
    5_500_000.0, // H
    6_400_000.0, // J
    7_300_000.0, // K
    8_200_000.0, // L
    9_100_000.0, // M
    0.0,         // N
    800_000.0,   // P
    1_700_000.0, // Q
    2_600_000.0, // R
    3_500_000.0, // S
    4_400_000.0, // T
    5_300_000.0, // U
    6_200_000.0, // V
    7_000_000.0, // W
    7_900_000.0, // X
];

/// Universal Polar Stereographic
const UPS_SCALE_FACTOR: f64 = 0.994;
const UPS_FALSE_ORIGIN: f64 = 2_000_000.0;

/// Polar bands, in order: south-west, south-east, north-west, north-east.
const POLAR_BANDS: &[u8; 4] = b"ABYZ";
const POLAR_COLUMNS: [&[u8]; 4] = [b"JKLPQRSTUXYZ", b"ABCFGHJKLPQR", b"RSTUXYZ", b"ABCFGHJ"];
/// First 100 km column of each polar band.
const POLAR_FIRST_COLUMN: [usize; 4] = [8, 20, 13, 20];
const SOUTH_POLAR_ROWS: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
const NORTH_POLAR_ROWS: &[u8] = b"ABCDEFGHJKLMNP";
const SOUTH_FIRST_ROW: usize = 8;
const NORTH_FIRST_ROW: usize = 13;

/// MGRS provider built on Universal Transverse Mercator, switching to
/// Universal Polar Stereographic north of 84°N and south of 80°S.
#[derive(Debug, Clone, Copy)]
pub struct UtmUpsMgrs {
    precision: u8,
}

/// A position projected onto one UTM zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtmPosition {
    pub zone: u8,
    pub easting: f64,
    pub northing: f64,
    pub southern: bool,
}

/// A position projected onto the north or south polar stereographic plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpsPosition {
    pub easting: f64,
    pub northing: f64,
    pub northern: bool,
}

impl UtmUpsMgrs {
    /// `precision` is the number of digits per axis, from 0 (100 km) to
    /// 5 (1 m).
    pub fn new(precision: u8) -> Result<Self> {
        if precision > MAX_MGRS_PRECISION {
            return Err(ConversionError::codec(
                CODEC,
                format!("precision must be 0-{}, got {}", MAX_MGRS_PRECISION, precision),
            ));
        }
        Ok(Self { precision })
    }

    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// Easting and northing within the 100 km square, truncated to
    /// `precision` digits each.
    fn square_digits(&self, easting: f64, northing: f64) -> String {
        let width = self.precision as usize;
        if width == 0 {
            return String::new();
        }

        let divisor = 10u64.pow(5 - self.precision as u32);
        let easting = (easting % SQUARE_SIZE).floor() as u64 / divisor;
        let northing = (northing % SQUARE_SIZE).floor() as u64 / divisor;

        format!("{:0width$}{:0width$}", easting, northing, width = width)
    }

    fn utm_gridref(&self, latitude: f64, longitude: f64) -> Result<String> {
        let utm = to_utm(latitude, longitude);

        let band_index = (((latitude - MIN_UTM_LAT) / 8.0).floor() as usize)
            .min(LATITUDE_BANDS.len() - 1);
        let band = LATITUDE_BANDS[band_index] as char;

        let column_index = ((utm.easting / SQUARE_SIZE).floor() as usize).saturating_sub(1);
        let column = column_letters(utm.zone)
            .get(column_index)
            .map(|&b| b as char)
            .ok_or_else(|| {
                ConversionError::codec(
                    CODEC,
                    format!("easting {} is outside the zone", utm.easting),
                )
            })?;

        let row_index = ((utm.northing / SQUARE_SIZE).floor() as usize + row_offset(utm.zone))
            % ROW_LETTERS.len();
        let row = ROW_LETTERS[row_index] as char;

        Ok(format!(
            "{:02}{}{}{}{}",
            utm.zone,
            band,
            column,
            row,
            self.square_digits(utm.easting, utm.northing)
        ))
    }

    fn ups_gridref(&self, latitude: f64, longitude: f64) -> Result<String> {
        let ups = to_ups(latitude, longitude);

        let east = ups.easting >= UPS_FALSE_ORIGIN;
        let band_index = usize::from(ups.northern) * 2 + usize::from(east);
        let (rows, first_row) = polar_rows(ups.northern);

        let column = ((ups.easting / SQUARE_SIZE).floor() as usize)
            .checked_sub(POLAR_FIRST_COLUMN[band_index])
            .and_then(|index| POLAR_COLUMNS[band_index].get(index));
        let row = ((ups.northing / SQUARE_SIZE).floor() as usize)
            .checked_sub(first_row)
            .and_then(|index| rows.get(index));

        match (column, row) {
            (Some(&column), Some(&row)) => Ok(format!(
                "{}{}{}{}",
                POLAR_BANDS[band_index] as char,
                column as char,
                row as char,
                self.square_digits(ups.easting, ups.northing)
            )),
            _ => Err(ConversionError::codec(
                CODEC,
                format!("({}, {}) is outside the polar grid", latitude, longitude),
            )),
        }
    }
}

impl Default for UtmUpsMgrs {
    fn default() -> Self {
        Self {
            precision: DEFAULT_MGRS_PRECISION,
        }
    }
}

fn eccentricity_squared() -> f64 {
    FLATTENING * (2.0 - FLATTENING)
}

/// Zone number, including the Norway and Svalbard exceptions.
pub fn utm_zone(latitude: f64, longitude: f64) -> u8 {
    let mut zone = (((longitude + 180.0) / 6.0).floor() as i32 + 1).clamp(1, 60);

    if (56.0..64.0).contains(&latitude) && (3.0..12.0).contains(&longitude) {
        zone = 32;
    }

    if (72.0..84.0).contains(&latitude) {
        zone = match longitude {
            lon if (0.0..9.0).contains(&lon) => 31,
            lon if (9.0..21.0).contains(&lon) => 33,
            lon if (21.0..33.0).contains(&lon) => 35,
            lon if (33.0..42.0).contains(&lon) => 37,
            _ => zone,
        };
    }

    zone as u8
}

fn central_meridian(zone: u8) -> f64 {
    (zone as f64 - 1.0) * 6.0 - 180.0 + 3.0
}

fn meridian_arc(phi: f64) -> f64 {
    let e2 = eccentricity_squared();
    let e4 = e2 * e2;
    let e6 = e4 * e2;

    SEMI_MAJOR_AXIS
        * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
            - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
            + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
            - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
}

/// Project a latitude/longitude onto its UTM zone.
pub fn to_utm(latitude: f64, longitude: f64) -> UtmPosition {
    let zone = utm_zone(latitude, longitude);
    let e2 = eccentricity_squared();
    let ep2 = e2 / (1.0 - e2);

    let phi = latitude.to_radians();
    let lambda = (longitude - central_meridian(zone)).to_radians();

    let n = SEMI_MAJOR_AXIS / (1.0 - e2 * phi.sin().powi(2)).sqrt();
    let t = phi.tan().powi(2);
    let c = ep2 * phi.cos().powi(2);
    let a = phi.cos() * lambda;

    let easting = SCALE_FACTOR
        * n
        * (a + (1.0 - t + c) * a.powi(3) / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0)
        + FALSE_EASTING;

    let mut northing = SCALE_FACTOR
        * (meridian_arc(phi)
            + n * phi.tan()
                * (a * a / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a.powi(6) / 720.0));

    let southern = latitude < 0.0;
    if southern {
        northing += FALSE_NORTHING;
    }

    UtmPosition {
        zone,
        easting,
        northing,
        southern,
    }
}

/// Inverse of [`to_utm`].
pub fn from_utm(position: &UtmPosition) -> (f64, f64) {
    let e2 = eccentricity_squared();
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    let ep2 = e2 / (1.0 - e2);

    let northing = if position.southern {
        position.northing - FALSE_NORTHING
    } else {
        position.northing
    };

    let m = northing / SCALE_FACTOR;
    let mu = m / (SEMI_MAJOR_AXIS * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));
    let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());

    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

    let sin1 = phi1.sin();
    let n1 = SEMI_MAJOR_AXIS / (1.0 - e2 * sin1 * sin1).sqrt();
    let t1 = phi1.tan().powi(2);
    let c1 = ep2 * phi1.cos().powi(2);
    let r1 = SEMI_MAJOR_AXIS * (1.0 - e2) / (1.0 - e2 * sin1 * sin1).powf(1.5);
    let d = (position.easting - FALSE_EASTING) / (n1 * SCALE_FACTOR);

    let phi = phi1
        - (n1 * phi1.tan() / r1)
            * (d * d / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2 - 3.0 * c1 * c1)
                    * d.powi(6)
                    / 720.0);

    let lambda = (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
        + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1) * d.powi(5)
            / 120.0)
        / phi1.cos();

    (
        phi.to_degrees(),
        central_meridian(position.zone) + lambda.to_degrees(),
    )
}

fn column_letters(zone: u8) -> &'static [u8; 8] {
    COLUMN_SETS[zone as usize % 3]
}

/// Offset of the row letters: even zones start five letters in.
fn row_offset(zone: u8) -> usize {
    if zone % 2 == 0 {
        5
    } else {
        0
    }
}

fn letter_index(letters: &[u8], letter: char) -> Option<usize> {
    letters.iter().position(|&b| b as char == letter)
}

fn conformal_constant(e: f64) -> f64 {
    ((1.0 + e).powf(1.0 + e) * (1.0 - e).powf(1.0 - e)).sqrt()
}

/// Project a latitude/longitude onto the polar stereographic plane of the
/// nearer pole.
pub fn to_ups(latitude: f64, longitude: f64) -> UpsPosition {
    let e = eccentricity_squared().sqrt();
    let northern = latitude > 0.0;

    let phi = latitude.abs().to_radians();
    let lambda = longitude.to_radians();
    let sin_phi = phi.sin();

    let t = (FRAC_PI_4 - phi / 2.0).tan()
        / ((1.0 - e * sin_phi) / (1.0 + e * sin_phi)).powf(e / 2.0);
    let rho = 2.0 * SEMI_MAJOR_AXIS * UPS_SCALE_FACTOR * t / conformal_constant(e);

    let easting = UPS_FALSE_ORIGIN + rho * lambda.sin();
    let northing = if northern {
        UPS_FALSE_ORIGIN - rho * lambda.cos()
    } else {
        UPS_FALSE_ORIGIN + rho * lambda.cos()
    };

    UpsPosition {
        easting,
        northing,
        northern,
    }
}

/// Inverse of [`to_ups`]. The pole itself is reported at longitude 0.
pub fn from_ups(position: &UpsPosition) -> (f64, f64) {
    let e = eccentricity_squared().sqrt();
    let dx = position.easting - UPS_FALSE_ORIGIN;
    let dy = position.northing - UPS_FALSE_ORIGIN;
    let rho = dx.hypot(dy);
    let hemisphere = if position.northern { 1.0 } else { -1.0 };

    if rho == 0.0 {
        return (hemisphere * 90.0, 0.0);
    }

    let t = rho * conformal_constant(e) / (2.0 * SEMI_MAJOR_AXIS * UPS_SCALE_FACTOR);
    let mut phi = FRAC_PI_2 - 2.0 * t.atan();
    for _ in 0..20 {
        let sin_phi = phi.sin();
        let next = FRAC_PI_2
            - 2.0 * (t * ((1.0 - e * sin_phi) / (1.0 + e * sin_phi)).powf(e / 2.0)).atan();
        let converged = (next - phi).abs() < 1e-14;
        phi = next;
        if converged {
            break;
        }
    }

    let lambda = if position.northern {
        dx.atan2(-dy)
    } else {
        dx.atan2(dy)
    };

    (hemisphere * phi.to_degrees(), lambda.to_degrees())
}

fn utm_position(zone: u8, letters: &str) -> std::result::Result<UtmPosition, &'static str> {
    let mut chars = letters.chars();
    let band = chars.next().ok_or("missing latitude band")?;
    let band_index =
        letter_index(LATITUDE_BANDS, band).ok_or("unknown or polar latitude band")?;
    let column = chars.next().ok_or("missing 100 km column letter")?;
    let column_index = letter_index(column_letters(zone), column)
        .ok_or("column letter does not belong to this zone")?;
    let row = chars.next().ok_or("missing 100 km row letter")?;
    let row_index = letter_index(ROW_LETTERS, row).ok_or("unknown row letter")?;
    let (square_easting, square_northing) = parse_square_digits(chars.as_str())?;

    let easting = (column_index as f64 + 1.0) * SQUARE_SIZE + square_easting;

    let row_number = (row_index + ROW_LETTERS.len() - row_offset(zone)) % ROW_LETTERS.len();
    let mut northing = row_number as f64 * SQUARE_SIZE + square_northing;
    while northing < BAND_MIN_NORTHING[band_index] {
        northing += ROW_CYCLE;
    }

    Ok(UtmPosition {
        zone,
        easting,
        northing,
        southern: band < 'N',
    })
}

fn ups_position(letters: &str) -> std::result::Result<UpsPosition, &'static str> {
    let mut chars = letters.chars();
    let band = chars.next().ok_or("missing zone number or polar band")?;
    let band_index = letter_index(POLAR_BANDS, band).ok_or("expected a zone number")?;
    let northern = band_index >= 2;
    let (rows, first_row) = polar_rows(northern);

    let column = chars.next().ok_or("missing 100 km column letter")?;
    let column_index = letter_index(POLAR_COLUMNS[band_index], column)
        .ok_or("column letter does not belong to this polar band")?;
    let row = chars.next().ok_or("missing 100 km row letter")?;
    let row_index = letter_index(rows, row).ok_or("row letter does not belong to this pole")?;
    let (square_easting, square_northing) = parse_square_digits(chars.as_str())?;

    Ok(UpsPosition {
        easting: (column_index + POLAR_FIRST_COLUMN[band_index]) as f64 * SQUARE_SIZE
            + square_easting,
        northing: (row_index + first_row) as f64 * SQUARE_SIZE + square_northing,
        northern,
    })
}

fn polar_rows(northern: bool) -> (&'static [u8], usize) {
    if northern {
        (NORTH_POLAR_ROWS, NORTH_FIRST_ROW)
    } else {
        (SOUTH_POLAR_ROWS, SOUTH_FIRST_ROW)
    }
}

/// Split the trailing digits of a grid reference into easting and northing
/// offsets, in metres, within the 100 km square.
fn parse_square_digits(digits: &str) -> std::result::Result<(f64, f64), &'static str> {
    if digits.len() % 2 == 1
        || digits.len() > 2 * MAX_MGRS_PRECISION as usize
        || !digits.chars().all(|c| c.is_ascii_digit())
    {
        return Err("expected an even number of up to ten digits");
    }

    let half = digits.len() / 2;
    let scale = 10f64.powi(5 - half as i32);
    let (easting, northing) = digits.split_at(half);
    let parse = |part: &str| part.parse::<f64>().map(|value| value * scale).unwrap_or(0.0);

    Ok((parse(easting), parse(northing)))
}

impl MgrsCodec for UtmUpsMgrs {
    fn to_mgrs(&self, latitude: f64, longitude: f64) -> Result<String> {
        validate_range(CODEC, latitude, longitude)?;

        let gridref = if (MIN_UTM_LAT..MAX_UTM_LAT).contains(&latitude) {
            self.utm_gridref(latitude, longitude)?
        } else {
            self.ups_gridref(latitude, longitude)?
        };

        debug!(latitude, longitude, gridref = %gridref, "encoded MGRS grid reference");
        Ok(gridref)
    }

    fn to_lat_lon(&self, gridref: &str) -> Result<(f64, f64)> {
        let normalized: String = gridref
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        let invalid = |reason: &str| {
            ConversionError::codec(
                CODEC,
                format!("invalid grid reference '{}': {}", gridref, reason),
            )
        };

        let zone_digits = normalized.chars().take_while(|c| c.is_ascii_digit()).count();
        let (latitude, longitude) = match zone_digits {
            0 => from_ups(&ups_position(&normalized).map_err(invalid)?),
            1 | 2 => {
                let zone: u8 = normalized[..zone_digits]
                    .parse()
                    .map_err(|_| invalid("bad zone number"))?;
                if !(1..=60).contains(&zone) {
                    return Err(invalid("zone must be 1-60"));
                }
                from_utm(&utm_position(zone, &normalized[zone_digits..]).map_err(invalid)?)
            }
            _ => return Err(invalid("expected a 1-2 digit zone number")),
        };

        debug!(gridref, latitude, longitude, "decoded MGRS grid reference");
        Ok((latitude, longitude))
    }
}
