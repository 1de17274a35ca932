use validator::Validate;

use crate::error::{ConversionError, Result};
use crate::models::{Axis, Coordinate, Format, Hemisphere};

/// Convert one axis of DMS (Degrees/Minutes/Seconds) text to decimal degrees
///
/// The sign comes from a hemisphere letter anywhere in the text (`N`/`E`
/// positive, `S`/`W` negative), then from a leading `+`/`-`, and defaults to
/// positive when neither is present. Only letters standing on their own
/// count, so the `e` in `deg` is not a hemisphere.
///
/// # Examples
/// ```
/// use coordinate_converter::utils::dms_to_decimal;
///
/// let decimal = dms_to_decimal("48°53'10.18\"N").unwrap();
/// assert!((decimal - 48.886161).abs() < 0.000001);
/// ```
pub fn dms_to_decimal(dms: &str) -> Result<f64> {
    dms_to_decimal_with(dms, false)
}

/// Like [`dms_to_decimal`], but with `strict_hemisphere` set an axis carrying
/// neither a hemisphere letter nor an explicit sign is rejected.
///
/// Digit runs are read as degrees, minutes, whole seconds and fractional
/// seconds; anything past the fourth run is ignored and missing runs count
/// as zero. The fractional run is read as an integer before being glued
/// back behind the decimal point, so `"05"` becomes `.5`.
pub fn dms_to_decimal_with(dms: &str, strict_hemisphere: bool) -> Result<f64> {
    let sign = dms_sign(dms, strict_hemisphere)?;

    let groups: Vec<&str> = dms
        .split(|c: char| !c.is_ascii_digit())
        .filter(|group| !group.is_empty())
        .take(4)
        .collect();

    if groups.is_empty() {
        return Err(ConversionError::malformed(
            Format::Dms,
            format!("no digits found in '{}'", dms),
        ));
    }

    let group = |index: usize| -> Result<u64> {
        match groups.get(index) {
            Some(digits) => digits.parse::<u64>().map_err(|_| {
                ConversionError::malformed(
                    Format::Dms,
                    format!("digit group '{}' is too large", digits),
                )
            }),
            None => Ok(0),
        }
    };

    let degrees = group(0)?;
    let minutes = group(1)?;
    let whole_seconds = group(2)?;
    let fraction_of_a_second = group(3)?;

    let seconds = format!("{}.{}", whole_seconds, fraction_of_a_second)
        .parse::<f64>()
        .map_err(|_| {
            ConversionError::malformed(Format::Dms, format!("Invalid seconds value in '{}'", dms))
        })?;

    Ok(sign * (degrees as f64 + minutes as f64 / 60.0 + seconds / 3600.0))
}

/// Hemisphere letters that are not part of a longer word.
fn hemisphere_letters(dms: &str) -> impl Iterator<Item = Hemisphere> + '_ {
    dms.split(|c: char| !c.is_alphabetic())
        .filter(|word| word.chars().count() == 1)
        .filter_map(|word| word.chars().next().and_then(Hemisphere::from_letter))
}

fn dms_sign(dms: &str, strict_hemisphere: bool) -> Result<f64> {
    let mut letters = hemisphere_letters(dms);

    if let Some(first) = letters.next() {
        if letters.any(|other| other.sign() != first.sign()) {
            return Err(ConversionError::malformed(
                Format::Dms,
                format!("conflicting hemispheres in '{}'", dms),
            ));
        }
        return Ok(first.sign());
    }

    match dms.trim().chars().next() {
        Some('-') => Ok(-1.0),
        Some('+') => Ok(1.0),
        _ if strict_hemisphere => Err(ConversionError::malformed(
            Format::Dms,
            format!("no hemisphere letter or sign in '{}'", dms),
        )),
        _ => Ok(1.0),
    }
}

/// Split decimal degrees into whole degrees, minutes and tenths of seconds.
///
/// The magnitude is scaled to tenths of a second and rounded once, then
/// divided by 60 to get minutes and residual seconds, and the minutes
/// divided by 60 again for degrees and residual minutes. Seconds can
/// therefore never round up to 60.
fn sexagesimal(decimal: f64) -> Result<(u32, u32, f64)> {
    let out_of_range = || {
        ConversionError::malformed(
            Format::Dd,
            format!("{} cannot be written as degrees, minutes and seconds", decimal),
        )
    };

    let scaled = (decimal.abs() * 36_000.0).round();
    if !scaled.is_finite() || scaled >= u64::MAX as f64 {
        return Err(out_of_range());
    }
    let tenths_of_seconds = scaled as u64;

    let (total_minutes, tenths) = (tenths_of_seconds / 600, tenths_of_seconds % 600);
    let degrees = u32::try_from(total_minutes / 60).map_err(|_| out_of_range())?;
    let minutes = u32::try_from(total_minutes % 60).map_err(|_| out_of_range())?;

    Ok((degrees, minutes, tenths as f64 / 10.0))
}

/// Convert decimal degrees to DMS text with a trailing `+` or `-` in place
/// of the hemisphere, e.g. `48° 53' 11.8" -`.
pub fn decimal_to_signed_dms(decimal: f64) -> Result<String> {
    let (degrees, minutes, seconds) = sexagesimal(decimal)?;
    let sign = if decimal < 0.0 { '-' } else { '+' };

    Ok(format!("{}° {}' {:.1}\" {}", degrees, minutes, seconds, sign))
}

/// Replace the trailing sign of [`decimal_to_signed_dms`] output with the
/// hemisphere letter for `axis`. Text without a trailing sign is returned
/// as is.
pub fn apply_hemisphere(signed_dms: &str, axis: Axis) -> String {
    if let Some(body) = signed_dms.strip_suffix('+') {
        format!("{}{}", body, axis.hemisphere(false).letter())
    } else if let Some(body) = signed_dms.strip_suffix('-') {
        format!("{}{}", body, axis.hemisphere(true).letter())
    } else {
        signed_dms.to_string()
    }
}

/// Convert decimal degrees to DMS format for one axis, e.g. `2° 20' 35.9" W`
pub fn decimal_to_dms(decimal: f64, axis: Axis) -> Result<String> {
    Ok(apply_hemisphere(&decimal_to_signed_dms(decimal)?, axis))
}

/// Split DMS text holding both axes into its latitude and longitude parts.
///
/// Two tokens separated by whitespace and/or a comma are taken as they
/// are. Otherwise the
/// latitude is located by its `N`/`S` letter: a trailing letter closes the
/// latitude, a leading one opens it and the longitude starts at the next
/// `E`/`W`.
pub fn split_dms_pair(text: &str) -> Result<(&str, &str)> {
    let tokens: Vec<&str> = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .collect();
    if tokens.len() == 2 {
        return Ok((tokens[0], tokens[1]));
    }

    let trimmed = text.trim();
    let unsplittable = || {
        ConversionError::malformed(
            Format::Dms,
            format!("expected a latitude and a longitude, got '{}'", text),
        )
    };

    let (index, letter) = trimmed
        .char_indices()
        .find(|(_, c)| matches!(c.to_ascii_uppercase(), 'N' | 'S'))
        .ok_or_else(unsplittable)?;

    let (latitude, longitude) = if trimmed[..index].chars().any(|c| c.is_ascii_digit()) {
        trimmed.split_at(index + letter.len_utf8())
    } else {
        let offset = trimmed[index..]
            .find(|c: char| matches!(c.to_ascii_uppercase(), 'E' | 'W'))
            .ok_or_else(unsplittable)?;
        trimmed.split_at(index + offset)
    };

    let separator = |c: char| c.is_whitespace() || c == ',';
    let (latitude, longitude) = (
        latitude.trim_matches(separator),
        longitude.trim_matches(separator),
    );
    let has_digits = |part: &str| part.chars().any(|c| c.is_ascii_digit());
    if !has_digits(latitude) || !has_digits(longitude) {
        return Err(unsplittable());
    }

    Ok((latitude, longitude))
}

/// Parse both axes of a DMS coordinate, each independently.
pub fn parse_dms_pair(text: &str, strict_hemisphere: bool) -> Result<Coordinate> {
    let (latitude, longitude) = split_dms_pair(text)?;

    Ok(Coordinate::new(
        dms_to_decimal_with(latitude, strict_hemisphere)?,
        dms_to_decimal_with(longitude, strict_hemisphere)?,
    ))
}

/// Render both axes as DMS. Pairs outside lat [-90, 90] / lon [-180, 180]
/// are rejected rather than printed.
pub fn format_dms_pair(coordinate: &Coordinate) -> Result<String> {
    if !coordinate.latitude.is_finite() || !coordinate.longitude.is_finite() {
        return Err(ConversionError::malformed(
            Format::Dd,
            format!("coordinate ({}) is not finite", coordinate),
        ));
    }
    coordinate.validate().map_err(|e| {
        ConversionError::malformed(
            Format::Dd,
            format!("coordinate ({}) is out of range: {}", coordinate, e),
        )
    })?;

    Ok(format!(
        "{} {}",
        decimal_to_dms(coordinate.latitude, Axis::Latitude)?,
        decimal_to_dms(coordinate.longitude, Axis::Longitude)?
    ))
}

/// Parse `<latitude> <longitude>` in decimal degrees. A comma may stand in
/// for, or accompany, the whitespace between the two numbers.
pub fn parse_decimal_pair(text: &str) -> Result<Coordinate> {
    let parts: Vec<&str> = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .collect();

    if parts.len() != 2 {
        return Err(ConversionError::malformed(
            Format::Dd,
            format!("expected '<latitude> <longitude>', got '{}'", text),
        ));
    }

    let parse = |part: &str| -> Result<f64> {
        match part.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(ConversionError::malformed(
                Format::Dd,
                format!("Invalid coordinate value: '{}'", part),
            )),
        }
    };

    Ok(Coordinate::new(parse(parts[0])?, parse(parts[1])?))
}
