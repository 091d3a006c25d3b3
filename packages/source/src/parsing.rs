//! Shared field parsing utilities for the row decoders.
//!
//! Numeric, date and coordinate parsing used across the four file families.
//! Sentinel filtering happens before these functions are called; they only
//! see values that are supposed to hold data.

use std::str::FromStr;

use baac_source_models::AccidentId;
use chrono::{NaiveDate, NaiveDateTime};

use crate::FieldError;

/// Latitude bound in decimal degrees.
pub const MAX_LATITUDE: f64 = 90.0;

/// Longitude bound in decimal degrees.
pub const MAX_LONGITUDE: f64 = 180.0;

/// Splits a raw hour-minute field into `(hour, minute)`.
///
/// Accepts `HH:MM` or a bare number of up to four digits (`930` is 09:30),
/// left-padded with zeros to exactly four digits.
///
/// # Errors
///
/// Returns [`FieldError::MalformedTimeField`] if the value has more than
/// four digits or anything other than digits and colons.
pub fn parse_hour_minute(raw: &str) -> Result<(u32, u32), FieldError> {
    let digits: String = raw.trim().chars().filter(|c| *c != ':').collect();
    if digits.len() > 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(FieldError::MalformedTimeField {
            value: raw.to_owned(),
        });
    }
    let padded = format!("{digits:0>4}");
    let malformed = || FieldError::MalformedTimeField {
        value: raw.to_owned(),
    };
    let hour = padded[0..2].parse().map_err(|_| malformed())?;
    let minute = padded[2..4].parse().map_err(|_| malformed())?;
    Ok((hour, minute))
}

/// Interprets the `an` column. Files before 2019 store the year on two
/// digits (`5` for 2005).
///
/// # Errors
///
/// Returns [`FieldError::InvalidNumber`] if the value is not a year.
pub fn parse_year(raw: &str) -> Result<i32, FieldError> {
    let year: i32 = parse_number("an", raw)?;
    Ok(if (0..100).contains(&year) {
        2000 + year
    } else {
        year
    })
}

/// Builds the accident timestamp from the `an`, `mois`, `jour` and `hrmn`
/// columns.
///
/// # Errors
///
/// Returns [`FieldError::MalformedTimeField`] for a bad `hrmn`,
/// [`FieldError::InvalidNumber`] for non-numeric date parts, or
/// [`FieldError::InvalidDate`] if the parts do not form a valid date.
pub fn parse_timestamp(
    year: &str,
    month: &str,
    day: &str,
    hour_minute: &str,
) -> Result<NaiveDateTime, FieldError> {
    let (hour, minute) = parse_hour_minute(hour_minute)?;
    let year = parse_year(year)?;
    let month: u32 = parse_number("mois", month)?;
    let day: u32 = parse_number("jour", day)?;

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .ok_or_else(|| FieldError::InvalidDate {
            message: format!("{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}"),
        })
}

/// Parses a trimmed integer.
///
/// # Errors
///
/// Returns [`FieldError::InvalidNumber`] if the value does not parse.
pub fn parse_number<T: FromStr>(field: &str, raw: &str) -> Result<T, FieldError> {
    raw.trim().parse().map_err(|_| FieldError::InvalidNumber {
        field: field.to_owned(),
        value: raw.to_owned(),
    })
}

/// Parses a non-negative integer.
///
/// # Errors
///
/// Returns [`FieldError::NegativeValue`] for a negative integer and
/// [`FieldError::InvalidNumber`] for anything else that does not parse.
pub fn parse_unsigned<T: FromStr>(field: &str, raw: &str) -> Result<T, FieldError> {
    parse_number(field, raw).map_err(|err| {
        if raw.trim().parse::<i64>().is_ok_and(|n| n < 0) {
            FieldError::NegativeValue {
                field: field.to_owned(),
                value: raw.to_owned(),
            }
        } else {
            err
        }
    })
}

/// Parses a decimal number written with either `.` or `,` as separator.
///
/// # Errors
///
/// Returns [`FieldError::InvalidNumber`] if the value does not parse to a
/// finite number.
pub fn parse_decimal(field: &str, raw: &str) -> Result<f64, FieldError> {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| FieldError::InvalidNumber {
            field: field.to_owned(),
            value: raw.to_owned(),
        })
}

/// Parses a decimal number that must not be negative.
///
/// # Errors
///
/// Returns [`FieldError::NegativeValue`] for a negative value, or the
/// errors of [`parse_decimal`].
pub fn parse_non_negative_decimal(field: &str, raw: &str) -> Result<f64, FieldError> {
    let value = parse_decimal(field, raw)?;
    if value < 0.0 {
        return Err(FieldError::NegativeValue {
            field: field.to_owned(),
            value: raw.to_owned(),
        });
    }
    Ok(value)
}

/// Parses a coordinate in decimal degrees. Values outside `[-bound, bound]`
/// (legacy projected coordinates, typing errors) read as absent.
///
/// # Errors
///
/// Returns [`FieldError::InvalidNumber`] if the value does not parse.
pub fn parse_coordinate(field: &str, raw: &str, bound: f64) -> Result<Option<f64>, FieldError> {
    let value = parse_decimal(field, raw)?;
    if value.abs() > bound {
        log::trace!("Discarding out-of-range {field} {value}");
        return Ok(None);
    }
    Ok(Some(value))
}

/// Parses the `Num_Acc` column.
///
/// # Errors
///
/// Returns [`FieldError::InvalidNumber`] if the value is not an integer.
pub fn parse_accident_id(raw: &str) -> Result<AccidentId, FieldError> {
    parse_number("Num_Acc", raw).map(AccidentId)
}

/// Parses the `id_vehicule` column, which is written with thousands
/// separators (`138 306 524`), sometimes as a mis-decoded non-breaking space.
///
/// # Errors
///
/// Returns [`FieldError::InvalidNumber`] if no integer remains once the
/// separators are removed.
pub fn parse_vehicle_id(raw: &str) -> Result<u64, FieldError> {
    let digits: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{c2}')
        .collect();
    parse_number("id_vehicule", &digits).map_err(|_| FieldError::InvalidNumber {
        field: "id_vehicule".to_owned(),
        value: raw.to_owned(),
    })
}

/// Returns the trimmed free text, or `None` if nothing is left.
#[must_use]
pub fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Removes the parentheses some files wrap route markers in (`(12)`).
#[must_use]
pub fn strip_parentheses(raw: &str) -> &str {
    let raw = raw.trim();
    let raw = raw.strip_prefix('(').unwrap_or(raw);
    raw.strip_suffix(')').unwrap_or(raw)
}

#[cfg(test)]
mod tests {
    use chrono::Timelike as _;

    use super::*;

    #[test]
    fn pads_bare_hour_minute() {
        assert_eq!(parse_hour_minute("930").unwrap(), (9, 30));
        assert_eq!(parse_hour_minute("5").unwrap(), (0, 5));
        assert_eq!(parse_hour_minute("1745").unwrap(), (17, 45));
        assert_eq!(parse_hour_minute("").unwrap(), (0, 0));
    }

    #[test]
    fn accepts_colon_separated_hour_minute() {
        assert_eq!(parse_hour_minute("09:30").unwrap(), (9, 30));
        assert_eq!(parse_hour_minute("23:05").unwrap(), (23, 5));
    }

    #[test]
    fn rejects_more_than_four_digits() {
        assert!(matches!(
            parse_hour_minute("12345"),
            Err(FieldError::MalformedTimeField { .. })
        ));
        assert!(matches!(
            parse_hour_minute("9h30"),
            Err(FieldError::MalformedTimeField { .. })
        ));
    }

    #[test]
    fn hour_minute_survives_timestamp_roundtrip() {
        for raw in ["0", "7", "59", "930", "1200", "2359", "0001"] {
            let ts = parse_timestamp("2020", "3", "4", raw).unwrap();
            let expected = format!("{raw:0>4}");
            assert_eq!(ts.format("%H%M").to_string(), expected, "input {raw}");
            assert_eq!(ts.second(), 0);
        }
    }

    #[test]
    fn expands_two_digit_years() {
        let ts = parse_timestamp("5", "1", "12", "1800").unwrap();
        assert_eq!(ts.to_string(), "2005-01-12 18:00:00");
        assert_eq!(parse_year("18").unwrap(), 2018);
        assert_eq!(parse_year("2021").unwrap(), 2021);
    }

    #[test]
    fn rejects_impossible_dates() {
        assert!(matches!(
            parse_timestamp("2020", "2", "30", "1000"),
            Err(FieldError::InvalidDate { .. })
        ));
        assert!(matches!(
            parse_timestamp("2020", "1", "1", "2575"),
            Err(FieldError::InvalidDate { .. })
        ));
    }

    #[test]
    fn parses_decimal_comma() {
        assert!((parse_decimal("lat", "48,85").unwrap() - 48.85).abs() < f64::EPSILON);
        assert!((parse_decimal("lat", " 2.35 ").unwrap() - 2.35).abs() < f64::EPSILON);
        assert!(parse_decimal("lat", "abc").is_err());
        assert!(parse_decimal("lat", "NaN").is_err());
    }

    #[test]
    fn out_of_range_coordinates_are_absent() {
        assert_eq!(parse_coordinate("lat", "5051500", MAX_LATITUDE).unwrap(), None);
        assert_eq!(
            parse_coordinate("long", "-180", MAX_LONGITUDE).unwrap(),
            Some(-180.0)
        );
    }

    #[test]
    fn rejects_negative_values() {
        assert!(matches!(
            parse_unsigned::<u32>("nbv", "-2"),
            Err(FieldError::NegativeValue { .. })
        ));
        assert!(matches!(
            parse_unsigned::<u32>("nbv", "two"),
            Err(FieldError::InvalidNumber { .. })
        ));
        assert!(matches!(
            parse_non_negative_decimal("larrout", "-3,5"),
            Err(FieldError::NegativeValue { .. })
        ));
        assert_eq!(parse_unsigned::<u32>("nbv", "2").unwrap(), 2);
    }

    #[test]
    fn cleans_vehicle_ids() {
        assert_eq!(parse_vehicle_id("138 306 524").unwrap(), 138_306_524);
        assert_eq!(parse_vehicle_id("138\u{a0}306\u{a0}524").unwrap(), 138_306_524);
        assert_eq!(parse_vehicle_id("138\u{c2}\u{a0}306").unwrap(), 138_306);
        assert!(parse_vehicle_id("A01").is_err());
    }

    #[test]
    fn blank_text_is_absent() {
        assert_eq!(non_empty(" Rue X "), Some("Rue X".to_owned()));
        assert_eq!(non_empty(""), None);
        assert_eq!(non_empty("   "), None);
    }

    #[test]
    fn strips_route_marker_parentheses() {
        assert_eq!(strip_parentheses("(12)"), "12");
        assert_eq!(strip_parentheses("12"), "12");
        assert_eq!(strip_parentheses(" (3.5) "), "3.5");
    }
}
