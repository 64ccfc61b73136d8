use crate::error::NmeaError;
use crate::message::{Date, Time};
use heapless::String;

/// Copies as much of `str` as fits into a `String<N>`, cutting at a char boundary.
pub fn truncated<const N: usize>(str: &str) -> String<N> {
    let mut result = String::new();
    for c in str.chars() {
        if result.push(c).is_err() {
            break;
        }
    }
    result
}

/// Parses a `DDMM.MMMM` / `DDDMM.MMMM` coordinate into unsigned degrees.
///
/// The degree digits are everything before the two minute digits that precede
/// the decimal point, so the dot has to sit at index 4 (latitude) or 5 (longitude).
pub fn parse_coordinate(field: &'static str, token: &str) -> Result<f32, NmeaError> {
    let malformed = || NmeaError::malformed(field, token);

    let dot = token.find('.').ok_or_else(malformed)?;
    if dot != 4 && dot != 5 {
        log_warn!("nmea: wrong dot position {} in coordinate", dot);
        return Err(malformed());
    }

    let degrees_len = dot - 2;
    let degrees = token
        .get(..degrees_len)
        .and_then(|degrees| degrees.parse::<u16>().ok())
        .ok_or_else(malformed)?;
    let minutes = token
        .get(degrees_len..)
        .and_then(|minutes| minutes.parse::<f32>().ok())
        .ok_or_else(malformed)?;
    if !(0.0..60.0).contains(&minutes) {
        return Err(malformed());
    }

    Ok(degrees as f32 + minutes / 60.0)
}

/// `N`/`E` map to `1.0`, `S`/`W` to `-1.0`.
pub fn parse_polarity(field: &'static str, token: &str) -> Result<f32, NmeaError> {
    match token {
        "N" | "E" => Ok(1.0),
        "S" | "W" => Ok(-1.0),
        _ => Err(NmeaError::malformed(field, token)),
    }
}

/// Bare float where an empty field means zero, as receivers leave e.g. the
/// course empty while standing still.
pub fn parse_f32_or_zero(field: &'static str, token: &str) -> Result<f32, NmeaError> {
    if token.is_empty() {
        return Ok(0.0);
    }
    token
        .parse::<f32>()
        .map_err(|_| NmeaError::malformed(field, token))
}

fn two_digits(str: &str, start: usize) -> Option<u8> {
    str.get(start..start + 2)?.parse::<u8>().ok()
}

/// `HHMMSS[.ss]`, each two character run parsed on its own. Shorter tokens
/// carry no time at all.
pub fn parse_time(str: &str) -> Option<Time> {
    if str.len() < 6 {
        return None;
    }
    Some(Time {
        hour: two_digits(str, 0)?,
        minute: two_digits(str, 2)?,
        second: two_digits(str, 4)?,
    })
}

/// `DDMMYY`, the year is kept as its two digits.
pub fn parse_date(str: &str) -> Option<Date> {
    if str.len() < 6 {
        return None;
    }
    Some(Date {
        day: two_digits(str, 0)?,
        month: two_digits(str, 2)?,
        year: two_digits(str, 4)?,
    })
}
