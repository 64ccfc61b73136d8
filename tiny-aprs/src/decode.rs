use heapless::String;

use crate::bytes_to_string;
use crate::encode::FRAME_LEAD_IN;
use crate::error::DecodeError;
use crate::identity::MAX_CALL_LEN;
use crate::weather::WeatherReport;

pub const MAX_VIA_LEN: usize = 128;
pub const MAX_DECODED_COMMENT_LEN: usize = 128;

// DDMM.mmN/DDDMM.mmE> including table and symbol
const POSITION_BLOCK_LEN: usize = 19;
const TIMESTAMP_LEN: usize = 7;
const METERS_PER_FOOT: f32 = 0.3048;

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodedFrame {
    pub source: String<MAX_CALL_LEN>,
    pub dest: String<MAX_CALL_LEN>,
    /// Digipeater path as sent, empty when there is none.
    pub via: String<MAX_VIA_LEN>,
    pub lat: f32,
    pub lon: f32,
    /// meters, 0 when the frame has no altitude
    pub altitude: f32,
    pub table: char,
    pub symbol: char,
    /// Everything after the position block, weather fields excluded.
    pub comment: String<MAX_DECODED_COMMENT_LEN>,
    /// Set when the position was refined by a `!wXY!` block.
    pub dao: bool,
    /// Weather fields of a frame with the `_` symbol.
    pub weather: Option<WeatherReport>,
}

/// Decodes a position frame as built by [`crate::build_frame`] or any other
/// station using the readable position format.
pub fn parse_frame(frame: &[u8]) -> Result<DecodedFrame, DecodeError> {
    let text = match frame.strip_prefix(&FRAME_LEAD_IN) {
        Some(text) if !text.is_empty() => text,
        _ => return Err(DecodeError::InvalidHeader),
    };

    let source_end = match text.iter().position(|&b| b == b'>') {
        Some(end) if end > 0 => end,
        _ => return Err(DecodeError::SourceNotFound),
    };
    let source = &text[..source_end];
    let text = &text[source_end + 1..];

    let path_end = text
        .iter()
        .position(|&b| b == b':')
        .ok_or(DecodeError::EndOfPathNotFound)?;
    let (dest, via) = match text[..path_end].iter().position(|&b| b == b',') {
        None => (&text[..path_end], &text[path_end..path_end]),
        Some(dest_end) => (&text[..dest_end], &text[dest_end + 1..path_end]),
    };
    if dest.is_empty() {
        return Err(DecodeError::DestinationNotFound);
    }
    if via.is_empty() && dest.len() < path_end {
        return Err(DecodeError::EndOfPathNotFound);
    }

    let info = &text[path_end + 1..];
    let (&message_type, info) = info.split_first().ok_or(DecodeError::Truncated)?;
    let body = match message_type {
        b'!' | b'=' => info,
        // timestamp is skipped
        b'/' | b'@' => info.get(TIMESTAMP_LEN..).ok_or(DecodeError::Truncated)?,
        other => return Err(DecodeError::UnknownMessageType(other as char)),
    };

    let block = PositionBlock::parse(body)?;
    let remainder = &body[POSITION_BLOCK_LEN..];

    let dao = find_dao(remainder);
    let (lat_extra, lon_extra) = dao.unwrap_or((0.0, 0.0));

    let altitude = find_altitude_feet(remainder)
        .map(|feet| feet as f32 * METERS_PER_FOOT)
        .unwrap_or(0.0);

    let mut comment = remainder;
    if let Some((&last, rest)) = comment.split_last() {
        if matches!(last, 0 | b'\r' | b'\n') {
            comment = rest;
        }
    }

    let mut weather = None;
    if block.symbol == '_' {
        if let Some((report, used)) = WeatherReport::parse(comment) {
            weather = Some(report);
            comment = &comment[used..];
        }
    }

    let decoded = DecodedFrame {
        source: bytes_to_string(source),
        dest: bytes_to_string(dest),
        via: bytes_to_string(via),
        lat: block.lat.to_degrees(lat_extra),
        lon: block.lon.to_degrees(lon_extra),
        altitude,
        table: block.table,
        symbol: block.symbol,
        comment: bytes_to_string(comment),
        dao: dao.is_some(),
        weather,
    };
    log_trace!("aprs: decoded frame from {}", decoded.source.as_str());
    Ok(decoded)
}

struct Coordinate {
    degrees: u16,
    minutes: f32,
    negative: bool,
}

impl Coordinate {
    fn to_degrees(&self, extra_minutes: f32) -> f32 {
        let magnitude = self.degrees as f32 + (self.minutes + extra_minutes) / 60.0;
        if self.negative {
            -magnitude
        } else {
            magnitude
        }
    }
}

struct PositionBlock {
    lat: Coordinate,
    lon: Coordinate,
    table: char,
    symbol: char,
}

impl PositionBlock {
    fn parse(body: &[u8]) -> Result<Self, DecodeError> {
        let block = body
            .get(..POSITION_BLOCK_LEN)
            .ok_or(DecodeError::Truncated)?;

        let lat_degrees = parse_number::<u16>(&block[0..2])
            .ok_or_else(|| DecodeError::InvalidLatitudeDegrees(bytes_to_string(&block[0..2])))?;
        let lat_minutes = parse_minutes(&block[2..7])
            .ok_or_else(|| DecodeError::InvalidLatitudeMinutes(bytes_to_string(&block[2..7])))?;
        let lat_negative = match block[7] {
            b'N' => false,
            b'S' => true,
            other => return Err(DecodeError::InvalidLatitudePolarity(other as char)),
        };

        let lon_degrees = parse_number::<u16>(&block[9..12])
            .ok_or_else(|| DecodeError::InvalidLongitudeDegrees(bytes_to_string(&block[9..12])))?;
        let lon_minutes = parse_minutes(&block[12..17])
            .ok_or_else(|| DecodeError::InvalidLongitudeMinutes(bytes_to_string(&block[12..17])))?;
        let lon_negative = match block[17] {
            b'E' => false,
            b'W' => true,
            other => return Err(DecodeError::InvalidLongitudePolarity(other as char)),
        };

        Ok(Self {
            lat: Coordinate {
                degrees: lat_degrees,
                minutes: lat_minutes,
                negative: lat_negative,
            },
            lon: Coordinate {
                degrees: lon_degrees,
                minutes: lon_minutes,
                negative: lon_negative,
            },
            table: block[8] as char,
            symbol: block[18] as char,
        })
    }
}

fn parse_number<T: core::str::FromStr>(raw: &[u8]) -> Option<T> {
    core::str::from_utf8(raw).ok()?.parse().ok()
}

fn parse_minutes(raw: &[u8]) -> Option<f32> {
    parse_number::<f32>(raw).filter(|minutes| (0.0..60.0).contains(minutes))
}

/// Extra minutes for latitude and longitude from a `!wXY!` block.
fn find_dao(remainder: &[u8]) -> Option<(f32, f32)> {
    let is_base91 = |b: u8| (b'!'..=b'{').contains(&b);
    remainder
        .windows(5)
        .find(|w| w[0] == b'!' && w[1] == b'w' && w[4] == b'!' && is_base91(w[2]) && is_base91(w[3]))
        .map(|w| {
            let extra = |b: u8| (b - b'!') as f32 / 91.0 * 0.01;
            (extra(w[2]), extra(w[3]))
        })
}

fn find_altitude_feet(remainder: &[u8]) -> Option<i32> {
    let start = remainder.windows(3).position(|w| w == b"/A=")? + 3;
    let digits = &remainder[start..];
    let digits = &digits[..digits.len().min(6)];

    // leading sign and digits only, like strtol
    let end = digits
        .iter()
        .enumerate()
        .take_while(|&(i, &b)| b.is_ascii_digit() || (i == 0 && b == b'-'))
        .count();
    parse_number::<i32>(&digits[..end])
}
