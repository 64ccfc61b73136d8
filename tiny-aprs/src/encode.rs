use core::fmt::Write as _;

use heapless::{String, Vec};

use crate::error::EncodeError;
use crate::identity::AprsIdentity;
use crate::weather::WeatherReport;

/// Marker byte and two protocol bytes that replace the AX.25 header on LoRa.
pub const FRAME_LEAD_IN: [u8; 3] = [b'<', 0xFF, 0x01];
/// Frame length without the trailing NUL.
pub const MAX_FRAME_LEN: usize = 255;
/// Longest information field (everything after `:`).
pub const MAX_INFO_LEN: usize = 100;

const FRAME_BUFFER_LEN: usize = MAX_FRAME_LEN + 1;
const FEET_PER_METER: f32 = 1.0 / 0.3048;
const WEATHER_TABLE: char = '/';
const WEATHER_SYMBOL: char = '_';

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub lat: f32,
    pub lon: f32,
    /// meters
    pub altitude: f32,
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, PartialEq)]
pub enum PacketKind {
    Position,
    Weather(WeatherReport),
}

/// An encoded frame. The buffer always holds a NUL after the last byte.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    bytes: Vec<u8, FRAME_BUFFER_LEN>,
}

impl Frame {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len()]
    }

    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The frame after the lead-in, for logging.
    pub fn text(&self) -> String<MAX_FRAME_LEN> {
        crate::bytes_to_string(&self.as_bytes()[FRAME_LEAD_IN.len()..])
    }
}

/// Builds `<lead-in>SRC>DEST,PATH...:` followed by the information field.
///
/// When space runs out the comment is cut first, then the frame counter and
/// then the altitude are left out.
pub fn build_frame(
    identity: &AprsIdentity,
    position: &Position,
    kind: &PacketKind,
    frame_id: u32,
) -> Result<Frame, EncodeError> {
    if !identity.can_build_frame() {
        return Err(EncodeError::MissingAddress);
    }
    if identity.flags.compress_location {
        log_warn!("aprs: compressed position requested but not implemented");
        return Err(EncodeError::CompressedPositionUnsupported);
    }

    let mut bytes = Vec::<u8, FRAME_BUFFER_LEN>::new();
    push_bytes(&mut bytes, &FRAME_LEAD_IN)?;
    push_bytes(&mut bytes, identity.source.as_bytes())?;
    push_bytes(&mut bytes, b">")?;
    push_bytes(&mut bytes, identity.dest.as_bytes())?;
    for via in identity.path.iter() {
        push_bytes(&mut bytes, b",")?;
        push_bytes(&mut bytes, via.as_bytes())?;
    }
    push_bytes(&mut bytes, b":")?;

    let capacity = MAX_INFO_LEN.min(MAX_FRAME_LEN.saturating_sub(bytes.len()));
    let info = build_info(identity, position, kind, frame_id, capacity)?;
    push_bytes(&mut bytes, info.as_bytes())?;
    push_bytes(&mut bytes, &[0])?;

    Ok(Frame { bytes })
}

fn push_bytes(bytes: &mut Vec<u8, FRAME_BUFFER_LEN>, data: &[u8]) -> Result<(), EncodeError> {
    bytes
        .extend_from_slice(data)
        .map_err(|_| EncodeError::FrameTooLong)
}

fn build_info(
    identity: &AprsIdentity,
    position: &Position,
    kind: &PacketKind,
    frame_id: u32,
    capacity: usize,
) -> Result<String<MAX_INFO_LEN>, EncodeError> {
    let mut head = String::<48>::new();
    let mut altitude = String::<12>::new();
    let mut frame_counter = String::<12>::new();

    match kind {
        PacketKind::Position => {
            write_readable_position(
                &mut head,
                position,
                identity.table,
                identity.symbol,
                identity.flags.add_dao,
            )?;
            // out of range altitudes are left out
            if write!(
                altitude,
                "/A={:06}",
                (position.altitude * FEET_PER_METER) as i32
            )
            .is_err()
            {
                log_debug!("aprs: altitude {} m does not fit", position.altitude);
                altitude.clear();
            }
        }
        PacketKind::Weather(report) => {
            write_readable_position(&mut head, position, WEATHER_TABLE, WEATHER_SYMBOL, false)?;
            report
                .write_to(&mut head)
                .map_err(|_| EncodeError::FrameTooLong)?;
        }
    }

    if identity.flags.add_frame_counter {
        write!(frame_counter, " #{}", frame_id).map_err(|_| EncodeError::FrameTooLong)?;
    }

    if head.len() > capacity {
        return Err(EncodeError::FrameTooLong);
    }
    if head.len() + altitude.len() + frame_counter.len() > capacity {
        log_debug!("aprs: no room for frame counter");
        frame_counter.clear();
    }
    if head.len() + altitude.len() > capacity {
        log_debug!("aprs: no room for altitude");
        altitude.clear();
    }
    let comment_budget = capacity - head.len() - altitude.len() - frame_counter.len();

    let mut info = String::<MAX_INFO_LEN>::new();
    push_str(&mut info, &head)?;
    for c in identity.comment.chars() {
        if info.len() - head.len() + c.len_utf8() > comment_budget {
            break;
        }
        push_str(&mut info, c.encode_utf8(&mut [0u8; 4]))?;
    }
    push_str(&mut info, &altitude)?;
    push_str(&mut info, &frame_counter)?;

    Ok(info)
}

fn push_str(info: &mut String<MAX_INFO_LEN>, s: &str) -> Result<(), EncodeError> {
    info.push_str(s).map_err(|_| EncodeError::FrameTooLong)
}

/// One coordinate split the way the readable format needs it.
struct MinuteParts {
    degrees: i32,
    minutes: i32,
    hundredths: i32,
    /// Extra precision below the hundredths, base-91 encoded.
    dao: char,
    hemisphere: char,
}

impl MinuteParts {
    fn new(value: f32, positive: char, negative: char) -> Self {
        let (value, hemisphere) = if value < 0.0 {
            (-value, negative)
        } else {
            (value, positive)
        };

        let degrees = value as i32;
        // minutes with four decimals
        let full_precision = ((value - degrees as f32) * 600_000.0) as i32;
        let extended = full_precision % 100;

        Self {
            degrees,
            minutes: full_precision / 10_000,
            hundredths: (full_precision / 100) % 100,
            dao: (b'!' + (extended * 91 / 100) as u8) as char,
            hemisphere,
        }
    }
}

fn write_readable_position<const N: usize>(
    out: &mut String<N>,
    position: &Position,
    table: char,
    symbol: char,
    add_dao: bool,
) -> Result<(), EncodeError> {
    let lat = MinuteParts::new(position.lat, 'N', 'S');
    let lon = MinuteParts::new(position.lon, 'E', 'W');

    write!(
        out,
        "!{:02}{:02}.{:02}{}{}{:03}{:02}.{:02}{}{}",
        lat.degrees,
        lat.minutes,
        lat.hundredths,
        lat.hemisphere,
        table,
        lon.degrees,
        lon.minutes,
        lon.hundredths,
        lon.hemisphere,
        symbol
    )
    .map_err(|_| EncodeError::FrameTooLong)?;

    if add_dao {
        write!(out, "!w{}{}!", lat.dao, lon.dao).map_err(|_| EncodeError::FrameTooLong)?;
    }
    Ok(())
}
