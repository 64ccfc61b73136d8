#![cfg_attr(not(test), no_std)]

mod fmt;

mod common;
mod error;
mod fields;
mod gga;
mod gsa;
mod gsv;
mod message;
mod rmc;
mod snapshot;

pub use crate::common::truncated;
pub use crate::error::NmeaError;
pub use crate::fields::Fields;
pub use crate::gga::GgaData;
pub use crate::gsa::GsaData;
pub use crate::gsv::{GsvData, MAX_SATELLITES_PER_SENTENCE};
pub use crate::message::{
    Constellation, Date, DateTime, Dop, FixQuality, FixType, NMEAMessage, SatelliteInfo, Time,
};
pub use crate::rmc::RmcData;
pub use crate::snapshot::{
    FixInfo, SatellitesInView, SentenceEffect, TelemetrySnapshot, NUM_FIX_INFO, NUM_SAT_INFO,
    NUM_SAT_SYSTEMS,
};

use heapless::String;

/// Longest sentence the serial framing hands to the parser, including `$` and CR/LF.
pub const MAX_SENTENCE_LENGTH: usize = 84;

/// XOR of every byte of `data`, i.e. the part of a sentence between `$` and `*`.
pub fn checksum(data: &str) -> u8 {
    data.bytes().fold(0u8, |checksum, byte| checksum ^ byte)
}

/// Checks framing and checksum, returning the body between `$` and `*`.
fn validate(sentence: &str) -> Result<&str, NmeaError> {
    let sentence = sentence.trim_end_matches(|c| c == '\r' || c == '\n');
    if !sentence.starts_with('$') {
        return Err(NmeaError::MissingStartDelimiter);
    }

    let star = match sentence.rfind('*') {
        Some(star) if star > 0 => star,
        _ => return Err(NmeaError::MissingChecksum),
    };

    let checksum_str = sentence
        .get(star + 1..star + 3)
        .ok_or_else(|| NmeaError::InvalidChecksumDigits(truncated(&sentence[star + 1..])))?;
    let expected = u8::from_str_radix(checksum_str, 16)
        .map_err(|_| NmeaError::InvalidChecksumDigits(truncated(checksum_str)))?;

    let body = &sentence[1..star];
    let calculated = checksum(body);
    if calculated != expected {
        return Err(NmeaError::ChecksumMismatch {
            expected,
            calculated,
        });
    }

    Ok(body)
}

/// Parses one sentence without touching any state.
///
/// Unknown sentence types are not an error, they come back as [`NMEAMessage::Other`].
pub fn parse(sentence: &str) -> Result<NMEAMessage, NmeaError> {
    let body = validate(sentence)?;

    let mut split = body.split(',');
    let message_id = split.next().unwrap_or("");
    let fields = Fields::new(split);

    let (talker, message_type) = match (message_id.get(..2), message_id.get(2..)) {
        (Some(talker), Some(message_type)) if message_id.len() == 5 => (talker, message_type),
        _ => {
            return Ok(NMEAMessage::Other {
                id: truncated(message_id),
            })
        }
    };
    let talker: String<2> = truncated(talker);

    match message_type {
        "GGA" => gga::parse_gga(talker, fields).map(NMEAMessage::GGA),
        "RMC" => rmc::parse_rmc(talker, fields).map(NMEAMessage::RMC),
        "GSA" => gsa::parse_gsa(talker, fields).map(NMEAMessage::GSA),
        "GSV" => gsv::parse_gsv(talker, fields).map(NMEAMessage::GSV),
        _ => Ok(NMEAMessage::Other {
            id: truncated(message_id),
        }),
    }
}
