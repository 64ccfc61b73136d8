#![cfg_attr(not(test), no_std)]

mod fmt;

mod decode;
mod encode;
mod error;
mod identity;
mod weather;

pub use crate::decode::{parse_frame, DecodedFrame, MAX_DECODED_COMMENT_LEN, MAX_VIA_LEN};
pub use crate::encode::{
    build_frame, Frame, PacketKind, Position, FRAME_LEAD_IN, MAX_FRAME_LEN, MAX_INFO_LEN,
};
pub use crate::error::{DecodeError, EncodeError};
pub use crate::identity::{
    AprsFlags, AprsIcon, AprsIdentity, MAX_CALL_LEN, MAX_COMMENT_LEN, MAX_PATH,
};
pub use crate::weather::WeatherReport;

use heapless::String;

/// Copies `s` into a fixed capacity string, dropping whatever doesn't fit.
pub(crate) fn truncated<const N: usize>(s: &str) -> String<N> {
    let mut result = String::new();
    for c in s.chars() {
        if result.push(c).is_err() {
            break;
        }
    }
    result
}

/// Frame bytes are mapped one to one onto chars, like the radio delivers them.
pub(crate) fn bytes_to_string<const N: usize>(bytes: &[u8]) -> String<N> {
    let mut result = String::new();
    for &b in bytes {
        if result.push(b as char).is_err() {
            break;
        }
    }
    result
}
