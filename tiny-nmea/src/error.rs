use core::fmt::Write as _;

use heapless::String;

use crate::common::truncated;

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, PartialEq)]
pub enum NmeaError {
    MissingStartDelimiter,
    MissingChecksum,
    InvalidChecksumDigits(String<4>),
    ChecksumMismatch { expected: u8, calculated: u8 },
    MalformedField { field: &'static str, raw: String<16> },
}

impl NmeaError {
    pub(crate) fn malformed(field: &'static str, raw: &str) -> Self {
        NmeaError::MalformedField {
            field,
            raw: truncated(raw),
        }
    }

    pub fn is_checksum_error(&self) -> bool {
        matches!(
            self,
            NmeaError::ChecksumMismatch { .. } | NmeaError::InvalidChecksumDigits(_)
        )
    }

    /// Diagnostic text, cut off at 128 bytes.
    pub fn message(&self) -> String<128> {
        let mut message = String::new();
        write!(message, "{}", self).ok();
        message
    }
}

impl core::fmt::Display for NmeaError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            NmeaError::MissingStartDelimiter => write!(f, "nmea: sentence does not start with '$'"),
            NmeaError::MissingChecksum => {
                write!(f, "nmea: checksum not found, sentence incomplete?")
            }
            NmeaError::InvalidChecksumDigits(raw) => {
                write!(f, "nmea: checksum is not two hex digits: '{}'", raw)
            }
            NmeaError::ChecksumMismatch {
                expected,
                calculated,
            } => write!(
                f,
                "nmea: checksum invalid! expected: {:02x}, calculated: {:02x}",
                expected, calculated
            ),
            NmeaError::MalformedField { field, raw } => {
                write!(f, "nmea: malformed {}: '{}'", field, raw)
            }
        }
    }
}
