use core::fmt::Write as _;

use heapless::String;

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, PartialEq)]
pub enum EncodeError {
    /// Source or destination call is empty.
    MissingAddress,
    CompressedPositionUnsupported,
    /// Not even the header and position fit into a frame.
    FrameTooLong,
}

impl EncodeError {
    pub fn message(&self) -> String<128> {
        let mut message = String::new();
        write!(message, "{}", self).ok();
        message
    }
}

impl core::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EncodeError::MissingAddress => {
                write!(f, "aprs: source and destination must be set")
            }
            EncodeError::CompressedPositionUnsupported => {
                write!(f, "aprs: compressed position encoding is not supported")
            }
            EncodeError::FrameTooLong => write!(f, "aprs: frame does not fit"),
        }
    }
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    InvalidHeader,
    SourceNotFound,
    EndOfPathNotFound,
    DestinationNotFound,
    UnknownMessageType(char),
    /// Frame ends inside the position block.
    Truncated,
    InvalidLatitudeDegrees(String<8>),
    InvalidLatitudeMinutes(String<8>),
    InvalidLatitudePolarity(char),
    InvalidLongitudeDegrees(String<8>),
    InvalidLongitudeMinutes(String<8>),
    InvalidLongitudePolarity(char),
}

impl DecodeError {
    pub fn message(&self) -> String<128> {
        let mut message = String::new();
        write!(message, "{}", self).ok();
        message
    }
}

impl core::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DecodeError::InvalidHeader => write!(f, "Invalid header"),
            DecodeError::SourceNotFound => write!(f, "End of source not found."),
            DecodeError::EndOfPathNotFound => write!(f, "End of path not found."),
            DecodeError::DestinationNotFound => {
                write!(f, "End of destination marker not found.")
            }
            DecodeError::UnknownMessageType(t) => write!(f, "Unknown message type: '{}'", t),
            DecodeError::Truncated => write!(f, "Location error: frame too short."),
            DecodeError::InvalidLatitudeDegrees(raw) => write!(
                f,
                "Location error: Lat. degrees is not an integer: '{}'.",
                raw
            ),
            DecodeError::InvalidLatitudeMinutes(raw) => {
                write!(f, "Location error: Lat. minutes is not a float: '{}'.", raw)
            }
            DecodeError::InvalidLatitudePolarity(c) => {
                write!(f, "Location error: Invalid latitude polarity: '{}'.", c)
            }
            DecodeError::InvalidLongitudeDegrees(raw) => write!(
                f,
                "Location error: Lon. degrees is not an integer: '{}'.",
                raw
            ),
            DecodeError::InvalidLongitudeMinutes(raw) => {
                write!(f, "Location error: Lon. minutes is not a float: '{}'.", raw)
            }
            DecodeError::InvalidLongitudePolarity(c) => {
                write!(f, "Location error: Invalid longitude polarity: '{}'.", c)
            }
        }
    }
}
