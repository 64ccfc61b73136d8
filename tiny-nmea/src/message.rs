use heapless::String;

use crate::gga::GgaData;
use crate::gsa::GsaData;
use crate::gsv::GsvData;
use crate::rmc::RmcData;

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Time {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// Date as sent in RMC, `year` is the two digit year.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Date {
    pub day: u8,
    pub month: u8,
    pub year: u8,
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTime {
    /// Range checked combination of RMC date and time, two digit years map to 20YY.
    pub fn from_parts(date: Date, time: Time) -> Option<Self> {
        let in_range = time.hour <= 23
            && time.minute <= 59
            && time.second <= 59
            && (1..=31).contains(&date.day)
            && (1..=12).contains(&date.month)
            && date.year <= 99;
        if !in_range {
            return None;
        }

        Some(Self {
            // only correct until 2099
            year: 2000 + date.year as u16,
            month: date.month,
            day: date.day,
            hour: time.hour,
            minute: time.minute,
            second: time.second,
        })
    }
}

/// GGA quality indicator.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixQuality {
    Invalid,
    Autonomous,
    Differential,
    Precise,
    RtkFixed,
    RtkFloat,
}

impl FixQuality {
    pub fn from_field(token: &str) -> Self {
        match token.as_bytes().first() {
            Some(b'1') => FixQuality::Autonomous,
            Some(b'2') => FixQuality::Differential,
            Some(b'3') => FixQuality::Precise,
            Some(b'4') => FixQuality::RtkFixed,
            Some(b'5') => FixQuality::RtkFloat,
            _ => FixQuality::Invalid,
        }
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, FixQuality::Invalid)
    }
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixType {
    None,
    Fix2D,
    Fix3D,
}

impl FixType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FixType::None => "none",
            FixType::Fix2D => "2D",
            FixType::Fix3D => "3D",
        }
    }
}

/// GNSS system id as sent in the last GSA field (NMEA 4.10).
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Constellation {
    Invalid = 0,
    Gps = 1,
    Glonass = 2,
    Galileo = 3,
    BeiDou = 4,
    Qzss = 5,
    NavIC = 6,
}

impl Constellation {
    pub fn from_system_id(id: u8) -> Self {
        match id {
            1 => Constellation::Gps,
            2 => Constellation::Glonass,
            3 => Constellation::Galileo,
            4 => Constellation::BeiDou,
            5 => Constellation::Qzss,
            6 => Constellation::NavIC,
            _ => Constellation::Invalid,
        }
    }

    /// Constellation of a single-system talker, `None` for combined talkers like `GN`.
    pub fn from_talker(talker: &str) -> Option<Self> {
        match talker {
            "GP" => Some(Constellation::Gps),
            "GL" => Some(Constellation::Glonass),
            "GA" => Some(Constellation::Galileo),
            "GB" | "BD" => Some(Constellation::BeiDou),
            "GQ" => Some(Constellation::Qzss),
            "GI" => Some(Constellation::NavIC),
            _ => None,
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Constellation::Invalid => "unk",
            Constellation::Gps => "GPS",
            Constellation::Glonass => "GLO",
            Constellation::Galileo => "GAL",
            Constellation::BeiDou => "BD",
            Constellation::Qzss => "QZ",
            Constellation::NavIC => "NAV",
        }
    }
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Dop {
    pub pdop: f32,
    pub hdop: f32,
    pub vdop: f32,
}

/// One satellite of a GSV sentence. `snr` is `-1` when the satellite is in
/// view but not tracked.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SatelliteInfo {
    pub id: u8,
    pub snr: i8,
}

impl SatelliteInfo {
    pub fn is_tracked(&self) -> bool {
        self.snr >= 0
    }
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, PartialEq)]
pub enum NMEAMessage {
    GGA(GgaData),
    RMC(RmcData),
    GSA(GsaData),
    GSV(GsvData),
    Other { id: String<6> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datetime_range_check() {
        let date = Date {
            day: 1,
            month: 1,
            year: 23,
        };
        let time = Time {
            hour: 12,
            minute: 0,
            second: 0,
        };
        let datetime = DateTime::from_parts(date, time).unwrap();
        assert_eq!(datetime.year, 2023);

        let bad_month = Date { month: 13, ..date };
        assert_eq!(DateTime::from_parts(bad_month, time), None);

        let bad_hour = Time { hour: 24, ..time };
        assert_eq!(DateTime::from_parts(date, bad_hour), None);

        let bad_day = Date { day: 0, ..date };
        assert_eq!(DateTime::from_parts(bad_day, time), None);
    }

    #[test]
    fn fix_quality_codes() {
        assert!(!FixQuality::from_field("0").is_valid());
        assert!(!FixQuality::from_field("").is_valid());
        assert!(!FixQuality::from_field("6").is_valid());
        for code in ["1", "2", "3", "4", "5"] {
            assert!(FixQuality::from_field(code).is_valid());
        }
    }
}
