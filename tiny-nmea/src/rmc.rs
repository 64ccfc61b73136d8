use heapless::String;

use crate::common::{parse_date, parse_f32_or_zero, parse_time};
use crate::error::NmeaError;
use crate::fields::Fields;
use crate::message::{Date, DateTime, Time};

pub const KNOTS_TO_METERS_PER_SECOND: f32 = 0.514444;

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, PartialEq)]
pub struct RmcData {
    pub talker: String<2>,
    pub time: Option<Time>,
    pub date: Option<Date>,
    pub speed_knots: f32,
    /// Course over ground in degrees.
    pub heading: f32,
    /// Mode indicator is `A`, `D` or `E`.
    pub valid: bool,
}

impl RmcData {
    pub fn speed_meters_per_second(&self) -> f32 {
        self.speed_knots * KNOTS_TO_METERS_PER_SECOND
    }

    /// `None` when date or time is missing or out of range.
    pub fn datetime(&self) -> Option<DateTime> {
        DateTime::from_parts(self.date?, self.time?)
    }
}

// fields: 0 time, 1 status, 2-5 position, 6 speed (knots), 7 course, 8 date, 11 mode
pub fn parse_rmc(talker: String<2>, fields: Fields) -> Result<RmcData, NmeaError> {
    let valid = matches!(fields.get_or_empty(11), "A" | "D" | "E");

    Ok(RmcData {
        talker,
        time: parse_time(fields.get_or_empty(0)),
        date: parse_date(fields.get_or_empty(8)),
        speed_knots: parse_f32_or_zero("speed", fields.get_or_empty(6))?,
        heading: parse_f32_or_zero("heading", fields.get_or_empty(7))?,
        valid,
    })
}

#[cfg(test)]
mod tests {
    use crate::test_utils::sentence;
    use crate::{parse, NMEAMessage, NmeaError};

    fn parse_rmc(body: &str) -> Result<super::RmcData, NmeaError> {
        match parse(&sentence(body))? {
            NMEAMessage::RMC(rmc) => Ok(rmc),
            other => panic!("expected RMC, got {:?}", other),
        }
    }

    #[test]
    fn speed_heading_and_datetime() {
        let rmc =
            parse_rmc("GNRMC,120000.00,A,4912.345,N,01103.456,E,5.0,90.0,010123,,,A").unwrap();
        assert!(rmc.valid);
        assert!((rmc.speed_meters_per_second() - 2.57222).abs() < 1e-3);
        assert_eq!(rmc.heading, 90.0);

        let datetime = rmc.datetime().unwrap();
        assert_eq!(
            (datetime.year, datetime.month, datetime.day),
            (2023, 1, 1)
        );
        assert_eq!(
            (datetime.hour, datetime.minute, datetime.second),
            (12, 0, 0)
        );
    }

    #[test]
    fn short_time_token_is_ignored() {
        let rmc = parse_rmc("GNRMC,1200,A,,,,,0.0,,010123,,,A").unwrap();
        assert_eq!(rmc.time, None);
        assert_eq!(rmc.datetime(), None);
        assert!(rmc.valid);
        assert_eq!(rmc.heading, 0.0);
    }

    #[test]
    fn mode_indicator() {
        for (mode, valid) in [("A", true), ("D", true), ("E", true), ("N", false), ("", false)] {
            let body = std::format!("GNRMC,120000.00,V,,,,,,,010123,,,{}", mode);
            assert_eq!(parse_rmc(&body).unwrap().valid, valid, "mode {:?}", mode);
        }
    }

    #[test]
    fn out_of_range_date_has_no_datetime() {
        let rmc = parse_rmc("GNRMC,250000.00,A,,,,,1.0,45.0,320123,,,A").unwrap();
        assert_eq!(rmc.datetime(), None);
    }

    #[test]
    fn garbage_speed_is_an_error() {
        let result = parse_rmc("GNRMC,120000.00,A,,,,,fast,90.0,010123,,,A");
        assert!(matches!(
            result,
            Err(NmeaError::MalformedField { field: "speed", .. })
        ));
    }
}
