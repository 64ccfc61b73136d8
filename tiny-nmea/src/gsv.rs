use heapless::{String, Vec};

use crate::error::NmeaError;
use crate::fields::Fields;
use crate::message::{Constellation, SatelliteInfo};

pub const MAX_SATELLITES_PER_SENTENCE: usize = 4;

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, PartialEq)]
pub struct GsvData {
    pub talker: String<2>,
    /// `None` for talkers that mix systems, e.g. `GN`.
    pub constellation: Option<Constellation>,
    /// 1-based index within the sentence group, `1` starts a new list.
    pub sentence_number: u8,
    pub satellites: Vec<SatelliteInfo, MAX_SATELLITES_PER_SENTENCE>,
}

// fields: 0 sentence count, 1 sentence number, 2 satellites in view,
// then groups of (id, elevation, azimuth, snr) starting at 3
pub fn parse_gsv(talker: String<2>, fields: Fields) -> Result<GsvData, NmeaError> {
    let sentence_number_str = fields.get_or_empty(1);
    let sentence_number = sentence_number_str
        .parse::<u8>()
        .map_err(|_| NmeaError::malformed("sentence number", sentence_number_str))?;

    let mut satellites = Vec::new();
    let mut group_start = 3;
    // a group only counts if its snr field exists, which skips the trailing
    // signal id field of NMEA 4.10 receivers
    while let Some(snr_str) = fields.get(group_start + 3) {
        let id_str = fields.get_or_empty(group_start);
        // receivers pad the last sentence of a group with empty groups
        if id_str.is_empty() {
            group_start += 4;
            continue;
        }
        let id = id_str
            .parse::<u8>()
            .map_err(|_| NmeaError::malformed("satellite id", id_str))?;

        let snr = if snr_str.is_empty() {
            -1
        } else {
            snr_str
                .parse::<i8>()
                .map_err(|_| NmeaError::malformed("snr", snr_str))?
        };

        if satellites.push(SatelliteInfo { id, snr }).is_err() {
            break;
        }
        group_start += 4;
    }

    Ok(GsvData {
        constellation: Constellation::from_talker(&talker),
        talker,
        sentence_number,
        satellites,
    })
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{init_logger, sentence};
    use crate::{parse, Constellation, NMEAMessage, SatelliteInfo};

    fn parse_gsv(body: &str) -> super::GsvData {
        match parse(&sentence(body)).unwrap() {
            NMEAMessage::GSV(gsv) => gsv,
            other => panic!("expected GSV, got {:?}", other),
        }
    }

    #[test]
    fn untracked_satellite_gets_sentinel() {
        let gsv = parse_gsv("GLGSV,2,1,05,65,30,120,35,66,10,200,,67,45,080,28,68,05,330,");
        assert_eq!(gsv.constellation, Some(Constellation::Glonass));
        assert_eq!(gsv.sentence_number, 1);
        assert_eq!(
            gsv.satellites.as_slice(),
            &[
                SatelliteInfo { id: 65, snr: 35 },
                SatelliteInfo { id: 66, snr: -1 },
                SatelliteInfo { id: 67, snr: 28 },
                SatelliteInfo { id: 68, snr: -1 },
            ]
        );
    }

    #[test]
    fn trailing_signal_id_is_not_a_satellite() {
        let gsv = parse_gsv("GPGSV,3,3,10,30,12,300,22,31,05,045,,1");
        assert_eq!(gsv.satellites.len(), 2);
        assert!(gsv.satellites[0].is_tracked());
        assert!(!gsv.satellites[1].is_tracked());
    }

    #[test]
    fn combined_talker_has_no_constellation() {
        let gsv = parse_gsv("GNGSV,1,1,01,05,40,100,30");
        assert_eq!(gsv.constellation, None);
    }

    #[test]
    fn empty_padding_groups_are_skipped() {
        init_logger();
        let gsv = parse_gsv("GPGSV,3,3,09,30,12,300,22,,,,");
        assert_eq!(gsv.satellites.as_slice(), &[SatelliteInfo { id: 30, snr: 22 }]);

        let gsv = parse_gsv("GPGSV,3,3,10,30,12,300,22,,,,,31,05,045,");
        assert_eq!(
            gsv.satellites.as_slice(),
            &[
                SatelliteInfo { id: 30, snr: 22 },
                SatelliteInfo { id: 31, snr: -1 },
            ]
        );
    }
}
