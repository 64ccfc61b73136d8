use heapless::Vec;

use crate::error::NmeaError;
use crate::gsa::GsaData;
use crate::gsv::GsvData;
use crate::message::{Constellation, DateTime, FixType, NMEAMessage, SatelliteInfo};
use crate::parse;

/// Fix info slots, one per constellation seen in GSA sentences.
pub const NUM_FIX_INFO: usize = 4;
/// Satellites kept per constellation from GSV sentences.
pub const NUM_SAT_INFO: usize = 16;
/// Constellations with a satellites-in-view list.
pub const NUM_SAT_SYSTEMS: usize = 4;

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixInfo {
    pub constellation: Constellation,
    pub fix_type: FixType,
    pub auto_mode: bool,
    pub satellites_used: u8,
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, PartialEq)]
pub struct SatellitesInView {
    pub constellation: Constellation,
    pub satellites: Vec<SatelliteInfo, NUM_SAT_INFO>,
}

impl SatellitesInView {
    pub fn tracked(&self) -> usize {
        self.satellites.iter().filter(|sat| sat.is_tracked()).count()
    }
}

/// What a sentence did to the snapshot.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentenceEffect {
    /// Set by GGA and RMC, which carry position, velocity and time.
    pub position_updated: bool,
}

/// Everything the parser knows about the receiver's state.
///
/// Position, altitude and date/time keep their last values when a sentence
/// clears the matching valid flag.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TelemetrySnapshot {
    pub lat: f32,
    pub lon: f32,
    /// meters
    pub altitude: f32,
    pub pos_valid: bool,

    /// m/s
    pub speed: f32,
    /// degrees, 0-360
    pub heading: f32,
    pub speed_heading_valid: bool,

    pub fix_info: Vec<FixInfo, NUM_FIX_INFO>,
    // shared by all constellations, written by whichever GSA came last
    pub pdop: f32,
    pub hdop: f32,
    pub vdop: f32,

    pub sat_info: Vec<SatellitesInView, NUM_SAT_SYSTEMS>,

    pub datetime: DateTime,
    pub datetime_valid: bool,
}

impl TelemetrySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Parses `sentence` and folds it into the snapshot.
    ///
    /// A sentence is parsed completely before anything is written, so an
    /// error leaves the snapshot exactly as it was.
    pub fn update(&mut self, sentence: &str) -> Result<SentenceEffect, NmeaError> {
        let message = parse(sentence).map_err(|e| {
            log_warn!("nmea: dropping sentence: {}", e.message().as_str());
            e
        })?;
        Ok(self.apply(&message))
    }

    pub fn apply(&mut self, message: &NMEAMessage) -> SentenceEffect {
        match message {
            NMEAMessage::GGA(gga) => {
                if let Some((lat, lon, altitude)) = gga.position {
                    self.lat = lat;
                    self.lon = lon;
                    self.altitude = altitude;
                    self.pos_valid = true;
                } else {
                    self.pos_valid = false;
                }
                SentenceEffect {
                    position_updated: true,
                }
            }
            NMEAMessage::RMC(rmc) => {
                if rmc.valid {
                    self.speed = rmc.speed_meters_per_second();
                    self.heading = rmc.heading;
                    self.speed_heading_valid = true;

                    match rmc.datetime() {
                        Some(datetime) => {
                            self.datetime = datetime;
                            self.datetime_valid = true;
                        }
                        None => self.datetime_valid = false,
                    }
                } else {
                    self.speed_heading_valid = false;
                    self.datetime_valid = false;
                }
                SentenceEffect {
                    position_updated: true,
                }
            }
            NMEAMessage::GSA(gsa) => {
                self.merge_fix_info(gsa);
                SentenceEffect {
                    position_updated: false,
                }
            }
            NMEAMessage::GSV(gsv) => {
                self.merge_satellites(gsv);
                SentenceEffect {
                    position_updated: false,
                }
            }
            NMEAMessage::Other { .. } => SentenceEffect {
                position_updated: false,
            },
        }
    }

    fn merge_fix_info(&mut self, gsa: &GsaData) {
        let Some(fix_type) = gsa.fix_type else {
            return;
        };

        let fix_info = FixInfo {
            constellation: gsa.constellation,
            fix_type,
            auto_mode: gsa.auto_mode,
            satellites_used: gsa.satellites_used,
        };

        if let Some(existing) = self
            .fix_info
            .iter_mut()
            .find(|info| info.constellation == gsa.constellation)
        {
            *existing = fix_info;
        } else if self.fix_info.push(fix_info).is_err() {
            log_debug!("nmea: no free fix info slot");
            return;
        }

        self.pdop = gsa.dop.pdop;
        self.hdop = gsa.dop.hdop;
        self.vdop = gsa.dop.vdop;
    }

    fn merge_satellites(&mut self, gsv: &GsvData) {
        let Some(constellation) = gsv.constellation else {
            return;
        };

        let index = match self
            .sat_info
            .iter()
            .position(|view| view.constellation == constellation)
        {
            Some(index) => index,
            None => {
                let view = SatellitesInView {
                    constellation,
                    satellites: Vec::new(),
                };
                if self.sat_info.push(view).is_err() {
                    return;
                }
                self.sat_info.len() - 1
            }
        };

        let view = &mut self.sat_info[index];
        if gsv.sentence_number == 1 {
            view.satellites.clear();
        }
        for satellite in gsv.satellites.iter() {
            if view.satellites.push(*satellite).is_err() {
                break;
            }
        }
    }

    pub fn fix_info_for(&self, constellation: Constellation) -> Option<&FixInfo> {
        self.fix_info
            .iter()
            .find(|info| info.constellation == constellation)
    }

    pub fn satellites_in_view(&self, constellation: Constellation) -> &[SatelliteInfo] {
        self.sat_info
            .iter()
            .find(|view| view.constellation == constellation)
            .map(|view| view.satellites.as_slice())
            .unwrap_or(&[])
    }

    pub fn total_satellites_in_view(&self) -> usize {
        self.sat_info.iter().map(|view| view.satellites.len()).sum()
    }

    pub fn total_satellites_tracked(&self) -> usize {
        self.sat_info.iter().map(|view| view.tracked()).sum()
    }

    pub fn total_satellites_used(&self) -> usize {
        self.fix_info
            .iter()
            .filter(|info| info.constellation != Constellation::Invalid)
            .map(|info| info.satellites_used as usize)
            .sum()
    }
}

impl core::fmt::Display for TelemetrySnapshot {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "TelemetrySnapshot {{ lat: {}, lon: {}, altitude: {}, pos_valid: {}, speed: {}, heading: {}, speed_heading_valid: {}, satellites: {}/{}/{} }}",
            self.lat,
            self.lon,
            self.altitude,
            self.pos_valid,
            self.speed,
            self.heading,
            self.speed_heading_valid,
            self.total_satellites_used(),
            self.total_satellites_tracked(),
            self.total_satellites_in_view(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sentence;
    use crate::NmeaError;

    #[test]
    fn gga_then_rmc() {
        let mut snapshot = TelemetrySnapshot::new();
        let effect = snapshot
            .update(&sentence(
                "GNGGA,120000.00,4912.345,N,01103.456,E,1,08,1.0,100.0,M,,,,",
            ))
            .unwrap();
        assert!(effect.position_updated);
        snapshot
            .update(&sentence(
                "GNRMC,120000.00,A,4912.345,N,01103.456,E,5.0,90.0,010123,,,A",
            ))
            .unwrap();

        assert!(snapshot.pos_valid);
        assert!((snapshot.altitude - 100.0).abs() < 1e-3);
        assert!((snapshot.speed - 2.57).abs() < 0.01);
        assert_eq!(snapshot.heading, 90.0);
        assert!(snapshot.speed_heading_valid);
        assert!(snapshot.datetime_valid);
        assert_eq!(snapshot.datetime.year, 2023);
    }

    #[test]
    fn lost_fix_keeps_last_position() {
        let mut snapshot = TelemetrySnapshot::new();
        snapshot
            .update(&sentence(
                "GNGGA,120000.00,4912.345,N,01103.456,E,1,08,1.0,100.0,M,,,,",
            ))
            .unwrap();
        snapshot
            .update(&sentence("GNGGA,,,,,,0,,,,,,,,"))
            .unwrap();

        assert!(!snapshot.pos_valid);
        assert!((snapshot.lat - 49.20575).abs() < 1e-5);
        assert!((snapshot.altitude - 100.0).abs() < 1e-3);
    }

    #[test]
    fn bad_sentence_leaves_snapshot_untouched() {
        let mut snapshot = TelemetrySnapshot::new();
        snapshot
            .update(&sentence(
                "GNGGA,120000.00,4912.345,N,01103.456,E,1,08,1.0,100.0,M,,,,",
            ))
            .unwrap();
        let before = snapshot.clone();

        let result = snapshot.update(&sentence(
            "GNGGA,120001.00,4912.400,N,011xx.456,E,1,08,1.0,101.0,M,,,,",
        ));
        assert!(matches!(result, Err(NmeaError::MalformedField { .. })));
        assert_eq!(snapshot, before);

        let mut corrupted = sentence("GNGGA,,,,,,0,,,,,,,,");
        corrupted.insert(3, 'X');
        assert!(snapshot.update(&corrupted).is_err());
        assert_eq!(snapshot, before);
    }

    #[test]
    fn invalid_rmc_clears_flags() {
        let mut snapshot = TelemetrySnapshot::new();
        snapshot
            .update(&sentence(
                "GNRMC,120000.00,A,4912.345,N,01103.456,E,5.0,90.0,010123,,,A",
            ))
            .unwrap();
        snapshot
            .update(&sentence("GNRMC,120001.00,V,,,,,,,010123,,,N"))
            .unwrap();
        assert!(!snapshot.speed_heading_valid);
        assert!(!snapshot.datetime_valid);
        assert_eq!(snapshot.heading, 90.0);
    }

    #[test]
    fn out_of_range_datetime_is_not_valid() {
        let mut snapshot = TelemetrySnapshot::new();
        snapshot
            .update(&sentence("GNRMC,120000.00,A,,,,,1.0,10.0,011323,,,A"))
            .unwrap();
        assert!(snapshot.speed_heading_valid);
        assert!(!snapshot.datetime_valid);
        assert_eq!(snapshot.datetime, DateTime::default());
    }

    #[test]
    fn fix_info_slots() {
        let mut snapshot = TelemetrySnapshot::new();
        snapshot
            .update(&sentence("GNGSA,A,3,05,07,13,,,,,,,,,,1.8,1.0,1.5,1"))
            .unwrap();
        snapshot
            .update(&sentence("GNGSA,A,2,65,66,,,,,,,,,,,2.5,2.0,1.9,2"))
            .unwrap();
        // update in place
        snapshot
            .update(&sentence("GNGSA,A,3,05,07,13,15,,,,,,,,,1.6,0.9,1.3,1"))
            .unwrap();

        assert_eq!(snapshot.fix_info.len(), 2);
        let gps = snapshot.fix_info_for(Constellation::Gps).unwrap();
        assert_eq!(gps.satellites_used, 4);
        assert_eq!(gps.fix_type, FixType::Fix3D);
        let glonass = snapshot.fix_info_for(Constellation::Glonass).unwrap();
        assert_eq!(glonass.fix_type, FixType::Fix2D);
        assert_eq!(snapshot.total_satellites_used(), 6);
        assert_eq!(snapshot.hdop, 0.9);

        // no fix type: discarded
        snapshot
            .update(&sentence("GNGSA,A,,,,,,,,,,,,,,9.9,9.9,9.9,3"))
            .unwrap();
        assert_eq!(snapshot.fix_info.len(), 2);
        assert_eq!(snapshot.hdop, 0.9);
    }

    #[test]
    fn fix_info_full_drops_new_constellations() {
        let mut snapshot = TelemetrySnapshot::new();
        for system_id in 1..=NUM_FIX_INFO {
            let body = std::format!("GNGSA,A,3,01,,,,,,,,,,,,1.0,1.0,1.0,{}", system_id);
            snapshot.update(&sentence(&body)).unwrap();
        }
        snapshot
            .update(&sentence("GNGSA,A,3,01,02,,,,,,,,,,,5.0,5.0,5.0,6"))
            .unwrap();

        assert_eq!(snapshot.fix_info.len(), NUM_FIX_INFO);
        assert!(snapshot.fix_info_for(Constellation::NavIC).is_none());
        assert_eq!(snapshot.pdop, 1.0);
    }

    #[test]
    fn satellite_list_restarts_with_first_sentence() {
        let mut snapshot = TelemetrySnapshot::new();
        snapshot
            .update(&sentence("GPGSV,2,1,06,01,40,083,46,02,17,308,,03,07,344,39,04,22,228,45"))
            .unwrap();
        snapshot
            .update(&sentence("GPGSV,2,2,06,05,40,083,41,06,17,308,"))
            .unwrap();
        assert_eq!(snapshot.satellites_in_view(Constellation::Gps).len(), 6);
        assert_eq!(snapshot.total_satellites_tracked(), 4);

        snapshot
            .update(&sentence("GPGSV,1,1,01,07,40,083,30"))
            .unwrap();
        assert_eq!(snapshot.satellites_in_view(Constellation::Gps).len(), 1);
        assert!(snapshot.satellites_in_view(Constellation::Glonass).is_empty());
    }

    #[test]
    fn satellite_list_is_capped() {
        let mut snapshot = TelemetrySnapshot::new();
        for sentence_number in 1..=6u8 {
            let first_id = sentence_number * 4;
            let body = std::format!(
                "GLGSV,6,{},24,{},10,010,20,{},10,010,20,{},10,010,20,{},10,010,20",
                sentence_number,
                first_id,
                first_id + 1,
                first_id + 2,
                first_id + 3
            );
            snapshot.update(&sentence(&body)).unwrap();
        }
        assert_eq!(
            snapshot.satellites_in_view(Constellation::Glonass).len(),
            NUM_SAT_INFO
        );
    }
}
