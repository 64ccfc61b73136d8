use core::fmt::Write as _;

use heapless::String;
use tiny_aprs::{build_frame, AprsIdentity, EncodeError, Frame, PacketKind, Position, WeatherReport};
use tiny_nmea::TelemetrySnapshot;

use crate::driver::{clock::Clock, radio::RadioTx, weather::WeatherSensor};

pub mod scheduler;
pub mod tracker_event;

use scheduler::{SchedulerConfig, TxDecision, TxReason, TxRefusal, TxScheduler};
use tracker_event::{TrackerEvent, TrackerEventPublisher, TransmissionKind};

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerError {
    /// Radio still sending the previous frame, nothing changed.
    RadioBusy,
    /// Too soon after the previous transmission.
    Busy,
    InvalidPosition,
    Encode(EncodeError),
}

impl TrackerError {
    pub fn message(&self) -> String<128> {
        let mut message = String::new();
        write!(message, "{}", self).ok();
        message
    }
}

impl core::fmt::Display for TrackerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TrackerError::RadioBusy => write!(f, "tracker: radio busy"),
            TrackerError::Busy => write!(f, "tracker: too soon since last transmission"),
            TrackerError::InvalidPosition => write!(f, "tracker: no valid position"),
            TrackerError::Encode(e) => write!(f, "tracker: {}", e),
        }
    }
}

impl From<TxRefusal> for TrackerError {
    fn from(refusal: TxRefusal) -> Self {
        match refusal {
            TxRefusal::Busy => TrackerError::Busy,
            TxRefusal::InvalidPosition => TrackerError::InvalidPosition,
        }
    }
}

impl From<EncodeError> for TrackerError {
    fn from(e: EncodeError) -> Self {
        TrackerError::Encode(e)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Idle,
    WeatherTimerArmed,
    /// A weather report was due but there has never been a position to put in it.
    WeatherSkipped,
    Transmitted {
        kind: TransmissionKind,
        frame_id: u32,
        reason: Option<TxReason>,
        frame: Frame,
    },
}

/// Scheduler, encoder and radio glued together. Call [`Tracker::tick`]
/// periodically with the latest snapshot.
pub struct Tracker<C: Clock, R: RadioTx, W: WeatherSensor, P: TrackerEventPublisher> {
    clock: C,
    radio: R,
    weather_sensor: W,
    event_publisher: P,
    identity: AprsIdentity,
    scheduler: TxScheduler,
}

impl<C: Clock, R: RadioTx, W: WeatherSensor, P: TrackerEventPublisher> Tracker<C, R, W, P> {
    pub fn new(
        clock: C,
        radio: R,
        weather_sensor: W,
        event_publisher: P,
        identity: AprsIdentity,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            clock,
            radio,
            weather_sensor,
            event_publisher,
            identity,
            scheduler: TxScheduler::new(config),
        }
    }

    pub fn tick(&mut self, snapshot: &TelemetrySnapshot) -> Result<TickOutcome, TrackerError> {
        if self.radio.is_busy() {
            return Err(TrackerError::RadioBusy);
        }

        let now = self.clock.now_ms();
        let committed = self.scheduler.state().clone();
        let outcome = match self.scheduler.tick(snapshot, now)? {
            TxDecision::Hold => Ok(TickOutcome::Idle),
            TxDecision::WeatherTimerArmed => Ok(TickOutcome::WeatherTimerArmed),
            TxDecision::WeatherReport { frame_id } => self.send_weather(snapshot, frame_id),
            TxDecision::Position { frame_id, reason } => {
                let position = Position {
                    lat: snapshot.lat,
                    lon: snapshot.lon,
                    altitude: snapshot.altitude,
                };
                build_frame(&self.identity, &position, &PacketKind::Position, frame_id)
                    .map_err(TrackerError::from)
                    .and_then(|frame| {
                        self.transmit(TransmissionKind::Position, frame_id, Some(reason), frame)
                    })
            }
        };

        // nothing went out, the frame must not count as sent
        if matches!(outcome, Err(TrackerError::Encode(_))) {
            self.scheduler.restore_state(committed);
        }
        outcome
    }

    fn send_weather(
        &mut self,
        snapshot: &TelemetrySnapshot,
        frame_id: u32,
    ) -> Result<TickOutcome, TrackerError> {
        let position = if snapshot.pos_valid {
            Position {
                lat: snapshot.lat,
                lon: snapshot.lon,
                altitude: snapshot.altitude,
            }
        } else if self.scheduler.state().last_tx_time.is_some() {
            let state = self.scheduler.state();
            Position {
                lat: state.last_tx_lat,
                lon: state.last_tx_lon,
                altitude: 0.0,
            }
        } else {
            log_warn!("tracker: weather report skipped, no position yet");
            return Ok(TickOutcome::WeatherSkipped);
        };

        let report = match self.weather_sensor.read() {
            Some(reading) => reading.into(),
            None => {
                log_warn!("tracker: no weather reading, sending unknowns");
                WeatherReport::default()
            }
        };

        let frame = build_frame(
            &self.identity,
            &position,
            &PacketKind::Weather(report),
            frame_id,
        )?;
        self.transmit(TransmissionKind::Weather, frame_id, None, frame)
    }

    fn transmit(
        &mut self,
        kind: TransmissionKind,
        frame_id: u32,
        reason: Option<TxReason>,
        frame: Frame,
    ) -> Result<TickOutcome, TrackerError> {
        log_info!("tracker: sending {}", frame.text().as_str());
        self.radio.send(frame.as_bytes());
        self.event_publisher
            .publish(TrackerEvent::TransmissionStarted { kind, frame_id });

        Ok(TickOutcome::Transmitted {
            kind,
            frame_id,
            reason,
            frame,
        })
    }

    pub fn force_tx(&mut self) {
        self.scheduler.force_tx();
    }

    pub fn tx_counter(&self) -> u32 {
        self.scheduler.tx_counter()
    }

    pub fn reset_tx_counter(&mut self) {
        self.scheduler.reset_tx_counter();
    }

    pub fn scheduler(&self) -> &TxScheduler {
        &self.scheduler
    }

    pub fn identity(&self) -> &AprsIdentity {
        &self.identity
    }

    pub fn identity_mut(&mut self) -> &mut AprsIdentity {
        &mut self.identity
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::vec::Vec;

    use tiny_aprs::{parse_frame, AprsIcon};
    use tiny_nmea::checksum;

    use super::*;
    use crate::driver::weather::{NoWeatherSensor, WeatherReading};
    use crate::test_utils::{init_logger, snapshot_at, FixedWeather, ManualClock, MemoryRadio};

    fn nmea(body: &str) -> std::string::String {
        std::format!("${}*{:02X}\r\n", body, checksum(body))
    }

    fn identity() -> AprsIdentity {
        let mut identity = AprsIdentity::new("N0CALL-7", "APLT00");
        identity.add_path("WIDE1-1");
        identity.set_icon_default(AprsIcon::Car);
        identity.set_comment(" test");
        identity
    }

    fn no_wx() -> SchedulerConfig {
        SchedulerConfig {
            wx_interval_ms: None,
            ..Default::default()
        }
    }

    #[test]
    fn nmea_to_frame_on_air() {
        init_logger();
        let mut snapshot = TelemetrySnapshot::new();
        snapshot
            .update(&nmea("GNGGA,120000.00,4912.345,N,01103.456,E,1,08,1.0,100.0,M,,,,"))
            .unwrap();
        snapshot
            .update(&nmea("GNRMC,120000.00,A,4912.345,N,01103.456,E,5.0,90.0,010123,,,A"))
            .unwrap();
        assert!(snapshot.pos_valid);
        assert!((snapshot.altitude - 100.0).abs() < 1e-3);
        assert!((snapshot.speed - 2.57).abs() < 0.01);
        assert_eq!(snapshot.heading, 90.0);

        let clock = ManualClock::new(1000);
        let radio = MemoryRadio::default();
        let events = Rc::new(RefCell::new(Vec::<TrackerEvent>::new()));
        let events_sink = events.clone();
        let mut tracker = Tracker::new(
            clock.clone(),
            radio.clone(),
            NoWeatherSensor {},
            move |event: TrackerEvent| events_sink.borrow_mut().push(event),
            identity(),
            no_wx(),
        );

        let outcome = tracker.tick(&snapshot).unwrap();
        let (kind, frame_id, frame) = match outcome {
            TickOutcome::Transmitted {
                kind,
                frame_id,
                frame,
                ..
            } => (kind, frame_id, frame),
            other => panic!("expected a transmission, got {:?}", other),
        };
        assert_eq!(kind, TransmissionKind::Position);
        assert_eq!(frame_id, 1);
        assert!(
            frame.text().contains(":!4912.34N/01103.45E>"),
            "{}",
            frame.text()
        );

        assert_eq!(radio.sent_count(), 1);
        let on_air = radio.last_sent().unwrap();
        assert_eq!(on_air.as_slice(), frame.as_bytes());
        assert_eq!(
            events.borrow().as_slice(),
            &[TrackerEvent::TransmissionStarted {
                kind: TransmissionKind::Position,
                frame_id: 1
            }]
        );

        let decoded = parse_frame(&on_air).unwrap();
        assert_eq!(decoded.source.as_str(), "N0CALL-7");
        assert!((decoded.lat - snapshot.lat).abs() < 2e-5);
        assert!((decoded.lon - snapshot.lon).abs() < 2e-5);
        assert!((decoded.altitude - 100.0).abs() < 0.5);
        assert!(decoded.dao);
        assert!(decoded.comment.contains(" test/A=000328"));
        assert!(decoded.comment.ends_with(" #1"));

        clock.advance(1);
        assert_eq!(tracker.tick(&snapshot), Err(TrackerError::Busy));
        assert_eq!(radio.sent_count(), 1);
    }

    #[test]
    fn busy_radio_changes_nothing() {
        let radio = MemoryRadio::default();
        radio.busy.set(true);
        let mut tracker = Tracker::new(
            ManualClock::new(0),
            radio.clone(),
            NoWeatherSensor {},
            |_: TrackerEvent| {},
            identity(),
            no_wx(),
        );
        let snapshot = snapshot_at(49.2, 11.05, 0.0, 0.0);

        assert_eq!(tracker.tick(&snapshot), Err(TrackerError::RadioBusy));
        assert_eq!(tracker.tx_counter(), 0);
        assert_eq!(tracker.scheduler().state().last_tx_time, None);

        radio.busy.set(false);
        assert!(matches!(
            tracker.tick(&snapshot),
            Ok(TickOutcome::Transmitted { frame_id: 1, .. })
        ));
    }

    #[test]
    fn missing_identity_is_reported() {
        let mut tracker = Tracker::new(
            ManualClock::new(0),
            MemoryRadio::default(),
            NoWeatherSensor {},
            |_: TrackerEvent| {},
            AprsIdentity::default(),
            no_wx(),
        );
        assert_eq!(
            tracker.tick(&snapshot_at(49.2, 11.05, 0.0, 0.0)),
            Err(TrackerError::Encode(EncodeError::MissingAddress))
        );
    }

    #[test]
    fn unencodable_frame_does_not_count_as_sent() {
        let radio = MemoryRadio::default();
        let mut tracker = Tracker::new(
            ManualClock::new(0),
            radio.clone(),
            NoWeatherSensor {},
            |_: TrackerEvent| {},
            AprsIdentity::default(),
            no_wx(),
        );
        let snapshot = snapshot_at(49.2, 11.05, 0.0, 0.0);
        assert!(tracker.tick(&snapshot).is_err());
        assert_eq!(tracker.tx_counter(), 0);
        assert_eq!(tracker.scheduler().state().last_tx_time, None);
        assert_eq!(radio.sent_count(), 0);

        *tracker.identity_mut() = identity();
        assert!(matches!(
            tracker.tick(&snapshot),
            Ok(TickOutcome::Transmitted { frame_id: 1, .. })
        ));
        assert_eq!(radio.sent_count(), 1);
    }

    #[test]
    fn weather_report_goes_out() {
        let clock = ManualClock::new(0);
        let radio = MemoryRadio::default();
        let sensor = FixedWeather(WeatherReading {
            temperature: 22.0,
            humidity: Some(55.0),
            pressure: 101_325.0,
        });
        let config = SchedulerConfig {
            wx_interval_ms: Some(60_000),
            ..Default::default()
        };
        let mut tracker = Tracker::new(
            clock.clone(),
            radio.clone(),
            sensor,
            |_: TrackerEvent| {},
            identity(),
            config,
        );
        let snapshot = snapshot_at(49.20575, 11.0576, 0.0, 0.0);

        assert_eq!(tracker.tick(&snapshot), Ok(TickOutcome::WeatherTimerArmed));
        clock.set(1000);
        tracker.tick(&snapshot).unwrap();
        clock.set(61_000);

        let outcome = tracker.tick(&snapshot).unwrap();
        let (kind, frame_id, frame) = match outcome {
            TickOutcome::Transmitted {
                kind,
                frame_id,
                frame,
                ..
            } => (kind, frame_id, frame),
            other => panic!("expected a weather report, got {:?}", other),
        };
        assert_eq!(kind, TransmissionKind::Weather);
        assert_eq!(frame_id, 1);
        assert!(
            frame
                .text()
                .contains(":!4912.34N/01103.45E_.../...g...t072h55b10133 test #1"),
            "{}",
            frame.text()
        );
        assert_eq!(radio.sent_count(), 2);

        let decoded = parse_frame(frame.as_bytes()).unwrap();
        assert_eq!(decoded.weather.unwrap().humidity, Some(55));
    }

    #[test]
    fn weather_without_any_position_is_skipped() {
        let clock = ManualClock::new(0);
        let radio = MemoryRadio::default();
        let config = SchedulerConfig {
            wx_interval_ms: Some(60_000),
            ..Default::default()
        };
        let mut tracker = Tracker::new(
            clock.clone(),
            radio.clone(),
            NoWeatherSensor {},
            |_: TrackerEvent| {},
            identity(),
            config,
        );
        let mut snapshot = TelemetrySnapshot::new();
        snapshot.update(&nmea("GNGGA,,,,,,0,,,,,,,,")).unwrap();

        assert_eq!(tracker.tick(&snapshot), Ok(TickOutcome::WeatherTimerArmed));
        clock.set(30_000);
        assert_eq!(tracker.tick(&snapshot), Err(TrackerError::InvalidPosition));
        clock.set(61_000);
        assert_eq!(tracker.tick(&snapshot), Ok(TickOutcome::WeatherSkipped));
        assert_eq!(radio.sent_count(), 0);
    }
}
