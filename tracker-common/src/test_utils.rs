use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::vec::Vec;

use tiny_nmea::TelemetrySnapshot;

use crate::driver::clock::Clock;
use crate::driver::radio::RadioTx;
use crate::driver::weather::{WeatherReading, WeatherSensor};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Clone)]
pub struct ManualClock(Rc<Cell<u64>>);

impl ManualClock {
    pub fn new(now_ms: u64) -> Self {
        Self(Rc::new(Cell::new(now_ms)))
    }

    pub fn set(&self, now_ms: u64) {
        self.0.set(now_ms);
    }

    pub fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }
}

#[derive(Clone, Default)]
pub struct MemoryRadio {
    pub sent: Rc<RefCell<Vec<Vec<u8>>>>,
    pub busy: Rc<Cell<bool>>,
}

impl MemoryRadio {
    pub fn sent_count(&self) -> usize {
        self.sent.borrow().len()
    }

    pub fn last_sent(&self) -> Option<Vec<u8>> {
        self.sent.borrow().last().cloned()
    }
}

impl RadioTx for MemoryRadio {
    fn send(&mut self, payload: &[u8]) {
        self.sent.borrow_mut().push(payload.to_vec());
    }

    fn is_busy(&self) -> bool {
        self.busy.get()
    }
}

pub struct FixedWeather(pub WeatherReading);

impl WeatherSensor for FixedWeather {
    fn read(&mut self) -> Option<WeatherReading> {
        Some(self.0)
    }
}

pub fn snapshot_at(lat: f32, lon: f32, heading: f32, speed: f32) -> TelemetrySnapshot {
    TelemetrySnapshot {
        lat,
        lon,
        altitude: 100.0,
        pos_valid: true,
        speed,
        heading,
        speed_heading_valid: true,
        ..Default::default()
    }
}
