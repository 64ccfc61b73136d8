use libm::fabsf;
use tiny_nmea::TelemetrySnapshot;

use crate::common::geo::great_circle_distance_m;

/// Minimum gap between a weather report and any other transmission.
pub const WX_GUARD_INTERVAL_MS: u64 = 20_000;

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    pub min_tx_interval_ms: u64,
    pub max_tx_interval_ms: u64,
    pub max_distance_m: f32,
    pub max_heading_delta_deg: f32,
    /// m/s, heading changes are ignored below this speed
    pub heading_check_min_speed: f32,
    /// `None` disables weather reports.
    pub wx_interval_ms: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_tx_interval_ms: 15_000,
            max_tx_interval_ms: 15 * 60_000,
            max_distance_m: 1000.0,
            max_heading_delta_deg: 30.0,
            heading_check_min_speed: 1.0,
            wx_interval_ms: Some(30 * 60_000),
        }
    }
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchedulerState {
    pub last_tx_lat: f32,
    pub last_tx_lon: f32,
    pub last_tx_heading: f32,
    pub last_tx_time: Option<u64>,
    pub last_wx_time: Option<u64>,
    /// Set by `force_tx`, cleared once a position goes out.
    pub tx_forced: bool,
    pub tx_counter: u32,
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxReason {
    MaxInterval,
    HeadingChange,
    Distance,
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxDecision {
    /// Nothing to send this tick.
    Hold,
    /// First weather slot since boot, the timer starts now.
    WeatherTimerArmed,
    WeatherReport { frame_id: u32 },
    Position { frame_id: u32, reason: TxReason },
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxRefusal {
    /// Too soon after the previous transmission.
    Busy,
    InvalidPosition,
}

/// Decides once per tick whether a position or weather report goes out.
pub struct TxScheduler {
    config: SchedulerConfig,
    state: SchedulerState,
}

impl TxScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            state: SchedulerState::default(),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    pub fn tick(
        &mut self,
        snapshot: &TelemetrySnapshot,
        now_ms: u64,
    ) -> Result<TxDecision, TxRefusal> {
        let since_tx = elapsed(self.state.last_tx_time, now_ms);

        if let Some(wx_interval_ms) = self
            .config
            .wx_interval_ms
            .filter(|_| !self.state.tx_forced)
        {
            let since_wx = elapsed(self.state.last_wx_time, now_ms);
            if since_tx > WX_GUARD_INTERVAL_MS && since_wx > wx_interval_ms {
                let armed = self.state.last_wx_time.is_some();
                self.state.last_wx_time = Some(now_ms);
                return Ok(if armed {
                    log_info!("tracker: weather report due");
                    TxDecision::WeatherReport {
                        frame_id: self.state.tx_counter,
                    }
                } else {
                    TxDecision::WeatherTimerArmed
                });
            }
        }

        if self.state.last_tx_time.is_some()
            && self.state.last_wx_time.is_some()
            && elapsed(self.state.last_wx_time, now_ms) < WX_GUARD_INTERVAL_MS
        {
            return Err(TxRefusal::Busy);
        }

        if !snapshot.pos_valid {
            return Err(TxRefusal::InvalidPosition);
        }

        if since_tx < self.config.min_tx_interval_ms {
            return Err(TxRefusal::Busy);
        }

        let Some(reason) = self.tx_reason(snapshot, since_tx) else {
            return Ok(TxDecision::Hold);
        };

        if snapshot.speed_heading_valid {
            self.state.last_tx_heading = snapshot.heading;
        }
        self.state.last_tx_lat = snapshot.lat;
        self.state.last_tx_lon = snapshot.lon;
        self.state.last_tx_time = Some(now_ms);
        self.state.tx_forced = false;
        self.state.tx_counter = self.state.tx_counter.wrapping_add(1);

        Ok(TxDecision::Position {
            frame_id: self.state.tx_counter,
            reason,
        })
    }

    fn tx_reason(&self, snapshot: &TelemetrySnapshot, since_tx: u64) -> Option<TxReason> {
        if since_tx > self.config.max_tx_interval_ms {
            log_info!("tracker: forced tx after {} ms idle", since_tx);
            return Some(TxReason::MaxInterval);
        }

        if snapshot.speed_heading_valid && snapshot.speed >= self.config.heading_check_min_speed {
            let delta = heading_delta(snapshot.heading, self.state.last_tx_heading);
            if delta >= self.config.max_heading_delta_deg {
                log_info!(
                    "tracker: heading changed too much: was: {}, is: {}, delta: {}",
                    self.state.last_tx_heading,
                    snapshot.heading,
                    delta
                );
                return Some(TxReason::HeadingChange);
            }
        }

        let distance = great_circle_distance_m(
            snapshot.lat,
            snapshot.lon,
            self.state.last_tx_lat,
            self.state.last_tx_lon,
        );
        if distance >= self.config.max_distance_m {
            log_info!("tracker: distance since last TX too high: {} m", distance);
            return Some(TxReason::Distance);
        }

        None
    }

    /// Makes the next tick transmit as soon as the position is valid.
    /// The weather timer keeps running.
    pub fn force_tx(&mut self) {
        self.state.last_tx_time = None;
        self.state.tx_forced = true;
    }

    /// Puts back the state from before a tick whose frame never went out.
    pub(crate) fn restore_state(&mut self, state: SchedulerState) {
        self.state = state;
    }

    pub fn tx_counter(&self) -> u32 {
        self.state.tx_counter
    }

    pub fn reset_tx_counter(&mut self) {
        self.state.tx_counter = 0;
    }
}

fn elapsed(since: Option<u64>, now_ms: u64) -> u64 {
    match since {
        Some(since) => now_ms.saturating_sub(since),
        None => u64::MAX,
    }
}

/// Absolute heading change in degrees, 0 to 180.
fn heading_delta(heading: f32, last_heading: f32) -> f32 {
    let mut delta = heading - last_heading;
    if delta < -180.0 {
        delta += 360.0;
    } else if delta > 180.0 {
        delta -= 360.0;
    }
    fabsf(delta)
}
