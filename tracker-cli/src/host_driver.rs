use std::{cell::Cell, rc::Rc, time::Instant};

use log::warn;
use tokio::sync::mpsc;
use tracker_common::driver::{clock::Clock, radio::RadioTx};

#[derive(Clone)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Clock driven by the replayed log instead of wall time.
#[derive(Clone, Default)]
pub struct SimulatedClock(Rc<Cell<u64>>);

impl SimulatedClock {
    pub fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }
}

impl Clock for SimulatedClock {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }
}

/// Hands frames to a writer task. Busy while the previous frame is still queued.
pub struct QueuedRadio {
    tx: Option<mpsc::Sender<Vec<u8>>>,
}

impl QueuedRadio {
    pub fn new(tx: mpsc::Sender<Vec<u8>>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Frames are only printed.
    pub fn disconnected() -> Self {
        Self { tx: None }
    }
}

impl RadioTx for QueuedRadio {
    fn send(&mut self, payload: &[u8]) {
        if let Some(tx) = &self.tx {
            if let Err(e) = tx.try_send(payload.to_vec()) {
                warn!("radio: frame dropped: {}", e);
            }
        }
    }

    fn is_busy(&self) -> bool {
        match &self.tx {
            Some(tx) => tx.capacity() == 0,
            None => false,
        }
    }
}
