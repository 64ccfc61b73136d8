use heapless::{Deque, String, Vec};
use tiny_aprs::{parse_frame, DecodeError, DecodedFrame, MAX_FRAME_LEN};

use crate::driver::radio::RadioReceiveInfo;

#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedFrame {
    pub frame: DecodedFrame,
    /// ms, clock time the frame was received
    pub rx_time: u64,
    pub rssi: i16,
    pub snr: i16,
}

/// The last `N` frames heard on air, newest first.
pub struct RxHistory<const N: usize> {
    frames: Deque<ReceivedFrame, N>,
    last_error: Option<String<128>>,
    last_undecodable: Vec<u8, MAX_FRAME_LEN>,
    received_count: u32,
    error_count: u32,
}

impl<const N: usize> RxHistory<N> {
    pub fn new() -> Self {
        Self {
            frames: Deque::new(),
            last_error: None,
            last_undecodable: Vec::new(),
            received_count: 0,
            error_count: 0,
        }
    }

    /// Decodes `data` and keeps it. Frames that fail to decode are stored raw
    /// together with the error message.
    pub fn receive(
        &mut self,
        data: &[u8],
        info: RadioReceiveInfo,
        now_ms: u64,
    ) -> Result<ReceivedFrame, DecodeError> {
        self.received_count = self.received_count.wrapping_add(1);

        let frame = match parse_frame(data) {
            Ok(frame) => frame,
            Err(e) => {
                log_warn!("rx: can't decode frame: {}", e.message().as_str());
                self.error_count = self.error_count.wrapping_add(1);
                self.last_error = Some(e.message());
                self.last_undecodable.clear();
                let len = data.len().min(MAX_FRAME_LEN);
                self.last_undecodable.extend_from_slice(&data[..len]).ok();
                return Err(e);
            }
        };
        log_info!(
            "rx: {} (rssi {}, snr {})",
            frame.source.as_str(),
            info.rssi,
            info.snr
        );

        let received = ReceivedFrame {
            frame,
            rx_time: now_ms,
            rssi: info.rssi,
            snr: info.snr,
        };
        if self.frames.is_full() {
            self.frames.pop_back();
        }
        self.frames.push_front(received.clone()).ok();

        Ok(received)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReceivedFrame> {
        self.frames.iter()
    }

    pub fn latest(&self) -> Option<&ReceivedFrame> {
        self.frames.front()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_ref().map(|message| message.as_str())
    }

    pub fn last_undecodable(&self) -> &[u8] {
        &self.last_undecodable
    }

    pub fn received_count(&self) -> u32 {
        self.received_count
    }

    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl<const N: usize> Default for RxHistory<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiny_aprs::FRAME_LEAD_IN;

    fn frame(text: &str) -> std::vec::Vec<u8> {
        let mut bytes = FRAME_LEAD_IN.to_vec();
        bytes.extend_from_slice(text.as_bytes());
        bytes
    }

    fn info(rssi: i16) -> RadioReceiveInfo {
        RadioReceiveInfo {
            rssi,
            snr: 7,
            len: 0,
        }
    }

    #[test]
    fn newest_first_and_bounded() {
        let mut history = RxHistory::<2>::new();
        for (i, call) in ["AA1AA", "BB2BB", "CC3CC"].iter().enumerate() {
            let text = std::format!("{}>APRS:!4912.34N/01103.45E>", call);
            history
                .receive(&frame(&text), info(-100 + i as i16), i as u64 * 1000)
                .unwrap();
        }

        assert_eq!(history.len(), 2);
        let calls: std::vec::Vec<&str> = history.iter().map(|rx| rx.frame.source.as_str()).collect();
        assert_eq!(calls, ["CC3CC", "BB2BB"]);
        let latest = history.latest().unwrap();
        assert_eq!(latest.rx_time, 2000);
        assert_eq!(latest.rssi, -98);
        assert_eq!(history.received_count(), 3);
    }

    #[test]
    fn undecodable_frame_is_kept() {
        let mut history = RxHistory::<4>::new();
        let bad = frame("N0CALL>APRS:>status");
        assert_eq!(
            history.receive(&bad, info(-90), 0).unwrap_err(),
            DecodeError::UnknownMessageType('>')
        );

        assert!(history.is_empty());
        assert_eq!(history.last_error(), Some("Unknown message type: '>'"));
        assert_eq!(history.last_undecodable(), bad.as_slice());
        assert_eq!(history.error_count(), 1);

        history.clear();
        assert_eq!(history.last_error(), None);
    }

    #[test]
    fn counters_wrap() {
        let mut history = RxHistory::<1>::new();
        history.received_count = u32::MAX;
        history.error_count = u32::MAX;

        let received = history
            .receive(&frame("AA1AA>APRS:!4912.34N/01103.45E>"), info(-80), 5)
            .unwrap();
        assert_eq!(received.frame.source.as_str(), "AA1AA");
        assert_eq!(history.latest(), Some(&received));
        assert_eq!(history.received_count(), 0);

        assert!(history.receive(&frame("AA1AA>APRS:>x"), info(-80), 6).is_err());
        assert_eq!(history.received_count(), 1);
        assert_eq!(history.error_count(), 0);
    }
}
