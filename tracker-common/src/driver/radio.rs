use core::ops::DerefMut;

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RadioReceiveInfo {
    pub rssi: i16,
    pub snr: i16,
    pub len: u8,
}

/// Transmit side of the LoRa link. `send` only queues the frame, the driver
/// reports completion on its own.
pub trait RadioTx {
    fn send(&mut self, payload: &[u8]);
    fn is_busy(&self) -> bool;
}

impl<T: RadioTx> RadioTx for &mut T {
    fn send(&mut self, payload: &[u8]) {
        self.deref_mut().send(payload)
    }

    fn is_busy(&self) -> bool {
        (**self).is_busy()
    }
}

pub struct DummyRadio {}

impl RadioTx for DummyRadio {
    fn send(&mut self, payload: &[u8]) {
        log_info!("dummy radio: dropping {} bytes", payload.len());
    }

    fn is_busy(&self) -> bool {
        false
    }
}
