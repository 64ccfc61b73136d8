#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransmissionKind {
    Position,
    Weather,
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerEvent {
    TransmissionStarted {
        kind: TransmissionKind,
        frame_id: u32,
    },
}

pub trait TrackerEventPublisher {
    fn publish(&mut self, event: TrackerEvent);
}

impl<F: FnMut(TrackerEvent)> TrackerEventPublisher for F {
    fn publish(&mut self, event: TrackerEvent) {
        self(event)
    }
}
