/// Monotonic milliseconds since boot.
pub trait Clock: Clone {
    fn now_ms(&self) -> u64;
}

impl<T: Clock> Clock for &T {
    fn now_ms(&self) -> u64 {
        (*self).now_ms()
    }
}
