pub mod clock;
pub mod gps;
pub mod radio;
pub mod weather;
