#![cfg_attr(not(test), no_std)]
#![allow(async_fn_in_trait)]

mod fmt;

pub mod common;
pub mod driver;
pub mod tracker;

#[cfg(test)]
mod test_utils;

pub use tiny_aprs;
pub use tiny_nmea;
