pub mod geo;
pub mod rx_history;
