//! Black-76 pricing for European options on futures, with strike sensitivity
//! curves for charting.
//!
//! - `models`: closed-form price and Greeks (`Black76`)
//! - `curve`: price/Greek series over a strike ladder
//! - `session`: calculate / select-metric entry points over a cached curve
//! - `server`: HTTP + WebSocket boundary

pub mod boundary;
pub mod config;
pub mod curve;
pub mod errors;
pub mod models;
pub mod server;
pub mod session;
pub mod state;
