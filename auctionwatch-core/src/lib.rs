//! AuctionWatch Realtime Client Core
//!
//! This crate provides the realtime layer of the AuctionWatch client:
//! a persistent, auto-recovering WebSocket connection to the auction
//! tracker backend, live connection state and latest-message observation,
//! and best-effort outbound sends.

pub mod config;
pub mod connection;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod retry;
pub mod transport;

pub fn version() -> &'static str {
    "0.1.0"
}
