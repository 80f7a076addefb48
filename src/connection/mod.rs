//! Connection management for the controlling client
//!
//! This module handles:
//! - Accepting exactly one client session
//! - Decoding inbound frames
//! - Reporting connect/disconnect to the host loop

mod manager;

pub use manager::{ConnectionEvent, ConnectionManager};
