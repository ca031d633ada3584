// src/lib.rs

#![cfg_attr(not(any(test, feature = "std")), no_std)] // no_std unless std is asked for

pub mod common;
pub mod link;

#[cfg(feature = "serialport")]
pub mod adapters;

// Re-export key types for convenience
pub use common::{Classification, FrameError, LinkConfig, LinkError, Reading, SensorField, Transport};
pub use link::{LinkEvent, LinkState, Snapshot, TelemetryLink};
