// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod band;
pub mod checksum;
pub mod config;
pub mod error;
pub mod frame;
pub mod hal_traits;
pub mod timing;
pub mod types;

// --- Re-export key types/traits/functions for easier access ---

// From band.rs
pub use band::{classify, AlertBand, Classification, Thresholds};

// From config.rs
pub use config::{ConfigError, LinkConfig};

// From error.rs
pub use error::{FrameError, LinkError};

// From frame.rs
pub use frame::{
    decode_line, decode_readings, encode_command, EncodedCommand, OutboundCommand, SensorFrame,
    SensorReadings, Subject,
};

// From hal_traits.rs
pub use hal_traits::Transport;

// From types.rs
pub use types::{decode_field, FieldKind, FieldValueError, Reading, SensorField};

// timing.rs and checksum.rs are reached through their module paths,
// e.g. common::checksum::compute or common::timing::POLL_INTERVAL.
