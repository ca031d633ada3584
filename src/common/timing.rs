// src/common/timing.rs

use core::time::Duration;

// === Link Cadence ===

/// Period of the error indicator toggle while the link is erroring.
pub const ERROR_BLINK_PERIOD: Duration = Duration::from_millis(500);
/// Nominal tick of the surrounding scheduler (100 Hz refresh).
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

// === Serial Port ===

/// Baud rate the peer firmware is built for.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;
/// Opening the port resets most boards; give the bootloader time to hand over.
pub const PORT_SETTLE_TIME: Duration = Duration::from_secs(1);
/// Read timeout handed to the OS; reads are only issued when bytes are pending.
pub const PORT_READ_TIMEOUT: Duration = Duration::from_millis(10);
