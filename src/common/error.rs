// src/common/error.rs

use super::types::{FieldValueError, SensorField};

/// Frame-local decode failures.
///
/// Every variant is recoverable: the frame is dropped, previously held
/// readings stay untouched and the link keeps polling.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// Text after `!` is not a non-negative base-10 integer.
    #[error("Malformed checksum")]
    ChecksumMalformed,

    /// Supplied checksum does not match the one computed over the payload.
    /// `received` is `None` when the digits do not fit in a byte.
    #[error("Checksum mismatch: received {received:?}, calculated {calculated}")]
    ChecksumMismatch { received: Option<u8>, calculated: u8 },

    /// Payload does not split into exactly five fields.
    #[error("Expected {expected} fields, found {found}")]
    FieldCountMismatch { expected: usize, found: usize },

    /// A field is neither its sentinel nor a valid number of its kind.
    #[error("Invalid value for {field}: {reason}")]
    ValueParseError { field: SensorField, reason: FieldValueError },

    /// Line exceeded the reassembly buffer before its terminator arrived.
    #[error("Line exceeds {capacity} bytes")]
    LineTooLong { capacity: usize },

    /// Line bytes are not valid UTF-8.
    #[error("Line is not valid UTF-8")]
    InvalidUtf8,

    /// Command subject is empty or contains a framing character.
    #[error("Invalid command subject")]
    InvalidSubject,

    /// Outbound command does not fit the encode buffer.
    #[error("Command exceeds {capacity} bytes")]
    CommandTooLong { capacity: usize },
}

impl From<core::str::Utf8Error> for FrameError {
    fn from(_: core::str::Utf8Error) -> Self {
        FrameError::InvalidUtf8
    }
}

/// Errors raised by the link against its transport.
#[derive(Debug, thiserror::Error)]
pub enum LinkError<E = ()>
where
    E: core::fmt::Debug,
{
    /// The transport could not be opened. The link is now erroring for good.
    #[error("Transport open failed: {0:?}")]
    TransportOpen(E),

    /// Underlying read error from the transport.
    #[error("I/O error: {0:?}")]
    Io(E),

    /// Writing an outbound command failed. The dispatcher baseline is unchanged.
    #[error("Write failed: {0:?}")]
    Write(E),

    /// Outbound command could not be encoded.
    #[error("Encode failed: {0}")]
    Encode(FrameError),

    /// Poll was called on a link that was never opened.
    #[error("Link not connected")]
    NotConnected,

    /// Open was attempted on a link that already went through it.
    #[error("Link already opened")]
    AlreadyOpened,
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_error_messages() {
        let err = FrameError::ValueParseError {
            field: SensorField::Dht11Temperature,
            reason: FieldValueError::InvalidFloat,
        };
        assert_eq!(err.to_string(), "Invalid value for dht11_temperature: not a number");
        assert_eq!(
            FrameError::FieldCountMismatch { expected: 5, found: 6 }.to_string(),
            "Expected 5 fields, found 6"
        );
    }

    #[test]
    fn test_link_error_wraps_transport_error() {
        #[derive(Debug)]
        struct PortGone;
        let err: LinkError<PortGone> = LinkError::TransportOpen(PortGone);
        assert_eq!(err.to_string(), "Transport open failed: PortGone");
    }
}
