// src/link/line_buffer.rs

use crate::common::error::FrameError;

/// Longest inbound line the link reassembles, not counting `\r\n` or `\n`.
pub const LINE_CAPACITY: usize = 128;

// Room for a full line plus the `\r` of a CRLF terminator.
const RAW_CAPACITY: usize = LINE_CAPACITY + 1;

/// One reassembled inbound line, `\n` and a trailing `\r` stripped.
pub type Line = heapless::String<LINE_CAPACITY>;

/// Reassembles `\n`-terminated lines from a byte stream.
///
/// A line that outgrows [`LINE_CAPACITY`] is reported once and then
/// discarded up to and including its terminator; the next line starts clean.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: heapless::Vec<u8, RAW_CAPACITY>,
    overflowed: bool,
}

impl LineBuffer {
    pub const fn new() -> Self {
        Self { buf: heapless::Vec::new(), overflowed: false }
    }

    /// Feeds one byte.
    ///
    /// Returns `Some(Ok(line))` when `byte` completes a line,
    /// `Some(Err(_))` when the pending line overflowed or is not UTF-8,
    /// and `None` otherwise.
    pub fn push(&mut self, byte: u8) -> Option<Result<Line, FrameError>> {
        if byte == b'\n' {
            if core::mem::take(&mut self.overflowed) {
                return None;
            }
            let raw = self.buf.strip_suffix(b"\r").unwrap_or(&self.buf[..]);
            let line = match core::str::from_utf8(raw) {
                Ok(text) => Line::try_from(text).map_err(|_| FrameError::LineTooLong { capacity: LINE_CAPACITY }),
                Err(e) => Err(e.into()),
            };
            self.buf.clear();
            return Some(line);
        }

        if self.overflowed {
            return None;
        }
        if self.buf.push(byte).is_err() {
            self.buf.clear();
            self.overflowed = true;
            return Some(Err(FrameError::LineTooLong { capacity: LINE_CAPACITY }));
        }
        None
    }

    /// Bytes of the line currently being assembled.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.overflowed = false;
    }
}
