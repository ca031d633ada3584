// src/common/frame.rs

//! Line framing for the telemetry link.
//!
//! Inbound (peer -> host), one line per sample set:
//!
//! ```text
//! <pot>,<tDHT11>,<hDHT11>,<tDHT22>,<hDHT22>[!<crc8>]\r\n
//! ```
//!
//! Outbound (host -> peer):
//!
//! ```text
//! <subject>=<action>!<crc8>\n
//! ```
//!
//! `<crc8>` is the decimal rendering of [`checksum::compute`] over everything
//! before the `!`.

use core::fmt::Write;

use arrayvec::ArrayString;

use super::checksum;
use super::error::FrameError;
use super::types::{decode_field, Reading, SensorField};

/// Separates payload from checksum.
pub const CHECKSUM_DELIMITER: char = '!';
/// Separates fields within an inbound payload.
pub const FIELD_DELIMITER: char = ',';
/// Separates subject from action in an outbound command.
pub const ACTION_DELIMITER: char = '=';
/// Terminates an outbound command; the peer's frame boundary.
pub const COMMAND_TERMINATOR: char = '\n';

/// Longest subject the encoder accepts.
pub const MAX_SUBJECT_LEN: usize = 16;
/// Subject + `=` + action (3) + `!` + crc (3) + `\n`, rounded up.
pub const MAX_COMMAND_LEN: usize = 32;

/// Owned command subject.
pub type Subject = heapless::String<MAX_SUBJECT_LEN>;
/// Encoded outbound command line.
pub type EncodedCommand = ArrayString<MAX_COMMAND_LEN>;

// --- Inbound ---

/// Checksum-validated field set borrowed from one inbound line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorFrame<'a> {
    fields: [&'a str; SensorField::COUNT],
    checksum_text: Option<&'a str>,
    checksum: u8,
}

impl<'a> SensorFrame<'a> {
    #[inline]
    pub fn field(&self, field: SensorField) -> &'a str {
        self.fields[field.index()]
    }

    #[inline]
    pub fn fields(&self) -> &[&'a str; SensorField::COUNT] {
        &self.fields
    }

    /// Checksum text as received, `None` when the line had no `!`.
    #[inline]
    pub fn checksum_text(&self) -> Option<&'a str> {
        self.checksum_text
    }

    #[inline]
    pub fn checksum_supplied(&self) -> bool {
        self.checksum_text.is_some()
    }

    /// Checksum of the payload. Synthesized locally when none was supplied.
    #[inline]
    pub fn checksum(&self) -> u8 {
        self.checksum
    }

    /// Runs every field through the value decoder.
    ///
    /// Fails on the first field that is neither its sentinel nor a valid
    /// number, naming that field.
    pub fn decode(&self) -> Result<SensorReadings, FrameError> {
        let mut values = [Reading::NoData; SensorField::COUNT];
        for field in SensorField::ALL {
            values[field.index()] = decode_field(self.field(field), field.kind())
                .map_err(|reason| FrameError::ValueParseError { field, reason })?;
        }
        Ok(SensorReadings { values })
    }
}

/// Typed readings of one successfully decoded frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SensorReadings {
    values: [Reading; SensorField::COUNT],
}

impl SensorReadings {
    #[inline]
    pub fn get(&self, field: SensorField) -> Reading {
        self.values[field.index()]
    }

    pub fn pot_raw(&self) -> Reading {
        self.get(SensorField::PotRaw)
    }

    pub fn dht11_temperature(&self) -> Reading {
        self.get(SensorField::Dht11Temperature)
    }

    pub fn dht11_humidity(&self) -> Reading {
        self.get(SensorField::Dht11Humidity)
    }

    pub fn dht22_temperature(&self) -> Reading {
        self.get(SensorField::Dht22Temperature)
    }

    pub fn dht22_humidity(&self) -> Reading {
        self.get(SensorField::Dht22Humidity)
    }

    /// `(field, reading)` pairs in wire order.
    pub fn iter(&self) -> impl Iterator<Item = (SensorField, Reading)> + '_ {
        SensorField::ALL.into_iter().map(move |f| (f, self.get(f)))
    }
}

/// Parses one inbound line into a checksum-validated [`SensorFrame`].
///
/// Trailing `\r`/`\n` are stripped. The line is split at the *first* `!`.
/// Without a `!` the payload is trusted and a checksum is computed locally
/// so downstream code sees a uniform frame.
pub fn decode_line(line: &str) -> Result<SensorFrame<'_>, FrameError> {
    let line = line.trim_end_matches(['\r', '\n']);

    let (payload, checksum_text) = match line.split_once(CHECKSUM_DELIMITER) {
        Some((payload, text)) => (payload, Some(text)),
        None => (line, None),
    };

    let calculated = checksum::compute(payload.as_bytes());
    if let Some(text) = checksum_text {
        let received = parse_checksum(text)?;
        if !received.is_some_and(|r| checksum::verify(payload.as_bytes(), r)) {
            return Err(FrameError::ChecksumMismatch { received, calculated });
        }
    }

    let mut fields = [""; SensorField::COUNT];
    let mut found = 0;
    for field in payload.split(FIELD_DELIMITER) {
        if let Some(slot) = fields.get_mut(found) {
            *slot = field;
        }
        found += 1;
    }
    if found != SensorField::COUNT {
        return Err(FrameError::FieldCountMismatch { expected: SensorField::COUNT, found });
    }

    Ok(SensorFrame { fields, checksum_text, checksum: calculated })
}

/// Decodes a line straight to typed readings.
pub fn decode_readings(line: &str) -> Result<SensorReadings, FrameError> {
    decode_line(line)?.decode()
}

// Digits only. `Ok(None)` when the digits overflow a byte: well-formed, but can never match.
fn parse_checksum(text: &str) -> Result<Option<u8>, FrameError> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FrameError::ChecksumMalformed);
    }
    Ok(text.parse::<u8>().ok())
}

// --- Outbound ---

/// A subject/action pair stamped with its checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundCommand {
    subject: Subject,
    action: u8,
    checksum: u8,
}

impl OutboundCommand {
    /// Builds a command, computing its checksum over `subject=action`.
    pub fn new(subject: &str, action: u8) -> Result<Self, FrameError> {
        validate_subject(subject)?;
        let subject = Subject::try_from(subject)
            .map_err(|_| FrameError::CommandTooLong { capacity: MAX_SUBJECT_LEN })?;

        let mut body = EncodedCommand::new();
        write!(body, "{}{}{}", subject, ACTION_DELIMITER, action)
            .map_err(|_| FrameError::CommandTooLong { capacity: MAX_COMMAND_LEN })?;
        let checksum = checksum::compute(body.as_bytes());

        Ok(Self { subject, action, checksum })
    }

    #[inline]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[inline]
    pub fn action(&self) -> u8 {
        self.action
    }

    #[inline]
    pub fn checksum(&self) -> u8 {
        self.checksum
    }

    /// Serializes to `subject=action!crc\n`.
    pub fn encode(&self) -> Result<EncodedCommand, FrameError> {
        let mut line = EncodedCommand::new();
        write!(
            line,
            "{}{}{}{}{}{}",
            self.subject, ACTION_DELIMITER, self.action, CHECKSUM_DELIMITER, self.checksum, COMMAND_TERMINATOR
        )
        .map_err(|_| FrameError::CommandTooLong { capacity: MAX_COMMAND_LEN })?;
        Ok(line)
    }
}

/// Formats `"{subject}={action}!{checksum}\n"`.
pub fn encode_command(subject: &str, action: u8) -> Result<EncodedCommand, FrameError> {
    OutboundCommand::new(subject, action)?.encode()
}

fn validate_subject(subject: &str) -> Result<(), FrameError> {
    let framing = |c: char| {
        c == ACTION_DELIMITER || c == CHECKSUM_DELIMITER || c == FIELD_DELIMITER || c.is_control()
    };
    if subject.is_empty() || subject.chars().any(framing) {
        return Err(FrameError::InvalidSubject);
    }
    Ok(())
}
