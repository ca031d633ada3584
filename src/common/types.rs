// src/common/types.rs

use core::fmt;
use core::str::FromStr;

/// Sentinel the peer sends for a raw count it could not read.
pub const RAW_COUNT_SENTINEL: &str = "-1";
/// Sentinel the peer sends for a float measurement it could not read.
pub const FLOAT_SENTINEL: &str = "NAN";

// --- Readings ---

/// A single decoded value from an inbound frame.
///
/// `NoData` is something the peer reported (no sensor attached, failed read),
/// not a decoding failure. Decoding failures never produce a `Reading`.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Reading {
    /// Finite floating point measurement.
    Measurement(f32),
    /// Integer raw count, e.g. an ADC sample.
    RawCount(i32),
    /// The peer had nothing to report for this field.
    NoData,
}

impl Reading {
    #[inline]
    pub fn is_no_data(&self) -> bool {
        matches!(self, Reading::NoData)
    }

    /// Numeric view used for classification. `None` for `NoData`.
    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            Reading::Measurement(v) => Some(v),
            Reading::RawCount(c) => Some(c as f32),
            Reading::NoData => None,
        }
    }

    pub fn as_raw_count(&self) -> Option<i32> {
        match *self {
            Reading::RawCount(c) => Some(c),
            _ => None,
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Measurement(v) => write!(f, "{}", v),
            Reading::RawCount(c) => write!(f, "{}", c),
            Reading::NoData => f.write_str("no data"),
        }
    }
}

// --- Field layout ---

/// How a field's text is decoded.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FieldKind {
    /// Base-10 integer, or `-1` for no data.
    IntegerOrSentinel,
    /// Float, or `NAN` for no data.
    FloatOrSentinel,
}

impl FieldKind {
    pub const fn sentinel(&self) -> &'static str {
        match self {
            FieldKind::IntegerOrSentinel => RAW_COUNT_SENTINEL,
            FieldKind::FloatOrSentinel => FLOAT_SENTINEL,
        }
    }
}

/// Positional fields of an inbound sensor frame, in wire order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(u8)]
pub enum SensorField {
    PotRaw = 0,
    Dht11Temperature = 1,
    Dht11Humidity = 2,
    Dht22Temperature = 3,
    Dht22Humidity = 4,
}

impl SensorField {
    /// Number of fields in every inbound frame.
    pub const COUNT: usize = 5;

    /// All fields in wire order.
    pub const ALL: [SensorField; Self::COUNT] = [
        SensorField::PotRaw,
        SensorField::Dht11Temperature,
        SensorField::Dht11Humidity,
        SensorField::Dht22Temperature,
        SensorField::Dht22Humidity,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn kind(self) -> FieldKind {
        match self {
            SensorField::PotRaw => FieldKind::IntegerOrSentinel,
            _ => FieldKind::FloatOrSentinel,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            SensorField::PotRaw => "pot",
            SensorField::Dht11Temperature => "dht11_temperature",
            SensorField::Dht11Humidity => "dht11_humidity",
            SensorField::Dht22Temperature => "dht22_temperature",
            SensorField::Dht22Humidity => "dht22_humidity",
        }
    }
}

impl fmt::Display for SensorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error during decoding of a single field value.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FieldValueError {
    /// Text is not a base-10 integer.
    InvalidInteger,
    /// Text is not a float.
    InvalidFloat,
    /// Float parsed but is infinite or NaN spelled some other way.
    NotFinite,
}

impl fmt::Display for FieldValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValueError::InvalidInteger => f.write_str("not a base-10 integer"),
            FieldValueError::InvalidFloat => f.write_str("not a number"),
            FieldValueError::NotFinite => f.write_str("not a finite number"),
        }
    }
}

/// Decodes one raw field into a [`Reading`].
///
/// Sentinels are matched exactly and case-sensitively; `"nan"` or `"-1.0"`
/// are not sentinels and go through normal numeric parsing.
pub fn decode_field(raw: &str, kind: FieldKind) -> Result<Reading, FieldValueError> {
    if raw == kind.sentinel() {
        return Ok(Reading::NoData);
    }
    match kind {
        FieldKind::IntegerOrSentinel => i32::from_str(raw)
            .map(Reading::RawCount)
            .map_err(|_| FieldValueError::InvalidInteger),
        FieldKind::FloatOrSentinel => {
            let value = f32::from_str(raw).map_err(|_| FieldValueError::InvalidFloat)?;
            if value.is_finite() {
                Ok(Reading::Measurement(value))
            } else {
                Err(FieldValueError::NotFinite)
            }
        }
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_map_to_no_data() {
        assert_eq!(decode_field("-1", FieldKind::IntegerOrSentinel), Ok(Reading::NoData));
        assert_eq!(decode_field("NAN", FieldKind::FloatOrSentinel), Ok(Reading::NoData));
    }

    #[test]
    fn test_sentinels_are_case_sensitive_and_per_kind() {
        assert_eq!(
            decode_field("nan", FieldKind::FloatOrSentinel),
            Err(FieldValueError::NotFinite)
        );
        assert_eq!(
            decode_field("NAN", FieldKind::IntegerOrSentinel),
            Err(FieldValueError::InvalidInteger)
        );
        // "-1" is an ordinary value for a float field
        assert_eq!(
            decode_field("-1", FieldKind::FloatOrSentinel),
            Ok(Reading::Measurement(-1.0))
        );
    }

    #[test]
    fn test_numeric_values() {
        assert_eq!(decode_field("120", FieldKind::IntegerOrSentinel), Ok(Reading::RawCount(120)));
        assert_eq!(decode_field("0", FieldKind::IntegerOrSentinel), Ok(Reading::RawCount(0)));
        assert_eq!(decode_field("23.5", FieldKind::FloatOrSentinel), Ok(Reading::Measurement(23.5)));
        assert_eq!(decode_field("-4.25", FieldKind::FloatOrSentinel), Ok(Reading::Measurement(-4.25)));
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            decode_field("12.5", FieldKind::IntegerOrSentinel),
            Err(FieldValueError::InvalidInteger)
        );
        assert_eq!(decode_field("", FieldKind::IntegerOrSentinel), Err(FieldValueError::InvalidInteger));
        assert_eq!(decode_field("abc", FieldKind::FloatOrSentinel), Err(FieldValueError::InvalidFloat));
        assert_eq!(decode_field("inf", FieldKind::FloatOrSentinel), Err(FieldValueError::NotFinite));
    }

    #[test]
    fn test_field_layout() {
        for (i, field) in SensorField::ALL.iter().enumerate() {
            assert_eq!(field.index(), i);
        }
        assert_eq!(SensorField::PotRaw.kind(), FieldKind::IntegerOrSentinel);
        assert_eq!(SensorField::Dht22Humidity.kind(), FieldKind::FloatOrSentinel);
    }

    #[test]
    fn test_reading_views() {
        assert_eq!(Reading::RawCount(7).as_f32(), Some(7.0));
        assert_eq!(Reading::Measurement(1.5).as_raw_count(), None);
        assert!(Reading::NoData.as_f32().is_none());
        assert!(Reading::NoData.is_no_data());
    }
}
