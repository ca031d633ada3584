// src/common/band.rs

//! Three-zone alert classification.

use core::fmt;

use super::types::Reading;

/// Alert zone of a numeric reading relative to two boundaries.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum AlertBand {
    /// Below the low boundary.
    Low,
    /// Between the boundaries, both inclusive.
    Mid,
    /// Above the high boundary.
    High,
}

impl AlertBand {
    /// LED bank bit for this band (`Low` -> bit 0, `Mid` -> bit 1, `High` -> bit 2).
    pub const fn led_bit(self) -> u8 {
        match self {
            AlertBand::Low => 0b001,
            AlertBand::Mid => 0b010,
            AlertBand::High => 0b100,
        }
    }
}

/// Classification result. `Unknown` stands for a `NoData` input.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Classification {
    Band(AlertBand),
    Unknown,
}

impl Classification {
    /// Action mask sent to the peer's LED bank. Exactly one bit per band, `0` when unknown.
    pub const fn led_mask(self) -> u8 {
        match self {
            Classification::Band(band) => band.led_bit(),
            Classification::Unknown => 0,
        }
    }

    pub const fn band(self) -> Option<AlertBand> {
        match self {
            Classification::Band(band) => Some(band),
            Classification::Unknown => None,
        }
    }
}

impl From<AlertBand> for Classification {
    fn from(band: AlertBand) -> Self {
        Classification::Band(band)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Band(AlertBand::Low) => f.write_str("low"),
            Classification::Band(AlertBand::Mid) => f.write_str("mid"),
            Classification::Band(AlertBand::High) => f.write_str("high"),
            Classification::Unknown => f.write_str("unknown"),
        }
    }
}

/// Hysteresis a threshold pair carries when none is configured.
pub const DEFAULT_HYSTERESIS: f32 = 0.5;

#[cfg(feature = "serde")]
fn default_hysteresis() -> f32 {
    DEFAULT_HYSTERESIS
}

/// Ordered boundary pair for one logical channel.
///
/// `hysteresis` is carried for configuration compatibility but is not
/// applied by [`Thresholds::classify`]; readings that jitter around a
/// boundary will flip bands.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Thresholds {
    pub low: f32,
    pub high: f32,
    #[cfg_attr(feature = "serde", serde(default = "default_hysteresis"))]
    pub hysteresis: f32,
}

impl Thresholds {
    pub const fn new(low: f32, high: f32) -> Self {
        Self { low, high, hysteresis: DEFAULT_HYSTERESIS }
    }

    pub const fn with_hysteresis(mut self, hysteresis: f32) -> Self {
        self.hysteresis = hysteresis;
        self
    }

    /// `true` when `low < high` and both are finite.
    pub fn is_ordered(&self) -> bool {
        self.low.is_finite() && self.high.is_finite() && self.low < self.high
    }

    #[inline]
    pub fn classify(&self, reading: Reading) -> Classification {
        classify(reading, self.low, self.high)
    }
}

/// Classifies `reading` against `low` and `high` without clamping.
///
/// `< low` is `Low`, `low..=high` is `Mid`, `> high` is `High` and `NoData`
/// is `Unknown`.
pub fn classify(reading: Reading, low: f32, high: f32) -> Classification {
    let Some(value) = reading.as_f32() else {
        return Classification::Unknown;
    };
    if value < low {
        Classification::Band(AlertBand::Low)
    } else if value > high {
        Classification::Band(AlertBand::High)
    } else {
        Classification::Band(AlertBand::Mid)
    }
}
