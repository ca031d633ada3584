// src/common/config.rs

use core::time::Duration;

use super::band::Thresholds;
use super::frame::{OutboundCommand, Subject, MAX_SUBJECT_LEN};
use super::timing;
use super::types::Reading;

/// Subject the peer firmware listens on for its RGB LED bank.
pub const DEFAULT_SUBJECT: &str = "rgbLEDs";

const _: () = assert!(DEFAULT_SUBJECT.len() <= MAX_SUBJECT_LEN);

/// Configuration of a telemetry link.
///
/// Every field has a default matching the stock peer firmware, so a config
/// file only needs to name what differs.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LinkConfig {
    /// Outbound command subject for the pot-driven LED bank.
    pub subject: Subject,
    /// Pot band boundaries, in volts.
    pub pot_thresholds: Thresholds,
    /// DHT11 temperature alert boundaries, in °C.
    pub dht11_temperature_thresholds: Thresholds,
    /// DHT22 temperature alert boundaries, in °C.
    pub dht22_temperature_thresholds: Thresholds,
    /// ADC reference voltage of the pot input.
    pub pot_reference_volts: f32,
    /// ADC full-scale count of the pot input.
    pub pot_resolution: u16,
    /// Error indicator toggle period while erroring.
    pub error_blink_period_ms: u32,
    /// Consecutive read faults after which the link gives up.
    pub max_read_faults: u8,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            // Infallible, the length is asserted at compile time above
            subject: Subject::try_from(DEFAULT_SUBJECT).unwrap_or_default(),
            pot_thresholds: Thresholds::new(1.5, 3.5),
            dht11_temperature_thresholds: Thresholds::new(5.0, 30.0),
            dht22_temperature_thresholds: Thresholds::new(5.0, 30.0),
            pot_reference_volts: 5.0,
            pot_resolution: 1024,
            error_blink_period_ms: timing::ERROR_BLINK_PERIOD.as_millis() as u32,
            max_read_faults: 3,
        }
    }
}

/// Rejected configuration values.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Thresholds for {0} must be finite with low < high")]
    UnorderedThresholds(&'static str),
    #[error("Subject is not a valid command subject")]
    InvalidSubject,
    #[error("Pot scale must be positive")]
    InvalidPotScale,
    #[error("Error blink period must be non-zero")]
    ZeroBlinkPeriod,
    #[error("max_read_faults must be at least 1")]
    ZeroReadFaults,
}

impl LinkConfig {
    /// Checks invariants the link relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, t) in [
            ("pot", &self.pot_thresholds),
            ("dht11_temperature", &self.dht11_temperature_thresholds),
            ("dht22_temperature", &self.dht22_temperature_thresholds),
        ] {
            if !t.is_ordered() {
                return Err(ConfigError::UnorderedThresholds(name));
            }
        }
        OutboundCommand::new(&self.subject, 0).map_err(|_| ConfigError::InvalidSubject)?;
        if !(self.pot_reference_volts.is_finite() && self.pot_reference_volts > 0.0) || self.pot_resolution == 0 {
            return Err(ConfigError::InvalidPotScale);
        }
        if self.error_blink_period_ms == 0 {
            return Err(ConfigError::ZeroBlinkPeriod);
        }
        if self.max_read_faults == 0 {
            return Err(ConfigError::ZeroReadFaults);
        }
        Ok(())
    }

    pub fn error_blink_period(&self) -> Duration {
        Duration::from_millis(u64::from(self.error_blink_period_ms))
    }

    /// Converts a raw pot count to volts, rounded to two decimals.
    ///
    /// Exact ties round to even, so 128 counts read 0.62 V. `NoData` stays `NoData`.
    pub fn pot_voltage(&self, raw: Reading) -> Reading {
        let Some(count) = raw.as_f32() else {
            return Reading::NoData;
        };
        let hundredths = self.pot_reference_volts * count * 100.0 / f32::from(self.pot_resolution);
        // `as` truncates toward zero
        let whole = hundredths as i64;
        let frac = (hundredths - whole as f32).abs();
        let away = if hundredths < 0.0 { -1 } else { 1 };
        let rounded = if frac > 0.5 || (frac == 0.5 && whole % 2 != 0) {
            whole + away
        } else {
            whole
        };
        Reading::Measurement(rounded as f32 / 100.0)
    }
}
