// src/link/snapshot.rs

//! What the link hands to the visualization front-end.

use crate::common::{
    band::Classification,
    config::LinkConfig,
    frame::SensorReadings,
    types::{Reading, SensorField},
};

/// Latest `(value, raw)` pair of one logical channel.
///
/// For the pot channel `value` is volts and `raw` is the ADC count; the
/// other channels report the measurement itself in both.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ChannelReading {
    pub value: Reading,
    pub raw: Reading,
}

/// One logical channel as seen by the front-end.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ChannelState {
    reading: Option<ChannelReading>,
    classification: Option<Classification>,
}

impl ChannelState {
    /// `None` until a frame has populated this channel.
    #[inline]
    pub fn reading(&self) -> Option<ChannelReading> {
        self.reading
    }

    /// Alert band, for channels that are classified.
    #[inline]
    pub fn classification(&self) -> Option<Classification> {
        self.classification
    }

    #[inline]
    pub fn ever_populated(&self) -> bool {
        self.reading.is_some()
    }

    /// No frame has populated the channel yet, or the peer reports no data.
    pub fn is_stale(&self) -> bool {
        self.reading.map_or(true, |r| r.value.is_no_data())
    }
}

/// Front-end view of the link: all channels plus the link error flags.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Snapshot {
    channels: [ChannelState; SensorField::COUNT],
    link_erroring: bool,
    error_indicator: bool,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn channel(&self, field: SensorField) -> &ChannelState {
        &self.channels[field.index()]
    }

    pub fn channels(&self) -> impl Iterator<Item = (SensorField, &ChannelState)> + '_ {
        SensorField::ALL.into_iter().map(move |f| (f, self.channel(f)))
    }

    /// Pot command band of the last decoded frame.
    pub fn pot_classification(&self) -> Option<Classification> {
        self.channel(SensorField::PotRaw).classification
    }

    /// The transport is unusable; the link will not recover.
    #[inline]
    pub fn link_erroring(&self) -> bool {
        self.link_erroring
    }

    /// Current phase of the blinking error indicator.
    #[inline]
    pub fn error_indicator(&self) -> bool {
        self.error_indicator
    }

    /// Replaces every channel with the readings of a decoded frame and
    /// reclassifies the alert channels. Returns the pot classification.
    pub(crate) fn apply(&mut self, readings: &SensorReadings, config: &LinkConfig) -> Classification {
        for (field, reading) in readings.iter() {
            let channel_reading = match field {
                SensorField::PotRaw => ChannelReading { value: config.pot_voltage(reading), raw: reading },
                _ => ChannelReading { value: reading, raw: reading },
            };
            let thresholds = match field {
                SensorField::PotRaw => Some(&config.pot_thresholds),
                SensorField::Dht11Temperature => Some(&config.dht11_temperature_thresholds),
                SensorField::Dht22Temperature => Some(&config.dht22_temperature_thresholds),
                SensorField::Dht11Humidity | SensorField::Dht22Humidity => None,
            };
            self.channels[field.index()] = ChannelState {
                reading: Some(channel_reading),
                classification: thresholds.map(|t| t.classify(channel_reading.value)),
            };
        }
        self.channel(SensorField::PotRaw).classification.unwrap_or(Classification::Unknown)
    }

    pub(crate) fn set_link_erroring(&mut self) {
        self.link_erroring = true;
    }

    pub(crate) fn toggle_error_indicator(&mut self) -> bool {
        self.error_indicator = !self.error_indicator;
        self.error_indicator
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::band::AlertBand;
    use crate::common::frame::decode_readings;

    #[test]
    fn test_fresh_snapshot_is_stale_everywhere() {
        let snapshot = Snapshot::new();
        for (_, channel) in snapshot.channels() {
            assert!(channel.is_stale());
            assert!(!channel.ever_populated());
            assert!(channel.reading().is_none());
        }
        assert!(!snapshot.link_erroring());
        assert!(snapshot.pot_classification().is_none());
    }

    #[test]
    fn test_apply_populates_and_classifies() {
        let config = LinkConfig::default();
        let mut snapshot = Snapshot::new();
        let readings = decode_readings("120,23.5,55.0,NAN,NAN").unwrap();

        let pot = snapshot.apply(&readings, &config);

        assert_eq!(pot, Classification::Band(AlertBand::Low));
        let pot_channel = snapshot.channel(SensorField::PotRaw);
        assert_eq!(
            pot_channel.reading(),
            Some(ChannelReading { value: Reading::Measurement(0.59), raw: Reading::RawCount(120) })
        );
        assert!(!pot_channel.is_stale());

        let t11 = snapshot.channel(SensorField::Dht11Temperature);
        assert_eq!(t11.classification(), Some(Classification::Band(AlertBand::Mid)));
        assert!(snapshot.channel(SensorField::Dht11Humidity).classification().is_none());

        let t22 = snapshot.channel(SensorField::Dht22Temperature);
        assert!(t22.ever_populated());
        assert!(t22.is_stale());
        assert_eq!(t22.classification(), Some(Classification::Unknown));
    }

    #[test]
    fn test_pot_no_data_is_unknown() {
        let config = LinkConfig::default();
        let mut snapshot = Snapshot::new();
        let readings = decode_readings("-1,NAN,NAN,NAN,NAN").unwrap();
        assert_eq!(snapshot.apply(&readings, &config), Classification::Unknown);
        assert_eq!(
            snapshot.channel(SensorField::PotRaw).reading(),
            Some(ChannelReading { value: Reading::NoData, raw: Reading::NoData })
        );
    }

    #[test]
    fn test_error_flags() {
        let mut snapshot = Snapshot::new();
        snapshot.set_link_erroring();
        assert!(snapshot.link_erroring());
        assert!(snapshot.toggle_error_indicator());
        assert!(!snapshot.toggle_error_indicator());
    }
}
