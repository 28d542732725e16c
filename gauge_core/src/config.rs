//! Runtime configuration types for the gauge pipeline.
//!
//! These are the structs used by `Gauge` and its stages. They are separate
//! from the TOML-deserialized config in `gauge_config`; see `conversions`.

use gauge_traits::Channel;

use crate::profile::{CalibrationProfile, RawBounds};
use crate::smoother::SmoothingKind;

/// Burst sampling and ADC parameters.
#[derive(Debug, Clone)]
pub struct SamplingCfg {
    /// Reads per channel per tick (>= 10).
    pub burst_size: usize,
    /// Largest raw value the ADC reports.
    pub raw_max: u16,
    /// Reference correction ratio applied after the trimmed mean.
    pub vref_num: u32,
    pub vref_den: u32,
    /// Tick rate of the control loop.
    pub tick_hz: u32,
}

impl SamplingCfg {
    /// Convert a raw ADC count into filter-output units, the unit of every
    /// calibration bound. Truncates like the noise filter does.
    pub fn to_filter_units(&self, raw: u16) -> u16 {
        let v = u64::from(raw) * u64::from(self.vref_num) / u64::from(self.vref_den.max(1));
        u16::try_from(v).unwrap_or(u16::MAX)
    }

    /// Largest value the noise filter can produce.
    pub fn filter_max(&self) -> u16 {
        self.to_filter_units(self.raw_max)
    }
}

impl Default for SamplingCfg {
    fn default() -> Self {
        Self {
            burst_size: 20,
            raw_max: gauge_config::DEFAULT_RAW_MAX,
            vref_num: 1100,
            vref_den: 1023,
            tick_hz: 20,
        }
    }
}

/// Where the smoother sits in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmoothingScope {
    /// One smoother over the weighted sum, before the display clamp.
    #[default]
    Aggregate,
    /// One smoother per channel over the filtered raw value, before mapping.
    Channel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingCfg {
    pub kind: SmoothingKind,
    pub scope: SmoothingScope,
}

impl Default for SmoothingCfg {
    fn default() -> Self {
        Self {
            kind: SmoothingKind::Exponential { alpha: 0.9 },
            scope: SmoothingScope::Aggregate,
        }
    }
}

/// Display clamp and hue derivation.
#[derive(Debug, Clone)]
pub struct AggregateCfg {
    /// Largest displayable estimate.
    pub ceiling: u16,
    /// Estimate mapped onto `hue_at_full`.
    pub full_scale: i32,
    pub hue_at_zero: i32,
    pub hue_at_full: i32,
    /// Lowest hue ever emitted.
    pub hue_floor: i32,
    /// Unit label drawn with every reading.
    pub label: String,
}

impl Default for AggregateCfg {
    fn default() -> Self {
        Self {
            ceiling: 999,
            full_scale: 100,
            hue_at_zero: 400,
            hue_at_full: 0,
            hue_floor: 50,
            label: "Gal".to_string(),
        }
    }
}

/// Calibration run parameters.
#[derive(Debug, Clone)]
pub struct CalibrationCfg {
    /// Collecting window length.
    pub duration_ms: u64,
    /// Button debounce window.
    pub debounce_ms: u64,
    /// Initial value of both running bounds.
    pub seed: u16,
}

impl Default for CalibrationCfg {
    fn default() -> Self {
        Self {
            duration_ms: 30_000,
            debounce_ms: 100,
            seed: gauge_config::DEFAULT_RAW_MAX / 2,
        }
    }
}

/// Per-channel mapping parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelCfg {
    pub target_max: i32,
    /// Mapped values strictly below this snap to 0.
    pub dead_zone: i32,
    /// Mapped values above this snap to it.
    pub ceiling: i32,
    pub inverted: bool,
    pub weight: f32,
    /// Bounds used when no calibration has been committed, in raw ADC
    /// counts.
    pub default_bounds: RawBounds,
}

impl ChannelCfg {
    pub fn factory(channel: Channel) -> Self {
        Self::from(gauge_config::factory_channel(channel))
    }
}

/// `ChannelCfg` for all six channels.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelTable {
    channels: [ChannelCfg; Channel::COUNT],
}

impl Default for ChannelTable {
    fn default() -> Self {
        Self {
            channels: Channel::ALL.map(ChannelCfg::factory),
        }
    }
}

impl ChannelTable {
    pub fn new(channels: [ChannelCfg; Channel::COUNT]) -> Self {
        Self { channels }
    }

    #[inline]
    pub fn get(&self, channel: Channel) -> &ChannelCfg {
        &self.channels[channel.index()]
    }

    pub fn weights(&self) -> [f32; Channel::COUNT] {
        self.channels.map(|c| c.weight)
    }

    /// Profile made of every channel's default bounds, converted from raw
    /// counts into filter-output units.
    pub fn default_profile(&self, sampling: &SamplingCfg) -> CalibrationProfile {
        CalibrationProfile::new(self.channels.map(|c| {
            let b = c.default_bounds;
            RawBounds::new(
                sampling.to_filter_units(b.low),
                sampling.to_filter_units(b.high),
            )
        }))
    }
}
