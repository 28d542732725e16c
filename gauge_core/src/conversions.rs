//! `From` implementations bridging `gauge_config` types to `gauge_core` types.

use gauge_traits::Channel;

use crate::builder::GaugeSettings;
use crate::config::{
    AggregateCfg, CalibrationCfg, ChannelCfg, ChannelTable, SamplingCfg, SmoothingCfg,
    SmoothingScope,
};
use crate::profile::RawBounds;
use crate::smoother::SmoothingKind;

// ── SamplingCfg ──────────────────────────────────────────────────────────────

impl From<&gauge_config::Sampling> for SamplingCfg {
    fn from(c: &gauge_config::Sampling) -> Self {
        Self {
            burst_size: c.burst_size,
            raw_max: c.raw_max,
            vref_num: c.vref_num,
            vref_den: c.vref_den,
            tick_hz: c.tick_hz,
        }
    }
}

// ── SmoothingCfg ─────────────────────────────────────────────────────────────

impl From<&gauge_config::Smoothing> for SmoothingCfg {
    fn from(c: &gauge_config::Smoothing) -> Self {
        let kind = match c.strategy {
            gauge_config::SmoothingStrategy::Exponential => {
                SmoothingKind::Exponential { alpha: c.alpha }
            }
            gauge_config::SmoothingStrategy::Window => SmoothingKind::Window { size: c.window },
        };
        let scope = match c.scope {
            gauge_config::SmoothingScope::Aggregate => SmoothingScope::Aggregate,
            gauge_config::SmoothingScope::Channel => SmoothingScope::Channel,
        };
        Self { kind, scope }
    }
}

// ── AggregateCfg ─────────────────────────────────────────────────────────────

impl From<&gauge_config::Aggregate> for AggregateCfg {
    fn from(c: &gauge_config::Aggregate) -> Self {
        Self {
            ceiling: c.ceiling,
            full_scale: c.full_scale,
            hue_at_zero: c.hue_at_zero,
            hue_at_full: c.hue_at_full,
            hue_floor: c.hue_floor,
            label: c.label.clone(),
        }
    }
}

// ── ChannelCfg ───────────────────────────────────────────────────────────────

impl From<gauge_config::ChannelSpec> for ChannelCfg {
    fn from(c: gauge_config::ChannelSpec) -> Self {
        Self {
            target_max: c.target_max,
            dead_zone: c.dead_zone,
            ceiling: c.ceiling,
            inverted: c.inverted,
            weight: c.weight,
            default_bounds: RawBounds::new(c.default_low, c.default_high),
        }
    }
}

// ── GaugeSettings ────────────────────────────────────────────────────────────

/// Whole-config conversion. Calibration lives here rather than on
/// `gauge_config::CalibrationCfg` because its seed default depends on
/// `raw_max`.
impl From<&gauge_config::Config> for GaugeSettings {
    fn from(c: &gauge_config::Config) -> Self {
        Self {
            sampling: SamplingCfg::from(&c.sampling),
            smoothing: SmoothingCfg::from(&c.smoothing),
            aggregate: AggregateCfg::from(&c.aggregate),
            calibration: CalibrationCfg {
                duration_ms: c.calibration.duration_ms,
                debounce_ms: c.calibration.debounce_ms,
                seed: c.calibration_seed(),
            },
            channels: ChannelTable::new(Channel::ALL.map(|ch| ChannelCfg::from(c.channel(ch)))),
        }
    }
}
