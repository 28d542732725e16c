//! Calibrated linear remap of filtered raw values onto channel units.

use gauge_traits::Channel;

use crate::config::{ChannelCfg, ChannelTable};
use crate::profile::{CalibrationProfile, RawBounds};
use crate::util::remap;

/// Map one filtered raw sample through `bounds` onto `[0, cfg.target_max]`.
///
/// - The sample is clamped into the bounds first, so out-of-range readings
///   land on the ends of travel instead of extrapolating.
/// - `cfg.inverted` sends `bounds.low` to `target_max` and `bounds.high` to 0.
/// - Results below `dead_zone` snap to 0, results above `ceiling` to `ceiling`.
/// - A degenerate pair (`low == high`) is widened by one unit each side.
pub fn map_value(cfg: &ChannelCfg, bounds: RawBounds, bound_max: u16, sample: i32) -> i32 {
    let bounds = if bounds.is_degenerate() {
        bounds.widened(bound_max)
    } else {
        bounds
    };
    let low = i32::from(bounds.low);
    let high = i32::from(bounds.high);
    let x = sample.clamp(low.min(high), low.max(high));

    let mapped = if cfg.inverted {
        remap(x, low, high, cfg.target_max, 0)
    } else {
        remap(x, low, high, 0, cfg.target_max)
    };

    if mapped < cfg.dead_zone {
        0
    } else if mapped > cfg.ceiling {
        cfg.ceiling
    } else {
        mapped
    }
}

/// The mapping stage for all channels.
#[derive(Debug, Clone)]
pub struct RangeMapper {
    channels: ChannelTable,
    bound_max: u16,
}

impl RangeMapper {
    pub fn new(channels: ChannelTable, bound_max: u16) -> Self {
        Self { channels, bound_max }
    }

    #[inline]
    pub fn channel(&self, channel: Channel) -> &ChannelCfg {
        self.channels.get(channel)
    }

    pub fn channels(&self) -> &ChannelTable {
        &self.channels
    }

    pub fn map(&self, profile: &CalibrationProfile, channel: Channel, sample: i32) -> i32 {
        map_value(
            self.channels.get(channel),
            profile.bounds(channel),
            self.bound_max,
            sample,
        )
    }

    pub fn map_all(
        &self,
        profile: &CalibrationProfile,
        samples: &[i32; Channel::COUNT],
    ) -> [i32; Channel::COUNT] {
        Channel::ALL.map(|ch| self.map(profile, ch, samples[ch.index()]))
    }
}
