//! Weighted sum of the six channel values, display clamp, and hue.

use gauge_traits::Channel;

use crate::config::AggregateCfg;
use crate::util::remap;

/// Output of one pipeline cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateReading {
    /// Consumption estimate, within `[0, ceiling]`.
    pub value: u16,
    /// Color-wheel hue for the digits.
    pub hue: u16,
}

#[derive(Debug, Clone)]
pub struct Aggregator {
    cfg: AggregateCfg,
    weights: [f32; Channel::COUNT],
}

impl Aggregator {
    pub fn new(cfg: AggregateCfg, weights: [f32; Channel::COUNT]) -> Self {
        Self { cfg, weights }
    }

    pub fn cfg(&self) -> &AggregateCfg {
        &self.cfg
    }

    /// Weighted sum, truncated toward zero. Not clamped: smoothing runs on
    /// this value in aggregate scope.
    pub fn combine(&self, mapped: &[i32; Channel::COUNT]) -> i32 {
        let total: f32 = mapped
            .iter()
            .zip(self.weights.iter())
            .map(|(&v, &w)| v as f32 * w)
            .sum();
        // `as` saturates and maps NaN to 0
        total as i32
    }

    /// Clamp `total` into `[0, ceiling]` and derive its hue.
    pub fn finish(&self, total: i32) -> AggregateReading {
        let value = total.clamp(0, i32::from(self.cfg.ceiling));
        AggregateReading {
            value: value as u16,
            hue: hue_for(&self.cfg, value),
        }
    }

    pub fn aggregate(&self, mapped: &[i32; Channel::COUNT]) -> AggregateReading {
        self.finish(self.combine(mapped))
    }
}

/// Linear map of `value` from `[0, full_scale]` onto
/// `[hue_at_zero, hue_at_full]`, floored at `hue_floor` and kept within the
/// configured hue range.
pub fn hue_for(cfg: &AggregateCfg, value: i32) -> u16 {
    let hue = remap(value, 0, cfg.full_scale.max(1), cfg.hue_at_zero, cfg.hue_at_full);
    let top = cfg.hue_at_zero.max(cfg.hue_at_full).max(cfg.hue_floor);
    hue.clamp(cfg.hue_floor, top).clamp(0, i32::from(u16::MAX)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hue_runs_from_zero_end_to_floor() {
        let cfg = AggregateCfg::default();
        assert_eq!(hue_for(&cfg, 0), 400);
        assert_eq!(hue_for(&cfg, 50), 200);
        assert_eq!(hue_for(&cfg, 87), 52);
        assert_eq!(hue_for(&cfg, 88), 50);
        assert_eq!(hue_for(&cfg, 999), 50);
    }

    #[test]
    fn weights_scale_contributions() {
        let mut weights = [1.0; Channel::COUNT];
        weights[Channel::Toilet.index()] = 0.5;
        let agg = Aggregator::new(AggregateCfg::default(), weights);
        assert_eq!(agg.combine(&[0, 50, 0, 0, 0, 0]), 25);
        assert_eq!(agg.combine(&[10, 11, 10, 10, 10, 10]), 55);
    }
}
