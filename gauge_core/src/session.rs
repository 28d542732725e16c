//! State of one in-progress calibration run.

use gauge_traits::Channel;

use crate::profile::{CalibrationProfile, RawBounds};

/// Running min/max per channel over a fixed wall-clock window.
///
/// Both accumulators start at `seed` (mid-range), so the first reading on
/// either side of it immediately moves one of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalibrationSession {
    started_ms: u64,
    deadline_ms: u64,
    lows: [u16; Channel::COUNT],
    highs: [u16; Channel::COUNT],
    observations: u32,
}

impl CalibrationSession {
    pub fn new(now_ms: u64, duration_ms: u64, seed: u16) -> Self {
        Self {
            started_ms: now_ms,
            deadline_ms: now_ms.saturating_add(duration_ms),
            lows: [seed; Channel::COUNT],
            highs: [seed; Channel::COUNT],
            observations: 0,
        }
    }

    #[inline]
    pub fn started_ms(&self) -> u64 {
        self.started_ms
    }

    #[inline]
    pub fn deadline_ms(&self) -> u64 {
        self.deadline_ms
    }

    #[inline]
    pub fn observations(&self) -> u32 {
        self.observations
    }

    pub fn bounds(&self, channel: Channel) -> RawBounds {
        RawBounds::new(self.lows[channel.index()], self.highs[channel.index()])
    }

    /// Widen the running bounds with one reading per channel.
    pub fn observe(&mut self, raw: &[u16; Channel::COUNT]) {
        for (i, &v) in raw.iter().enumerate() {
            self.lows[i] = self.lows[i].min(v);
            self.highs[i] = self.highs[i].max(v);
        }
        self.observations = self.observations.saturating_add(1);
    }

    #[inline]
    pub fn is_due(&self, now_ms: u64) -> bool {
        now_ms >= self.deadline_ms
    }

    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.deadline_ms.saturating_sub(now_ms)
    }

    /// Whole seconds left, rounded up, so the display reaches 0 only at the
    /// deadline.
    pub fn seconds_remaining(&self, now_ms: u64) -> u32 {
        let secs = self.remaining_ms(now_ms).div_ceil(1000);
        u32::try_from(secs).unwrap_or(u32::MAX)
    }

    /// Profile holding the discovered bounds, degenerate pairs widened.
    pub fn to_profile(&self, bound_max: u16) -> CalibrationProfile {
        CalibrationProfile::new(Channel::ALL.map(|ch| self.bounds(ch))).sanitized(bound_max)
    }
}
