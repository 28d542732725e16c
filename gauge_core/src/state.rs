//! All mutable pipeline state, owned by the control loop.

use gauge_traits::Channel;

use crate::aggregate::{AggregateReading, Aggregator};
use crate::config::{SmoothingCfg, SmoothingScope};
use crate::controller::CalibrationController;
use crate::mapper::RangeMapper;
use crate::noise::NoiseFilter;
use crate::profile::CalibrationProfile;
use crate::smoother::Smoother;

/// Everything a tick reads or writes besides the collaborators.
#[derive(Debug, Clone)]
pub struct PipelineState {
    pub(crate) profile: CalibrationProfile,
    pub(crate) noise: NoiseFilter,
    pub(crate) mapper: RangeMapper,
    pub(crate) aggregator: Aggregator,
    pub(crate) scope: SmoothingScope,
    pub(crate) aggregate_smoother: Smoother,
    pub(crate) channel_smoothers: [Smoother; Channel::COUNT],
    pub(crate) controller: CalibrationController,
    /// Last successfully de-noised value per channel.
    pub(crate) last_raw: [i32; Channel::COUNT],
    pub(crate) last_reading: Option<AggregateReading>,
}

impl PipelineState {
    pub fn new(
        profile: CalibrationProfile,
        noise: NoiseFilter,
        mapper: RangeMapper,
        aggregator: Aggregator,
        smoothing: SmoothingCfg,
        controller: CalibrationController,
    ) -> Self {
        let last_raw = Channel::ALL.map(|ch| rest_position(&mapper, &profile, ch));
        Self {
            profile,
            noise,
            mapper,
            aggregator,
            scope: smoothing.scope,
            aggregate_smoother: Smoother::new(smoothing.kind),
            channel_smoothers: Channel::ALL.map(|_| Smoother::new(smoothing.kind)),
            controller,
            last_raw,
            last_reading: None,
        }
    }

    pub fn profile(&self) -> &CalibrationProfile {
        &self.profile
    }

    pub fn controller(&self) -> &CalibrationController {
        &self.controller
    }

    pub fn last_reading(&self) -> Option<AggregateReading> {
        self.last_reading
    }

    pub fn last_raw(&self) -> &[i32; Channel::COUNT] {
        &self.last_raw
    }

    /// Swap in a newly committed profile. Smoother history was built on the
    /// old bounds and is dropped.
    pub fn set_profile(&mut self, profile: CalibrationProfile) {
        self.profile = profile;
        self.reset_smoothing();
    }

    pub fn reset_smoothing(&mut self) {
        self.aggregate_smoother.reset();
        for s in &mut self.channel_smoothers {
            s.reset();
        }
    }

    /// Map, smooth and aggregate one tick of de-noised samples.
    pub fn process(&mut self, denoised: &[i32; Channel::COUNT]) -> AggregateReading {
        let inputs = match self.scope {
            SmoothingScope::Channel => {
                Channel::ALL.map(|ch| self.channel_smoothers[ch.index()].push(denoised[ch.index()]))
            }
            SmoothingScope::Aggregate => *denoised,
        };
        let mapped = self.mapper.map_all(&self.profile, &inputs);
        let mut total = self.aggregator.combine(&mapped);
        if self.scope == SmoothingScope::Aggregate {
            total = self.aggregate_smoother.push(total);
        }
        let reading = self.aggregator.finish(total);
        tracing::trace!(?mapped, total, value = reading.value, hue = reading.hue, "tick");
        self.last_reading = Some(reading);
        reading
    }
}

/// Raw value at which `channel` reads zero under `profile`.
pub fn rest_position(mapper: &RangeMapper, profile: &CalibrationProfile, channel: Channel) -> i32 {
    let b = profile.bounds(channel);
    if mapper.channel(channel).inverted {
        i32::from(b.high)
    } else {
        i32::from(b.low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AggregateCfg, CalibrationCfg, ChannelTable, SamplingCfg};
    use crate::smoother::SmoothingKind;

    fn state(scope: SmoothingScope) -> PipelineState {
        let channels = ChannelTable::default();
        let unit = SamplingCfg {
            vref_num: 1,
            vref_den: 1,
            ..SamplingCfg::default()
        };
        let profile = channels.default_profile(&unit);
        let weights = channels.weights();
        PipelineState::new(
            profile,
            NoiseFilter::new(10, 1, 1).unwrap(),
            RangeMapper::new(channels, 1023),
            Aggregator::new(AggregateCfg::default(), weights),
            SmoothingCfg {
                kind: SmoothingKind::Exponential { alpha: 0.0 },
                scope,
            },
            CalibrationController::new(CalibrationCfg::default(), 1023),
        )
    }

    #[test]
    fn rest_positions_read_zero() {
        let mut s = state(SmoothingScope::Aggregate);
        let rest = *s.last_raw();
        assert_eq!(s.process(&rest).value, 0);
        let mut s = state(SmoothingScope::Channel);
        assert_eq!(s.process(&rest).value, 0);
    }

    #[test]
    fn full_travel_saturates_display() {
        let mut s = state(SmoothingScope::Aggregate);
        let full = Channel::ALL.map(|ch| i32::from(s.profile().bounds(ch).low));
        let r = s.process(&full);
        assert_eq!(r.value, 999);
        assert_eq!(r.hue, 50);
        assert_eq!(s.last_reading(), Some(r));
    }
}
