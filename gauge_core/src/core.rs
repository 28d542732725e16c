//! The gauge control loop body (`Gauge`).
//!
//! One [`Gauge::step`] is one tick: poll the button, let the calibration
//! controller pick the tick's job, then either run the pipeline, collect a
//! calibration sample, or commit the collected profile.

use std::sync::Arc;
use std::time::Instant;

use eyre::WrapErr;
use gauge_traits::clock::Clock;
use gauge_traits::{BlockStore, ButtonInput, Channel, SensorSource};

use crate::aggregate::AggregateReading;
use crate::config::SamplingCfg;
use crate::controller::{Action, Phase};
use crate::error::Result;
use crate::hw_error::map_hw_error;
use crate::profile::CalibrationProfile;
use crate::render::Frame;
use crate::state::PipelineState;
use crate::store::ProfileStore;

pub struct Gauge<S: SensorSource, B: ButtonInput, P: BlockStore> {
    pub(crate) sensors: S,
    pub(crate) button: B,
    pub(crate) store: ProfileStore<P>,
    pub(crate) state: PipelineState,
    pub(crate) sampling: SamplingCfg,
    pub(crate) label: String,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) epoch: Instant,
    pub(crate) period_us: u64,
    pub(crate) ticks: u64,
    pub(crate) read_failures: u64,
}

impl<S: SensorSource, B: ButtonInput, P: BlockStore> core::fmt::Debug for Gauge<S, B, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Gauge")
            .field("phase", &self.state.controller.phase())
            .field("ticks", &self.ticks)
            .field("last_reading", &self.state.last_reading)
            .finish_non_exhaustive()
    }
}

impl<S: SensorSource, B: ButtonInput, P: BlockStore> Gauge<S, B, P> {
    /// Active calibration profile.
    pub fn profile(&self) -> &CalibrationProfile {
        &self.state.profile
    }

    pub fn phase(&self) -> Phase {
        self.state.controller.phase()
    }

    pub fn last_reading(&self) -> Option<AggregateReading> {
        self.state.last_reading
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Unit label drawn next to readings.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn sampling(&self) -> &SamplingCfg {
        &self.sampling
    }

    pub fn clock(&self) -> &Arc<dyn Clock + Send + Sync> {
        &self.clock
    }

    /// Tick period derived from `tick_hz`.
    pub fn period_us(&self) -> u64 {
        self.period_us
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Channel reads that failed and fell back to the last good value.
    pub fn read_failures(&self) -> u64 {
        self.read_failures
    }

    pub fn store(&self) -> &ProfileStore<P> {
        &self.store
    }

    /// Milliseconds since the gauge was built.
    pub fn now_ms(&self) -> u64 {
        self.clock.ms_since(self.epoch)
    }

    /// Start a calibration run as if the button had been pressed. Returns
    /// `false` if one is already in progress.
    pub fn start_calibration(&mut self) -> bool {
        self.state.controller.arm()
    }

    /// Run one tick.
    pub fn step(&mut self) -> Frame {
        let now = self.now_ms();
        let pressed = self.button.is_pressed();
        self.ticks = self.ticks.saturating_add(1);

        match self.state.controller.on_tick(pressed, now) {
            Action::RunPipeline => {
                let denoised = self.sample_all();
                Frame::Reading(self.state.process(&denoised))
            }
            Action::Collect { seconds_remaining } => {
                let filter_max = i32::from(self.sampling.filter_max());
                let raw = self.sample_all().map(|v| v.clamp(0, filter_max) as u16);
                self.state.controller.observe(&raw);
                tracing::trace!(?raw, seconds_remaining, "calibration sample");
                Frame::Countdown { seconds_remaining }
            }
            Action::Commit(profile) => {
                let saved = match self.store.commit(&profile) {
                    Ok(()) => {
                        tracing::info!(profile = ?profile, "calibration profile committed");
                        self.state.set_profile(profile);
                        true
                    }
                    Err(e) => {
                        tracing::error!(
                            error = %e,
                            "calibration profile not saved; keeping previous profile"
                        );
                        false
                    }
                };
                self.state.controller.finish_commit();
                Frame::Committed { saved }
            }
        }
    }

    /// De-noised value for every channel. A failed read keeps the last good
    /// value for that channel.
    fn sample_all(&mut self) -> [i32; Channel::COUNT] {
        for ch in Channel::ALL {
            match self.read_channel(ch) {
                Ok(v) => self.state.last_raw[ch.index()] = v,
                Err(e) => {
                    self.read_failures = self.read_failures.saturating_add(1);
                    tracing::warn!(
                        channel = ch.name(),
                        error = %format!("{e:#}"),
                        fallback = self.state.last_raw[ch.index()],
                        "sensor read failed; reusing last value"
                    );
                }
            }
        }
        self.state.last_raw
    }

    fn read_channel(&mut self, ch: Channel) -> Result<i32> {
        let sensors = &mut self.sensors;
        self.state
            .noise
            .sample(|| sensors.read(ch))
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err_with(|| format!("reading {ch}"))
    }
}
