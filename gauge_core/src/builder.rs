//! Type-state builder for `Gauge` and generic `build_gauge` constructor.
//!
//! The builder enforces at compile time that sensors, button and store are
//! provided before `build()` is available. `try_build()` is always available
//! for dynamic checks.

use std::marker::PhantomData;
use std::sync::Arc;

use gauge_traits::clock::{Clock, MonotonicClock};
use gauge_traits::{BlockStore, ButtonInput, Channel, SensorSource};

use crate::aggregate::Aggregator;
use crate::config::*;
use crate::controller::CalibrationController;
use crate::core::Gauge;
use crate::error::{BuildError, Result};
use crate::mapper::RangeMapper;
use crate::noise::NoiseFilter;
use crate::smoother::SmoothingKind;
use crate::state::PipelineState;
use crate::store::ProfileStore;

/// Boxed gauge produced by [`GaugeBuilder`].
pub type DynGauge = Gauge<Box<dyn SensorSource>, Box<dyn ButtonInput>, Box<dyn BlockStore>>;

/// Every tunable of the pipeline in one place.
#[derive(Debug, Clone, Default)]
pub struct GaugeSettings {
    pub sampling: SamplingCfg,
    pub smoothing: SmoothingCfg,
    pub aggregate: AggregateCfg,
    pub calibration: CalibrationCfg,
    pub channels: ChannelTable,
}

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for [`DynGauge`]. Settings are validated on `build()`.
pub struct GaugeBuilder<S, B, P> {
    sensors: Option<Box<dyn SensorSource>>,
    button: Option<Box<dyn ButtonInput>>,
    store: Option<Box<dyn BlockStore>>,
    settings: GaugeSettings,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    _s: PhantomData<S>,
    _b: PhantomData<B>,
    _p: PhantomData<P>,
}

impl Default for GaugeBuilder<Missing, Missing, Missing> {
    fn default() -> Self {
        Self {
            sensors: None,
            button: None,
            store: None,
            settings: GaugeSettings::default(),
            clock: None,
            _s: PhantomData,
            _b: PhantomData,
            _p: PhantomData,
        }
    }
}

impl DynGauge {
    /// Start building a gauge.
    pub fn builder() -> GaugeBuilder<Missing, Missing, Missing> {
        GaugeBuilder::default()
    }
}

fn invalid(msg: &'static str) -> eyre::Report {
    eyre::Report::new(BuildError::InvalidConfig(msg))
}

fn validate(settings: &GaugeSettings) -> Result<()> {
    let s = &settings.sampling;
    if s.raw_max == 0 {
        return Err(invalid("raw_max must be > 0"));
    }
    if s.tick_hz == 0 {
        return Err(invalid("tick_hz must be > 0"));
    }
    if let SmoothingKind::Window { size } = settings.smoothing.kind {
        if size == 0 {
            return Err(invalid("smoothing window must be >= 1"));
        }
    }
    let a = &settings.aggregate;
    if a.ceiling == 0 {
        return Err(invalid("aggregate ceiling must be > 0"));
    }
    if a.full_scale <= 0 {
        return Err(invalid("aggregate full_scale must be > 0"));
    }
    let c = &settings.calibration;
    if c.duration_ms == 0 {
        return Err(invalid("calibration duration must be > 0"));
    }
    if c.seed > s.raw_max {
        return Err(invalid("calibration seed exceeds raw_max"));
    }
    for ch in Channel::ALL {
        let cfg = settings.channels.get(ch);
        if cfg.target_max <= 0 {
            return Err(invalid("channel target_max must be > 0"));
        }
        if cfg.dead_zone < 0 {
            return Err(invalid("channel dead_zone must be >= 0"));
        }
        if !(1..=cfg.target_max).contains(&cfg.ceiling) {
            return Err(invalid("channel ceiling must be in [1, target_max]"));
        }
        if !cfg.weight.is_finite() || cfg.weight < 0.0 {
            return Err(invalid("channel weight must be finite and >= 0"));
        }
        let b = cfg.default_bounds;
        if b.low > s.raw_max || b.high > s.raw_max {
            return Err(invalid("channel default bounds exceed raw_max"));
        }
        if b.is_degenerate() {
            return Err(invalid("channel default bounds must differ"));
        }
    }
    Ok(())
}

/// Validate settings, load the stored profile and construct a `Gauge`.
///
/// This is the single source of truth for construction, used by both
/// `GaugeBuilder::try_build()` and `build_gauge()`.
pub fn build_gauge<S: SensorSource, B: ButtonInput, P: BlockStore>(
    sensors: S,
    button: B,
    store: P,
    settings: GaugeSettings,
    clock: Option<Box<dyn Clock + Send + Sync>>,
) -> Result<Gauge<S, B, P>> {
    validate(&settings)?;
    let GaugeSettings {
        sampling,
        smoothing,
        aggregate,
        mut calibration,
        channels,
    } = settings;

    let noise = NoiseFilter::new(sampling.burst_size, sampling.vref_num, sampling.vref_den)
        .map_err(eyre::Report::new)?;

    // Config bounds and seed are raw counts; profiles hold filter output.
    let filter_max = sampling.filter_max();
    calibration.seed = sampling.to_filter_units(calibration.seed);
    let mut store = ProfileStore::new(store, filter_max, channels.default_profile(&sampling));
    let (profile, source) = store.load_with_source();
    tracing::info!(?source, filter_max, "calibration profile ready");

    let label = aggregate.label.clone();
    let weights = channels.weights();
    let state = PipelineState::new(
        profile,
        noise,
        RangeMapper::new(channels, filter_max),
        Aggregator::new(aggregate, weights),
        smoothing,
        CalibrationController::new(calibration, filter_max),
    );

    let clock: Arc<dyn Clock + Send + Sync> = match clock {
        Some(b) => Arc::from(b),
        None => Arc::new(MonotonicClock::new()),
    };
    let epoch = clock.now();
    let period_us = crate::util::period_us(sampling.tick_hz);

    Ok(Gauge {
        sensors,
        button,
        store,
        state,
        sampling,
        label,
        clock,
        epoch,
        period_us,
        ticks: 0,
        read_failures: 0,
    })
}

impl<S, B, P> GaugeBuilder<S, B, P> {
    /// Fallible build available in any type-state; reports missing pieces.
    pub fn try_build(self) -> Result<DynGauge> {
        let sensors = self
            .sensors
            .ok_or_else(|| eyre::Report::new(BuildError::MissingSensors))?;
        let button = self
            .button
            .ok_or_else(|| eyre::Report::new(BuildError::MissingButton))?;
        let store = self
            .store
            .ok_or_else(|| eyre::Report::new(BuildError::MissingStore))?;
        build_gauge(sensors, button, store, self.settings, self.clock)
    }
}

/// Chainable setters that do not affect type-state.
impl<S, B, P> GaugeBuilder<S, B, P> {
    pub fn with_settings(mut self, settings: GaugeSettings) -> Self {
        self.settings = settings;
        self
    }
    pub fn with_sampling(mut self, sampling: SamplingCfg) -> Self {
        self.settings.sampling = sampling;
        self
    }
    pub fn with_smoothing(mut self, smoothing: SmoothingCfg) -> Self {
        self.settings.smoothing = smoothing;
        self
    }
    pub fn with_aggregate(mut self, aggregate: AggregateCfg) -> Self {
        self.settings.aggregate = aggregate;
        self
    }
    pub fn with_calibration(mut self, calibration: CalibrationCfg) -> Self {
        self.settings.calibration = calibration;
        self
    }
    pub fn with_channels(mut self, channels: ChannelTable) -> Self {
        self.settings.channels = channels;
        self
    }
    /// Provide a custom clock; defaults to `MonotonicClock`.
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }
}

// Setters that advance type-state
impl<B, P> GaugeBuilder<Missing, B, P> {
    pub fn with_sensors(self, sensors: impl SensorSource + 'static) -> GaugeBuilder<Set, B, P> {
        GaugeBuilder {
            sensors: Some(Box::new(sensors)),
            button: self.button,
            store: self.store,
            settings: self.settings,
            clock: self.clock,
            _s: PhantomData,
            _b: PhantomData,
            _p: PhantomData,
        }
    }
}

impl<S, P> GaugeBuilder<S, Missing, P> {
    pub fn with_button(self, button: impl ButtonInput + 'static) -> GaugeBuilder<S, Set, P> {
        GaugeBuilder {
            sensors: self.sensors,
            button: Some(Box::new(button)),
            store: self.store,
            settings: self.settings,
            clock: self.clock,
            _s: PhantomData,
            _b: PhantomData,
            _p: PhantomData,
        }
    }
}

impl<S, B> GaugeBuilder<S, B, Missing> {
    pub fn with_store(self, store: impl BlockStore + 'static) -> GaugeBuilder<S, B, Set> {
        GaugeBuilder {
            sensors: self.sensors,
            button: self.button,
            store: Some(Box::new(store)),
            settings: self.settings,
            clock: self.clock,
            _s: PhantomData,
            _b: PhantomData,
            _p: PhantomData,
        }
    }
}

impl GaugeBuilder<Set, Set, Set> {
    /// Validate and build. Only available once sensors, button and store are set.
    pub fn build(self) -> Result<DynGauge> {
        self.try_build()
    }
}
