#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and calibration-profile CSV handling for the gauge.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//!   Every section has defaults, so an empty document is a working config
//!   for the stock exhibit panel.
//! - Per-channel sections are sparse overrides on top of the factory table
//!   (`factory_channel`); `Config::channel` resolves them.
//! - The profile CSV loader enforces headers and rejects incomplete or
//!   degenerate profiles before anything reaches the store.
use gauge_traits::Channel;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// ADC full-scale value of the stock 10-bit converter.
pub const DEFAULT_RAW_MAX: u16 = 1023;

/// Smallest burst the trimmed-mean noise filter accepts (its mid window).
pub const MIN_BURST_SIZE: usize = 10;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Sampling {
    /// Reads per channel per tick fed to the noise filter
    pub burst_size: usize,
    /// Largest raw value the ADC can report
    pub raw_max: u16,
    /// Reference-voltage correction applied to the filtered value: num/den
    pub vref_num: u32,
    pub vref_den: u32,
    /// Control loop rate
    pub tick_hz: u32,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            burst_size: 20,
            raw_max: DEFAULT_RAW_MAX,
            vref_num: 1100,
            vref_den: 1023,
            tick_hz: 20,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SmoothingStrategy {
    #[default]
    Exponential,
    Window,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SmoothingScope {
    /// Smooth the aggregated estimate once per tick
    #[default]
    Aggregate,
    /// Smooth every channel's filtered raw value before mapping
    Channel,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Smoothing {
    pub strategy: SmoothingStrategy,
    /// Weight of the previous smoothed value, clamped to [0.0, 0.99] at use.
    pub alpha: f32,
    /// Sliding window length (samples) for the window strategy
    pub window: usize,
    pub scope: SmoothingScope,
}

impl Default for Smoothing {
    fn default() -> Self {
        Self {
            strategy: SmoothingStrategy::Exponential,
            alpha: 0.9,
            window: 150,
            scope: SmoothingScope::Aggregate,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Aggregate {
    /// Largest displayable estimate (three digits)
    pub ceiling: u16,
    /// Estimate that maps onto `hue_at_full`
    pub full_scale: i32,
    pub hue_at_zero: i32,
    pub hue_at_full: i32,
    /// Hue never drops below this, low readings stay legible
    pub hue_floor: i32,
    /// Unit label drawn under the digits
    pub label: String,
}

impl Default for Aggregate {
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

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CalibrationCfg {
    /// Length of the collecting window in milliseconds
    pub duration_ms: u64,
    /// Button level must hold this long before it counts as an edge
    pub debounce_ms: u64,
    /// Seed for both running bounds; defaults to the mid-range raw value
    pub seed: Option<u16>,
}

impl Default for CalibrationCfg {
    fn default() -> Self {
        Self {
            duration_ms: 30_000,
            debounce_ms: 100,
            seed: None,
        }
    }
}

/// Fully resolved per-channel parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelSpec {
    /// Output of the linear map spans [0, target_max]
    pub target_max: i32,
    /// Mapped values strictly below this snap to 0
    pub dead_zone: i32,
    /// Mapped values above this snap to it
    pub ceiling: i32,
    /// Low raw bound maps to target_max instead of 0
    pub inverted: bool,
    /// Contribution factor in the aggregate sum
    pub weight: f32,
    /// Factory bounds used until a calibration run is committed
    pub default_low: u16,
    pub default_high: u16,
}

/// Stock panel values. All sliders on the panel are wired so that pushing
/// them up lowers the raw reading.
pub fn factory_channel(channel: Channel) -> ChannelSpec {
    let (low, high, target_max, dead_zone, weight) = match channel {
        Channel::Shower => (50, 950, 40, 4, 1.0),
        Channel::Toilet => (118, 940, 50, 0, 0.16),
        Channel::Sink => (540, 930, 40, 0, 1.0),
        Channel::Dishes => (69, 949, 8, 2, 1.0),
        Channel::Laundry => (80, 800, 900, 10, 1.0),
        Channel::Lawn => (51, 786, 28, 2, 1.0),
    };
    ChannelSpec {
        target_max,
        dead_zone,
        ceiling: target_max,
        inverted: true,
        weight,
        default_low: low,
        default_high: high,
    }
}

/// Sparse TOML override for one channel.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ChannelOverride {
    pub target_max: Option<i32>,
    pub dead_zone: Option<i32>,
    pub ceiling: Option<i32>,
    pub inverted: Option<bool>,
    pub weight: Option<f32>,
    pub default_low: Option<u16>,
    pub default_high: Option<u16>,
}

impl ChannelOverride {
    pub fn resolve(&self, base: ChannelSpec) -> ChannelSpec {
        let target_max = self.target_max.unwrap_or(base.target_max);
        ChannelSpec {
            target_max,
            dead_zone: self.dead_zone.unwrap_or(base.dead_zone),
            // A raised target without an explicit ceiling keeps the full range.
            ceiling: self.ceiling.unwrap_or(if self.target_max.is_some() {
                target_max
            } else {
                base.ceiling
            }),
            inverted: self.inverted.unwrap_or(base.inverted),
            weight: self.weight.unwrap_or(base.weight),
            default_low: self.default_low.unwrap_or(base.default_low),
            default_high: self.default_high.unwrap_or(base.default_high),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Channels {
    pub shower: ChannelOverride,
    pub toilet: ChannelOverride,
    pub sink: ChannelOverride,
    pub dishes: ChannelOverride,
    pub laundry: ChannelOverride,
    pub lawn: ChannelOverride,
}

impl Channels {
    pub fn get(&self, channel: Channel) -> &ChannelOverride {
        match channel {
            Channel::Shower => &self.shower,
            Channel::Toilet => &self.toilet,
            Channel::Sink => &self.sink,
            Channel::Dishes => &self.dishes,
            Channel::Laundry => &self.laundry,
            Channel::Lawn => &self.lawn,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Store {
    /// File holding the persisted calibration profile record
    pub path: PathBuf,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            path: PathBuf::from("gauge_profile.bin"),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

/// ADC input number per logical channel.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct AdcChannels {
    pub shower: u8,
    pub toilet: u8,
    pub sink: u8,
    pub dishes: u8,
    pub laundry: u8,
    pub lawn: u8,
}

impl Default for AdcChannels {
    fn default() -> Self {
        Self {
            shower: 0,
            toilet: 1,
            sink: 2,
            lawn: 3,
            laundry: 4,
            dishes: 5,
        }
    }
}

impl AdcChannels {
    pub fn get(&self, channel: Channel) -> u8 {
        match channel {
            Channel::Shower => self.shower,
            Channel::Toilet => self.toilet,
            Channel::Sink => self.sink,
            Channel::Dishes => self.dishes,
            Channel::Laundry => self.laundry,
            Channel::Lawn => self.lawn,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Hardware {
    pub spi_bus: u8,
    pub spi_ss: u8,
    pub spi_clock_hz: u32,
    pub button_pin: u8,
    /// Treat low level as pressed when true
    pub button_active_low: bool,
    pub adc_channels: AdcChannels,
}

impl Default for Hardware {
    fn default() -> Self {
        Self {
            spi_bus: 0,
            spi_ss: 0,
            spi_clock_hz: 1_350_000,
            button_pin: 17,
            button_active_low: true,
            adc_channels: AdcChannels::default(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub sampling: Sampling,
    pub smoothing: Smoothing,
    pub aggregate: Aggregate,
    pub calibration: CalibrationCfg,
    pub channels: Channels,
    pub store: Store,
    pub logging: Logging,
    pub hardware: Hardware,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    /// Resolved parameters for `channel` (factory table plus overrides).
    pub fn channel(&self, channel: Channel) -> ChannelSpec {
        self.channels.get(channel).resolve(factory_channel(channel))
    }

    /// Seed for the calibration running bounds.
    pub fn calibration_seed(&self) -> u16 {
        self.calibration.seed.unwrap_or(self.sampling.raw_max / 2)
    }

    pub fn validate(&self) -> eyre::Result<()> {
        // Sampling
        if self.sampling.burst_size < MIN_BURST_SIZE {
            eyre::bail!("sampling.burst_size must be >= {MIN_BURST_SIZE}");
        }
        if self.sampling.burst_size > 4096 {
            eyre::bail!("sampling.burst_size is unreasonably large (>4096)");
        }
        if self.sampling.raw_max == 0 {
            eyre::bail!("sampling.raw_max must be > 0");
        }
        if self.sampling.vref_num == 0 || self.sampling.vref_den == 0 {
            eyre::bail!("sampling.vref_num and sampling.vref_den must be > 0");
        }
        if self.sampling.tick_hz == 0 {
            eyre::bail!("sampling.tick_hz must be > 0");
        }
        if self.sampling.tick_hz > 1000 {
            eyre::bail!("sampling.tick_hz must be <= 1000");
        }

        // Smoothing
        if !self.smoothing.alpha.is_finite() {
            eyre::bail!("smoothing.alpha must be finite");
        }
        if self.smoothing.window == 0 {
            eyre::bail!("smoothing.window must be >= 1");
        }
        if self.smoothing.window > 4096 {
            eyre::bail!("smoothing.window is unreasonably large (>4096)");
        }

        // Aggregate
        if self.aggregate.ceiling == 0 || self.aggregate.ceiling > 999 {
            eyre::bail!("aggregate.ceiling must be in [1, 999]");
        }
        if self.aggregate.full_scale <= 0 {
            eyre::bail!("aggregate.full_scale must be > 0");
        }
        if self.aggregate.hue_floor < 0 {
            eyre::bail!("aggregate.hue_floor must be >= 0");
        }
        if self.aggregate.hue_at_zero < 0 || self.aggregate.hue_at_full < 0 {
            eyre::bail!("aggregate.hue_at_zero and aggregate.hue_at_full must be >= 0");
        }
        if self.aggregate.hue_at_zero.max(self.aggregate.hue_at_full) > i32::from(u16::MAX) {
            eyre::bail!("aggregate hue range must fit in 16 bits");
        }

        // Calibration
        if self.calibration.duration_ms == 0 {
            eyre::bail!("calibration.duration_ms must be >= 1");
        }
        if self.calibration.duration_ms > 10 * 60 * 1000 {
            eyre::bail!("calibration.duration_ms is unreasonably large (>10min)");
        }
        if self.calibration.debounce_ms > 5_000 {
            eyre::bail!("calibration.debounce_ms is unreasonably large (>5s)");
        }
        if self.calibration_seed() > self.sampling.raw_max {
            eyre::bail!("calibration.seed must be <= sampling.raw_max");
        }

        // Channels
        for ch in Channel::ALL {
            let spec = self.channel(ch);
            if spec.target_max <= 0 {
                eyre::bail!("channels.{ch}.target_max must be > 0");
            }
            if spec.dead_zone < 0 || spec.dead_zone > spec.target_max {
                eyre::bail!("channels.{ch}.dead_zone must be in [0, target_max]");
            }
            if spec.ceiling <= 0 || spec.ceiling > spec.target_max {
                eyre::bail!("channels.{ch}.ceiling must be in [1, target_max]");
            }
            if !spec.weight.is_finite() || spec.weight < 0.0 {
                eyre::bail!("channels.{ch}.weight must be finite and >= 0");
            }
            if spec.default_low > self.sampling.raw_max || spec.default_high > self.sampling.raw_max
            {
                eyre::bail!("channels.{ch} default bounds must be <= sampling.raw_max");
            }
            if spec.default_low == spec.default_high {
                eyre::bail!("channels.{ch}.default_low must differ from default_high");
            }
        }

        // Store
        if self.store.path.as_os_str().is_empty() {
            eyre::bail!("store.path must not be empty");
        }

        // Hardware
        if self.hardware.spi_clock_hz == 0 {
            eyre::bail!("hardware.spi_clock_hz must be > 0");
        }
        let mut seen = [false; 8];
        for ch in Channel::ALL {
            let adc = usize::from(self.hardware.adc_channels.get(ch));
            if adc >= seen.len() {
                eyre::bail!("hardware.adc_channels.{ch} must be in [0, 7]");
            }
            if seen[adc] {
                eyre::bail!("hardware.adc_channels.{ch} reuses ADC input {adc}");
            }
            seen[adc] = true;
        }

        Ok(())
    }
}

/// Calibration profile CSV schema.
///
/// Expected headers:
/// channel,raw_low,raw_high
///
/// Example:
/// channel,raw_low,raw_high
/// shower,50,950
/// toilet,118,940
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProfileRow {
    pub channel: String,
    pub raw_low: u16,
    pub raw_high: u16,
}

/// `(raw_low, raw_high)` per channel, in `Channel` order.
pub type ProfileBounds = [(u16, u16); Channel::COUNT];

const PROFILE_HEADERS: [&str; 3] = ["channel", "raw_low", "raw_high"];

/// Check a full set of rows: one per channel, in range, not degenerate.
pub fn profile_from_rows(rows: &[ProfileRow], full_scale: u16) -> eyre::Result<ProfileBounds> {
    let mut out: [Option<(u16, u16)>; Channel::COUNT] = [None; Channel::COUNT];
    for (idx, row) in rows.iter().enumerate() {
        let Some(ch) = Channel::from_name(&row.channel) else {
            eyre::bail!("row {}: unknown channel '{}'", idx + 2, row.channel);
        };
        if row.raw_low > full_scale || row.raw_high > full_scale {
            eyre::bail!("row {}: bounds for {ch} exceed full scale {full_scale}", idx + 2);
        }
        if row.raw_low == row.raw_high {
            eyre::bail!("row {}: raw_low equals raw_high for {ch}", idx + 2);
        }
        let slot = &mut out[ch.index()];
        if slot.is_some() {
            eyre::bail!("row {}: duplicate channel {ch}", idx + 2);
        }
        *slot = Some((row.raw_low, row.raw_high));
    }

    let mut bounds: ProfileBounds = [(0, 0); Channel::COUNT];
    for ch in Channel::ALL {
        match out[ch.index()] {
            Some(b) => bounds[ch.index()] = b,
            None => eyre::bail!("calibration profile is missing channel {ch}"),
        }
    }
    Ok(bounds)
}

pub fn load_profile_csv(path: &std::path::Path, full_scale: u16) -> eyre::Result<ProfileBounds> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open profile CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != PROFILE_HEADERS {
        eyre::bail!(
            "profile CSV must have headers 'channel,raw_low,raw_high', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<ProfileRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }

    profile_from_rows(&rows, full_scale)
}

pub fn write_profile_csv(path: &std::path::Path, bounds: &ProfileBounds) -> eyre::Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .map_err(|e| eyre::eyre!("create profile CSV {:?}: {}", path, e))?;
    for ch in Channel::ALL {
        let (raw_low, raw_high) = bounds[ch.index()];
        wtr.serialize(ProfileRow {
            channel: ch.name().to_string(),
            raw_low,
            raw_high,
        })
        .map_err(|e| eyre::eyre!("write profile CSV {:?}: {}", path, e))?;
    }
    wtr.flush()
        .map_err(|e| eyre::eyre!("flush profile CSV {:?}: {}", path, e))?;
    Ok(())
}
