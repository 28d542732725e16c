#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_possible_wrap
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Consumption gauge pipeline (hardware-agnostic).
//!
//! Six slider positions go in, one bounded consumption estimate comes out.
//! All hardware goes through the `gauge_traits` collaborator traits.
//!
//! ## Architecture
//!
//! - **Noise filter**: trimmed mean around the median of a read burst (`noise`)
//! - **Range mapper**: calibrated linear remap with dead zone and ceiling (`mapper`)
//! - **Smoother**: exponential or sliding-window, per aggregate or per channel (`smoother`)
//! - **Aggregator**: weighted sum, display clamp and hue (`aggregate`)
//! - **Calibration**: debounced button, timed min/max collection, commit (`controller`)
//! - **Persistence**: fixed-layout profile record and store fallback policy
//!   (`profile`, `store`)
//!
//! `Gauge::step` runs one tick; `runner::run` paces ticks and renders them.
//!
//! ## Arithmetic
//!
//! Raw and mapped values are `i32` with truncating integer division, so the
//! same inputs give the same outputs on every target. Only the exponential
//! smoother and the aggregate weights use `f32`.

pub mod aggregate;
pub mod builder;
pub mod config;
pub mod controller;
pub mod conversions;
pub mod core;
pub mod debounce;
pub mod error;
pub mod hw_error;
pub mod mapper;
pub mod noise;
pub mod profile;
pub mod render;
pub mod runner;
pub mod session;
pub mod smoother;
pub mod state;
pub mod store;
pub mod util;

pub use aggregate::{AggregateReading, Aggregator};
pub use builder::{DynGauge, GaugeBuilder, GaugeSettings, build_gauge};
pub use config::{
    AggregateCfg, CalibrationCfg, ChannelCfg, ChannelTable, SamplingCfg, SmoothingCfg,
    SmoothingScope,
};
pub use controller::{Action, CalibrationController, CalibrationState, Phase};
pub use core::Gauge;
pub use debounce::{Debouncer, Edge};
pub use error::{BuildError, GaugeError, ProfileError, Report, Result};
pub use mapper::{RangeMapper, map_value};
pub use noise::NoiseFilter;
pub use profile::{CalibrationProfile, RawBounds};
pub use render::{Frame, render};
pub use runner::RunStats;
pub use session::CalibrationSession;
pub use smoother::{SampleWindow, Smoother, SmoothingKind};
pub use state::PipelineState;
pub use store::{LoadSource, ProfileStore};

pub use gauge_traits::Channel;
