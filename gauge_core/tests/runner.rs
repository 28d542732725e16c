use std::sync::atomic::{AtomicBool, Ordering};

use gauge_core::runner::run;
use gauge_core::{
    Channel, Frame, GaugeSettings, SamplingCfg, SmoothingCfg, SmoothingKind, SmoothingScope,
    build_gauge,
};
use gauge_hardware::{MemoryStore, ScriptedButton, SimulatedSoftpots, TerminalDisplay};
use gauge_traits::ManualClock;
use rstest::rstest;

fn settings(smoothing: SmoothingCfg) -> GaugeSettings {
    GaugeSettings {
        sampling: SamplingCfg {
            burst_size: 10,
            vref_num: 1,
            vref_den: 1,
            tick_hz: 10,
            ..SamplingCfg::default()
        },
        smoothing,
        ..GaugeSettings::default()
    }
}

/// Every slider pushed to the `low` end of its factory travel.
fn full_travel() -> [u16; Channel::COUNT] {
    let table = gauge_core::ChannelTable::default();
    Channel::ALL.map(|ch| table.get(ch).default_bounds.low)
}

#[rstest]
fn runs_requested_ticks_at_tick_rate() {
    let clock = ManualClock::new();
    let mut gauge = build_gauge(
        SimulatedSoftpots::new(full_travel(), 1023),
        ScriptedButton::default(),
        MemoryStore::new(),
        settings(SmoothingCfg::default()),
        Some(Box::new(clock.clone())),
    )
    .unwrap();
    let mut display = TerminalDisplay::new(Vec::new());
    let shutdown = AtomicBool::new(false);
    let mut frames = Vec::new();

    let stats = run(&mut gauge, &mut display, Some(5), &shutdown, |f| frames.push(*f)).unwrap();

    assert_eq!(stats.ticks, 5);
    assert_eq!(stats.readings, 5);
    assert_eq!(stats.overruns, 0);
    assert_eq!(frames.len(), 5);
    // 10 Hz
    assert_eq!(gauge.now_ms(), 500);
    assert_eq!(display.presented(), 5);
    assert_eq!(display.last_line(), Some("999 Gal (hue 50)"));
}

#[rstest]
fn shutdown_flag_stops_before_first_tick() {
    let mut gauge = build_gauge(
        SimulatedSoftpots::new([500; Channel::COUNT], 1023),
        ScriptedButton::default(),
        MemoryStore::new(),
        settings(SmoothingCfg::default()),
        Some(Box::new(ManualClock::new())),
    )
    .unwrap();
    let shutdown = AtomicBool::new(true);
    let mut display = TerminalDisplay::new(Vec::new());
    let stats = run(&mut gauge, &mut display, None, &shutdown, |_| {}).unwrap();
    assert_eq!(stats.ticks, 0);
    assert!(shutdown.load(Ordering::Relaxed));
}

#[rstest]
fn scripted_press_leads_to_commit() {
    let store = MemoryStore::new();
    let mut gauge = build_gauge(
        SimulatedSoftpots::new([500; Channel::COUNT], 1023),
        // held for 3 polls at 100 ms per tick: longer than the 100 ms debounce
        ScriptedButton::press_at(2, 3),
        store.clone(),
        GaugeSettings {
            calibration: gauge_core::CalibrationCfg {
                duration_ms: 2_000,
                ..gauge_core::CalibrationCfg::default()
            },
            ..settings(SmoothingCfg::default())
        },
        Some(Box::new(ManualClock::new())),
    )
    .unwrap();
    let mut display = TerminalDisplay::new(Vec::new());
    let stats = run(&mut gauge, &mut display, Some(40), &AtomicBool::new(false), |_| {}).unwrap();
    assert_eq!(stats.commits, 1);
    assert_eq!(stats.countdowns, 20);
    assert_eq!(store.writes(), 1);
}

#[rstest]
#[case::aggregate_ema(SmoothingKind::Exponential { alpha: 0.5 }, SmoothingScope::Aggregate)]
#[case::aggregate_window(SmoothingKind::Window { size: 4 }, SmoothingScope::Aggregate)]
#[case::channel_ema(SmoothingKind::Exponential { alpha: 0.5 }, SmoothingScope::Channel)]
#[case::channel_window(SmoothingKind::Window { size: 4 }, SmoothingScope::Channel)]
fn every_smoothing_setup_settles_on_full_scale(
    #[case] kind: SmoothingKind,
    #[case] scope: SmoothingScope,
) {
    let mut gauge = build_gauge(
        SimulatedSoftpots::new(full_travel(), 1023),
        ScriptedButton::default(),
        MemoryStore::new(),
        settings(SmoothingCfg { kind, scope }),
        Some(Box::new(ManualClock::new())),
    )
    .unwrap();
    let mut last = None;
    for _ in 0..60 {
        last = gauge.step().reading();
    }
    let r = last.unwrap();
    assert_eq!(r.value, 999);
    assert_eq!(r.hue, 50);
    assert!(matches!(gauge.step(), Frame::Reading(_)));
}
