use std::cell::Cell;
use std::rc::Rc;

use gauge_core::{
    CalibrationCfg, CalibrationProfile, CalibrationSession, Channel, Frame, Gauge, GaugeSettings,
    Phase, ProfileStore, RawBounds, SamplingCfg, SmoothingCfg, SmoothingKind, build_gauge,
};
use gauge_hardware::{MemoryStore, SimulatedButton, SimulatedSoftpots, SoftpotHandle};
use gauge_traits::ManualClock;
use proptest::prelude::*;
use rstest::rstest;

const TICK_MS: u64 = 50;
const LOWS: [u16; 6] = [200, 210, 220, 230, 240, 250];
const HIGHS: [u16; 6] = [800, 810, 820, 830, 840, 850];

type SimGauge = Gauge<SimulatedSoftpots, SimulatedButton, MemoryStore>;

struct Rig {
    gauge: SimGauge,
    clock: ManualClock,
    sliders: SoftpotHandle,
    button: Rc<Cell<bool>>,
}

impl Rig {
    fn new(store: MemoryStore) -> Self {
        let clock = ManualClock::new();
        let softpots = SimulatedSoftpots::new([600; Channel::COUNT], 1023);
        let sliders = softpots.handle();
        let button = SimulatedButton::new();
        let level = button.handle();
        let settings = GaugeSettings {
            sampling: SamplingCfg {
                burst_size: 10,
                vref_num: 1,
                vref_den: 1,
                ..SamplingCfg::default()
            },
            smoothing: SmoothingCfg {
                kind: SmoothingKind::Exponential { alpha: 0.0 },
                ..SmoothingCfg::default()
            },
            calibration: CalibrationCfg {
                duration_ms: 1_000,
                debounce_ms: 100,
                seed: 511,
            },
            ..GaugeSettings::default()
        };
        let gauge = build_gauge(
            softpots,
            button,
            store,
            settings,
            Some(Box::new(clock.clone())),
        )
        .unwrap();
        Self {
            gauge,
            clock,
            sliders,
            button: level,
        }
    }

    fn tick(&mut self) -> Frame {
        let f = self.gauge.step();
        self.clock.advance_ms(TICK_MS);
        f
    }

    /// Hold the button until the controller leaves Idle, then release.
    fn press(&mut self) {
        self.button.set(true);
        for _ in 0..10 {
            self.tick();
            if self.gauge.phase() != Phase::Idle {
                break;
            }
        }
        self.button.set(false);
        assert_eq!(self.gauge.phase(), Phase::Armed);
    }

    fn run_until_committed(&mut self) -> bool {
        for _ in 0..200 {
            if let Frame::Committed { saved } = self.tick() {
                return saved;
            }
        }
        panic!("calibration never committed");
    }
}

fn expected_profile() -> CalibrationProfile {
    CalibrationProfile::new(Channel::ALL.map(|ch| {
        RawBounds::new(LOWS[ch.index()], HIGHS[ch.index()])
    }))
}

#[rstest]
fn button_press_runs_full_calibration() {
    let store = MemoryStore::new();
    let mut rig = Rig::new(store.clone());
    let factory = *rig.gauge.profile();

    assert!(matches!(rig.tick(), Frame::Reading(_)));
    rig.press();

    assert_eq!(rig.tick(), Frame::Countdown { seconds_remaining: 1 });
    assert_eq!(rig.gauge.phase(), Phase::Collecting);

    rig.sliders.set_all(LOWS);
    assert!(matches!(rig.tick(), Frame::Countdown { .. }));
    rig.sliders.set_all(HIGHS);
    assert!(rig.run_until_committed());

    assert_eq!(rig.gauge.phase(), Phase::Idle);
    assert_eq!(*rig.gauge.profile(), expected_profile());
    assert_ne!(*rig.gauge.profile(), factory);
    assert_eq!(store.writes(), 1);
    assert!(matches!(rig.tick(), Frame::Reading(_)));
}

#[rstest]
fn committed_profile_survives_restart() {
    let store = MemoryStore::new();
    {
        let mut rig = Rig::new(store.clone());
        rig.press();
        rig.sliders.set_all(LOWS);
        rig.tick();
        rig.tick();
        rig.sliders.set_all(HIGHS);
        assert!(rig.run_until_committed());
    }
    let rebooted = Rig::new(store.clone());
    assert_eq!(*rebooted.gauge.profile(), expected_profile());
}

#[rstest]
fn countdown_decreases_to_deadline() {
    let mut rig = Rig::new(MemoryStore::new());
    rig.gauge.start_calibration();
    let mut seen = Vec::new();
    loop {
        match rig.tick() {
            Frame::Countdown { seconds_remaining } => seen.push(seconds_remaining),
            Frame::Committed { .. } => break,
            Frame::Reading(_) => panic!("reading during calibration"),
        }
    }
    assert!(seen.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(seen.first(), Some(&1));
    // 1000 ms window at 50 ms ticks
    assert_eq!(seen.len(), 20);
}

#[rstest]
fn press_during_collecting_is_ignored() {
    let mut rig = Rig::new(MemoryStore::new());
    rig.press();
    rig.tick();
    let deadline = rig.gauge.state().controller().session().unwrap().deadline_ms();

    rig.button.set(true);
    for _ in 0..6 {
        assert!(matches!(rig.tick(), Frame::Countdown { .. }));
    }
    rig.button.set(false);
    assert_eq!(
        rig.gauge.state().controller().session().unwrap().deadline_ms(),
        deadline
    );
}

#[rstest]
fn short_bounce_does_not_arm() {
    let mut rig = Rig::new(MemoryStore::new());
    rig.button.set(true);
    rig.tick();
    rig.button.set(false);
    for _ in 0..10 {
        assert!(matches!(rig.tick(), Frame::Reading(_)));
    }
    assert_eq!(rig.gauge.phase(), Phase::Idle);
}

#[rstest]
#[case(1, true)]
#[case(2, false)]
fn commit_retries_once(#[case] failures: u32, #[case] saved: bool) {
    let store = MemoryStore::new();
    let mut rig = Rig::new(store.clone());
    let before = *rig.gauge.profile();
    store.fail_writes(failures);

    rig.gauge.start_calibration();
    rig.tick();
    rig.sliders.set_all(LOWS);
    rig.tick();
    rig.sliders.set_all(HIGHS);
    assert_eq!(rig.run_until_committed(), saved);

    if saved {
        assert_eq!(*rig.gauge.profile(), expected_profile());
        assert_eq!(store.writes(), 1);
    } else {
        assert_eq!(*rig.gauge.profile(), before);
        assert!(store.block().is_none());
    }
    assert_eq!(rig.gauge.phase(), Phase::Idle);
}

#[rstest]
fn untouched_slider_commits_widened_bounds() {
    let store = MemoryStore::new();
    let mut rig = Rig::new(store.clone());
    rig.sliders.set_all([511; Channel::COUNT]);
    rig.gauge.start_calibration();
    assert!(rig.run_until_committed());
    for (_, b) in rig.gauge.profile().iter() {
        assert_eq!(b, RawBounds::new(510, 512));
    }
    let mut reopened = ProfileStore::new(store, 1023, *rig.gauge.profile());
    assert_eq!(reopened.load(), *rig.gauge.profile());
}

#[rstest]
fn failed_read_reuses_last_value() {
    let mut rig = Rig::new(MemoryStore::new());
    rig.tick();
    let before = *rig.gauge.state().last_raw();
    rig.sliders.set(Channel::Sink, 300);
    rig.sliders.fail_reads(Channel::Sink, 1);
    assert!(matches!(rig.tick(), Frame::Reading(_)));
    assert_eq!(rig.gauge.read_failures(), 1);
    assert_eq!(
        rig.gauge.state().last_raw()[Channel::Sink.index()],
        before[Channel::Sink.index()]
    );
    rig.tick();
    assert_eq!(rig.gauge.state().last_raw()[Channel::Sink.index()], 300);
}

proptest! {
    #[test]
    fn running_bounds_only_widen(
        readings in proptest::collection::vec(proptest::array::uniform6(0u16..=1023), 1..100),
        seed in 0u16..=1023,
    ) {
        let mut s = CalibrationSession::new(0, 30_000, seed);
        let mut prev = Channel::ALL.map(|ch| s.bounds(ch));
        for r in &readings {
            s.observe(r);
            for ch in Channel::ALL {
                let b = s.bounds(ch);
                let p = prev[ch.index()];
                prop_assert!(b.low <= p.low);
                prop_assert!(b.high >= p.high);
                prop_assert!(b.low <= r[ch.index()] && r[ch.index()] <= b.high);
            }
            prev = Channel::ALL.map(|ch| s.bounds(ch));
        }
    }
}
