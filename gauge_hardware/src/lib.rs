pub mod display;
pub mod error;
pub mod store;
pub mod util;

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod hardware;

pub use display::TerminalDisplay;
pub use error::HwError;
pub use store::{FileStore, MemoryStore};

use gauge_traits::{ButtonInput, Channel, SensorSource};
use std::cell::{Cell, RefCell};
use std::ops::Range;
use std::rc::Rc;

/// How one simulated slider moves between reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderMotion {
    Fixed(u16),
    /// Triangle wave `low -> high -> low` over `period` reads.
    Sweep { low: u16, high: u16, period: u32 },
}

impl SliderMotion {
    fn at(self, read: u64) -> u16 {
        match self {
            SliderMotion::Fixed(v) => v,
            SliderMotion::Sweep { low, high, period } => {
                let half = u64::from((period / 2).max(1));
                let phase = read % (half * 2);
                let span = i64::from(high) - i64::from(low);
                let pos = if phase < half {
                    phase as i64
                } else {
                    (half * 2 - phase) as i64
                };
                (i64::from(low) + span * pos / half as i64) as u16
            }
        }
    }
}

#[derive(Debug)]
struct SoftpotState {
    motion: [SliderMotion; Channel::COUNT],
    reads: [u64; Channel::COUNT],
    failures: [u32; Channel::COUNT],
    jitter: u16,
    rng: u64,
    raw_max: u16,
}

impl SoftpotState {
    /// xorshift64; deterministic for a given seed.
    fn next_rand(&mut self) -> u64 {
        let mut x = self.rng;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.rng = x;
        x
    }
}

/// Simulated slider bank.
///
/// Positions are shared with every [`SoftpotHandle`] so a test can move
/// sliders while the gauge owns the source.
pub struct SimulatedSoftpots {
    state: Rc<RefCell<SoftpotState>>,
}

/// Control side of a [`SimulatedSoftpots`].
#[derive(Clone)]
pub struct SoftpotHandle {
    state: Rc<RefCell<SoftpotState>>,
}

impl SimulatedSoftpots {
    /// All sliders parked at `positions`, no jitter.
    pub fn new(positions: [u16; Channel::COUNT], raw_max: u16) -> Self {
        Self {
            state: Rc::new(RefCell::new(SoftpotState {
                motion: positions.map(SliderMotion::Fixed),
                reads: [0; Channel::COUNT],
                failures: [0; Channel::COUNT],
                jitter: 0,
                rng: 0x9E37_79B9_7F4A_7C15,
                raw_max,
            })),
        }
    }

    /// Add `±amplitude` of pseudo-random noise to every read.
    pub fn with_jitter(self, amplitude: u16, seed: u64) -> Self {
        {
            let mut s = self.state.borrow_mut();
            s.jitter = amplitude;
            s.rng = seed.max(1);
        }
        self
    }

    pub fn handle(&self) -> SoftpotHandle {
        SoftpotHandle {
            state: Rc::clone(&self.state),
        }
    }
}

impl SoftpotHandle {
    pub fn set(&self, channel: Channel, raw: u16) {
        self.set_motion(channel, SliderMotion::Fixed(raw));
    }

    pub fn set_all(&self, positions: [u16; Channel::COUNT]) {
        self.state.borrow_mut().motion = positions.map(SliderMotion::Fixed);
    }

    pub fn set_motion(&self, channel: Channel, motion: SliderMotion) {
        self.state.borrow_mut().motion[channel.index()] = motion;
    }

    /// Make the next `reads` reads of `channel` fail.
    pub fn fail_reads(&self, channel: Channel, reads: u32) {
        self.state.borrow_mut().failures[channel.index()] = reads;
    }

    /// Successful reads served for `channel` so far.
    pub fn reads(&self, channel: Channel) -> u64 {
        self.state.borrow().reads[channel.index()]
    }
}

impl SensorSource for SimulatedSoftpots {
    fn read(&mut self, channel: Channel) -> Result<u16, Box<dyn std::error::Error + Send + Sync>> {
        let mut s = self.state.borrow_mut();
        let i = channel.index();
        if s.failures[i] > 0 {
            s.failures[i] -= 1;
            return Err(Box::new(HwError::Disconnected(channel.name())));
        }
        let base = s.motion[i].at(s.reads[i]);
        s.reads[i] += 1;
        let j = s.jitter;
        let v = if j == 0 {
            base
        } else {
            let offset = (s.next_rand() % (2 * u64::from(j) + 1)) as i64 - i64::from(j);
            (i64::from(base) + offset).clamp(0, i64::from(s.raw_max)) as u16
        };
        Ok(v.min(s.raw_max))
    }
}

/// Button whose level is set from outside.
#[derive(Default)]
pub struct SimulatedButton {
    level: Rc<Cell<bool>>,
}

impl SimulatedButton {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared level; `set(true)` holds the button down.
    pub fn handle(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.level)
    }
}

impl ButtonInput for SimulatedButton {
    fn is_pressed(&mut self) -> bool {
        self.level.get()
    }
}

/// Button held down during fixed ranges of poll counts.
#[derive(Debug, Clone, Default)]
pub struct ScriptedButton {
    held: Vec<Range<u64>>,
    polls: u64,
}

impl ScriptedButton {
    pub fn new(held: Vec<Range<u64>>) -> Self {
        Self { held, polls: 0 }
    }

    /// Hold for `polls` polls starting at poll `at`.
    pub fn press_at(at: u64, polls: u64) -> Self {
        Self::new(vec![at..at.saturating_add(polls)])
    }
}

impl ButtonInput for ScriptedButton {
    fn is_pressed(&mut self) -> bool {
        let n = self.polls;
        self.polls = self.polls.saturating_add(1);
        self.held.iter().any(|r| r.contains(&n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_is_a_triangle() {
        let m = SliderMotion::Sweep {
            low: 100,
            high: 500,
            period: 8,
        };
        let seq: Vec<u16> = (0..9).map(|r| m.at(r)).collect();
        assert_eq!(seq, [100, 200, 300, 400, 500, 400, 300, 200, 100]);
    }

    #[test]
    fn scripted_button_follows_script() {
        let mut b = ScriptedButton::press_at(2, 3);
        let levels: Vec<bool> = (0..6).map(|_| b.is_pressed()).collect();
        assert_eq!(levels, [false, false, true, true, true, false]);
    }

    #[test]
    fn jitter_stays_in_band_and_range() {
        let mut s = SimulatedSoftpots::new([1020; Channel::COUNT], 1023).with_jitter(5, 42);
        for _ in 0..200 {
            let v = s.read(Channel::Sink).unwrap();
            assert!((1015..=1023).contains(&v), "{v}");
        }
    }

    #[test]
    fn injected_failures_run_out() {
        let mut s = SimulatedSoftpots::new([300; Channel::COUNT], 1023);
        let h = s.handle();
        h.fail_reads(Channel::Lawn, 2);
        assert!(s.read(Channel::Lawn).is_err());
        assert!(s.read(Channel::Lawn).is_err());
        assert_eq!(s.read(Channel::Lawn).unwrap(), 300);
        assert_eq!(h.reads(Channel::Lawn), 1);
    }
}
