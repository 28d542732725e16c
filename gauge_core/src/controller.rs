//! Button-triggered calibration state machine.
//!
//! `Idle -> Armed -> Collecting -> Committing -> Idle`, advanced once per tick
//! by [`CalibrationController::on_tick`]. The controller never touches
//! hardware or storage itself; it tells the caller what the tick is for via
//! [`Action`] and is fed raw readings and the commit outcome back.

use gauge_traits::Channel;

use crate::config::CalibrationCfg;
use crate::debounce::{Debouncer, Edge};
use crate::profile::CalibrationProfile;
use crate::session::CalibrationSession;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalibrationState {
    Idle,
    /// A press was accepted; collection starts on the next tick.
    Armed,
    Collecting(CalibrationSession),
    /// Collection finished; the profile waits for the caller to persist it.
    Committing(CalibrationProfile),
}

/// Data-free view of [`CalibrationState`] for logs and status output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Armed,
    Collecting,
    Committing,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Armed => "armed",
            Phase::Collecting => "collecting",
            Phase::Committing => "committing",
        }
    }
}

impl core::fmt::Display for Phase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the current tick must do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Normal read, filter, map, smooth, aggregate.
    RunPipeline,
    /// Read raw channels into the session and show the countdown.
    Collect { seconds_remaining: u32 },
    /// Persist this profile, then call `finish_commit`.
    Commit(CalibrationProfile),
}

#[derive(Debug, Clone)]
pub struct CalibrationController {
    cfg: CalibrationCfg,
    bound_max: u16,
    debouncer: Debouncer,
    state: CalibrationState,
}

impl CalibrationController {
    pub fn new(cfg: CalibrationCfg, bound_max: u16) -> Self {
        let debouncer = Debouncer::new(cfg.debounce_ms);
        Self {
            cfg,
            bound_max,
            debouncer,
            state: CalibrationState::Idle,
        }
    }

    pub fn state(&self) -> &CalibrationState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            CalibrationState::Idle => Phase::Idle,
            CalibrationState::Armed => Phase::Armed,
            CalibrationState::Collecting(_) => Phase::Collecting,
            CalibrationState::Committing(_) => Phase::Committing,
        }
    }

    pub fn session(&self) -> Option<&CalibrationSession> {
        match &self.state {
            CalibrationState::Collecting(s) => Some(s),
            _ => None,
        }
    }

    /// Advance the machine by one tick.
    ///
    /// `pressed` is the raw button level for this tick. Presses are only
    /// acted on in `Idle`; during a run they are ignored.
    pub fn on_tick(&mut self, pressed: bool, now_ms: u64) -> Action {
        let edge = self.debouncer.update(pressed, now_ms);

        match &mut self.state {
            CalibrationState::Idle => {
                if edge == Some(Edge::Pressed) {
                    tracing::info!(now_ms, "calibration armed by button");
                    self.state = CalibrationState::Armed;
                }
                Action::RunPipeline
            }
            CalibrationState::Armed => {
                let session = CalibrationSession::new(now_ms, self.cfg.duration_ms, self.cfg.seed);
                let seconds_remaining = session.seconds_remaining(now_ms);
                tracing::info!(
                    duration_ms = self.cfg.duration_ms,
                    seed = self.cfg.seed,
                    "calibration collecting"
                );
                self.state = CalibrationState::Collecting(session);
                Action::Collect { seconds_remaining }
            }
            CalibrationState::Collecting(session) => {
                if edge == Some(Edge::Pressed) {
                    tracing::debug!("button press ignored during calibration");
                }
                if session.is_due(now_ms) {
                    let profile = session.to_profile(self.bound_max);
                    tracing::info!(
                        observations = session.observations(),
                        "calibration window closed"
                    );
                    self.state = CalibrationState::Committing(profile);
                    Action::Commit(profile)
                } else {
                    Action::Collect {
                        seconds_remaining: session.seconds_remaining(now_ms),
                    }
                }
            }
            CalibrationState::Committing(profile) => Action::Commit(*profile),
        }
    }

    /// Feed one raw reading per channel. Ignored outside `Collecting`.
    pub fn observe(&mut self, raw: &[u16; Channel::COUNT]) -> bool {
        match &mut self.state {
            CalibrationState::Collecting(session) => {
                session.observe(raw);
                true
            }
            _ => false,
        }
    }

    /// Arm a run without a button press. Returns `false` when a run is
    /// already in progress.
    pub fn arm(&mut self) -> bool {
        if self.state == CalibrationState::Idle {
            tracing::info!("calibration armed");
            self.state = CalibrationState::Armed;
            true
        } else {
            false
        }
    }

    /// Leave `Committing` for `Idle`, handing back the committed profile.
    pub fn finish_commit(&mut self) -> Option<CalibrationProfile> {
        match std::mem::replace(&mut self.state, CalibrationState::Idle) {
            CalibrationState::Committing(profile) => Some(profile),
            other => {
                self.state = other;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> CalibrationCfg {
        CalibrationCfg {
            duration_ms: 2_000,
            debounce_ms: 100,
            seed: 511,
        }
    }

    #[test]
    fn bounce_does_not_arm() {
        let mut c = CalibrationController::new(cfg(), 1023);
        assert_eq!(c.on_tick(true, 0), Action::RunPipeline);
        assert_eq!(c.on_tick(false, 50), Action::RunPipeline);
        assert_eq!(c.on_tick(false, 500), Action::RunPipeline);
        assert_eq!(c.phase(), Phase::Idle);
    }

    #[test]
    fn finish_commit_outside_committing_is_noop() {
        let mut c = CalibrationController::new(cfg(), 1023);
        assert_eq!(c.finish_commit(), None);
        assert!(c.arm());
        assert!(!c.arm());
        assert_eq!(c.finish_commit(), None);
        assert_eq!(c.phase(), Phase::Armed);
    }

    #[test]
    fn observe_outside_collecting_is_ignored() {
        let mut c = CalibrationController::new(cfg(), 1023);
        assert!(!c.observe(&[0; Channel::COUNT]));
    }
}
