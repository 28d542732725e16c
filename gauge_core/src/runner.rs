use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use gauge_traits::{BlockStore, ButtonInput, DisplaySurface, SensorSource};

use crate::core::Gauge;
use crate::error::Result;
use crate::render::{Frame, render};

/// Counters for one `run` invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub ticks: u64,
    pub readings: u64,
    pub countdowns: u64,
    pub commits: u64,
    pub failed_commits: u64,
    /// Ticks whose work took longer than the period.
    pub overruns: u64,
}

impl RunStats {
    fn record(&mut self, frame: &Frame) {
        self.ticks += 1;
        match frame {
            Frame::Reading(_) => self.readings += 1,
            Frame::Countdown { .. } => self.countdowns += 1,
            Frame::Committed { saved: true } => self.commits += 1,
            Frame::Committed { saved: false } => self.failed_commits += 1,
        }
    }
}

/// Drive `gauge` at its tick rate, rendering every frame to `display`.
///
/// Stops after `max_ticks` ticks (if given) or once `shutdown` is set.
/// `on_frame` sees each frame after it was rendered. Display errors end the
/// loop; everything else inside a tick is handled by the gauge.
pub fn run<S, B, P, D>(
    gauge: &mut Gauge<S, B, P>,
    display: &mut D,
    max_ticks: Option<u64>,
    shutdown: &AtomicBool,
    mut on_frame: impl FnMut(&Frame),
) -> Result<RunStats>
where
    S: SensorSource,
    B: ButtonInput,
    P: BlockStore,
    D: DisplaySurface + ?Sized,
{
    let period = Duration::from_micros(gauge.period_us());
    let clock = gauge.clock().clone();
    let mut stats = RunStats::default();
    tracing::info!(
        period_us = gauge.period_us(),
        max_ticks = ?max_ticks,
        "gauge loop started"
    );

    loop {
        if shutdown.load(Ordering::Relaxed) {
            tracing::info!("shutdown requested");
            break;
        }
        if max_ticks.is_some_and(|n| stats.ticks >= n) {
            break;
        }

        let started = clock.now();
        let frame = gauge.step();
        render(&frame, gauge.label(), display)?;
        stats.record(&frame);
        on_frame(&frame);

        let spent = clock.now().saturating_duration_since(started);
        if spent < period {
            clock.sleep(period - spent);
        } else {
            stats.overruns += 1;
            tracing::debug!(spent_us = spent.as_micros() as u64, "tick overran period");
        }
    }

    tracing::info!(
        ticks = stats.ticks,
        commits = stats.commits,
        failed_commits = stats.failed_commits,
        "gauge loop stopped"
    );
    Ok(stats)
}
