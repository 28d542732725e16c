//! What one tick shows and how it reaches a [`DisplaySurface`].

use eyre::WrapErr;
use gauge_traits::DisplaySurface;

use crate::aggregate::AggregateReading;
use crate::error::Result;
use crate::hw_error::map_hw_error;

/// Label drawn under the calibration countdown.
pub const COUNTDOWN_LABEL: &str = "CAL";
/// Hue of the countdown digits.
pub const COUNTDOWN_HUE: u16 = 0;

/// Output of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    Reading(AggregateReading),
    /// Calibration in progress.
    Countdown { seconds_remaining: u32 },
    /// Calibration finished; `saved` is false if the profile could not be
    /// written and the previous one stays active.
    Committed { saved: bool },
}

impl Frame {
    pub fn reading(&self) -> Option<AggregateReading> {
        match self {
            Frame::Reading(r) => Some(*r),
            _ => None,
        }
    }
}

/// Draw `frame` with the double-buffer discipline: clear, draw, present,
/// clear, present. The surface is left blank between renders.
pub fn render<D: DisplaySurface + ?Sized>(frame: &Frame, label: &str, display: &mut D) -> Result<()> {
    surface(display.clear(), "display clear")?;
    surface(draw(frame, label, display), "display draw")?;
    surface(display.present(), "display present")?;
    surface(display.clear(), "display clear")?;
    surface(display.present(), "display present")
}

type SurfaceResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

fn surface(res: SurfaceResult, what: &'static str) -> Result<()> {
    res.map_err(|e| eyre::Report::new(map_hw_error(&*e)))
        .wrap_err(what)
}

fn draw<D: DisplaySurface + ?Sized>(frame: &Frame, label: &str, display: &mut D) -> SurfaceResult {
    match *frame {
        Frame::Reading(r) => {
            display.draw_digits(r.value, r.hue)?;
            display.draw_label(label)
        }
        Frame::Countdown { seconds_remaining } => {
            let secs = u16::try_from(seconds_remaining).unwrap_or(u16::MAX);
            display.draw_digits(secs, COUNTDOWN_HUE)?;
            display.draw_label(COUNTDOWN_LABEL)
        }
        Frame::Committed { saved } => display.draw_label(if saved { "SAVED" } else { "ERR" }),
    }
}
