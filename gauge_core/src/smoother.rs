//! Temporal smoothing: exponential weighting or a sliding-window mean.
//!
//! Both strategies are deterministic: replaying the same input sequence
//! into a fresh smoother reproduces the same outputs.

use crate::util::div_round_nearest_i64;

/// Largest retain factor accepted by the exponential strategy.
pub const MAX_ALPHA: f32 = 0.99;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SmoothingKind {
    /// `out = raw * (1 - alpha) + prev * alpha`; alpha clamped to `[0, 0.99]`.
    Exponential { alpha: f32 },
    /// Unweighted mean over the last `size` inputs.
    Window { size: usize },
}

/// Clamp a retain factor into `[0, MAX_ALPHA]`; non-finite becomes 0.
#[inline]
pub fn clamp_alpha(alpha: f32) -> f32 {
    if !alpha.is_finite() {
        return 0.0;
    }
    alpha.clamp(0.0, MAX_ALPHA)
}

/// Fixed-capacity ring of recent values with an incrementally kept sum.
///
/// The ring starts zero-filled, so the mean ramps up over the first `len`
/// pushes and is exact once the ring has been filled.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    buf: Vec<i32>,
    head: usize,
    sum: i64,
}

impl SampleWindow {
    pub fn new(size: usize) -> Self {
        Self {
            buf: vec![0; size.max(1)],
            head: 0,
            sum: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn sum(&self) -> i64 {
        self.sum
    }

    /// Evict the oldest value, insert `value`, return the rounded mean.
    pub fn push(&mut self, value: i32) -> i32 {
        let old = std::mem::replace(&mut self.buf[self.head], value);
        self.sum += i64::from(value) - i64::from(old);
        self.head = (self.head + 1) % self.buf.len();
        #[cfg(debug_assertions)]
        debug_assert_eq!(
            self.sum,
            self.buf.iter().map(|&v| i64::from(v)).sum::<i64>(),
            "running sum out of step with window contents"
        );
        self.mean()
    }

    pub fn mean(&self) -> i32 {
        div_round_nearest_i64(self.sum, self.buf.len() as i64) as i32
    }

    pub fn reset(&mut self) {
        self.buf.fill(0);
        self.head = 0;
        self.sum = 0;
    }
}

#[derive(Debug, Clone)]
pub enum Smoother {
    Exponential { alpha: f32, prev: Option<f32> },
    Window(SampleWindow),
}

impl Smoother {
    pub fn new(kind: SmoothingKind) -> Self {
        match kind {
            SmoothingKind::Exponential { alpha } => Smoother::Exponential {
                alpha: clamp_alpha(alpha),
                prev: None,
            },
            SmoothingKind::Window { size } => Smoother::Window(SampleWindow::new(size)),
        }
    }

    /// Feed one value and return the smoothed output.
    pub fn push(&mut self, raw: i32) -> i32 {
        match self {
            Smoother::Exponential { alpha, prev } => {
                let x = raw as f32;
                // Seed with the first value to avoid a ramp from zero
                let y = match *prev {
                    None => x,
                    Some(p) => x * (1.0 - *alpha) + p * *alpha,
                };
                *prev = Some(y);
                y.round() as i32
            }
            Smoother::Window(w) => w.push(raw),
        }
    }

    pub fn reset(&mut self) {
        match self {
            Smoother::Exponential { prev, .. } => *prev = None,
            Smoother::Window(w) => w.reset(),
        }
    }
}
