//! Time-based button debouncer.

/// A debounced level transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Pressed,
    Released,
}

/// Accepts a level change only after it has held for `window_ms`.
///
/// The raw level is sampled once per tick. Any flip back before the window
/// elapses restarts the wait, so bounces shorter than the window never
/// produce an edge.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window_ms: u64,
    stable: bool,
    candidate: bool,
    changed_at_ms: u64,
}

impl Debouncer {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            stable: false,
            candidate: false,
            changed_at_ms: 0,
        }
    }

    /// Debounced level.
    #[inline]
    pub fn is_pressed(&self) -> bool {
        self.stable
    }

    pub fn update(&mut self, level: bool, now_ms: u64) -> Option<Edge> {
        if level != self.candidate {
            self.candidate = level;
            self.changed_at_ms = now_ms;
        }
        if self.candidate != self.stable
            && now_ms.saturating_sub(self.changed_at_ms) >= self.window_ms
        {
            self.stable = self.candidate;
            return Some(if self.stable {
                Edge::Pressed
            } else {
                Edge::Released
            });
        }
        None
    }
}
