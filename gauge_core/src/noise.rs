//! Burst noise filter: trimmed mean around the median.
//!
//! A tick reads every slider `burst_size` times. The burst is sorted and the
//! `MID_WINDOW` values nearest the median (`[n/2 - 5, n/2 + 5)`) are averaged,
//! which throws away sporadic spikes on either side. The mean is then scaled
//! by `vref_num / vref_den` to correct for the board's analog reference
//! differing from the ADC's nominal full scale.
//!
//! All arithmetic is integer: the result is `sum * num / (count * den)`
//! truncated toward zero, so `[500; 10]` with 1100/1023 yields 537.

use crate::error::BuildError;

/// Number of order statistics averaged around the median.
pub const MID_WINDOW: usize = 10;

/// Index range of the mid window for a sorted burst of length `n`.
///
/// Bursts shorter than `MID_WINDOW` fall back to the whole burst; the
/// configured burst size is validated to be at least `MID_WINDOW`.
#[inline]
pub fn mid_window(n: usize) -> std::ops::Range<usize> {
    if n < MID_WINDOW {
        return 0..n;
    }
    let start = n / 2 - MID_WINDOW / 2;
    start..start + MID_WINDOW
}

/// Sort `burst` in place and return the scaled trimmed mean, or `None` for
/// an empty burst.
pub fn reduce_burst(burst: &mut [u16], vref_num: u32, vref_den: u32) -> Option<i32> {
    if burst.is_empty() {
        return None;
    }
    burst.sort_unstable();
    let window = &burst[mid_window(burst.len())];
    let sum: i64 = window.iter().map(|&v| i64::from(v)).sum();
    let den = (window.len() as i64) * i64::from(vref_den.max(1));
    let scaled = sum * i64::from(vref_num) / den;
    Some(scaled.clamp(0, i64::from(i32::MAX)) as i32)
}

/// Reusable noise filter holding its scratch buffer so ticks do not allocate.
#[derive(Debug, Clone)]
pub struct NoiseFilter {
    burst_size: usize,
    vref_num: u32,
    vref_den: u32,
    scratch: Vec<u16>,
}

impl NoiseFilter {
    pub fn new(burst_size: usize, vref_num: u32, vref_den: u32) -> Result<Self, BuildError> {
        if burst_size < MID_WINDOW {
            return Err(BuildError::InvalidConfig("burst_size must be >= 10"));
        }
        if vref_num == 0 || vref_den == 0 {
            return Err(BuildError::InvalidConfig("vref ratio must be > 0"));
        }
        Ok(Self {
            burst_size,
            vref_num,
            vref_den,
            scratch: Vec::with_capacity(burst_size),
        })
    }

    #[inline]
    pub fn burst_size(&self) -> usize {
        self.burst_size
    }

    /// De-noise one burst. The input is left untouched and the result does
    /// not depend on sample order.
    pub fn reduce(&mut self, burst: &[u16]) -> Option<i32> {
        self.scratch.clear();
        self.scratch.extend_from_slice(burst);
        reduce_burst(&mut self.scratch, self.vref_num, self.vref_den)
    }

    /// Collect a burst through `read` and de-noise it. Stops at the first
    /// read error and returns it.
    pub fn sample<E>(&mut self, mut read: impl FnMut() -> Result<u16, E>) -> Result<i32, E> {
        self.scratch.clear();
        for _ in 0..self.burst_size {
            self.scratch.push(read()?);
        }
        // burst_size >= MID_WINDOW, so the scratch is never empty here
        Ok(reduce_burst(&mut self.scratch, self.vref_num, self.vref_den).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_centered_on_median() {
        assert_eq!(mid_window(10), 0..10);
        assert_eq!(mid_window(11), 0..10);
        assert_eq!(mid_window(20), 5..15);
        assert_eq!(mid_window(1000), 495..505);
    }

    #[test]
    fn short_bursts_use_everything() {
        assert_eq!(mid_window(4), 0..4);
        let mut b = [10u16, 20, 30];
        assert_eq!(reduce_burst(&mut b, 1, 1), Some(20));
    }

    #[test]
    fn empty_burst_has_no_value() {
        assert_eq!(reduce_burst(&mut [], 1100, 1023), None);
    }

    #[test]
    fn constructor_rejects_small_bursts() {
        assert!(NoiseFilter::new(9, 1100, 1023).is_err());
        assert!(NoiseFilter::new(10, 1100, 0).is_err());
        assert!(NoiseFilter::new(10, 1100, 1023).is_ok());
    }
}
