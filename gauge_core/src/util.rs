//! Common integer and period helpers for gauge_core.

/// Number of microseconds in one second.
pub const MICROS_PER_SEC: u64 = 1_000_000;
/// Number of milliseconds in one second.
pub const MILLIS_PER_SEC: u64 = 1_000;

/// Compute the period in microseconds for a given tick rate in Hz.
/// - Clamps `hz` to at least 1 to avoid division by zero.
/// - Ensures result is at least 1 microsecond.
#[inline]
pub fn period_us(hz: u32) -> u64 {
    (MICROS_PER_SEC / u64::from(hz.max(1))).max(1)
}

/// Compute the period in milliseconds for a given tick rate in Hz.
/// - Clamps `hz` to at least 1 to avoid division by zero.
/// - Ensures result is at least 1 millisecond.
#[inline]
pub fn period_ms(hz: u32) -> u64 {
    (MILLIS_PER_SEC / u64::from(hz.max(1))).max(1)
}

/// Divide rounding to nearest, ties away from zero. `d` must be positive.
#[inline]
pub fn div_round_nearest_i64(n: i64, d: i64) -> i64 {
    debug_assert!(d > 0, "div_round_nearest_i64: non-positive divisor {d}");
    let d = d.max(1);
    let half = d / 2;
    if n >= 0 {
        (n + half) / d
    } else {
        (n - half) / d
    }
}

/// Integer linear remap of `x` from `[in_a, in_b]` onto `[out_a, out_b]`,
/// truncating toward zero. Either range may run backwards. `in_a` must
/// differ from `in_b`.
#[inline]
pub fn remap(x: i32, in_a: i32, in_b: i32, out_a: i32, out_b: i32) -> i32 {
    let span_in = i64::from(in_b) - i64::from(in_a);
    debug_assert!(span_in != 0, "remap: empty input span");
    if span_in == 0 {
        return out_a;
    }
    let num = (i64::from(x) - i64::from(in_a)) * (i64::from(out_b) - i64::from(out_a));
    let v = num / span_in + i64::from(out_a);
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
