use gauge_core::NoiseFilter;
use gauge_core::noise::{mid_window, reduce_burst};
use proptest::prelude::*;
use rstest::rstest;

#[rstest]
fn constant_burst_with_vref_correction_is_537() {
    let mut f = NoiseFilter::new(10, 1100, 1023).unwrap();
    // 500 * 1100 / 1023 = 537.63, truncated
    assert_eq!(f.reduce(&[500; 10]), Some(537));
}

#[rstest]
#[case(&[10, 20, 30, 40, 50, 60, 70, 80, 90, 100], 55)]
#[case(&[1023, 0, 1023, 0, 1023, 0, 1023, 0, 1023, 0], 511)]
#[case(&[7; 12], 7)]
fn unit_ratio_is_plain_trimmed_mean(#[case] burst: &[u16], #[case] expected: i32) {
    let mut f = NoiseFilter::new(10, 1, 1).unwrap();
    assert_eq!(f.reduce(burst), Some(expected));
}

#[rstest]
fn sample_reads_exactly_one_burst() {
    let mut f = NoiseFilter::new(20, 1, 1).unwrap();
    let mut n = 0u16;
    let out: Result<i32, ()> = f.sample(|| {
        n += 1;
        Ok(n)
    });
    assert_eq!(n, 20);
    // sorted 1..=20, window [5, 15) holds 6..=15
    assert_eq!(out, Ok(10));
}

#[rstest]
fn sample_stops_at_first_error() {
    let mut f = NoiseFilter::new(10, 1, 1).unwrap();
    let mut calls = 0;
    let out: Result<i32, &str> = f.sample(|| {
        calls += 1;
        if calls == 3 { Err("spi") } else { Ok(100) }
    });
    assert_eq!(out, Err("spi"));
    assert_eq!(calls, 3);
}

#[rstest]
#[case(9)]
#[case(0)]
fn short_bursts_are_rejected_at_construction(#[case] n: usize) {
    assert!(NoiseFilter::new(n, 1, 1).is_err());
}

#[rstest]
fn zero_ratio_is_rejected() {
    assert!(NoiseFilter::new(10, 0, 1).is_err());
    assert!(NoiseFilter::new(10, 1, 0).is_err());
}

fn burst_and_shuffle() -> impl Strategy<Value = (Vec<u16>, Vec<u16>)> {
    proptest::collection::vec(0u16..=1023, 10..300)
        .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
}

proptest! {
    #[test]
    fn output_is_order_independent((burst, shuffled) in burst_and_shuffle()) {
        let mut f = NoiseFilter::new(10, 1100, 1023).unwrap();
        prop_assert_eq!(f.reduce(&burst), f.reduce(&shuffled));
    }

    // With N >= 50, up to 40% outliers on one side never reach the mid window.
    #[test]
    fn one_sided_minority_outliers_are_ignored(
        n in 50usize..400,
        truth in 100u16..900,
        frac in 0.0f64..=0.4,
        high in any::<bool>(),
    ) {
        let k = (n as f64 * frac).floor() as usize;
        let outlier = if high { 1023 } else { 0 };
        let mut burst = vec![truth; n - k];
        burst.extend(std::iter::repeat_n(outlier, k));
        prop_assert_eq!(reduce_burst(&mut burst, 1, 1), Some(i32::from(truth)));
    }

    // Outliers split across both tails: each tail stays outside the window.
    #[test]
    fn two_sided_outliers_are_ignored(
        n in 20usize..400,
        truth in 100u16..900,
        lo_frac in 0.0f64..=1.0,
        hi_frac in 0.0f64..=1.0,
    ) {
        let window = mid_window(n);
        let max_lo = window.start;
        let max_hi = n - window.end;
        let lo = (max_lo as f64 * lo_frac).floor() as usize;
        let hi = (max_hi as f64 * hi_frac).floor() as usize;
        let mut burst = vec![0u16; lo];
        burst.extend(std::iter::repeat_n(1023u16, hi));
        burst.extend(std::iter::repeat_n(truth, n - lo - hi));
        prop_assert_eq!(reduce_burst(&mut burst, 1, 1), Some(i32::from(truth)));
    }

    #[test]
    fn output_stays_within_scaled_burst_range(burst in proptest::collection::vec(0u16..=1023, 10..200)) {
        let mut f = NoiseFilter::new(10, 1, 1).unwrap();
        let v = f.reduce(&burst).unwrap();
        let lo = i32::from(*burst.iter().min().unwrap());
        let hi = i32::from(*burst.iter().max().unwrap());
        prop_assert!(lo <= v && v <= hi);
    }
}
