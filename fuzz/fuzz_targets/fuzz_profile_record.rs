#![no_main]
use gauge_core::CalibrationProfile;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Any accepted record stays in range and survives a re-encode.
    if let Ok(profile) = CalibrationProfile::from_record(data, 1023) {
        for (_, b) in profile.iter() {
            assert!(b.low <= 1023 && b.high <= 1023);
        }
        let again = CalibrationProfile::from_record(&profile.to_record(), 1023);
        assert_eq!(again, Ok(profile));
    }
});
