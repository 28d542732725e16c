#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validation errors are fine; panics are not. A config that
    // validates must also convert into gauge settings without panicking.
    if let Ok(cfg) = gauge_config::load_toml(data) {
        if cfg.validate().is_ok() {
            let settings = gauge_core::GaugeSettings::from(&cfg);
            let _ = settings.channels.default_profile(&settings.sampling);
        }
    }
});
