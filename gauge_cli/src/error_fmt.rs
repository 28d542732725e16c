//! Human-readable error descriptions and structured JSON error formatting.

use gauge_core::error::{BuildError, GaugeError, ProfileError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = find::<BuildError>(err) {
        return match be {
            BuildError::MissingSensors => {
                "What happened: No slider source was provided to the gauge.\nLikely causes: The ADC failed to initialize or was not wired into the builder.\nHow to fix: Ensure the MCP3008 is created successfully and passed via with_sensors(...).".to_string()
            }
            BuildError::MissingButton => {
                "What happened: No calibration button was provided to the gauge.\nLikely causes: GPIO setup failed or the button was not wired into the builder.\nHow to fix: Check [hardware].button_pin and pass the button via with_button(...).".to_string()
            }
            BuildError::MissingStore => {
                "What happened: No profile store was provided to the gauge.\nLikely causes: The builder was not given a store.\nHow to fix: Pass a store via with_store(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(pe) = find::<ProfileError>(err) {
        return format!(
            "What happened: The stored calibration profile is unreadable ({pe}).\nLikely causes: Interrupted write or a record from another device.\nHow to fix: Run `gauge calibrate` or `gauge profile import --csv FILE` to replace it."
        );
    }

    if let Some(ge) = find::<GaugeError>(err) {
        return match ge {
            GaugeError::HardwareFault(m) | GaugeError::Hardware(m) => format!(
                "What happened: Slider hardware failed ({m}).\nLikely causes: SPI disabled, wrong bus/slave select, or loose wiring.\nHow to fix: Check [hardware] in the config, enable SPI, and verify 3.3V/GND to the ADC."
            ),
            GaugeError::Store(m) => format!(
                "What happened: The profile store could not be written ({m}).\nLikely causes: Read-only filesystem, missing directory, or full disk.\nHow to fix: Check [store].path and its permissions."
            ),
            GaugeError::Config(m) => format!(
                "What happened: Configuration does not match the hardware ({m}).\nLikely causes: An ADC input outside 0..=7 in [hardware.adc_channels].\nHow to fix: Edit the config file, then rerun."
            ),
            GaugeError::State(m) => format!(
                "What happened: {m}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = format!("{err:#}").to_ascii_lowercase();

    if lower.contains("profile csv must have headers") {
        return "Invalid headers in profile CSV. Expected 'channel,raw_low,raw_high'.".to_string();
    }

    if is_config_error(err) {
        return format!(
            "What happened: Configuration is invalid or incomplete.\nLikely causes: A typo in a section or key, or an out-of-range value.\nHow to fix: Edit the TOML config and try again. Details: {err:#}"
        );
    }

    if lower.contains("read config") {
        return format!(
            "What happened: The config file could not be read.\nLikely causes: Wrong --config path or missing permissions.\nHow to fix: Check the path. Details: {err:#}"
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.chain().nth(1) {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

fn find<E: std::error::Error + Send + Sync + 'static>(err: &eyre::Report) -> Option<&E> {
    err.chain().find_map(|e| e.downcast_ref::<E>())
}

/// Stable exit codes per error family; anything unclassified returns 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if find::<BuildError>(err).is_some() {
        return 3;
    }
    match find::<GaugeError>(err) {
        Some(GaugeError::Config(_)) => 3,
        Some(GaugeError::Hardware(_) | GaugeError::HardwareFault(_)) => 4,
        Some(GaugeError::Store(_)) => 5,
        _ if find::<ProfileError>(err).is_some() => 5,
        _ if is_config_error(err) => 3,
        _ => 1,
    }
}

fn is_config_error(err: &eyre::Report) -> bool {
    let text = format!("{err:#}").to_ascii_lowercase();
    text.contains("invalid configuration") || text.contains("parse config")
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(be) = find::<BuildError>(err) {
        return match be {
            BuildError::MissingSensors => "MissingSensors",
            BuildError::MissingButton => "MissingButton",
            BuildError::MissingStore => "MissingStore",
            BuildError::InvalidConfig(_) => "InvalidConfig",
        };
    }
    if find::<ProfileError>(err).is_some() {
        return "Profile";
    }
    match find::<GaugeError>(err) {
        Some(GaugeError::Hardware(_) | GaugeError::HardwareFault(_)) => "Hardware",
        Some(GaugeError::Store(_)) => "Store",
        Some(GaugeError::Config(_)) => "Config",
        Some(GaugeError::State(_)) => "State",
        None if is_config_error(err) => "InvalidConfig",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_errors_get_config_exit_code() {
        let err = eyre::Report::new(BuildError::InvalidConfig("tick_hz must be > 0"));
        assert_eq!(exit_code_for_error(&err), 3);
        assert!(humanize(&err).contains("tick_hz must be > 0"));
    }

    #[test]
    fn wrapped_store_error_is_found() {
        let err = eyre::Report::new(GaugeError::Store("disk full".into())).wrap_err("import");
        assert_eq!(exit_code_for_error(&err), 5);
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], "Store");
        assert_eq!(v["exit_code"], 5);
    }

    #[test]
    fn humanized_messages_end_cleanly() {
        let err = eyre::Report::new(BuildError::InvalidConfig("window must be >= 1"));
        let text = humanize(&err);
        assert!(text.ends_with("then rerun."), "{text}");
        assert!(!text.contains(".."), "{text}");
    }

    #[test]
    fn unknown_errors_fall_back() {
        let err = eyre::eyre!("boom");
        assert_eq!(exit_code_for_error(&err), 1);
        assert!(humanize(&err).starts_with("Something went wrong."));
    }
}
