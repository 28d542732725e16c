//! `profile` subcommands and the shared profile printer.

use eyre::{Result, WrapErr};
use gauge_core::{CalibrationProfile, GaugeError, GaugeSettings, LoadSource, ProfileStore};
use gauge_hardware::FileStore;
use std::path::Path;

use crate::cli::json_mode;

pub fn open_store(cfg: &gauge_config::Config) -> ProfileStore<FileStore> {
    let settings = GaugeSettings::from(cfg);
    ProfileStore::new(
        FileStore::new(&cfg.store.path),
        settings.sampling.filter_max(),
        settings.channels.default_profile(&settings.sampling),
    )
}

pub fn source_name(source: LoadSource) -> &'static str {
    match source {
        LoadSource::Stored => "stored",
        LoadSource::Empty => "factory",
        LoadSource::Fallback => "fallback",
    }
}

/// Print `profile` as a table, or as one JSON object in `--json` mode.
pub fn print_profile(profile: &CalibrationProfile, source: &str) {
    if json_mode() {
        let channels: Vec<_> = profile
            .iter()
            .map(|(ch, b)| {
                serde_json::json!({ "channel": ch.name(), "raw_low": b.low, "raw_high": b.high })
            })
            .collect();
        println!(
            "{}",
            serde_json::json!({ "source": source, "channels": channels })
        );
        return;
    }
    println!("profile ({source})");
    println!("{:<8} {:>7} {:>8}", "channel", "raw_low", "raw_high");
    for (ch, b) in profile.iter() {
        println!("{:<8} {:>7} {:>8}", ch.name(), b.low, b.high);
    }
}

pub fn show(cfg: &gauge_config::Config) -> Result<()> {
    let (profile, source) = open_store(cfg).load_with_source();
    print_profile(&profile, source_name(source));
    Ok(())
}

pub fn export(cfg: &gauge_config::Config, path: &Path) -> Result<()> {
    let profile = open_store(cfg).load();
    gauge_config::write_profile_csv(path, &gauge_config::ProfileBounds::from(&profile))
        .wrap_err("export profile")?;
    tracing::info!(path = %path.display(), "profile exported");
    if json_mode() {
        println!("{}", serde_json::json!({ "exported": path.display().to_string() }));
    } else {
        println!("exported profile to {}", path.display());
    }
    Ok(())
}

pub fn import(cfg: &gauge_config::Config, path: &Path) -> Result<()> {
    let mut store = open_store(cfg);
    let full_scale = GaugeSettings::from(cfg).sampling.filter_max();
    let bounds = gauge_config::load_profile_csv(path, full_scale)?;
    let profile = CalibrationProfile::from(bounds).sanitized(full_scale);
    store
        .commit(&profile)
        .map_err(|e| eyre::Report::new(GaugeError::Store(e.to_string())))
        .wrap_err("import profile")?;
    tracing::info!(path = %path.display(), "profile imported");
    print_profile(&profile, "imported");
    Ok(())
}
