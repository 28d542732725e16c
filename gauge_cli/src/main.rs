#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod cli;
mod error_fmt;
mod logging;
mod profile;
mod run;

use clap::Parser;
use eyre::{Result, WrapErr};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::cli::{Cli, Commands, JSON_MODE, ProfileCmd, json_mode};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() -> ExitCode {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    let cfg = load_config(cli.config.as_deref());
    logging::init(
        &cli.log_level,
        cli.json,
        cfg.as_ref().ok().map(|c| &c.logging),
    );

    match cfg.and_then(|cfg| dispatch(&cli, &cfg)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "command failed");
            if json_mode() {
                eprintln!("{}", format_error_json(&err));
            } else {
                eprintln!("{}", humanize(&err));
            }
            ExitCode::from(u8::try_from(exit_code_for_error(&err)).unwrap_or(1))
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<gauge_config::Config> {
    let Some(path) = path else {
        return Ok(gauge_config::Config::default());
    };
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    let cfg = gauge_config::load_toml(&text)
        .map_err(eyre::Report::new)
        .wrap_err_with(|| format!("parse config {}", path.display()))?;
    cfg.validate().wrap_err("invalid configuration")?;
    Ok(cfg)
}

fn dispatch(cli: &Cli, cfg: &gauge_config::Config) -> Result<()> {
    match &cli.cmd {
        Commands::Run {
            ticks,
            slide,
            press_at,
            stats,
        } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&shutdown);
            if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
                tracing::warn!(error = %e, "failed to install Ctrl-C handler");
            }
            run::run_gauge(
                cfg,
                run::RunOpts {
                    ticks: *ticks,
                    slide: *slide,
                    press_at: *press_at,
                    stats: *stats,
                },
                &shutdown,
            )
        }
        Commands::Calibrate {
            duration_ms,
            dry_run,
        } => run::calibrate(cfg, *duration_ms, *dry_run),
        Commands::Profile { cmd } => match cmd {
            ProfileCmd::Show => profile::show(cfg),
            ProfileCmd::Export { csv } => profile::export(cfg, csv),
            ProfileCmd::Import { csv } => profile::import(cfg, csv),
        },
        Commands::SelfCheck => run::self_check(cfg),
    }
}
