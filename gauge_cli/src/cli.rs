//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

pub fn json_mode() -> bool {
    JSON_MODE.get().copied().unwrap_or(false)
}

#[derive(Parser, Debug)]
#[command(name = "gauge", version, about = "Consumption gauge CLI")]
pub struct Cli {
    /// Path to config TOML (typed); built-in defaults when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log as JSON lines and print machine-readable output
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the gauge loop and render readings to the terminal
    Run {
        /// Stop after this many ticks (runs until Ctrl-C otherwise)
        #[arg(long, value_name = "N")]
        ticks: Option<u64>,
        /// Simulation: move every slider this far along its travel (0..=100)
        #[arg(long, value_name = "PERCENT", default_value_t = 0,
              value_parser = clap::value_parser!(u8).range(0..=100))]
        slide: u8,
        /// Simulation: press the calibration button at this tick
        #[arg(long, value_name = "TICK")]
        press_at: Option<u64>,
        /// Print loop counters on exit
        #[arg(long, action = ArgAction::SetTrue)]
        stats: bool,
    },
    /// Run one calibration against sweeping simulated sliders and print the result
    Calibrate {
        /// Override the collecting window length
        #[arg(long, value_name = "MS")]
        duration_ms: Option<u64>,
        /// Keep the committed profile in memory instead of writing the store
        #[arg(long, action = ArgAction::SetTrue)]
        dry_run: bool,
    },
    /// Inspect or edit the stored calibration profile
    Profile {
        #[command(subcommand)]
        cmd: ProfileCmd,
    },
    /// Quick health check (config, profile store, hardware presence / sim ok)
    SelfCheck,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCmd {
    /// Print the profile the gauge would start with
    Show,
    /// Write the current profile as CSV (channel,raw_low,raw_high)
    Export {
        #[arg(long, value_name = "FILE")]
        csv: PathBuf,
    },
    /// Replace the stored profile with bounds read from CSV
    Import {
        #[arg(long, value_name = "FILE")]
        csv: PathBuf,
    },
}
