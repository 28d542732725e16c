//! Device assembly and the `run`, `calibrate` and `self-check` commands.

use eyre::{Result, WrapErr};
use gauge_core::{DynGauge, Frame, GaugeError, GaugeSettings, RunStats, runner};
use gauge_hardware::{
    FileStore, MemoryStore, SimulatedButton, SimulatedSoftpots, SliderMotion, TerminalDisplay,
};
use gauge_traits::{BlockStore, ButtonInput, Channel, DisplaySurface, ManualClock, SensorSource};
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use crate::cli::json_mode;
use crate::profile::{open_store, print_profile, source_name};

#[derive(Debug, Clone, Copy)]
pub struct RunOpts {
    pub ticks: Option<u64>,
    pub slide: u8,
    pub press_at: Option<u64>,
    pub stats: bool,
}

type Devices = (Box<dyn SensorSource>, Box<dyn ButtonInput>);

/// Raw position `slide` percent of the way from rest to full travel.
fn slider_position(settings: &GaugeSettings, channel: Channel, slide: u8) -> u16 {
    let cfg = settings.channels.get(channel);
    let b = cfg.default_bounds;
    let (rest, full) = if cfg.inverted {
        (i32::from(b.high), i32::from(b.low))
    } else {
        (i32::from(b.low), i32::from(b.high))
    };
    let pos = rest + (full - rest) * i32::from(slide) / 100;
    pos.clamp(0, i32::from(settings.sampling.raw_max)) as u16
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
fn open_devices(
    _cfg: &gauge_config::Config,
    settings: &GaugeSettings,
    slide: u8,
    press_at: Option<u64>,
) -> Result<Devices> {
    let positions = Channel::ALL.map(|ch| slider_position(settings, ch, slide));
    let sensors = SimulatedSoftpots::new(positions, settings.sampling.raw_max).with_jitter(3, 7);
    let button: Box<dyn ButtonInput> = match press_at {
        Some(at) => {
            let period_ms = gauge_core::util::period_ms(settings.sampling.tick_hz).max(1);
            let hold = settings.calibration.debounce_ms.div_ceil(period_ms) + 2;
            Box::new(gauge_hardware::ScriptedButton::press_at(at, hold))
        }
        None => Box::new(SimulatedButton::new()),
    };
    tracing::info!(slide, ?positions, "using simulated sliders");
    Ok((Box::new(sensors), button))
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
fn open_devices(
    cfg: &gauge_config::Config,
    _settings: &GaugeSettings,
    slide: u8,
    press_at: Option<u64>,
) -> Result<Devices> {
    use gauge_core::hw_error::map_hw_error;
    use gauge_hardware::hardware::{GpioButton, Mcp3008};

    if slide != 0 || press_at.is_some() {
        tracing::warn!("--slide and --press-at only apply to the simulator; ignoring");
    }
    let hw = &cfg.hardware;
    let inputs = Channel::ALL.map(|ch| hw.adc_channels.get(ch));
    let adc = Mcp3008::new(hw.spi_bus, hw.spi_ss, hw.spi_clock_hz, inputs)
        .map_err(|e| eyre::Report::new(map_hw_error(&e)))
        .wrap_err("open MCP3008")?;
    let button = GpioButton::new(hw.button_pin, hw.button_active_low)
        .map_err(|e| eyre::Report::new(map_hw_error(&e)))
        .wrap_err("open calibration button")?;
    Ok((Box::new(adc), Box::new(button)))
}

fn build(
    settings: GaugeSettings,
    (sensors, button): Devices,
    store: impl BlockStore + 'static,
    clock: Option<ManualClock>,
) -> Result<DynGauge> {
    let builder = DynGauge::builder()
        .with_settings(settings)
        .with_sensors(sensors)
        .with_button(button)
        .with_store(store);
    match clock {
        Some(c) => builder.with_clock(Box::new(c)).build(),
        None => builder.build(),
    }
}

fn frame_json(frame: &Frame, label: &str) -> serde_json::Value {
    match frame {
        Frame::Reading(r) => serde_json::json!({
            "type": "reading",
            "value": r.value,
            "hue": r.hue,
            "label": label,
        }),
        Frame::Countdown { seconds_remaining } => serde_json::json!({
            "type": "countdown",
            "seconds_remaining": seconds_remaining,
        }),
        Frame::Committed { saved } => serde_json::json!({
            "type": "committed",
            "saved": saved,
        }),
    }
}

fn print_stats(stats: &RunStats, read_failures: u64) {
    if json_mode() {
        println!(
            "{}",
            serde_json::json!({
                "type": "summary",
                "ticks": stats.ticks,
                "readings": stats.readings,
                "countdowns": stats.countdowns,
                "commits": stats.commits,
                "failed_commits": stats.failed_commits,
                "overruns": stats.overruns,
                "read_failures": read_failures,
            })
        );
        return;
    }
    eprintln!("\n--- Gauge Stats ---");
    eprintln!("Ticks: {}", stats.ticks);
    eprintln!("Readings / countdowns: {} / {}", stats.readings, stats.countdowns);
    eprintln!("Commits ok / failed: {} / {}", stats.commits, stats.failed_commits);
    eprintln!("Overruns (> period): {}", stats.overruns);
    eprintln!("Read failures: {read_failures}");
    eprintln!("-------------------\n");
}

pub fn run_gauge(cfg: &gauge_config::Config, opts: RunOpts, shutdown: &AtomicBool) -> Result<()> {
    let settings = GaugeSettings::from(cfg);
    let devices = open_devices(cfg, &settings, opts.slide, opts.press_at)?;
    let mut gauge = build(settings, devices, FileStore::new(&cfg.store.path), None)?;

    let json = json_mode();
    let label = gauge.label().to_string();
    let mut display: Box<dyn DisplaySurface> = if json {
        Box::new(TerminalDisplay::new(std::io::sink()))
    } else {
        Box::new(TerminalDisplay::new(std::io::stdout()))
    };

    let stats = runner::run(&mut gauge, display.as_mut(), opts.ticks, shutdown, |frame| {
        if json {
            println!("{}", frame_json(frame, &label));
        }
    })?;

    if opts.stats || json {
        print_stats(&stats, gauge.read_failures());
    }
    Ok(())
}

/// Run one calibration on virtual time against sliders that sweep their
/// factory travel, then print the committed profile.
pub fn calibrate(
    cfg: &gauge_config::Config,
    duration_ms: Option<u64>,
    dry_run: bool,
) -> Result<()> {
    let mut settings = GaugeSettings::from(cfg);
    if let Some(ms) = duration_ms {
        settings.calibration.duration_ms = ms;
    }

    let sweep_period =
        u32::try_from(settings.sampling.burst_size.saturating_mul(20)).unwrap_or(u32::MAX);
    let softpots = SimulatedSoftpots::new(
        Channel::ALL.map(|ch| slider_position(&settings, ch, 0)),
        settings.sampling.raw_max,
    );
    let handle = softpots.handle();
    for ch in Channel::ALL {
        let b = settings.channels.get(ch).default_bounds;
        handle.set_motion(
            ch,
            SliderMotion::Sweep {
                low: b.low.min(b.high),
                high: b.low.max(b.high),
                period: sweep_period,
            },
        );
    }

    let store: Box<dyn BlockStore> = if dry_run {
        Box::new(MemoryStore::new())
    } else {
        Box::new(FileStore::new(&cfg.store.path))
    };
    let tick_limit = settings.calibration.duration_ms
        / gauge_core::util::period_ms(settings.sampling.tick_hz).max(1)
        + 8;
    let clock = ManualClock::new();
    let devices: Devices = (Box::new(softpots), Box::new(SimulatedButton::new()));
    let mut gauge = build(settings, devices, store, Some(clock.clone()))?;

    gauge.start_calibration();
    tracing::info!(tick_limit, dry_run, "calibration started");
    let period = Duration::from_micros(gauge.period_us());
    let mut saved = None;
    for _ in 0..tick_limit {
        if let Frame::Committed { saved: ok } = gauge.step() {
            saved = Some(ok);
            break;
        }
        clock.advance(period);
    }

    match saved {
        Some(true) => {
            let source = if dry_run {
                "calibrated (dry run)"
            } else {
                "calibrated"
            };
            print_profile(gauge.profile(), source);
            Ok(())
        }
        Some(false) => Err(eyre::Report::new(GaugeError::Store(
            "calibrated profile could not be saved".into(),
        ))),
        None => Err(eyre::Report::new(GaugeError::State(format!(
            "calibration did not finish within {tick_limit} ticks"
        )))),
    }
}

pub fn self_check(cfg: &gauge_config::Config) -> Result<()> {
    let settings = GaugeSettings::from(cfg);
    let devices = open_devices(cfg, &settings, 0, None)?;
    let mut gauge = build(settings, devices, FileStore::new(&cfg.store.path), None)
        .wrap_err("assemble gauge")?;

    let frame = gauge.step();
    if gauge.read_failures() > 0 {
        return Err(eyre::Report::new(GaugeError::Hardware(format!(
            "{} channel reads failed during self-check",
            gauge.read_failures()
        ))));
    }
    let (_, source) = open_store(cfg).load_with_source();
    let value = frame.reading().map_or(0, |r| r.value);

    if json_mode() {
        println!(
            "{}",
            serde_json::json!({
                "ok": true,
                "profile": source_name(source),
                "period_us": gauge.period_us(),
                "value": value,
                "label": gauge.label(),
            })
        );
    } else {
        println!(
            "self-check ok: profile {}, tick {}us, reading {value} {}",
            source_name(source),
            gauge.period_us(),
            gauge.label()
        );
    }
    Ok(())
}
