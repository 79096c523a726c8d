//! keytrace CLI
//!
//! Keystroke timing visualization and replay.

use chrono::Utc;
use clap::{Parser, Subcommand};
use keytrace::config::Config;
use keytrace::core::presence::build_presence;
use keytrace::input::{read_timestamps, TimestampFormat};
use keytrace::render::{write_chart, ChartOptions};
use keytrace::replay::{build_plan, read_log, KeyEmitter, KeyMap, NullEmitter};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "keytrace")]
#[command(version = keytrace::VERSION)]
#[command(about = "Keystroke timing visualization and replay", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a presence chart from a timestamp capture
    Plot {
        /// Timestamp file (.bin = little-endian u64, .csv/.txt = one integer per row)
        input: PathBuf,

        /// Reference start time subtracted from every timestamp, in ticks
        #[arg(long, default_value = "0")]
        origin: u64,

        /// TSC frequency of the capturing machine in GHz (default from config)
        #[arg(long)]
        cpu_freq: Option<f64>,

        /// Bucket width in milliseconds (default from config)
        #[arg(long)]
        bucket_ms: Option<u64>,

        /// Number of buckets (default from config)
        #[arg(long)]
        buckets: Option<usize>,

        /// Input format override (bin or csv)
        #[arg(long)]
        format: Option<String>,

        /// Output HTML path (default: export dir with a timestamped name)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Replay a keystroke capture log through a virtual keyboard
    Replay {
        /// Capture log file (dmesg records from the capture module)
        log: PathBuf,

        /// Speed factor (2.0 = twice as fast as recorded)
        #[arg(long, default_value = "1.0")]
        speed: f64,

        /// TSC frequency of the capturing machine in GHz (default from config)
        #[arg(long)]
        cpu_freq: Option<f64>,

        /// Print the schedule instead of emitting events
        #[arg(long)]
        dry_run: bool,
    },

    /// Emit one key repeatedly for a fixed duration
    Tap {
        /// Key symbol to emit
        #[arg(long, default_value = "a")]
        key: String,

        /// Total duration in seconds
        #[arg(long, default_value = "20")]
        duration: u64,

        /// Interval between taps in milliseconds
        #[arg(long, default_value = "100")]
        interval_ms: u64,

        /// Count taps instead of emitting events
        #[arg(long)]
        dry_run: bool,
    },

    /// Show configuration
    Config,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Plot {
            input,
            origin,
            cpu_freq,
            bucket_ms,
            buckets,
            format,
            output,
        } => {
            cmd_plot(input, origin, cpu_freq, bucket_ms, buckets, format, output);
        }
        Commands::Replay {
            log,
            speed,
            cpu_freq,
            dry_run,
        } => {
            cmd_replay(log, speed, cpu_freq, dry_run);
        }
        Commands::Tap {
            key,
            duration,
            interval_ms,
            dry_run,
        } => {
            cmd_tap(&key, duration, interval_ms, dry_run);
        }
        Commands::Config => {
            cmd_config();
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_plot(
    input: PathBuf,
    origin: u64,
    cpu_freq: Option<f64>,
    bucket_ms: Option<u64>,
    buckets: Option<usize>,
    format: Option<String>,
    output: Option<PathBuf>,
) {
    let config = Config::load().unwrap_or_default();
    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: Could not create export directory: {e}");
    }
    let cpu_freq = cpu_freq.unwrap_or(config.cpu_freq_ghz);
    let bucket_ms = bucket_ms.unwrap_or(config.bucket_ms);
    let buckets = buckets.unwrap_or(config.bucket_count);

    if cpu_freq <= 0.0 {
        eprintln!("Error: --cpu-freq must be strictly positive");
        std::process::exit(1);
    }

    let format = match format {
        Some(name) => match TimestampFormat::from_name(&name) {
            Some(f) => Some(f),
            None => {
                eprintln!("Error: unknown format {name:?} (expected bin or csv)");
                std::process::exit(1);
            }
        },
        None => None,
    };

    let timestamps = match read_timestamps(&input, format) {
        Ok(timestamps) => timestamps,
        Err(e) => {
            eprintln!("Error reading timestamps: {e}");
            std::process::exit(1);
        }
    };
    println!("Read {} timestamps from {:?}", timestamps.len(), input);

    let scale = cpu_freq * 1e6 * bucket_ms as f64;
    let presence = match build_presence(&timestamps, origin, scale, buckets) {
        Ok(presence) => presence,
        Err(e) => {
            eprintln!("Error bucketing timestamps: {e}");
            std::process::exit(1);
        }
    };

    println!(
        "Buckets occupied: {} / {} ({} ms each)",
        presence.occupied(),
        presence.len(),
        bucket_ms
    );
    if presence.dropped() > 0 {
        println!(
            "Dropped {} timestamps outside the observation window",
            presence.dropped()
        );
    }

    let output = output.unwrap_or_else(|| {
        config.export_path.join(format!(
            "keystrokes_{}.html",
            Utc::now().format("%Y%m%d_%H%M%S")
        ))
    });

    let options = ChartOptions {
        bucket_ms,
        ..Default::default()
    };
    match write_chart(&presence, &options, &output) {
        Ok(()) => println!("Wrote chart to {output:?}"),
        Err(e) => {
            eprintln!("Error writing chart: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_replay(log_path: PathBuf, speed: f64, cpu_freq: Option<f64>, dry_run: bool) {
    let config = Config::load().unwrap_or_default();
    let cpu_freq = cpu_freq.unwrap_or(config.cpu_freq_ghz);

    let parsed = match read_log(&log_path) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Error reading capture log: {e}");
            std::process::exit(1);
        }
    };
    println!(
        "Parsed {} records ({} presses) from {:?}",
        parsed.records.len(),
        parsed.press_count(),
        log_path
    );
    if parsed.skipped > 0 {
        println!("Skipped {} malformed lines", parsed.skipped);
    }

    let keymap = KeyMap::qwerty();
    let plan = match build_plan(&parsed.records, &keymap, cpu_freq, speed) {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if plan.steps.is_empty() {
        eprintln!("Error: no replayable press records in {log_path:?}");
        std::process::exit(1);
    }
    if plan.unmapped > 0 {
        println!("Skipped {} presses with unmapped key symbols", plan.unmapped);
    }
    if plan.clamped > 0 {
        println!("Clamped {} non-monotonic intervals to zero", plan.clamped);
    }
    println!(
        "Replaying {} keystrokes over {:.1}s (speed x{})",
        plan.steps.len(),
        plan.total_delay().as_secs_f64(),
        speed
    );

    if dry_run {
        for step in &plan.steps {
            println!("  +{:>6} ms  {}", step.delay.as_millis(), step.key);
        }
        println!("Dry run complete.");
        return;
    }

    let mut emitter = make_emitter(&keymap);
    let running = run_flag();

    println!("Press Ctrl+C to stop");
    for step in &plan.steps {
        if !running.load(Ordering::SeqCst) {
            println!();
            println!("Replay interrupted.");
            return;
        }
        thread::sleep(step.delay);
        if let Err(e) = emitter.tap(step.code) {
            eprintln!("Error emitting {:?}: {e}", step.key);
            std::process::exit(1);
        }
    }
    println!("Replay complete.");
}

fn cmd_tap(key: &str, duration: u64, interval_ms: u64, dry_run: bool) {
    let keymap = KeyMap::qwerty();
    let code = match keymap.resolve(key) {
        Some(code) => code,
        None => {
            eprintln!("Error: unknown key symbol {key:?}");
            std::process::exit(1);
        }
    };

    let mut emitter: Box<dyn KeyEmitter> = if dry_run {
        Box::new(NullEmitter::new())
    } else {
        make_emitter(&keymap)
    };

    let deadline = match Instant::now().checked_add(Duration::from_secs(duration)) {
        Some(deadline) => deadline,
        None => {
            eprintln!("Error: --duration {duration} is too large");
            std::process::exit(1);
        }
    };

    let running = run_flag();
    let interval = Duration::from_millis(interval_ms);
    let mut taps = 0u64;

    println!("Tapping {key:?} every {interval_ms} ms for {duration}s");
    println!("Press Ctrl+C to stop");
    while running.load(Ordering::SeqCst) && Instant::now() < deadline {
        if let Err(e) = emitter.tap(code) {
            eprintln!("Error emitting {key:?}: {e}");
            std::process::exit(1);
        }
        taps += 1;
        thread::sleep(interval);
    }
    println!("Emitted {taps} taps.");
}

fn cmd_config() {
    let config = Config::load().unwrap_or_default();

    // First run: persist the defaults so they can be edited in place.
    if !Config::config_path().exists() {
        if let Err(e) = config.save() {
            eprintln!("Warning: Could not write default config: {e}");
        }
    }

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!("Ticks per bucket: {}", config.ticks_per_bucket());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}

/// Set up Ctrl+C handler.
fn run_flag() -> Arc<AtomicBool> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");
    running
}

/// Create the uinput-backed emitter, or exit with guidance if uinput is not
/// accessible.
#[cfg(target_os = "linux")]
fn make_emitter(keymap: &KeyMap) -> Box<dyn KeyEmitter> {
    use keytrace::replay::{check_permission, UinputEmitter};

    if !check_permission() {
        eprintln!("Error: cannot open /dev/uinput for writing.");
        eprintln!();
        eprintln!("To grant access:");
        eprintln!("1. Load the uinput module: sudo modprobe uinput");
        eprintln!("2. Run as root, or add a udev rule granting your user write access");
        eprintln!("3. Alternatively, re-run with --dry-run");
        std::process::exit(1);
    }

    match UinputEmitter::new(keymap) {
        Ok(emitter) => Box::new(emitter),
        Err(e) => {
            eprintln!("Error creating virtual keyboard: {e}");
            std::process::exit(1);
        }
    }
}

/// Synthetic input devices are only supported on Linux; elsewhere emission
/// silently degrades to a counting emitter.
#[cfg(not(target_os = "linux"))]
fn make_emitter(_keymap: &KeyMap) -> Box<dyn KeyEmitter> {
    eprintln!("Warning: synthetic input devices require Linux; running without emission");
    Box::new(NullEmitter::new())
}
