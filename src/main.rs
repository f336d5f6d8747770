//! Shake Dice CLI
//!
//! Command-line interface for testing and demonstrating the
//! shake-to-roll pipeline with a scripted mock sensor.

use clap::Parser;
use shake_dice::{
    display::{ConsoleDisplay, RollDisplay},
    entropy::HashAlgorithm,
    metrics::RollStats,
    outcome::{persist, OutcomeTracker},
    sensor::{FileConfig, MockMotionSensor, MotionSensor},
    session::{spawn_background_tasks, IdleClock, MotionSession, SessionController},
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex, RwLock};
use tracing::{info, warn};

/// Roll dice by simulated shaking.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of scripted shakes to play back on the mock sensor.
    #[arg(long, default_value_t = 5)]
    shakes: u32,

    /// Override the lowest outcome value.
    #[arg(long)]
    min: Option<i32>,

    /// Override the highest outcome value.
    #[arg(long)]
    max: Option<i32>,

    /// Persist the outcome distribution to this file across runs.
    #[arg(long)]
    persist: Option<PathBuf>,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    info!("Shake Dice v{}", shake_dice::VERSION);
    info!("This is a demonstration using mock sensor input");

    let mut config = match &args.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };
    if let Some(min) = args.min {
        config.roll.min = min;
    }
    if let Some(max) = args.max {
        config.roll.max = max;
    }

    let range_id = config.roll.range_identity();
    info!(range = %range_id, shakes = args.shakes, "Starting demo run");

    // Load or create the outcome distribution.
    let tracker = match &args.persist {
        Some(path) => {
            match persist::load(path, &range_id, config.roll.min, config.roll.max) {
                Ok(t) => t,
                Err(e) => {
                    warn!("Failed to load persisted distribution: {}; starting fresh", e);
                    OutcomeTracker::new(config.roll.min, config.roll.max)
                }
            }
        }
        None => OutcomeTracker::new(config.roll.min, config.roll.max),
    };
    let tracker = Arc::new(RwLock::new(tracker));

    let display: Arc<Mutex<dyn RollDisplay>> = Arc::new(Mutex::new(ConsoleDisplay::new()));
    let clock = Arc::new(IdleClock::new());
    let running = Arc::new(AtomicBool::new(true));
    let stats = Arc::new(RollStats::default());

    // Optional Prometheus exporter over the live tracker and counters.
    #[cfg(feature = "metrics")]
    {
        use shake_dice::metrics::{MetricsServer, RollMetricsRegistry};

        match RollMetricsRegistry::new() {
            Ok(registry) => {
                let server = MetricsServer::new(
                    ([0, 0, 0, 0], config.metrics.exporter_port).into(),
                    registry,
                    Arc::clone(&tracker),
                    Arc::clone(&stats),
                );
                std::thread::spawn(move || {
                    let runtime = match tokio::runtime::Runtime::new() {
                        Ok(rt) => rt,
                        Err(e) => {
                            warn!("Failed to start metrics runtime: {}", e);
                            return;
                        }
                    };
                    if let Err(e) = runtime.block_on(server.run()) {
                        warn!("Metrics exporter stopped: {}", e);
                    }
                });
            }
            Err(e) => warn!("Failed to create metrics registry: {}", e),
        }
    }

    // Ctrl-C requests a clean stop of the controller loop.
    {
        let running = Arc::clone(&running);
        if let Err(e) = ctrlc::set_handler(move || {
            running.store(false, Ordering::Relaxed);
        }) {
            warn!("Failed to install Ctrl-C handler: {}", e);
        }
    }

    // Periodic background activities: idle watchdog and display refresh.
    let (idle_tx, idle_rx) = mpsc::channel();
    let tasks = spawn_background_tasks(
        Arc::clone(&tracker),
        Arc::clone(&display),
        Arc::clone(&clock),
        &config.idle,
        &config.display,
        Arc::clone(&running),
        Arc::clone(&stats),
        idle_tx,
    );

    // Scripted shakes of varying lengths for the demo.
    let script: Vec<u32> = (0..args.shakes).map(|i| 3 + (i * 7) % 10).collect();
    let mut sensor = MockMotionSensor::with_script(script);
    if let Err(e) = sensor.open(&config.sensor) {
        eprintln!("Failed to open sensor: {}", e);
        std::process::exit(1);
    }

    let session = MotionSession::new(
        &config.roll,
        HashAlgorithm::Blake3,
        config.sensor.sample_interval(),
    );
    let mut controller = SessionController::new(
        sensor,
        session,
        Arc::clone(&tracker),
        Arc::clone(&display),
        Arc::clone(&clock),
        Arc::clone(&running),
        Arc::clone(&stats),
    );

    if let Err(e) = controller.run() {
        warn!("Controller stopped with error: {}", e);
    }

    running.store(false, Ordering::Relaxed);
    tasks.join();

    let mut idle_signals = 0u64;
    while idle_rx.try_recv().is_ok() {
        idle_signals += 1;
    }
    if idle_signals > 0 {
        info!(idle_signals, "Low-power state was requested during the run");
    }

    // Final distribution summary.
    let snapshot = tracker.read().expect("tracker lock poisoned").snapshot();
    println!("sessions: {}", controller.sessions_completed());
    for (value, count) in &snapshot.counts {
        println!("  {value}: {count}");
    }

    if let Some(path) = &args.persist {
        let tracker = tracker.read().expect("tracker lock poisoned");
        if let Err(e) = persist::save(&tracker, &range_id, path) {
            warn!("Failed to persist distribution: {}", e);
        }
    }

    info!("Done. Sessions completed: {}", controller.sessions_completed());
}
