//! SimTracker - simulated motion-capture daemon
//!
//! Publishes the pose of one virtual rigid body at a fixed rate so tracking
//! clients can be developed without cameras.
//!
//! ## Threads
//!
//! - **driver**: ticks the trajectory engine and publishes each pose
//! - **control-console**: stdin commands (mode switches, setters, nudges)
//!
//! Ctrl-C or `quit` on the console stops the daemon.

use clap::Parser;
use sim_tracker::control::{ControlPanel, console};
use sim_tracker::driver::{DriverConfig, DriverThread};
use sim_tracker::engine::{SharedEngine, TrajectoryEngine, TrajectoryMode};
use sim_tracker::error::{Error, Result};
use sim_tracker::sink::create_sink;
use sim_tracker::{Config, KinematicState, Pose};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to TOML config file
    #[arg(short, long, default_value = "sim_tracker.toml")]
    config: String,

    /// Override the startup trajectory mode
    #[arg(short, long)]
    mode: Option<String>,

    /// Do not read commands from stdin
    #[arg(long)]
    no_console: bool,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        print!("{}", Config::default().to_toml_string()?);
        return Ok(());
    }

    // Logger level comes from the config, so read it once before logging is up
    // and again afterwards to surface any field warnings.
    let level = Config::load(&args.config).logging.level;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    log::info!("SimTracker v{} starting...", env!("CARGO_PKG_VERSION"));
    log::info!("Using config: {}", args.config);
    let mut config = Config::load(&args.config);

    if let Some(name) = &args.mode {
        config.trajectory.mode = TrajectoryMode::from_config(name)
            .ok_or_else(|| Error::Config(format!("Unknown trajectory mode '{}'", name)))?;
    }
    log::info!("{}", config.summary());

    let params = config.trajectory_params();
    let initial = params.initial;
    let engine = SharedEngine::new(TrajectoryEngine::new(
        Pose::new(initial.position, initial.orientation()),
        KinematicState::default(),
    ));
    engine.set_mode(config.trajectory.mode, &params);

    let sink = create_sink(&config).map_err(|e| {
        log::error!(
            "Failed to create tracker server on {}:{}",
            config.tracker.server_identifier,
            config.sink.port
        );
        e
    })?;

    // Set up shutdown signal handler
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    let driver = DriverThread::spawn(
        engine.clone(),
        sink,
        DriverConfig {
            object_name: config.tracker.object_name.clone(),
            frequency_hz: config.tracker.update_frequency_hz,
        },
        Arc::clone(&running),
    )?;

    // The console thread blocks on stdin and is not joined
    if !args.no_console {
        console::spawn(ControlPanel::new(engine, params), Arc::clone(&running))?;
    }

    let published = driver
        .join()
        .map_err(|_| Error::Other("Driver thread panicked".to_string()))?;

    log::info!("SimTracker stopped ({} poses published)", published);
    Ok(())
}
