use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use sysinfo::System;

use sfx_pool::{
    AppResult, Clip, JsonSettingsStore, PlaybackManager, RodioDevice, SfxConfig, Ticker,
};

const LOG_TARGET_STARTUP: &str = "sfx_pool::startup";

/// Initialize tracing with file rotation
///
/// Logs are written to:
/// - macOS: ~/Library/Application Support/SfxPool/logs/
/// - Windows: %APPDATA%/SfxPool/logs/
/// - Linux: ~/.config/SfxPool/logs/
///
/// Log output:
/// - Debug builds: Console + File
/// - Release builds: File only
fn initialize_tracing() {
    use tracing_appender::rolling;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_dir = dirs::config_dir()
        .map(|dir| dir.join("SfxPool").join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("logs"));

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create log directory: {}", e);
    }

    // Create file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "sfx-pool.log");

    // Configure filter (info level by default)
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true);

    #[cfg(debug_assertions)]
    {
        let console_layer = fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(true)
            .with_target(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(console_layer)
            .init();
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();
    }

    tracing::info!("Log directory: {}", log_dir.display());
}

fn log_runtime_environment() {
    let version = env!("CARGO_PKG_VERSION");
    let os_name = System::long_os_version()
        .or_else(System::name)
        .unwrap_or_else(|| "Unknown OS".to_string());
    let architecture = std::env::consts::ARCH;

    tracing::info!(
        target: LOG_TARGET_STARTUP,
        "Starting sfx-pool demo v{} ({})",
        version,
        architecture
    );
    tracing::info!(target: LOG_TARGET_STARTUP, "Operating System: {}", os_name);
}

/// Poll until the manager has nothing left to play
fn wait_until_idle(manager: &PlaybackManager<RodioDevice>, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while manager.active_count() > 0 {
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(20));
    }
    true
}

fn run(paths: &[String]) -> AppResult<()> {
    let config = SfxConfig::load().context("Failed to load configuration")?;
    tracing::info!("Config: {}", SfxConfig::config_path_display());

    let settings_path = config
        .settings_file
        .as_ref()
        .map(PathBuf::from)
        .or_else(JsonSettingsStore::default_path)
        .context("No settings directory available")?;
    let settings = JsonSettingsStore::open_or_default(settings_path);

    let clips = paths
        .iter()
        .map(Clip::load)
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to preload clips")?;

    // The stream has to outlive every voice, so it stays on this thread
    let (_stream, device) = RodioDevice::open_default().context("Failed to open audio output")?;
    let manager = Arc::new(PlaybackManager::with_config(device, settings, &config));
    let (events, _subscription) = manager.subscribe();
    let mut ticker = Ticker::spawn(Arc::clone(&manager), config.tick_interval())
        .context("Failed to start ticker thread")?;

    let first = &clips[0];
    tracing::info!("Awaiting '{}'", first.name());
    manager.play_await(first)?.wait();

    for clip in &clips {
        manager.play(clip)?;
    }

    manager.play_looped(first, "demo-loop")?;
    thread::sleep(Duration::from_secs(1));
    manager.pause_all();
    thread::sleep(Duration::from_millis(500));
    manager.unpause_all();
    thread::sleep(Duration::from_secs(1));
    manager.stop("demo-loop");

    if !wait_until_idle(&manager, Duration::from_secs(30)) {
        tracing::warn!("Clips still playing after 30s, stopping them");
        manager.stop_all();
    }

    ticker.stop();
    manager.shutdown().context("Failed to save audio settings")?;

    for event in events.try_iter() {
        tracing::debug!("{}", event.description());
    }
    println!("✓ Played {} clip(s)", clips.len());
    Ok(())
}

fn main() {
    initialize_tracing();
    log_runtime_environment();

    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        eprintln!("Usage: sfx-pool-demo <clip> [clip...]");
        std::process::exit(2);
    }

    if let Err(e) = run(&paths) {
        tracing::error!("{:#}", e);
        eprintln!("✗ {:#}", e);
        std::process::exit(1);
    }
}
