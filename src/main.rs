//! Autoclick - watches the screen for a button image and clicks it.
//!
//! Main entry point for the command-line agent.
//!
//! # Execution Flow
//!
//! 1. Parse flags and resolve the layered configuration
//! 2. Optionally write the resolved config (`--write-config`) and exit
//! 3. Initialize logging → `<log_dir>/autoclick.<date>`
//! 4. Decode the template images (missing or corrupt primary image is fatal)
//! 5. Register the toggle and quit hotkeys (failure is fatal)
//! 6. Run the detection loop on the main thread until quit or idle timeout
//! 7. Log the run summary and shut the runtime down

use anyhow::{Context, Result};
use autoclick::cli::Cli;
use autoclick::config::DEFAULT_CONFIG_FILE;
use autoclick::logging::{LogOptions, setup_logging};
use autoclick::platform::{
    EnigoDriver, FocusedWindow, HotkeySource, NccMatcher, RdevHotkeys, ScreenCapture,
};
use autoclick::services::load_templates;
use autoclick::{
    APP_NAME, Collaborators, ConfigManager, DetectionLoop, Metrics, StateManager, VERSION,
};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let manager = ConfigManager::new(cli.config.clone());
    let config = manager
        .load(&cli.overrides())
        .context("Failed to load configuration")?;

    if let Some(path) = &cli.write_config {
        ConfigManager::save_config(path, &config)?;
        println!("Wrote configuration to {}", path);
        return Ok(());
    }

    let _guard = setup_logging(LogOptions {
        log_dir: &config.log_dir,
        prefix: APP_NAME,
        debug: config.debug,
        json: config.log_json,
        console: true,
    })?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);
    match manager.config_path() {
        Some(path) => tracing::info!("Configuration file: {}", path),
        None => tracing::info!("Configuration file: {} (if present)", DEFAULT_CONFIG_FILE),
    }
    tracing::info!(
        "Watching for {} (confidence {:.2}, interval {:.2}s, button {}, clicks {})",
        config.image_path,
        config.confidence,
        config.interval_seconds,
        config.click_button.as_str(),
        config.click_count
    );
    if let Some(region) = config.region {
        tracing::info!(
            "Capture region: {},{} {}x{}",
            region.left,
            region.top,
            region.width,
            region.height
        );
    }
    if let Some(filter) = &config.window_title_filter {
        tracing::info!("Only active while the focused window title contains '{}'", filter);
    }
    match config.idle_timeout() {
        Some(timeout) => tracing::info!("Stopping after {:.0}s without a detection", timeout.as_secs_f64()),
        None => tracing::info!("Idle stop disabled"),
    }
    if config.restore_pointer {
        tracing::info!(
            "Pointer restored after each click (over {:.2}s)",
            config.restore_duration_seconds
        );
    }
    tracing::info!(
        "Hotkeys: {} toggles pause, {} quits",
        config.toggle_hotkey,
        config.quit_hotkey
    );

    let templates = load_templates(&config.image_path, config.images_dir.as_deref())
        .context("Failed to load template images")?;
    tracing::info!("Loaded {} template(s)", templates.len());
    for template in templates.iter() {
        tracing::info!(
            "Template {} ({}x{})",
            template.path,
            template.image.width(),
            template.image.height()
        );
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let state_manager = StateManager::new();
    let metrics = Arc::new(Metrics::new());

    let bindings = config.hotkey_bindings()?;
    let events = RdevHotkeys::new()
        .subscribe(&bindings)
        .context("Failed to register global hotkeys")?;

    let parts = Collaborators {
        frames: Box::new(ScreenCapture::new()),
        matcher: Box::new(NccMatcher::new()),
        input: Box::new(EnigoDriver::new().context("Failed to initialize pointer control")?),
        windows: Box::new(FocusedWindow::new()),
    };

    let detection = DetectionLoop::new(
        &config,
        state_manager.clone(),
        templates,
        parts,
        events,
        Arc::clone(&metrics),
    );

    // The loop owns non-Send platform handles, so it runs on this thread
    let reason = runtime.block_on(detection.run());

    tracing::info!("Stopped: {}", reason);
    metrics.log_summary();

    runtime.shutdown_timeout(Duration::from_secs(5));

    tracing::info!("Shutdown complete");
    Ok(())
}
