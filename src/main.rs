// SolSleuth - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Configuration loading (config.toml)
// 3. Logging initialisation (debug mode support)
// 4. eframe GUI launch

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod gui;

// Re-export modules from the library crate so that `gui.rs` and other
// binary-side code can still use `crate::app::...`, `crate::core::...` etc.
pub use solsleuth::app;
pub use solsleuth::core;
pub use solsleuth::platform;
pub use solsleuth::ui;
pub use solsleuth::util;

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// SolSleuth - Flash shared-object (.sol) save file viewer.
///
/// Searches the Flash Player save directories (or a directory you
/// choose) for .sol save files and recovers the account credentials
/// stored inside them.
#[derive(Parser, Debug)]
#[command(name = "SolSleuth", version, about)]
struct Cli {
    /// Directory to search (defaults to the platform Flash Player save dirs).
    path: Option<PathBuf>,

    /// Only examine files whose name contains this text (case-insensitive).
    #[arg(short = 'f', long = "filter")]
    filter: Option<String>,

    /// Per-file scan budget in milliseconds.
    #[arg(long = "deadline-ms")]
    deadline_ms: Option<u64>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    // Resolve platform paths and load config.toml before logging init so
    // the configured level can take effect. Anything config loading
    // wants to say is returned as warnings and logged afterwards.
    let platform_paths = platform::config::PlatformPaths::resolve();
    let (mut config, config_warnings) = platform::config::load_config(&platform_paths.config_dir);

    util::logging::init(cli.debug, config.log_level.as_deref());

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "SolSleuth starting"
    );

    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    // CLI overrides take precedence over config.toml.
    if let Some(filter) = cli.filter {
        config.name_filter = Some(filter);
    }
    if let Some(ms) = cli.deadline_ms {
        if (util::constants::MIN_DEADLINE_MS..=util::constants::MAX_DEADLINE_MS).contains(&ms) {
            config.deadline = Duration::from_millis(ms);
        } else {
            tracing::warn!(
                deadline_ms = ms,
                "--deadline-ms out of range ({}-{}), keeping {}ms",
                util::constants::MIN_DEADLINE_MS,
                util::constants::MAX_DEADLINE_MS,
                config.deadline.as_millis()
            );
        }
    }

    // Create application state; surface config warnings in the UI too.
    let mut state = app::state::AppState::new();
    for warning in config_warnings {
        state.push_warning(warning);
    }

    // A path on the CLI behaves exactly like choosing it in the UI.
    if let Some(path) = cli.path {
        state.chosen_dir = Some(path);
    }

    let flash_dirs = platform_paths.flash_dirs.clone();
    let dark_mode = config.dark_mode;
    let font_size = config.font_size;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!(
                "{} v{}",
                util::constants::APP_NAME,
                util::constants::APP_VERSION
            ))
            .with_inner_size([900.0, 600.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        util::constants::APP_NAME,
        native_options,
        Box::new(move |cc| {
            ui::theme::apply(&cc.egui_ctx, dark_mode, font_size);
            Ok(Box::new(gui::SolSleuthApp::new(state, config, flash_dirs)))
        }),
    );

    if let Err(e) = result {
        tracing::error!(error = %e, "Failed to launch GUI");
        eprintln!("Error: Failed to launch SolSleuth GUI: {e}");
        std::process::exit(1);
    }
}
