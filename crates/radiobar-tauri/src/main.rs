//! Radiobar - Tray-resident desktop radio player
//!
//! A frameless webview window with four station buttons, a tray icon with
//! show/hide, move, about and exit, and window placement plus the last
//! station remembered across restarts.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use clap::Parser;
use radiobar_core::{config::HIDDEN_ARG, LaunchMode};
use std::path::PathBuf;
use tauri_plugin_autostart::MacosLauncher;

mod commands;
mod shell;
mod tray;

/// Radiobar - desktop radio player
#[derive(Parser, Debug)]
#[command(name = "radiobar")]
#[command(version)]
#[command(about = "Tray-resident desktop radio player", long_about = None)]
struct Cli {
    /// Stay in the tray until the window is requested
    #[arg(long)]
    hidden: bool,

    /// Configuration file (defaults to config.json in the app config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "debug"
    } else {
        "info,radiobar=debug,radiobar_core=debug"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    tracing::info!(
        version = radiobar_core::VERSION,
        hidden = cli.hidden,
        "Starting Radiobar"
    );

    if let Err(e) = run(cli) {
        tracing::error!(error = %e, "Radiobar failed");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let options = shell::LaunchOptions {
        launch: LaunchMode::from_hidden_flag(cli.hidden),
        config_path: cli.config,
    };

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_autostart::init(
            MacosLauncher::LaunchAgent,
            Some(vec![HIDDEN_ARG]),
        ))
        .invoke_handler(tauri::generate_handler![
            // Bridge
            commands::station_changed,
            commands::get_window_position,
            commands::update_window_position,
            // Window chrome
            commands::show_context_menu,
            // Info
            commands::get_stations,
            commands::get_version,
        ])
        .on_menu_event(|app, event| shell::on_menu_event(app, event.id().as_ref()))
        .on_window_event(shell::on_window_event)
        .setup(move |app| {
            shell::setup(app, options)?;
            tracing::info!("Radiobar initialized");
            Ok(())
        })
        .build(tauri::generate_context!())?
        .run(shell::on_run_event);

    Ok(())
}
