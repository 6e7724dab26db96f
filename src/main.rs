use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use std::sync::Arc;

use cadremote::cli::Args;
use cadremote::config::{self, RemoteSettings};
use cadremote::core::ui_channel;
use cadremote::host::demo::{DemoCatalog, DemoUi};
use cadremote::prefs::JsonPrefs;
use cadremote::server::RemoteServer;
use cadremote::utils::net;

fn init_logging(args: &Args, path_config: &config::PathConfig) -> Result<()> {
    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let log_level = match args.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    if let Some(log_path_opt) = &args.log_file {
        let log_path = log_path_opt
            .as_ref()
            .cloned()
            .unwrap_or_else(|| config::data_file(config::LOG_FILE, path_config));

        let file = std::fs::File::create(&log_path)
            .with_context(|| format!("Failed to create log file {}", log_path.display()))?;

        env_logger::Builder::new()
            .filter_level(log_level)
            .filter_module("tiny_http", log::LevelFilter::Warn)
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!("Logging to file: {} (level: {:?})", log_path.display(), log_level);
    } else {
        // Console logging (respects RUST_LOG if set)
        let default_level = match args.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .filter_module("tiny_http", log::LevelFilter::Warn)
            .format_timestamp_millis()
            .init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let path_config = config::PathConfig::from_env_and_cli(args.config_dir.clone());
    if let Err(e) = config::ensure_dirs(&path_config) {
        eprintln!("Warning: Failed to create application directories: {}", e);
    }

    init_logging(&args, &path_config)?;
    info!("cadremote {} starting...", env!("CARGO_PKG_VERSION"));
    debug!("Command-line args: {:?}", args);

    let prefs_path = config::config_file(config::PREFS_FILE, &path_config);
    info!("Preferences: {}", prefs_path.display());
    let prefs = Arc::new(JsonPrefs::load(&prefs_path)?);

    let settings = RemoteSettings::resolve(&args.overrides(), prefs.as_ref());
    debug!("Settings: {:?}", settings);
    if !settings.document_root.is_dir() {
        warn!(
            "Document root {} does not exist, only the JSON API will answer",
            settings.document_root.display()
        );
    }

    // This thread plays the host's UI thread
    let (ui_queue, mut dispatcher) = ui_channel(DemoUi::new());
    let host = Arc::new(DemoCatalog::new(args.macro_dir.clone()));
    let server = RemoteServer::new(settings, host, prefs, ui_queue)?;

    // Bind failures are reported once; the host keeps running without the server
    match server.start() {
        Ok(addr) => match net::connect_url(addr, net::local_ip()) {
            Some(url) => println!("You can connect your device to: {}", url),
            None => warn!("Network address not detected"),
        },
        Err(e) => eprintln!("Remote control disabled: {}", e),
    }

    dispatcher.run();

    server.stop();
    Ok(())
}
