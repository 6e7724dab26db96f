use clap::Parser;
use std::path::PathBuf;

use crate::config::SettingsOverrides;

// Build version with target info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "HTTP:   rouille 3.6\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Remote-control server for a CAD host (demo host on the main thread)
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Listening port (default: remote.port preference, then 8521)
    #[arg(short = 'p', long = "port", value_name = "PORT")]
    pub port: Option<u16>,

    /// Address to bind (default: 0.0.0.0)
    #[arg(short = 'b', long = "bind", value_name = "ADDR")]
    pub bind_address: Option<String>,

    /// Directory with the web client (index.html, css/, js/, img/)
    #[arg(short = 'd', long = "docroot", value_name = "DIR")]
    pub document_root: Option<PathBuf>,

    /// Directory scanned for *.FCMacro / *.py macros
    #[arg(short = 'm', long = "macro-dir", value_name = "DIR")]
    pub macro_dir: Option<PathBuf>,

    /// How long a UI request waits for the UI thread, in milliseconds
    #[arg(short = 't', long = "timeout-ms", value_name = "MS")]
    pub ui_timeout_ms: Option<u64>,

    /// Enable debug logging to file (default: cadremote.log)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

impl Args {
    /// Settings given on the command line
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            port: self.port,
            bind_address: self.bind_address.clone(),
            document_root: self.document_root.clone(),
            ui_timeout_ms: self.ui_timeout_ms,
        }
    }
}
