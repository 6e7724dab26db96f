//! Settings and application directories.
//!
//! Every setting resolves as: CLI flag → persisted preference → default.
//! Only the port is persisted; it is the one value users change from the
//! host's preference dialog.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::prefs::{KEY_PORT, Preferences};

/// Default listening port
pub const DEFAULT_PORT: u16 = 8521;
/// Lowest port accepted from the persisted preference
pub const MIN_PERSISTED_PORT: u16 = 1000;
/// How long a UI request waits for the UI thread
pub const DEFAULT_UI_TIMEOUT_MS: u64 = 6000;
/// Listen on all interfaces: clients are phones on the same network
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
/// Preferences file name
pub const PREFS_FILE: &str = "cadremote.json";
/// Log file name (with `--log` and no explicit path)
pub const LOG_FILE: &str = "cadremote.log";

/// Remote-control server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    pub port: u16,
    pub bind_address: String,
    /// Static assets (index.html, css/, js/, img/)
    pub document_root: PathBuf,
    pub ui_timeout_ms: u64,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            document_root: PathBuf::from("www"),
            ui_timeout_ms: DEFAULT_UI_TIMEOUT_MS,
        }
    }
}

/// Values given on the command line (all optional)
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub port: Option<u16>,
    pub bind_address: Option<String>,
    pub document_root: Option<PathBuf>,
    pub ui_timeout_ms: Option<u64>,
}

impl RemoteSettings {
    /// Resolve settings from CLI overrides and persisted preferences.
    pub fn resolve(overrides: &SettingsOverrides, prefs: &dyn Preferences) -> Self {
        let defaults = Self::default();
        let persisted_port = prefs.get(KEY_PORT).and_then(|p| match p.trim().parse::<u16>() {
            Ok(port) if port >= MIN_PERSISTED_PORT => Some(port),
            Ok(port) => {
                log::warn!(
                    "Ignoring {} preference {}: below {}, using {}",
                    KEY_PORT,
                    port,
                    MIN_PERSISTED_PORT,
                    DEFAULT_PORT
                );
                None
            }
            Err(e) => {
                log::warn!("Ignoring invalid {} preference {:?}: {}", KEY_PORT, p, e);
                None
            }
        });

        Self {
            port: overrides.port.or(persisted_port).unwrap_or(defaults.port),
            bind_address: overrides.bind_address.clone().unwrap_or(defaults.bind_address),
            document_root: overrides.document_root.clone().unwrap_or(defaults.document_root),
            ui_timeout_ms: overrides.ui_timeout_ms.unwrap_or(defaults.ui_timeout_ms),
        }
    }

    pub fn ui_timeout(&self) -> Duration {
        Duration::from_millis(self.ui_timeout_ms)
    }

    /// `host:port` to bind
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Configuration for overriding default application paths
#[derive(Debug, Clone)]
pub struct PathConfig {
    /// Custom config directory (from CLI or ENV)
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    /// Priority: CLI args → ENV var (CADREMOTE_CONFIG_DIR) → None (use defaults)
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>) -> Self {
        let config_dir = cli_dir.or_else(|| std::env::var("CADREMOTE_CONFIG_DIR").ok().map(PathBuf::from));
        Self { config_dir }
    }
}

/// Path to a configuration file.
///
/// Priority:
/// 1. CLI --config-dir / CADREMOTE_CONFIG_DIR
/// 2. Current folder IF it already holds cadremote.json
/// 3. Platform config directory from dirs-next (~/.config/cadremote on Linux)
pub fn config_file(name: &str, config: &PathConfig) -> PathBuf {
    get_config_dir(config).join(name)
}

/// Path to a data file (logs). Same priority as [`config_file`], with the
/// platform data directory as the last step.
pub fn data_file(name: &str, config: &PathConfig) -> PathBuf {
    get_data_dir(config).join(name)
}

/// Create config and data directories if missing.
pub fn ensure_dirs(config: &PathConfig) -> Result<()> {
    let config_dir = get_config_dir(config);
    let data_dir = get_data_dir(config);

    for dir in [&config_dir, &data_dir] {
        if !dir.exists() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
    }
    Ok(())
}

fn local_dir(config: &PathConfig) -> Option<PathBuf> {
    if let Some(dir) = &config.config_dir {
        return Some(dir.clone());
    }
    std::env::current_dir()
        .ok()
        .filter(|dir| dir.join(PREFS_FILE).exists())
}

fn get_config_dir(config: &PathConfig) -> PathBuf {
    local_dir(config)
        .or_else(|| dirs_next::config_dir().map(|d| d.join("cadremote")))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn get_data_dir(config: &PathConfig) -> PathBuf {
    local_dir(config)
        .or_else(|| dirs_next::data_dir().map(|d| d.join("cadremote")))
        .unwrap_or_else(|| PathBuf::from("."))
}
