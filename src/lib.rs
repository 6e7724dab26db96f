//! cadremote - remote control of a CAD host from a phone or tablet
//!
//! Re-exports all modules for use by the binary and embedding hosts.

// Core (exports, pages, icons, UI bridge)
pub mod core;

// Catalog and server
pub mod catalog;
pub mod host;
pub mod server;

// App modules
pub mod cli;
pub mod config;
pub mod error;
pub mod prefs;
pub mod utils;

// Re-export commonly used types
pub use crate::catalog::ResourceCatalog;
pub use crate::config::RemoteSettings;
pub use crate::core::exports::{ExportRegistry, Resource};
pub use crate::core::page::{Action, Page, Section};
pub use crate::core::ui_bridge::{CallOutcome, UiCallBridge, UiDispatcher, UiQueue, ui_channel};
pub use crate::error::{RemoteError, RemoteResult};
pub use crate::host::{HostCatalog, UiHost};
pub use crate::server::{RemoteServer, RemoteService, Router, ServerState};
