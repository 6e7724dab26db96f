//! Interfaces the remote-control core consumes from the host application.
//!
//! The host is split along the thread boundary:
//!
//! - [`HostCatalog`] - read-only queries, called on the server thread. Must
//!   be `Send + Sync`; assumed cheap and synchronous.
//! - [`UiHost`] - everything that mutates UI or document state. Only ever
//!   called on the UI thread through [`crate::core::ui_bridge`], so it does
//!   not need to be `Send`.

pub mod demo;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Opaque host handle of a toolbar action (command name, object name...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionHandle(String);

impl ActionHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Icon as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Icon {
    /// Image file on disk, served through an export token
    File(PathBuf),
    /// Inline reference passed to the client untouched (data URI, named icon)
    Inline(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkbenchDescriptor {
    pub icon: Option<Icon>,
    pub menu_text: Option<String>,
    pub tooltip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarAction {
    pub handle: ActionHandle,
    pub icon: Option<Icon>,
    pub label: String,
}

/// A named toolbar of a workbench, actions in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolbar {
    pub name: String,
    pub actions: Vec<ToolbarAction>,
}

/// Read-only host queries (server thread).
pub trait HostCatalog: Send + Sync {
    /// Registered workbenches by key, in host order.
    fn list_workbenches(&self) -> IndexMap<String, WorkbenchDescriptor>;

    /// Toolbars of a workbench with their actions.
    fn list_toolbar_actions(&self, workbench: &str) -> anyhow::Result<Vec<Toolbar>>;

    /// Macro source files available to run.
    fn list_macro_files(&self) -> Vec<PathBuf>;
}

/// UI-mutating host operations (UI thread only).
pub trait UiHost {
    fn activate_workbench(&mut self, key: &str) -> anyhow::Result<()>;

    fn run_macro_source(&mut self, path: &Path) -> anyhow::Result<()>;

    fn trigger_action(&mut self, handle: &ActionHandle) -> anyhow::Result<()>;
}
