//! Export registry: opaque tokens for everything the network may touch.
//!
//! A token is the SHA-256 of a resource's canonical identity string. The
//! registry is write-once and append-only for the life of the process, and
//! it is the only path from a token back to a file, macro, workbench or UI
//! action. A token that was never issued by [`ExportRegistry::export`]
//! resolves to nothing, even if the caller hashed a real path.
//!
//! Identities are kind-qualified (`file:`, `macro:`, `workbench:`,
//! `toolbar:`, `action:`) so a macro and the same path exported as a plain
//! file get different tokens.

use log::{debug, error};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::host::ActionHandle;

/// Kind of an exported resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    File,
    Macro,
    Workbench,
    Toolbar,
    Action,
}

/// Macro as seen by the catalog: display name, icon URL and source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDescriptor {
    pub name: String,
    pub icon: String,
    pub source: PathBuf,
}

/// Payload behind a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    /// Absolute path, or a path relative to the document root.
    File(PathBuf),
    Macro(MacroDescriptor),
    Workbench(String),
    Toolbar(String),
    Action { toolbar: String, handle: ActionHandle },
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::File(_) => ResourceKind::File,
            Resource::Macro(_) => ResourceKind::Macro,
            Resource::Workbench(_) => ResourceKind::Workbench,
            Resource::Toolbar(_) => ResourceKind::Toolbar,
            Resource::Action { .. } => ResourceKind::Action,
        }
    }

    /// Canonical identity string that the token is derived from.
    ///
    /// A macro's identity is its source path only: re-exporting the same
    /// file with a different display name maps to the same token.
    pub fn identity(&self) -> String {
        match self {
            Resource::File(path) => format!("file:{}", path.to_string_lossy()),
            Resource::Macro(m) => format!("macro:{}", m.source.to_string_lossy()),
            Resource::Workbench(key) => format!("workbench:{}", key),
            Resource::Toolbar(name) => format!("toolbar:{}", name),
            Resource::Action { toolbar, handle } => format!("action:{}.{}", toolbar, handle.as_str()),
        }
    }

    /// Token this resource exports to. Pure, does not touch any registry.
    pub fn token(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.identity().as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// One registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedResource {
    pub token: String,
    pub resource: Resource,
}

impl ExportedResource {
    pub fn kind(&self) -> ResourceKind {
        self.resource.kind()
    }
}

/// URL path under which an exported file token is served.
pub fn file_url(token: &str) -> String {
    format!("/{}", token)
}

/// Append-only token table shared by the catalog, handlers and file server.
#[derive(Debug, Default)]
pub struct ExportRegistry {
    entries: Mutex<HashMap<String, ExportedResource>>,
}

impl ExportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Export a resource and return its token.
    ///
    /// Idempotent: the same identity always yields the same token and the
    /// first payload stored for it is kept.
    pub fn export(&self, resource: Resource) -> String {
        let token = resource.token();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get(&token) {
            Some(existing) => {
                if existing.resource.identity() != resource.identity() {
                    // Two identities hashing to one token. Keep the first.
                    error!(
                        "Token collision: {} already maps to {}, refusing {}",
                        token,
                        existing.resource.identity(),
                        resource.identity()
                    );
                }
            }
            None => {
                debug!("Exported {:?} as {}", resource.kind(), token);
                entries.insert(
                    token.clone(),
                    ExportedResource {
                        token: token.clone(),
                        resource,
                    },
                );
            }
        }
        token
    }

    /// Shorthand for exporting a file path.
    pub fn export_file(&self, path: impl Into<PathBuf>) -> String {
        self.export(Resource::File(path.into()))
    }

    /// Look up a token. `None` for anything this registry never issued.
    pub fn resolve(&self, token: &str) -> Option<ExportedResource> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(token)
            .cloned()
    }

    /// Resolve a file token to a path that exists and is not a directory.
    ///
    /// Relative paths are taken against `base` (the document root).
    pub fn resolve_file(&self, token: &str, base: &Path) -> Option<PathBuf> {
        let path = match self.resolve(token)?.resource {
            Resource::File(path) => path,
            _ => return None,
        };
        let path = if path.is_absolute() { path } else { base.join(path) };
        if path.is_file() { Some(path) } else { None }
    }

    /// Resolve a macro token whose source file still exists.
    pub fn resolve_macro(&self, token: &str) -> Option<MacroDescriptor> {
        match self.resolve(token)?.resource {
            Resource::Macro(m) if m.source.is_file() => Some(m),
            _ => None,
        }
    }

    /// Resolve an action token to `(toolbar, handle)`.
    pub fn resolve_action(&self, token: &str) -> Option<(String, ActionHandle)> {
        match self.resolve(token)?.resource {
            Resource::Action { toolbar, handle } => Some((toolbar, handle)),
            _ => None,
        }
    }

    /// True if the workbench key has been exported by the catalog.
    pub fn has_workbench(&self, key: &str) -> bool {
        let token = Resource::Workbench(key.to_string()).token();
        matches!(
            self.resolve(&token).map(|e| e.resource),
            Some(Resource::Workbench(_))
        )
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
