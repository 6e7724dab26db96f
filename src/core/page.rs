//! Page / Section / Action: the only tree sent to clients.
//!
//! Serialises to the shape the bundled web client reads:
//!
//! ```text
//! { "title": "...", "stylesheet": "css/default.css",
//!   "sections": [ { "title": "...",
//!                   "actions": [ { "title": "...", "icon": "/<token>", "action": "/macro/<token>" } ] } ] }
//! ```

use serde::{Deserialize, Serialize};

/// Stylesheet for list pages (workbenches, macros)
pub const DEFAULT_STYLESHEET: &str = "css/default.css";
/// Stylesheet for dense toolbar pages
pub const COMPACT_STYLESHEET: &str = "css/compact.css";

/// A clickable entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Display label
    pub title: String,
    /// Icon URL (exported file token) or inline identifier
    pub icon: String,
    /// Invocation path, e.g. `/macro/<token>`
    pub action: String,
}

impl Action {
    pub fn new(title: impl Into<String>, icon: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            icon: icon.into(),
            action: action.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub actions: Vec<Action>,
}

impl Section {
    pub fn new(title: impl Into<String>, actions: Vec<Action>) -> Self {
        Self {
            title: title.into(),
            actions,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub title: String,
    pub stylesheet: String,
    pub sections: Vec<Section>,
}

impl Page {
    pub fn new(title: impl Into<String>, sections: Vec<Section>) -> Self {
        Self {
            title: title.into(),
            stylesheet: DEFAULT_STYLESHEET.to_string(),
            sections,
        }
    }

    pub fn with_stylesheet(mut self, stylesheet: impl Into<String>) -> Self {
        self.stylesheet = stylesheet.into();
        self
    }

    /// All actions across sections, in order.
    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.sections.iter().flat_map(|s| s.actions.iter())
    }

    /// Nested key-value form, independent of the wire format.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
