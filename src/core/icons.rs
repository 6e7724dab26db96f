//! Round-robin pool of generic macro icons.
//!
//! Macros without an icon of their own get `img/macro-icon-<n>.svg`, taken
//! from the front of a persisted pool. The assignment is persisted too, so a
//! macro keeps its icon across restarts. Once the pool is empty every
//! remaining macro shares [`FALLBACK_ICON`].

use log::debug;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::prefs::{self, KEY_ICONS_ASSIGNED, KEY_ICONS_AVAILABLE, Preferences};

/// Number of generic icons shipped in the document root
pub const POOL_SIZE: u32 = 108;
/// Shared icon once the pool is exhausted
pub const FALLBACK_ICON: &str = "img/macro.svg";

/// Document-root relative path of pool icon `n`.
pub fn pool_icon(n: u32) -> String {
    format!("img/macro-icon-{}.svg", n)
}

struct PoolState {
    available: Vec<u32>,
    assigned: BTreeMap<String, String>,
}

/// Icon assignments keyed by macro file stem.
pub struct IconPool {
    prefs: Arc<dyn Preferences>,
    state: Mutex<PoolState>,
}

impl IconPool {
    /// Read the pool and assignments from preferences.
    pub fn load(prefs: Arc<dyn Preferences>) -> Self {
        let available = prefs::get_json::<Vec<u32>>(prefs.as_ref(), KEY_ICONS_AVAILABLE)
            .unwrap_or_else(|| (1..=POOL_SIZE).collect());
        let assigned = prefs::get_json::<BTreeMap<String, String>>(prefs.as_ref(), KEY_ICONS_ASSIGNED)
            .unwrap_or_default();

        debug!(
            "Icon pool: {} available, {} assigned",
            available.len(),
            assigned.len()
        );

        Self {
            prefs,
            state: Mutex::new(PoolState { available, assigned }),
        }
    }

    /// Icon explicitly (or previously auto-) assigned to this macro.
    pub fn assigned(&self, stem: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .assigned
            .get(stem)
            .cloned()
    }

    /// Assign the next pool icon to `stem` and persist both tables.
    pub fn take_next(&self, stem: &str) -> String {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(icon) = state.assigned.get(stem) {
            return icon.clone();
        }
        if state.available.is_empty() {
            return FALLBACK_ICON.to_string();
        }

        let icon = pool_icon(state.available.remove(0));
        state.assigned.insert(stem.to_string(), icon.clone());
        prefs::set_json(self.prefs.as_ref(), KEY_ICONS_AVAILABLE, &state.available);
        prefs::set_json(self.prefs.as_ref(), KEY_ICONS_ASSIGNED, &state.assigned);
        debug!("Assigned {} to macro {}", icon, stem);
        icon
    }

    pub fn remaining(&self) -> usize {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).available.len()
    }
}
