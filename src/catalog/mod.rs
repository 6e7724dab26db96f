//! Resource catalog: cached pages describing what a client can trigger.
//!
//! One long-lived [`ResourceCatalog`] is built at server start and shared by
//! the handlers. Each page is computed on first request and kept until the
//! process exits: macros added or workbenches registered later do not show
//! up without a restart. Failed builds are not cached.

pub mod macros;
pub mod workbenches;

use log::info;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::core::exports::ExportRegistry;
use crate::core::icons::IconPool;
use crate::core::page::Page;
use crate::error::RemoteResult;
use crate::host::HostCatalog;
use crate::prefs::Preferences;

pub struct ResourceCatalog {
    host: Arc<dyn HostCatalog>,
    registry: Arc<ExportRegistry>,
    icons: IconPool,
    macros: Mutex<Option<Arc<Page>>>,
    workbenches: Mutex<Option<Arc<Page>>>,
    workbench_actions: Mutex<HashMap<String, Arc<Page>>>,
}

impl ResourceCatalog {
    pub fn new(host: Arc<dyn HostCatalog>, registry: Arc<ExportRegistry>, prefs: Arc<dyn Preferences>) -> Self {
        Self {
            host,
            registry,
            icons: IconPool::load(prefs),
            macros: Mutex::new(None),
            workbenches: Mutex::new(None),
            workbench_actions: Mutex::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &Arc<ExportRegistry> {
        &self.registry
    }

    /// "All Macros" page.
    pub fn get_macros(&self) -> RemoteResult<Arc<Page>> {
        let mut cache = self.macros.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(page) = cache.as_ref() {
            return Ok(Arc::clone(page));
        }
        let page = Arc::new(macros::macros_page(self.host.as_ref(), &self.icons, &self.registry)?);
        info!("Macro catalog built ({} macros)", page.actions().count());
        *cache = Some(Arc::clone(&page));
        Ok(page)
    }

    /// "All Workbenches" page.
    pub fn get_workbenches(&self) -> RemoteResult<Arc<Page>> {
        let mut cache = self.workbenches.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(page) = cache.as_ref() {
            return Ok(Arc::clone(page));
        }
        let page = Arc::new(workbenches::workbenches_page(self.host.as_ref(), &self.registry));
        info!("Workbench catalog built ({} workbenches)", page.actions().count());
        *cache = Some(Arc::clone(&page));
        Ok(page)
    }

    /// Toolbar page of one workbench.
    pub fn get_workbench_actions(&self, key: &str) -> RemoteResult<Arc<Page>> {
        let mut cache = self.workbench_actions.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(page) = cache.get(key) {
            return Ok(Arc::clone(page));
        }
        let page = Arc::new(workbenches::workbench_page(self.host.as_ref(), &self.registry, key)?);
        cache.insert(key.to_string(), Arc::clone(&page));
        Ok(page)
    }

    /// True if `key` is a listed workbench. Builds the workbench page if
    /// needed so the registry knows every listed key.
    pub fn is_known_workbench(&self, key: &str) -> bool {
        self.get_workbenches().is_ok() && self.registry.has_workbench(key)
    }
}
