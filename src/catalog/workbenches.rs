//! Workbench list page and per-workbench toolbar pages.

use log::debug;

use crate::core::exports::{ExportRegistry, Resource, file_url};
use crate::core::page::{Action, COMPACT_STYLESHEET, Page, Section};
use crate::error::{RemoteError, RemoteResult};
use crate::host::{HostCatalog, Icon, WorkbenchDescriptor};

/// Never offered to clients
pub const EXCLUDED_WORKBENCHES: &[&str] = &["NoneWorkbench", "CompleteWorkbench", "StartWorkbench"];

/// Toolbars left out of workbench pages (generic, not workbench specific)
pub const EXCLUDED_TOOLBARS: &[&str] = &["File", "Workbench", "Macro", "View", "Structure"];

/// Placeholder for workbenches without an icon
pub const NO_ICON: &str = "img/noicon.svg";

/// Client-facing icon reference: exported file URL or inline identifier.
pub fn icon_url(icon: Option<&Icon>, registry: &ExportRegistry) -> String {
    match icon {
        Some(Icon::File(path)) => file_url(&registry.export_file(path.clone())),
        Some(Icon::Inline(inline)) => inline.clone(),
        None => file_url(&registry.export_file(NO_ICON)),
    }
}

/// Menu text, then tooltip, then the raw key.
pub fn display_text(key: &str, descriptor: &WorkbenchDescriptor) -> String {
    descriptor
        .menu_text
        .as_deref()
        .or(descriptor.tooltip.as_deref())
        .filter(|t| !t.is_empty())
        .unwrap_or(key)
        .to_string()
}

/// Build the "All Workbenches" page, exporting every listed workbench.
pub fn workbenches_page(host: &dyn HostCatalog, registry: &ExportRegistry) -> Page {
    let actions: Vec<Action> = host
        .list_workbenches()
        .iter()
        .filter(|(key, _)| !EXCLUDED_WORKBENCHES.contains(&key.as_str()))
        .map(|(key, descriptor)| {
            registry.export(Resource::Workbench(key.clone()));
            Action::new(
                display_text(key, descriptor),
                icon_url(descriptor.icon.as_ref(), registry),
                format!("/workbench/{}", key),
            )
        })
        .collect();

    debug!("Workbench catalog: {} workbenches", actions.len());
    Page::new("All Workbenches", vec![Section::new("All", actions)])
}

/// Build the toolbar page of one workbench.
pub fn workbench_page(host: &dyn HostCatalog, registry: &ExportRegistry, key: &str) -> RemoteResult<Page> {
    let workbenches = host.list_workbenches();
    let descriptor = workbenches
        .get(key)
        .filter(|_| !EXCLUDED_WORKBENCHES.contains(&key))
        .ok_or_else(|| RemoteError::UnknownWorkbench(key.to_string()))?;
    registry.export(Resource::Workbench(key.to_string()));

    let mut sections = Vec::new();
    for toolbar in host.list_toolbar_actions(key)? {
        if EXCLUDED_TOOLBARS.contains(&toolbar.name.as_str()) {
            continue;
        }
        registry.export(Resource::Toolbar(toolbar.name.clone()));

        let actions: Vec<Action> = toolbar
            .actions
            .iter()
            .filter(|a| !a.label.is_empty())
            .map(|a| {
                let token = registry.export(Resource::Action {
                    toolbar: toolbar.name.clone(),
                    handle: a.handle.clone(),
                });
                Action::new(
                    a.label.clone(),
                    icon_url(a.icon.as_ref(), registry),
                    format!("/action/{}", token),
                )
            })
            .collect();

        if !actions.is_empty() {
            sections.push(Section::new(toolbar.name, actions));
        }
    }

    Ok(Page::new(display_text(key, descriptor), sections).with_stylesheet(COMPACT_STYLESHEET))
}
