//! Stand-in host used by the `cadremote` binary.
//!
//! A fixed set of workbenches and toolbars, macros from a directory on disk.
//! UI effects are logged instead of touching a real document.

use anyhow::{Context, bail};
use indexmap::IndexMap;
use log::info;
use std::path::{Path, PathBuf};

use super::{ActionHandle, HostCatalog, Icon, Toolbar, ToolbarAction, UiHost, WorkbenchDescriptor};
use crate::catalog::macros::scan_macro_dir;

/// (workbench key, menu text, [(toolbar, [(command, label)])])
type WorkbenchEntry = (&'static str, &'static str, &'static [(&'static str, &'static [(&'static str, &'static str)])]);

const WORKBENCHES: &[WorkbenchEntry] = &[
    ("StartWorkbench", "Start", &[]),
    (
        "PartWorkbench",
        "Part",
        &[
            ("Solids", &[("Part_Box", "Cube"), ("Part_Cylinder", "Cylinder"), ("Part_Sphere", "Sphere")]),
            ("Boolean", &[("Part_Cut", "Cut"), ("Part_Fuse", "Union"), ("Part_Common", "Intersection")]),
            ("View", &[("Std_ViewFitAll", "Fit all")]),
        ],
    ),
    (
        "SketcherWorkbench",
        "Sketcher",
        &[
            ("Sketcher", &[("Sketcher_NewSketch", "Create sketch"), ("Sketcher_LeaveSketch", "Leave sketch")]),
            ("Sketcher geometries", &[("Sketcher_CreateLine", "Line"), ("Sketcher_CreateCircle", "Circle")]),
        ],
    ),
    (
        "PartDesignWorkbench",
        "Part Design",
        &[("Part Design Helper", &[("PartDesign_Body", "Create body"), ("PartDesign_Pad", "Pad")])],
    ),
];

/// Server-side half of the demo host.
#[derive(Debug, Clone, Default)]
pub struct DemoCatalog {
    macro_dir: Option<PathBuf>,
}

impl DemoCatalog {
    pub fn new(macro_dir: Option<PathBuf>) -> Self {
        Self { macro_dir }
    }
}

impl HostCatalog for DemoCatalog {
    fn list_workbenches(&self) -> IndexMap<String, WorkbenchDescriptor> {
        WORKBENCHES
            .iter()
            .map(|(key, text, _)| {
                let descriptor = WorkbenchDescriptor {
                    icon: Some(Icon::Inline(format!("img/workbench/{}.svg", key))),
                    menu_text: Some(text.to_string()),
                    tooltip: None,
                };
                (key.to_string(), descriptor)
            })
            .collect()
    }

    fn list_toolbar_actions(&self, workbench: &str) -> anyhow::Result<Vec<Toolbar>> {
        let Some((_, _, toolbars)) = WORKBENCHES.iter().find(|(key, _, _)| *key == workbench) else {
            bail!("Workbench {} is not registered", workbench);
        };
        Ok(toolbars
            .iter()
            .map(|(name, actions)| Toolbar {
                name: name.to_string(),
                actions: actions
                    .iter()
                    .map(|(command, label)| ToolbarAction {
                        handle: ActionHandle::new(*command),
                        icon: None,
                        label: label.to_string(),
                    })
                    .collect(),
            })
            .collect())
    }

    fn list_macro_files(&self) -> Vec<PathBuf> {
        match &self.macro_dir {
            Some(dir) => scan_macro_dir(dir),
            None => Vec::new(),
        }
    }
}

/// UI-thread half of the demo host.
#[derive(Debug, Default)]
pub struct DemoUi {
    active_workbench: Option<String>,
}

impl DemoUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_workbench(&self) -> Option<&str> {
        self.active_workbench.as_deref()
    }
}

impl UiHost for DemoUi {
    fn activate_workbench(&mut self, key: &str) -> anyhow::Result<()> {
        info!("Workbench activated: {}", key);
        self.active_workbench = Some(key.to_string());
        Ok(())
    }

    fn run_macro_source(&mut self, path: &Path) -> anyhow::Result<()> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Error in macro: {}", path.display()))?;
        info!("Macro executed: {} ({} lines)", path.display(), source.lines().count());
        Ok(())
    }

    fn trigger_action(&mut self, handle: &ActionHandle) -> anyhow::Result<()> {
        info!(
            "Action triggered: {} (workbench: {})",
            handle.as_str(),
            self.active_workbench.as_deref().unwrap_or("-")
        );
        Ok(())
    }
}
