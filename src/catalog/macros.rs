//! Macro enumeration and the "All Macros" page.
//!
//! Icon policy, first hit wins:
//! 1. icon assigned in preferences (custom, or auto-assigned on an earlier run)
//! 2. `__Icon__ = "..."` in the macro source, relative to the macro's folder
//! 3. `<stem>.svg` or `<stem>.png` next to the macro
//! 4. next icon from the generic pool

use log::debug;
use regex::Regex;
use std::path::{Path, PathBuf};

use crate::core::exports::{ExportRegistry, MacroDescriptor, Resource, file_url};
use crate::core::icons::IconPool;
use crate::core::page::{Action, Page, Section};
use crate::error::{RemoteError, RemoteResult};
use crate::host::HostCatalog;

/// Macro file extensions (case-insensitive)
const MACRO_EXTENSIONS: &[&str] = &["fcmacro", "py"];

/// List macro files directly inside `dir`, sorted by name.
pub fn scan_macro_dir(dir: &Path) -> Vec<PathBuf> {
    let pattern = format!("{}/*", glob::Pattern::escape(&dir.to_string_lossy()));

    let mut files: Vec<PathBuf> = match glob::glob(&pattern) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .filter(|p| p.is_file() && is_macro_file(p))
            .collect(),
        Err(e) => {
            debug!("Bad macro dir pattern {}: {}", pattern, e);
            Vec::new()
        }
    };
    files.sort();
    files
}

fn is_macro_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| MACRO_EXTENSIONS.iter().any(|m| e.eq_ignore_ascii_case(m)))
        .unwrap_or(false)
}

/// Split an identifier into words: separators, camelCase and ACRONYMWord
/// boundaries. `"MyHTTPMacro_v2"` → `["My", "HTTP", "Macro", "v2"]`.
pub fn camel_terms(name: &str) -> Vec<String> {
    let mut terms = Vec::new();
    for chunk in name.split(|c: char| c == '_' || c == '-' || c.is_whitespace()) {
        let chars: Vec<char> = chunk.chars().collect();
        let mut current = String::new();
        for (i, &c) in chars.iter().enumerate() {
            if c.is_uppercase() && !current.is_empty() {
                let prev = chars[i - 1];
                let next_lower = chars.get(i + 1).map(|n| n.is_lowercase()).unwrap_or(false);
                if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_lower) {
                    terms.push(std::mem::take(&mut current));
                }
            }
            current.push(c);
        }
        if !current.is_empty() {
            terms.push(current);
        }
    }
    terms
}

/// Metadata assignments found in a macro source.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct MacroMeta {
    pub name: Option<String>,
    pub icon: Option<String>,
}

/// Reads `__Name__` / `__Icon__` module-level assignments.
pub struct MacroParser {
    assignment: Regex,
}

impl MacroParser {
    pub fn new() -> RemoteResult<Self> {
        let assignment = Regex::new(r#"(?m)^__(Name|Icon)__\s*=\s*(?:"([^"\n]*)"|'([^'\n]*)')"#)?;
        Ok(Self { assignment })
    }

    /// Later assignments override earlier ones; empty strings are ignored.
    pub fn parse(&self, source: &str) -> MacroMeta {
        let mut meta = MacroMeta::default();
        for caps in self.assignment.captures_iter(source) {
            let value = caps.get(2).or_else(|| caps.get(3)).map(|m| m.as_str()).unwrap_or("");
            if value.is_empty() {
                continue;
            }
            match &caps[1] {
                "Name" => meta.name = Some(value.to_string()),
                _ => meta.icon = Some(value.to_string()),
            }
        }
        meta
    }
}

/// Export one macro and its icon. Returns the macro token and descriptor.
pub fn export_macro(
    path: &Path,
    parser: &MacroParser,
    icons: &IconPool,
    registry: &ExportRegistry,
) -> RemoteResult<(String, MacroDescriptor)> {
    let bytes = std::fs::read(path)?;
    let meta = parser.parse(&String::from_utf8_lossy(&bytes));

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| RemoteError::NotFound(path.display().to_string()))?;
    let folder = path.parent().unwrap_or(Path::new(""));

    // Names made only of separators fall back to the stem, then to the raw stem
    let name = [meta.name.as_deref(), Some(stem.as_str())]
        .into_iter()
        .flatten()
        .map(|n| camel_terms(n).join(" "))
        .find(|n| !n.is_empty())
        .unwrap_or_else(|| stem.clone());

    let icon: PathBuf = if let Some(assigned) = icons.assigned(&stem) {
        PathBuf::from(assigned)
    } else if let Some(defined) = meta.icon.map(|i| folder.join(i)).filter(|p| p.exists()) {
        defined
    } else if let Some(sidecar) = ["svg", "png"]
        .iter()
        .map(|ext| folder.join(format!("{}.{}", stem, ext)))
        .find(|p| p.exists())
    {
        sidecar
    } else {
        PathBuf::from(icons.take_next(&stem))
    };

    let descriptor = MacroDescriptor {
        name,
        icon: file_url(&registry.export_file(icon)),
        source: path.to_path_buf(),
    };
    let token = registry.export(Resource::Macro(descriptor.clone()));
    Ok((token, descriptor))
}

/// Build the "All Macros" page. Unreadable macros are skipped.
pub fn macros_page(host: &dyn HostCatalog, icons: &IconPool, registry: &ExportRegistry) -> RemoteResult<Page> {
    let parser = MacroParser::new()?;
    let mut actions = Vec::new();

    for path in host.list_macro_files() {
        match export_macro(&path, &parser, icons, registry) {
            Ok((token, m)) => actions.push(Action::new(m.name, m.icon, format!("/macro/{}", token))),
            Err(e) => debug!("Skipping macro {}: {}", path.display(), e),
        }
    }

    debug!("Macro catalog: {} macros", actions.len());
    Ok(Page::new("All Macros", vec![Section::new("All", actions)]))
}
