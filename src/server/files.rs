//! Static asset serving.
//!
//! A GET path is first tried as an export token (`/<token>`), which may point
//! anywhere on disk because the catalog issued it. Everything else is looked
//! up under the document root and can never leave it: `..` segments are
//! rejected and the final path is canonicalised and checked against the
//! canonical root, which also catches symlinks pointing out.

use log::{debug, warn};
use rouille::Response;
use std::fs::File;
use std::path::{Component, Path, PathBuf};

use crate::core::exports::ExportRegistry;

/// Served for `/` and for directory requests
pub const INDEX_FILE: &str = "index.html";

/// Map a request path to a file on disk, or `None` (not found).
pub fn translate_path(requested: &str, registry: &ExportRegistry, document_root: &Path) -> Option<PathBuf> {
    let trimmed = requested.trim_start_matches('/');

    if !trimmed.is_empty() && !trimmed.contains('/') {
        if let Some(path) = registry.resolve_file(trimmed, document_root) {
            return Some(path);
        }
    }

    resolve_under_root(trimmed, document_root)
}

fn resolve_under_root(relative: &str, document_root: &Path) -> Option<PathBuf> {
    let mut path = document_root.to_path_buf();
    for segment in relative.split('/') {
        if segment.is_empty() || segment == "." {
            continue;
        }
        // Only plain names: no "..", no drive letters or roots smuggled in a segment
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) if !segment.contains('\\') => path.push(name),
            _ => {
                debug!("Rejected path segment {:?} in {:?}", segment, relative);
                return None;
            }
        }
    }

    if path.is_dir() {
        path.push(INDEX_FILE);
    }

    let root = document_root.canonicalize().ok()?;
    let resolved = path.canonicalize().ok()?;
    if !resolved.starts_with(&root) {
        warn!("Refused {} (outside document root)", resolved.display());
        return None;
    }
    resolved.is_file().then_some(resolved)
}

/// Response for a file from [`translate_path`].
pub fn file_response(path: &Path) -> Response {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match File::open(path) {
        Ok(file) => Response::from_file(rouille::extension_to_mime(ext), file),
        Err(e) => {
            warn!("Failed to open {}: {}", path.display(), e);
            Response::empty_404()
        }
    }
}
