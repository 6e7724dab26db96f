//! Shared fixtures: a scriptable host and a temporary web root.
#![allow(dead_code)]

use anyhow::bail;
use cadremote::catalog::macros::scan_macro_dir;
use cadremote::host::{ActionHandle, HostCatalog, Toolbar, ToolbarAction, UiHost, WorkbenchDescriptor};
use cadremote::prefs::Preferences;
use cadremote::{RemoteService, RemoteSettings, UiQueue};
use crossbeam_channel::Sender;
use indexmap::IndexMap;
use rouille::{Request, Response};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Host catalog with two workbenches. `grow()` adds more to the next listing.
#[derive(Default)]
pub struct FakeHost {
    pub macro_dir: Option<PathBuf>,
    extra: AtomicUsize,
}

impl FakeHost {
    pub fn new(macro_dir: Option<PathBuf>) -> Self {
        Self {
            macro_dir,
            extra: AtomicUsize::new(0),
        }
    }

    pub fn grow(&self) {
        self.extra.fetch_add(1, Ordering::SeqCst);
    }
}

impl HostCatalog for FakeHost {
    fn list_workbenches(&self) -> IndexMap<String, WorkbenchDescriptor> {
        let mut all = IndexMap::new();
        all.insert(
            "Sketcher".to_string(),
            WorkbenchDescriptor {
                menu_text: Some("Sketcher".into()),
                ..Default::default()
            },
        );
        all.insert(
            "PartDesign".to_string(),
            WorkbenchDescriptor {
                menu_text: Some("Part Design".into()),
                ..Default::default()
            },
        );
        for i in 0..self.extra.load(Ordering::SeqCst) {
            all.insert(format!("Extra{}", i), WorkbenchDescriptor::default());
        }
        all
    }

    fn list_toolbar_actions(&self, workbench: &str) -> anyhow::Result<Vec<Toolbar>> {
        match workbench {
            "Sketcher" => Ok(vec![Toolbar {
                name: "Sketcher geometries".into(),
                actions: vec![ToolbarAction {
                    handle: ActionHandle::new("Sketcher_CreateLine"),
                    icon: None,
                    label: "Line".into(),
                }],
            }]),
            "PartDesign" => Ok(Vec::new()),
            other => bail!("no such workbench: {}", other),
        }
    }

    fn list_macro_files(&self) -> Vec<PathBuf> {
        self.macro_dir.as_deref().map(scan_macro_dir).unwrap_or_default()
    }
}

/// UI host that reports every effect on a channel.
pub struct RecordingUi {
    pub events: Sender<String>,
}

impl UiHost for RecordingUi {
    fn activate_workbench(&mut self, key: &str) -> anyhow::Result<()> {
        let _ = self.events.send(format!("activate:{}", key));
        Ok(())
    }

    fn run_macro_source(&mut self, path: &Path) -> anyhow::Result<()> {
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        let _ = self.events.send(format!("macro:{}", name));
        Ok(())
    }

    fn trigger_action(&mut self, handle: &ActionHandle) -> anyhow::Result<()> {
        let _ = self.events.send(format!("action:{}", handle.as_str()));
        Ok(())
    }
}

/// Temporary document root and macro folder.
pub struct Site {
    _tmp: tempfile::TempDir,
    pub docroot: PathBuf,
    pub macro_dir: PathBuf,
}

pub fn site() -> Site {
    let tmp = tempfile::tempdir().unwrap();
    let docroot = tmp.path().join("www");
    let macro_dir = tmp.path().join("macros");
    std::fs::create_dir_all(docroot.join("img")).unwrap();
    std::fs::create_dir_all(docroot.join("css")).unwrap();
    std::fs::create_dir_all(&macro_dir).unwrap();

    std::fs::write(docroot.join("index.html"), "<html>remote</html>").unwrap();
    std::fs::write(docroot.join("css/default.css"), "body{}").unwrap();
    std::fs::write(docroot.join("img/noicon.svg"), "<svg id=\"noicon\"/>").unwrap();
    std::fs::write(docroot.join("img/macro.svg"), "<svg id=\"fallback\"/>").unwrap();
    for n in 1..=3 {
        std::fs::write(docroot.join(format!("img/macro-icon-{}.svg", n)), format!("<svg id=\"pool-{}\"/>", n)).unwrap();
    }
    std::fs::write(tmp.path().join("secret.txt"), "secret").unwrap();

    Site {
        _tmp: tmp,
        docroot,
        macro_dir,
    }
}

pub fn write_macro(site: &Site, file: &str, source: &str) -> PathBuf {
    let path = site.macro_dir.join(file);
    std::fs::write(&path, source).unwrap();
    path
}

pub fn settings(docroot: &Path, timeout_ms: u64) -> RemoteSettings {
    RemoteSettings {
        port: 0,
        bind_address: "127.0.0.1".into(),
        document_root: docroot.to_path_buf(),
        ui_timeout_ms: timeout_ms,
    }
}

pub fn service(
    host: Arc<FakeHost>,
    prefs: Arc<dyn Preferences>,
    queue: UiQueue,
    docroot: &Path,
    timeout_ms: u64,
) -> RemoteService {
    RemoteService::new(&settings(docroot, timeout_ms), host, prefs, queue).unwrap()
}

pub fn body(response: Response) -> String {
    let (mut reader, _) = response.data.into_reader_and_size();
    let mut out = String::new();
    std::io::Read::read_to_string(&mut reader, &mut out).unwrap();
    out
}

/// Send a fake request, return status and body.
pub fn call(service: &RemoteService, method: &str, path: &str) -> (u16, String) {
    let response = service.handle_request(&Request::fake_http(method, path, vec![], vec![]));
    (response.status_code, body(response))
}

pub fn post_json(service: &RemoteService, path: &str) -> serde_json::Value {
    let (status, text) = call(service, "POST", path);
    assert_eq!(status, 200, "{} answered {}", path, status);
    serde_json::from_str(&text).unwrap()
}
