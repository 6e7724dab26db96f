//! End-to-end request handling through `RemoteService`, without sockets.

mod common;

use cadremote::core::ui_bridge::{UiDispatcher, ui_channel};
use cadremote::prefs::{MemoryPrefs, Preferences};
use common::{FakeHost, RecordingUi, call, post_json, service, site, write_macro};
use crossbeam_channel::{Receiver, unbounded};
use serde_json::json;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

fn recording_ui() -> (cadremote::UiQueue, UiDispatcher<RecordingUi>, Receiver<String>) {
    let (tx, rx) = unbounded();
    let (queue, dispatcher) = ui_channel(RecordingUi { events: tx });
    (queue, dispatcher, rx)
}

/// Pump the UI queue on a thread until every sender is gone.
fn spawn_ui(mut dispatcher: UiDispatcher<RecordingUi>) -> JoinHandle<()> {
    thread::spawn(move || dispatcher.run())
}

#[test]
fn test_macro_pool_icon_is_served_and_stable() {
    let site = site();
    write_macro(&site, "MyTool.FCMacro", "print('hello')\n");
    let prefs: Arc<dyn Preferences> = Arc::new(MemoryPrefs::new());
    let host = Arc::new(FakeHost::new(Some(site.macro_dir.clone())));

    let (queue, _ui, _events) = recording_ui();
    let svc = service(Arc::clone(&host), Arc::clone(&prefs), queue, &site.docroot, 100);

    let page = post_json(&svc, "/macros");
    assert_eq!(page["status"], "ok");
    assert_eq!(page["title"], "All Macros");
    assert_eq!(page["sections"][0]["title"], "All");
    let action = &page["sections"][0]["actions"][0];
    assert_eq!(action["title"], "My Tool");
    assert!(action["action"].as_str().unwrap().starts_with("/macro/"));

    let icon = action["icon"].as_str().unwrap().to_string();
    let (status, svg) = call(&svc, "GET", &icon);
    assert_eq!(status, 200);
    assert_eq!(svg, "<svg id=\"pool-1\"/>");

    // Same catalog: same bytes
    assert_eq!(post_json(&svc, "/macros"), page);

    // Restart with a second macro: the first keeps its icon
    write_macro(&site, "Another.py", "__Name__ = \"Second Macro\"\n");
    let (queue, _ui2, _events2) = recording_ui();
    let restarted = service(host, prefs, queue, &site.docroot, 100);
    let page = post_json(&restarted, "/macros");
    let actions = page["sections"][0]["actions"].as_array().unwrap();
    assert_eq!(actions.len(), 2);

    let icon_of = |title: &str| {
        let action = actions.iter().find(|a| a["title"] == title).unwrap();
        call(&restarted, "GET", action["icon"].as_str().unwrap()).1
    };
    assert_eq!(icon_of("My Tool"), "<svg id=\"pool-1\"/>");
    assert_eq!(icon_of("Second Macro"), "<svg id=\"pool-2\"/>");
}

#[test]
fn test_activate_workbench_answers_without_ui() {
    let site = site();
    let (queue, mut ui, events) = recording_ui();
    let svc = service(Arc::new(FakeHost::default()), Arc::new(MemoryPrefs::new()), queue, &site.docroot, 100);

    let started = Instant::now();
    let (status, text) = call(&svc, "POST", "/workbench/Sketcher");
    assert_eq!(status, 200);
    assert_eq!(text, r#"{"status":"ok","workbench":"Sketcher"}"#);
    assert!(started.elapsed() < Duration::from_secs(2));

    // The queued job still runs once the UI thread gets to it
    assert!(events.try_recv().is_err());
    assert_eq!(ui.pump(), 1);
    assert_eq!(events.try_recv().unwrap(), "activate:Sketcher");
}

#[test]
fn test_ui_actions_run_on_ui_thread() {
    let site = site();
    let macro_path = write_macro(&site, "make_gear.FCMacro", "gear()\n");
    let host = Arc::new(FakeHost::new(Some(site.macro_dir.clone())));
    let (queue, ui, events) = recording_ui();
    let svc = service(host, Arc::new(MemoryPrefs::new()), queue, &site.docroot, 2000);
    let ui_thread = spawn_ui(ui);

    assert_eq!(post_json(&svc, "/workbench/PartDesign"), json!({ "status": "ok", "workbench": "PartDesign" }));
    assert_eq!(events.recv_timeout(Duration::from_secs(2)).unwrap(), "activate:PartDesign");

    let macros = post_json(&svc, "/macros");
    let run = macros["sections"][0]["actions"][0]["action"].as_str().unwrap().to_string();
    assert_eq!(post_json(&svc, &run), json!({ "status": "ok" }));
    let name = macro_path.file_name().unwrap().to_string_lossy().into_owned();
    assert_eq!(events.recv_timeout(Duration::from_secs(2)).unwrap(), format!("macro:{}", name));

    let toolbars = post_json(&svc, "/workbench-actions/Sketcher");
    assert_eq!(toolbars["title"], "Sketcher");
    assert_eq!(toolbars["stylesheet"], "css/compact.css");
    let section = &toolbars["sections"][0];
    assert_eq!(section["title"], "Sketcher geometries");
    assert_eq!(section["actions"][0]["title"], "Line");
    let trigger = section["actions"][0]["action"].as_str().unwrap().to_string();
    let token = trigger.trim_start_matches("/action/").to_string();
    assert_eq!(post_json(&svc, &trigger), json!({ "status": "ok", "key": token }));
    assert_eq!(events.recv_timeout(Duration::from_secs(2)).unwrap(), "action:Sketcher_CreateLine");

    drop(svc);
    ui_thread.join().unwrap();
}

#[test]
fn test_unknown_tokens_answer_ok_but_do_nothing() {
    let site = site();
    let (queue, ui, events) = recording_ui();
    let svc = service(Arc::new(FakeHost::default()), Arc::new(MemoryPrefs::new()), queue, &site.docroot, 2000);
    let ui_thread = spawn_ui(ui);

    let unknown = "0".repeat(64);
    assert_eq!(call(&svc, "POST", &format!("/macro/{}", unknown)).1, r#"{"status":"ok"}"#);
    assert_eq!(post_json(&svc, &format!("/action/{}", unknown))["status"], "ok");
    assert_eq!(post_json(&svc, "/workbench/NotListed")["status"], "ok");

    drop(svc);
    ui_thread.join().unwrap();
    assert!(events.try_recv().is_err());
}

#[test]
fn test_workbench_listing_frozen_after_first_request() {
    let site = site();
    let host = Arc::new(FakeHost::default());
    let (queue, _ui, _events) = recording_ui();
    let svc = service(Arc::clone(&host), Arc::new(MemoryPrefs::new()), queue, &site.docroot, 100);

    let (_, first) = call(&svc, "POST", "/workbenches");
    host.grow();
    host.grow();
    let (_, second) = call(&svc, "POST", "/workbenches");
    assert_eq!(first, second);

    let page: serde_json::Value = serde_json::from_str(&first).unwrap();
    assert_eq!(page["title"], "All Workbenches");
    let titles: Vec<_> = page["sections"][0]["actions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, ["Sketcher", "Part Design"]);
    assert_eq!(page["sections"][0]["actions"][0]["action"], "/workbench/Sketcher");

    // Read-only pages also answer GET
    assert_eq!(call(&svc, "GET", "/workbenches").1, first);
}

#[test]
fn test_error_replies() {
    let site = site();
    let (queue, _ui, _events) = recording_ui();
    let svc = service(Arc::new(FakeHost::default()), Arc::new(MemoryPrefs::new()), queue, &site.docroot, 100);

    assert_eq!(call(&svc, "POST", "/nope"), (200, r#"{"status":"error","message":"Unknown action"}"#.to_string()));
    assert_eq!(call(&svc, "POST", "/").1, r#"{"status":"error","message":"Unknown action"}"#);
    assert_eq!(
        post_json(&svc, "/workbench-actions/Nope"),
        json!({ "status": "error", "message": "Unknown workbench: Nope" })
    );
    // The listener survives repeated faults
    for _ in 0..3 {
        assert_eq!(post_json(&svc, "/workbench-actions/Nope")["status"], "error");
    }
    assert_eq!(post_json(&svc, "/workbenches")["status"], "ok");
}

#[test]
fn test_ui_thread_gone() {
    let site = site();
    let (queue, ui, _events) = recording_ui();
    let svc = service(Arc::new(FakeHost::default()), Arc::new(MemoryPrefs::new()), queue, &site.docroot, 100);
    drop(ui);

    assert_eq!(
        call(&svc, "POST", "/workbench/Sketcher").1,
        r#"{"status":"error","message":"UI thread unavailable"}"#
    );
    // Catalog pages do not need the UI thread
    assert_eq!(post_json(&svc, "/macros")["status"], "ok");
}

#[test]
fn test_static_files() {
    let site = site();
    let (queue, _ui, _events) = recording_ui();
    let svc = service(Arc::new(FakeHost::default()), Arc::new(MemoryPrefs::new()), queue, &site.docroot, 100);

    assert_eq!(call(&svc, "GET", "/"), (200, "<html>remote</html>".to_string()));
    assert_eq!(call(&svc, "GET", "/css/default.css"), (200, "body{}".to_string()));
    assert_eq!(call(&svc, "GET", "/missing.js").0, 404);
    assert_eq!(call(&svc, "GET", "/../secret.txt").0, 404);
    assert_eq!(call(&svc, "GET", "/img/../../secret.txt").0, 404);
    // UI routes are POST only
    assert_eq!(call(&svc, "GET", "/workbench/Sketcher").0, 404);

    // Workbench without icon points at the placeholder
    let page = post_json(&svc, "/workbenches");
    let icon = page["sections"][0]["actions"][0]["icon"].as_str().unwrap().to_string();
    assert_eq!(call(&svc, "GET", &icon), (200, "<svg id=\"noicon\"/>".to_string()));
}
