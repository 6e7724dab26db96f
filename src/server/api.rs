//! HTTP server and request boundary using rouille.
//!
//! # Purpose
//!
//! Runs the remote-control listener on a background thread. POST requests go
//! through the [`Router`] to a handler; GET requests serve read-only pages and
//! static assets (export tokens first, then the document root).
//!
//! # Key types
//!
//! - [`RemoteService`] - per-request logic, shared by the listener thread
//! - [`RemoteServer`] - lifecycle: `Stopped → Starting → Listening → Stopped`
//! - [`ServerState`] - observable lifecycle state
//!
//! # Thread safety
//!
//! - The listener uses a pool of one thread: requests are served one at a time
//! - UI work leaves the listener thread only through the `UiCallBridge`
//! - Every response is HTTP 200 JSON for POST; the `status` field carries the result
//!
//! # Used by
//!
//! - `main.rs` - builds and starts the server, then pumps the UI queue
//! - `tests/` - drives [`RemoteService::handle_request`] with fake requests

use log::{debug, error, info, warn};
use rouille::{Request, Response};
use serde::Serialize;
use serde_json::Value;
use std::net::SocketAddr;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, mpsc};
use std::thread::JoinHandle;

use super::files::{file_response, translate_path};
use super::handlers::{Handler, HandlerContext, RouteHandler};
use super::router::Router;
use crate::catalog::ResourceCatalog;
use crate::config::RemoteSettings;
use crate::core::exports::ExportRegistry;
use crate::core::ui_bridge::{UiCallBridge, UiQueue, panic_message};
use crate::error::{RemoteError, RemoteResult};
use crate::host::HostCatalog;
use crate::prefs::Preferences;

/// Error reply body
#[derive(Serialize)]
struct ErrorReply<'a> {
    status: &'static str,
    message: &'a str,
}

impl<'a> ErrorReply<'a> {
    fn new(message: &'a str) -> Self {
        Self {
            status: "error",
            message,
        }
    }
}

fn json_response<T: Serialize>(body: &T) -> Response {
    match serde_json::to_string(body) {
        Ok(text) => Response::from_data("text/json", text),
        Err(e) => {
            error!("Failed to serialize reply: {}", e);
            Response::from_data("text/json", r#"{"status":"error","message":"Internal error"}"#)
        }
    }
}

fn error_response(message: &str) -> Response {
    json_response(&ErrorReply::new(message))
}

/// Request handling shared with the listener thread.
pub struct RemoteService {
    ctx: HandlerContext,
    router: Router,
    document_root: PathBuf,
}

impl RemoteService {
    /// Build registry, catalog, router and bridge.
    pub fn new(
        settings: &RemoteSettings,
        host: Arc<dyn HostCatalog>,
        prefs: Arc<dyn Preferences>,
        ui_queue: UiQueue,
    ) -> RemoteResult<Self> {
        let registry = Arc::new(ExportRegistry::new());
        let catalog = Arc::new(ResourceCatalog::new(host, registry, prefs));
        Ok(Self {
            ctx: HandlerContext {
                catalog,
                bridge: UiCallBridge::new(ui_queue, settings.ui_timeout()),
            },
            router: Router::standard()?,
            document_root: settings.document_root.clone(),
        })
    }

    pub fn catalog(&self) -> &Arc<ResourceCatalog> {
        &self.ctx.catalog
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Outermost request boundary: never panics, never returns an error.
    pub fn handle_request(&self, request: &Request) -> Response {
        let method = request.method();
        let url = request.url();
        debug!("{} {}", method, url);

        match method {
            "POST" => self.handle_post(&url),
            "GET" | "HEAD" => self.handle_get(&url),
            _ => Response::text("Unsupported method").with_status_code(501),
        }
    }

    fn handle_post(&self, url: &str) -> Response {
        let Some(matched) = self.router.dispatch(url) else {
            info!("No route for {}", url);
            return error_response(&RemoteError::UnknownAction.to_string());
        };
        self.run_handler(matched.handler, matched.param.as_deref())
    }

    fn handle_get(&self, url: &str) -> Response {
        if let Some(matched) = self.router.dispatch(url) {
            if matched.handler.read_only() {
                return self.run_handler(matched.handler, matched.param.as_deref());
            }
        }

        match translate_path(url, self.ctx.catalog.registry(), &self.document_root) {
            Some(path) => file_response(&path),
            None => {
                debug!("Not found: {}", url);
                Response::empty_404()
            }
        }
    }

    fn run_handler(&self, handler: Handler, param: Option<&str>) -> Response {
        let result = catch_unwind(AssertUnwindSafe(|| handler.handle(&self.ctx, param)));
        match result {
            Ok(Ok(value)) => json_response::<Value>(&value),
            Ok(Err(e)) => {
                warn!("{} failed: {}", handler.name(), e);
                error_response(&e.to_string())
            }
            Err(payload) => {
                let msg = panic_message(payload.as_ref());
                error!("{} panicked: {}", handler.name(), msg);
                error_response(&msg)
            }
        }
    }
}

/// Observable server lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Stopped,
    Starting,
    Listening(SocketAddr),
}

enum Lifecycle {
    Stopped,
    Starting,
    Listening {
        addr: SocketAddr,
        handle: JoinHandle<()>,
        stop_tx: mpsc::Sender<()>,
    },
}

/// Remote-control server.
///
/// The host owns one instance. Dropping it stops the listener.
pub struct RemoteServer {
    settings: RemoteSettings,
    service: Arc<RemoteService>,
    lifecycle: Mutex<Lifecycle>,
}

impl RemoteServer {
    pub fn new(
        settings: RemoteSettings,
        host: Arc<dyn HostCatalog>,
        prefs: Arc<dyn Preferences>,
        ui_queue: UiQueue,
    ) -> RemoteResult<Self> {
        let service = Arc::new(RemoteService::new(&settings, host, prefs, ui_queue)?);
        Ok(Self {
            settings,
            service,
            lifecycle: Mutex::new(Lifecycle::Stopped),
        })
    }

    pub fn service(&self) -> &Arc<RemoteService> {
        &self.service
    }

    pub fn settings(&self) -> &RemoteSettings {
        &self.settings
    }

    pub fn state(&self) -> ServerState {
        match &*self.lifecycle.lock().unwrap_or_else(|e| e.into_inner()) {
            Lifecycle::Stopped => ServerState::Stopped,
            Lifecycle::Starting => ServerState::Starting,
            Lifecycle::Listening { addr, .. } => ServerState::Listening(*addr),
        }
    }

    /// Bound address while listening.
    pub fn address(&self) -> Option<SocketAddr> {
        match self.state() {
            ServerState::Listening(addr) => Some(addr),
            _ => None,
        }
    }

    /// Bind and spawn the listener. Port 0 picks a free port.
    ///
    /// Starting a listening server returns the known address.
    pub fn start(&self) -> RemoteResult<SocketAddr> {
        let listen = self.settings.listen_address();
        {
            let mut lifecycle = self.lifecycle.lock().unwrap_or_else(|e| e.into_inner());
            match &*lifecycle {
                Lifecycle::Listening { addr, .. } => {
                    debug!("Server already listening on {}", addr);
                    return Ok(*addr);
                }
                Lifecycle::Starting => {
                    return Err(RemoteError::Bind {
                        addr: listen,
                        message: "server is already starting".into(),
                    });
                }
                Lifecycle::Stopped => *lifecycle = Lifecycle::Starting,
            }
        }

        let service = Arc::clone(&self.service);
        let bound = rouille::Server::new(listen.as_str(), move |request| service.handle_request(request));

        let mut lifecycle = self.lifecycle.lock().unwrap_or_else(|e| e.into_inner());
        match bound {
            Ok(server) => {
                let server = server.pool_size(1);
                let addr = server.server_addr();
                let (handle, stop_tx) = server.stoppable();
                info!(
                    "Remote control listening on {} (docroot {})",
                    addr,
                    self.settings.document_root.display()
                );
                *lifecycle = Lifecycle::Listening { addr, handle, stop_tx };
                Ok(addr)
            }
            Err(e) => {
                error!("Failed to start remote control server on {}: {}", listen, e);
                *lifecycle = Lifecycle::Stopped;
                Err(RemoteError::Bind {
                    addr: listen,
                    message: e.to_string(),
                })
            }
        }
    }

    /// Close the socket and join the listener thread.
    pub fn stop(&self) {
        let previous = {
            let mut lifecycle = self.lifecycle.lock().unwrap_or_else(|e| e.into_inner());
            match &*lifecycle {
                Lifecycle::Listening { .. } => std::mem::replace(&mut *lifecycle, Lifecycle::Stopped),
                _ => return,
            }
        };

        if let Lifecycle::Listening { addr, handle, stop_tx } = previous {
            // Listener already gone if the send fails
            let _ = stop_tx.send(());
            if handle.join().is_err() {
                error!("Listener thread for {} panicked", addr);
            }
            info!("Remote control server on {} stopped", addr);
        }
    }
}

impl Drop for RemoteServer {
    fn drop(&mut self) {
        self.stop();
    }
}
