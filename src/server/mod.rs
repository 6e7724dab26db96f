//! HTTP server for remote control of the host from a phone or tablet.
//!
//! # Purpose
//!
//! Serves a small web client (static files) and a JSON API listing the host's
//! workbenches, toolbar actions and macros, and triggering them on the UI
//! thread.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐      UiQueue (crossbeam)     ┌──────────────────────┐
//! │   Server Thread          │  ──── boxed UI job ───────▶  │   UI Thread          │
//! │   (rouille, pool of 1)   │                              │   (UiDispatcher)     │
//! │                          │                              │                      │
//! │  POST /workbench/<key>   │  ──▶ activate_workbench ──▶  │  host.activate(..)   │
//! │  POST /macro/<token>     │  ──▶ run_macro_source ───▶   │  host.run_macro(..)  │
//! │  POST /action/<token>    │  ──▶ trigger_action ─────▶   │  host.trigger(..)    │
//! └──────────────────────────┘                              └──────────────────────┘
//!          │            ◀──── one-shot result (or timeout) ────────────│
//!          │
//!          │  ResourceCatalog (cached pages) + ExportRegistry (tokens)
//! ```
//!
//! - **rouille** - sync HTTP server, one request at a time
//! - **Router** - ordered regex table, first full match wins
//! - **UiCallBridge** - marshals UI work and waits with a timeout
//!
//! # Dependencies
//!
//! - `rouille` - HTTP server
//! - `regex` - route patterns
//! - `enum_dispatch` - handler dispatch
//! - `serde` / `serde_json` - JSON replies
//!
//! # Endpoints
//!
//! | Method     | Path                         | Description                      |
//! |------------|------------------------------|----------------------------------|
//! | GET/POST   | `/workbenches`               | "All Workbenches" page           |
//! | GET/POST   | `/workbench-actions/{key}`   | Toolbars of one workbench        |
//! | GET/POST   | `/macros`                    | "All Macros" page                |
//! | POST       | `/workbench/{key}`           | Activate workbench               |
//! | POST       | `/macro/{token}`             | Run macro                        |
//! | POST       | `/action/{token}`            | Trigger toolbar action           |
//! | GET        | `/{token}`                   | Exported file (icons)            |
//! | GET        | `/{path}`                    | Static file under document root  |

mod api;
pub mod files;
pub mod handlers;
pub mod router;

pub use api::{RemoteServer, RemoteService, ServerState};
pub use handlers::{Handler, HandlerContext, RouteHandler};
pub use router::{Router, STANDARD_ROUTES};
