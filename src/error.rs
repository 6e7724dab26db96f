//! Error taxonomy for the remote-control core.
//!
//! Every handler fault ends up as one of these and is serialised at the
//! request boundary as `{"status":"error","message":...}`. Nothing here is
//! allowed to escape into the accept loop.

use thiserror::Error;

/// Errors produced by the registry, catalog, bridge and server.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// No route matched the request path.
    #[error("Unknown action")]
    UnknownAction,

    /// Workbench key is not listed by the host.
    #[error("Unknown workbench: {0}")]
    UnknownWorkbench(String),

    /// Token did not resolve, or the resolved file is gone.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Listening socket could not be bound.
    #[error("Failed to bind {addr}: {message}")]
    Bind { addr: String, message: String },

    /// The UI dispatcher has been dropped, nothing can run on the UI thread.
    #[error("UI thread unavailable")]
    UiUnavailable,

    /// Fault reported by the host application.
    #[error(transparent)]
    Host(#[from] anyhow::Error),

    /// Route or metadata pattern failed to compile.
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Alias for results of the remote-control core.
pub type RemoteResult<T> = Result<T, RemoteError>;
