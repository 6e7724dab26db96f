//! Request handlers, one per route.
//!
//! The set is closed: [`Handler`] is an `enum_dispatch` enum over unit
//! structs implementing [`RouteHandler`]. Read-only handlers answer from the
//! catalog on the server thread; the three UI handlers go through the
//! [`UiCallBridge`] and resolve their token on the UI thread.

use enum_dispatch::enum_dispatch;
use log::{debug, info};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::catalog::ResourceCatalog;
use crate::core::page::Page;
use crate::core::ui_bridge::{CallOutcome, UiCallBridge};
use crate::error::{RemoteError, RemoteResult};

/// Everything a handler may use. Built once at server start.
#[derive(Clone)]
pub struct HandlerContext {
    pub catalog: Arc<ResourceCatalog>,
    pub bridge: UiCallBridge,
}

/// Common capability of all route handlers.
#[enum_dispatch]
pub trait RouteHandler {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Read-only handlers never touch the UI thread and also answer GET.
    fn read_only(&self) -> bool;

    /// Handle a request. `param` is the trailing path segment captured by
    /// the route pattern, if it has one.
    fn handle(&self, ctx: &HandlerContext, param: Option<&str>) -> RemoteResult<Value>;
}

#[enum_dispatch(RouteHandler)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    GetWorkbenches(GetWorkbenches),
    GetWorkbenchActions(GetWorkbenchActions),
    GetMacros(GetMacros),
    ActivateWorkbench(ActivateWorkbench),
    RunMacro(RunMacro),
    TriggerAction(TriggerAction),
}

fn page_response(page: &Page) -> RemoteResult<Value> {
    let mut value = serde_json::to_value(page)?;
    value["status"] = json!("ok");
    Ok(value)
}

fn require<'a>(param: Option<&'a str>, what: &str) -> RemoteResult<&'a str> {
    param
        .filter(|p| !p.is_empty())
        .ok_or_else(|| RemoteError::NotFound(format!("missing {}", what)))
}

/// Map a bridge outcome to the client reply.
///
/// Completed, failed and timed-out calls all answer `body` (status ok): the
/// client cannot act on a UI-side failure, and a slow UI thread will still
/// run the job. Only a missing UI thread is reported as an error.
fn ui_response(handler: &str, outcome: CallOutcome, body: Value) -> RemoteResult<Value> {
    match outcome {
        CallOutcome::Completed => debug!("{} completed on UI thread", handler),
        CallOutcome::Failed(msg) => info!("{} failed on UI thread: {}", handler, msg),
        CallOutcome::TimedOut => info!("{} not finished yet, answering anyway", handler),
        CallOutcome::Unavailable => return Err(RemoteError::UiUnavailable),
    }
    Ok(body)
}

/// `/workbenches`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GetWorkbenches;

impl RouteHandler for GetWorkbenches {
    fn name(&self) -> &'static str {
        "get_workbenches"
    }

    fn read_only(&self) -> bool {
        true
    }

    fn handle(&self, ctx: &HandlerContext, _param: Option<&str>) -> RemoteResult<Value> {
        page_response(&*ctx.catalog.get_workbenches()?)
    }
}

/// `/workbench-actions/<key>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GetWorkbenchActions;

impl RouteHandler for GetWorkbenchActions {
    fn name(&self) -> &'static str {
        "get_workbench_actions"
    }

    fn read_only(&self) -> bool {
        true
    }

    fn handle(&self, ctx: &HandlerContext, param: Option<&str>) -> RemoteResult<Value> {
        let key = require(param, "workbench key")?;
        page_response(&*ctx.catalog.get_workbench_actions(key)?)
    }
}

/// `/macros`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GetMacros;

impl RouteHandler for GetMacros {
    fn name(&self) -> &'static str {
        "get_macros"
    }

    fn read_only(&self) -> bool {
        true
    }

    fn handle(&self, ctx: &HandlerContext, _param: Option<&str>) -> RemoteResult<Value> {
        page_response(&*ctx.catalog.get_macros()?)
    }
}

/// `/workbench/<key>` - activate a listed workbench.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActivateWorkbench;

impl RouteHandler for ActivateWorkbench {
    fn name(&self) -> &'static str {
        "activate_workbench"
    }

    fn read_only(&self) -> bool {
        false
    }

    fn handle(&self, ctx: &HandlerContext, param: Option<&str>) -> RemoteResult<Value> {
        let key = require(param, "workbench key")?.to_string();
        // Make sure every listed key is exported before the UI side checks
        ctx.catalog.get_workbenches()?;

        let registry = Arc::clone(ctx.catalog.registry());
        let wb = key.clone();
        let outcome = ctx.bridge.invoke(self.name(), move |host| {
            if !registry.has_workbench(&wb) {
                return Err(RemoteError::UnknownWorkbench(wb));
            }
            Ok(host.activate_workbench(&wb)?)
        });

        ui_response(self.name(), outcome, json!({ "status": "ok", "workbench": key }))
    }
}

/// `/macro/<token>` - run an exported macro.
///
/// The token is checked on the UI thread only, so an unknown token still
/// answers ok; the failure shows up in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunMacro;

impl RouteHandler for RunMacro {
    fn name(&self) -> &'static str {
        "run_macro"
    }

    fn read_only(&self) -> bool {
        false
    }

    fn handle(&self, ctx: &HandlerContext, param: Option<&str>) -> RemoteResult<Value> {
        let token = require(param, "macro token")?.to_string();
        let registry = Arc::clone(ctx.catalog.registry());

        let outcome = ctx.bridge.invoke(self.name(), move |host| {
            let descriptor = registry
                .resolve_macro(&token)
                .ok_or_else(|| RemoteError::NotFound(format!("macro {}", token)))?;
            debug!("Running macro {} ({})", descriptor.name, descriptor.source.display());
            Ok(host.run_macro_source(&descriptor.source)?)
        });

        ui_response(self.name(), outcome, json!({ "status": "ok" }))
    }
}

/// `/action/<token>` - trigger an exported toolbar action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TriggerAction;

impl RouteHandler for TriggerAction {
    fn name(&self) -> &'static str {
        "trigger_action"
    }

    fn read_only(&self) -> bool {
        false
    }

    fn handle(&self, ctx: &HandlerContext, param: Option<&str>) -> RemoteResult<Value> {
        let token = require(param, "action token")?.to_string();
        let registry = Arc::clone(ctx.catalog.registry());

        let key = token.clone();
        let outcome = ctx.bridge.invoke(self.name(), move |host| {
            let (toolbar, handle) = registry
                .resolve_action(&key)
                .ok_or_else(|| RemoteError::NotFound(format!("action {}", key)))?;
            debug!("Triggering {}/{}", toolbar, handle.as_str());
            Ok(host.trigger_action(&handle)?)
        });

        ui_response(self.name(), outcome, json!({ "status": "ok", "key": token }))
    }
}
