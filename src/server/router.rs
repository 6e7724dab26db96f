//! Ordered path-pattern → handler table.
//!
//! Patterns are regexes that must match the whole path. Lookup walks the
//! table in registration order and the first match wins; overlapping
//! patterns are not detected. [`STANDARD_ROUTES`] spells the order out
//! explicitly and none of its patterns overlap.

use log::trace;
use regex::Regex;

use super::handlers::{
    ActivateWorkbench, GetMacros, GetWorkbenchActions, GetWorkbenches, Handler, RunMacro, TriggerAction,
};
use crate::error::RemoteResult;

/// The route table served by the remote-control server, in precedence order.
pub const STANDARD_ROUTES: &[(&str, Handler)] = &[
    ("/workbenches", Handler::GetWorkbenches(GetWorkbenches)),
    ("/workbench/([^/]+)", Handler::ActivateWorkbench(ActivateWorkbench)),
    ("/workbench-actions/([^/]+)", Handler::GetWorkbenchActions(GetWorkbenchActions)),
    ("/macros", Handler::GetMacros(GetMacros)),
    ("/macro/([^/]+)", Handler::RunMacro(RunMacro)),
    ("/action/([^/]+)", Handler::TriggerAction(TriggerAction)),
];

/// Result of a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matched {
    pub handler: Handler,
    /// First capture group of the pattern (token, key...)
    pub param: Option<String>,
}

struct RouteEntry {
    source: String,
    pattern: Regex,
    handler: Handler,
}

#[derive(Default)]
pub struct Router {
    routes: Vec<RouteEntry>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Router with [`STANDARD_ROUTES`].
    pub fn standard() -> RemoteResult<Self> {
        let mut router = Self::new();
        for (pattern, handler) in STANDARD_ROUTES {
            router.register(pattern, *handler)?;
        }
        Ok(router)
    }

    /// Append a route. The pattern is anchored at both ends.
    pub fn register(&mut self, pattern: &str, handler: impl Into<Handler>) -> RemoteResult<()> {
        let anchored = Regex::new(&format!("^(?:{})$", pattern))?;
        self.routes.push(RouteEntry {
            source: pattern.to_string(),
            pattern: anchored,
            handler: handler.into(),
        });
        Ok(())
    }

    /// First route whose pattern matches the whole `path`.
    pub fn dispatch(&self, path: &str) -> Option<Matched> {
        self.routes.iter().find_map(|route| {
            let caps = route.pattern.captures(path)?;
            trace!("{} matched {}", path, route.source);
            Some(Matched {
                handler: route.handler,
                param: caps.get(1).map(|m| m.as_str().to_string()),
            })
        })
    }

    /// Registered patterns, in precedence order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|r| r.source.as_str())
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(router: &Router, path: &str) -> Option<(Handler, Option<String>)> {
        router.dispatch(path).map(|m| (m.handler, m.param))
    }

    #[test]
    fn test_standard_routes() {
        let router = Router::standard().unwrap();
        assert_eq!(router.len(), 6);

        assert_eq!(param(&router, "/workbenches"), Some((Handler::from(GetWorkbenches), None)));
        assert_eq!(param(&router, "/macros"), Some((Handler::from(GetMacros), None)));
        assert_eq!(
            param(&router, "/workbench/Sketcher"),
            Some((Handler::from(ActivateWorkbench), Some("Sketcher".into())))
        );
        assert_eq!(
            param(&router, "/workbench-actions/PartWorkbench"),
            Some((Handler::from(GetWorkbenchActions), Some("PartWorkbench".into())))
        );
        assert_eq!(param(&router, "/macro/abc123"), Some((Handler::from(RunMacro), Some("abc123".into()))));
        assert_eq!(param(&router, "/action/ff00"), Some((Handler::from(TriggerAction), Some("ff00".into()))));
    }

    #[test]
    fn test_full_match_only() {
        let router = Router::standard().unwrap();
        for path in [
            "/workbenchesX",
            "/xworkbenches",
            "/macro/",
            "/macro/a/b",
            "/workbench",
            "/",
            "",
            "/index.html",
        ] {
            assert!(router.dispatch(path).is_none(), "{} should not match", path);
        }
    }

    #[test]
    fn test_standard_routes_do_not_overlap() {
        let samples = [
            "/workbenches",
            "/workbench/A",
            "/workbench-actions/A",
            "/macros",
            "/macro/A",
            "/action/A",
        ];
        for path in samples {
            let hits = STANDARD_ROUTES
                .iter()
                .filter(|(p, _)| Regex::new(&format!("^(?:{})$", p)).unwrap().is_match(path))
                .count();
            assert_eq!(hits, 1, "{} matched {} routes", path, hits);
        }
    }

    #[test]
    fn test_first_registered_wins() {
        let mut router = Router::new();
        router.register("/run/(.+)", RunMacro).unwrap();
        router.register("/run/special", TriggerAction).unwrap();
        for _ in 0..10 {
            assert_eq!(router.dispatch("/run/special").unwrap().handler, Handler::from(RunMacro));
        }

        let mut reversed = Router::new();
        reversed.register("/run/special", TriggerAction).unwrap();
        reversed.register("/run/(.+)", RunMacro).unwrap();
        assert_eq!(reversed.dispatch("/run/special").unwrap().handler, Handler::from(TriggerAction));
        assert_eq!(
            reversed.patterns().collect::<Vec<_>>(),
            ["/run/special", "/run/(.+)"]
        );
    }

    #[test]
    fn test_bad_pattern() {
        let mut router = Router::new();
        assert!(router.register("/broken/(", GetMacros).is_err());
        assert!(router.is_empty());
    }
}
