use crate::routes::RouteMeta;
use http::Method;
use regex::Regex;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the hot path.
///
/// Param names are `Arc<str>` because they come from the static route table
/// and are shared by every match; values are per-request.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Result of successfully matching a request path to a route.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Arc<RouteMeta>,
    /// Path parameters extracted from the URL (e.g. `{id}` → `("id", "123")`)
    pub path_params: ParamVec,
    pub handler_name: String,
}

impl RouteMatch {
    /// Get a path parameter by name.
    ///
    /// Last write wins when a pattern repeats a name at different depths.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A route compiled for matching.
#[derive(Debug, Clone)]
struct CompiledRoute {
    method: Method,
    regex: Regex,
    meta: Arc<RouteMeta>,
    param_names: Vec<Arc<str>>,
}

/// Matches HTTP requests to handlers.
///
/// Each path pattern is compiled once into an anchored regex; matching tests
/// routes in registration order and returns the first hit. The route table is
/// tiny, so a linear scan is cheaper than building a tree.
#[derive(Debug, Clone)]
pub struct Router {
    routes: Vec<CompiledRoute>,
}

impl Router {
    /// Build a router from route metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if a path pattern does not compile to a valid regex.
    pub fn new(routes: Vec<RouteMeta>) -> Result<Self, regex::Error> {
        let mut compiled = Vec::with_capacity(routes.len());
        for route in routes {
            let (regex, names) = Self::path_to_regex(&route.path_pattern)?;
            compiled.push(CompiledRoute {
                method: route.method.clone(),
                regex,
                meta: Arc::new(route),
                param_names: names.into_iter().map(Arc::from).collect(),
            });
        }

        let routes_summary: Vec<String> = compiled
            .iter()
            .take(10)
            .map(|r| format!("{} {}", r.method, r.meta.path_pattern))
            .collect();
        info!(
            routes_count = compiled.len(),
            routes_summary = ?routes_summary,
            "Routing table loaded"
        );

        Ok(Self { routes: compiled })
    }

    /// Iterate over the registered routes in match order.
    pub fn routes(&self) -> impl Iterator<Item = &RouteMeta> {
        self.routes.iter().map(|r| r.meta.as_ref())
    }

    /// Render the routing table, one `METHOD PATH -> handler` line per route.
    #[must_use]
    pub fn describe_routes(&self) -> Vec<String> {
        self.routes()
            .map(|meta| {
                format!(
                    "{} {} -> {}",
                    meta.method, meta.path_pattern, meta.handler_name
                )
            })
            .collect()
    }

    /// Match a request to a route.
    ///
    /// `path` must already have its query string removed.
    #[must_use]
    pub fn route(&self, method: Method, path: &str) -> Option<RouteMatch> {
        debug!(method = %method, path = %path, "Route match attempt");

        for route in self.routes.iter().filter(|r| r.method == method) {
            let Some(caps) = route.regex.captures(path) else {
                continue;
            };
            let mut path_params = ParamVec::new();
            for (idx, name) in route.param_names.iter().enumerate() {
                if let Some(value) = caps.get(idx + 1) {
                    path_params.push((Arc::clone(name), value.as_str().to_string()));
                }
            }

            info!(
                method = %method,
                path = %path,
                handler_name = %route.meta.handler_name,
                route_pattern = %route.meta.path_pattern,
                path_params = ?path_params,
                "Route matched"
            );
            return Some(RouteMatch {
                route: Arc::clone(&route.meta),
                path_params,
                handler_name: route.meta.handler_name.clone(),
            });
        }

        warn!(method = %method, path = %path, "No route matched");
        None
    }

    /// Convert a path pattern to an anchored regex and its parameter names.
    ///
    /// `/users/{id}/posts/{post_id}` becomes `^/users/([^/]+)/posts/([^/]+)$`
    /// with names `["id", "post_id"]`. Literal segments are escaped.
    pub(crate) fn path_to_regex(path: &str) -> Result<(Regex, Vec<String>), regex::Error> {
        if path == "/" {
            return Ok((Regex::new(r"^/$")?, Vec::new()));
        }

        let mut pattern = String::with_capacity(path.len() + 16);
        pattern.push('^');
        let mut param_names = Vec::with_capacity(path.matches('{').count());

        for segment in path.split('/').filter(|s| !s.is_empty()) {
            pattern.push('/');
            if let Some(name) = segment
                .strip_prefix('{')
                .and_then(|s| s.strip_suffix('}'))
            {
                pattern.push_str("([^/]+)");
                param_names.push(name.to_string());
            } else {
                pattern.push_str(&regex::escape(segment));
            }
        }

        pattern.push('$');
        Ok((Regex::new(&pattern)?, param_names))
    }
}
