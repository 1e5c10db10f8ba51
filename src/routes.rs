//! Route table for the service.

use http::Method;

/// Handler name for the pet lookup.
pub const GET_PET: &str = "get_pet";

/// A single routable operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMeta {
    pub method: Method,
    /// Path with `{name}` placeholders, e.g. `/api/pets/{id}`
    pub path_pattern: String,
    pub handler_name: String,
}

impl RouteMeta {
    #[must_use]
    pub fn new(method: Method, path_pattern: &str, handler_name: &str) -> Self {
        Self {
            method,
            path_pattern: path_pattern.to_string(),
            handler_name: handler_name.to_string(),
        }
    }
}

/// Every route served by the API.
#[must_use]
pub fn api_routes() -> Vec<RouteMeta> {
    vec![RouteMeta::new(Method::GET, "/api/pets/{id}", GET_PET)]
}
