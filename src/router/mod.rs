//! # Router Module
//!
//! Path matching and route resolution.
//!
//! At startup each route's path pattern (e.g. `/api/pets/{id}`) is compiled
//! into an anchored regex. For each request the router tests the method and
//! path against the compiled routes and returns the route metadata together
//! with the extracted path parameters.
//!
//! ```rust
//! use http::Method;
//! use pet_lookup::router::Router;
//! use pet_lookup::routes::api_routes;
//!
//! let router = Router::new(api_routes()).unwrap();
//! let m = router.route(Method::GET, "/api/pets/42").unwrap();
//! assert_eq!(m.handler_name, "get_pet");
//! assert_eq!(m.get_path_param("id"), Some("42"));
//! ```

mod core;

pub use core::{ParamVec, RouteMatch, Router, MAX_INLINE_PARAMS};
