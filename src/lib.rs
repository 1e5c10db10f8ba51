//! # pet_lookup
//!
//! A coroutine-powered HTTP service answering `GET /api/pets/{id}` with the
//! pet and its owner from a relational store:
//!
//! ```json
//! {"pet": {"id": 1, "name": "Rex", "species": "dog", "ownerId": 7,
//!          "owner": {"id": 7, "name": "Alice", "email": null}}}
//! ```
//!
//! An unknown id answers `{"pet": null}` with status 200. A non-integer id is
//! a 400 and never reaches the store; a store failure is a 500.
//!
//! ## Architecture
//!
//! - **[`router`]** - regex path matching and parameter extraction
//! - **[`dispatcher`]** - one `may` coroutine per handler, fed over channels
//! - **[`typed`]** - `TryFrom`-based request conversion for handlers
//! - **[`handlers`]** - the pet lookup controller
//! - **[`store`]** - the [`store::PetRepository`] seam and its SQLite implementation
//! - **[`middleware`]** - request metrics and structured request logging
//! - **[`server`]** - `may_minihttp` service with `/health` and `/metrics`
//! - **[`config`]**, **[`runtime_config`]**, **[`logging`]** - ambient setup
//!
//! ## Request flow
//!
//! ```text
//! may_minihttp -> AppService -> Router::route -> Dispatcher::dispatch
//!     -> middleware.before -> handler coroutine -> PetRepository
//!     -> middleware.after -> response
//! ```
//!
//! ## Embedding
//!
//! ```rust,no_run
//! use pet_lookup::app::build_service;
//! use pet_lookup::config::DatabaseConfig;
//! use pet_lookup::runtime_config::RuntimeConfig;
//! use pet_lookup::server::HttpServer;
//! use pet_lookup::store::{PetRepository, SqlitePetStore};
//! use std::sync::Arc;
//!
//! # fn main() -> anyhow::Result<()> {
//! let store: Arc<dyn PetRepository> =
//!     Arc::new(SqlitePetStore::open(&DatabaseConfig::default())?);
//! let service = build_service(store, &RuntimeConfig::from_env(), true)?;
//! let handle = HttpServer(service).start("127.0.0.1:8080")?;
//! handle.wait_ready()?;
//! # handle.stop();
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod handlers;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod model;
pub mod registry;
pub mod router;
pub mod routes;
pub mod runtime_config;
pub mod server;
pub mod store;
pub mod typed;
