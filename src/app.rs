//! Service assembly: router, middleware, handler coroutines.

use crate::dispatcher::Dispatcher;
use crate::middleware::{MetricsMiddleware, TracingMiddleware};
use crate::registry;
use crate::router::Router;
use crate::routes::api_routes;
use crate::runtime_config::RuntimeConfig;
use crate::server::AppService;
use crate::store::PetRepository;
use std::io;
use std::sync::Arc;
use tracing::info;

/// Build a ready-to-serve [`AppService`] around `store`.
///
/// Applies `runtime` to the `may` scheduler before any coroutine is spawned.
/// With `metrics_enabled` a [`MetricsMiddleware`] is installed and `/metrics`
/// is served; otherwise `/metrics` answers 404.
///
/// # Errors
///
/// Fails if the routing table does not compile or a handler coroutine cannot
/// be spawned.
pub fn build_service(
    store: Arc<dyn PetRepository>,
    runtime: &RuntimeConfig,
    metrics_enabled: bool,
) -> io::Result<AppService> {
    runtime.apply();

    let router = Router::new(api_routes())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let mut dispatcher = Dispatcher::new();
    let metrics = metrics_enabled.then(|| Arc::new(MetricsMiddleware::new()));
    if let Some(metrics) = &metrics {
        dispatcher.add_middleware(Arc::clone(metrics) as _);
    }
    dispatcher.add_middleware(Arc::new(TracingMiddleware));

    // SAFETY: the runtime configuration was applied above, before any spawn.
    unsafe { registry::register_all(&mut dispatcher, store, runtime.stack_size)? };

    info!(
        stack_size = runtime.stack_size,
        metrics = metrics_enabled,
        handlers = dispatcher.handlers.len(),
        "Service assembled"
    );

    let mut service = AppService::new(Arc::new(router), Arc::new(dispatcher));
    if let Some(metrics) = metrics {
        service.set_metrics_middleware(metrics);
    }
    Ok(service)
}
