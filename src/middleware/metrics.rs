use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use super::Middleware;
use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Middleware collecting Prometheus-compatible request metrics.
///
/// All counters are atomics updated with `Ordering::Relaxed`; readers see
/// eventually consistent values, which is all a scrape needs.
///
/// Metrics collected:
/// - Dispatched request count and cumulative latency
/// - Client (4xx) and server (5xx) error responses
/// - Top-level requests that bypass dispatch (`/health`, `/metrics`)
/// - Coroutine stack size of the last handler invocation
#[derive(Default)]
pub struct MetricsMiddleware {
    request_count: AtomicUsize,
    total_latency_ns: AtomicU64,
    client_errors: AtomicUsize,
    server_errors: AtomicUsize,
    top_level_requests: AtomicUsize,
    stack_size: AtomicUsize,
}

impl MetricsMiddleware {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of dispatched requests.
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Mean dispatch latency; zero before the first request completes.
    pub fn average_latency(&self) -> Duration {
        let count = self.request_count.load(Ordering::Relaxed) as u64;
        if count == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }

    pub fn client_errors(&self) -> usize {
        self.client_errors.load(Ordering::Relaxed)
    }

    pub fn server_errors(&self) -> usize {
        self.server_errors.load(Ordering::Relaxed)
    }

    /// Count a request answered without dispatch (`/health`, `/metrics`).
    pub fn inc_top_level_request(&self) {
        self.top_level_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn top_level_request_count(&self) -> usize {
        self.top_level_requests.load(Ordering::Relaxed)
    }

    pub fn stack_size(&self) -> usize {
        self.stack_size.load(Ordering::Relaxed)
    }

    /// Render all counters in the Prometheus text exposition format.
    #[must_use]
    pub fn render_prometheus(&self) -> String {
        format!(
            "# HELP pet_lookup_requests_total Total number of dispatched requests\n\
             # TYPE pet_lookup_requests_total counter\n\
             pet_lookup_requests_total {}\n\
             # HELP pet_lookup_request_latency_seconds Average request latency in seconds\n\
             # TYPE pet_lookup_request_latency_seconds gauge\n\
             pet_lookup_request_latency_seconds {}\n\
             # HELP pet_lookup_client_errors_total Responses with a 4xx status\n\
             # TYPE pet_lookup_client_errors_total counter\n\
             pet_lookup_client_errors_total {}\n\
             # HELP pet_lookup_server_errors_total Responses with a 5xx status\n\
             # TYPE pet_lookup_server_errors_total counter\n\
             pet_lookup_server_errors_total {}\n\
             # HELP pet_lookup_top_level_requests_total HTTP requests received, including /health and /metrics\n\
             # TYPE pet_lookup_top_level_requests_total counter\n\
             pet_lookup_top_level_requests_total {}\n\
             # HELP pet_lookup_coroutine_stack_bytes Configured coroutine stack size\n\
             # TYPE pet_lookup_coroutine_stack_bytes gauge\n\
             pet_lookup_coroutine_stack_bytes {}\n",
            self.request_count(),
            self.average_latency().as_secs_f64(),
            self.client_errors(),
            self.server_errors(),
            self.top_level_request_count(),
            self.stack_size(),
        )
    }
}

impl Middleware for MetricsMiddleware {
    fn before(&self, _req: &HandlerRequest) -> Option<HandlerResponse> {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn after(&self, _req: &HandlerRequest, res: &mut HandlerResponse, latency: Duration) {
        self.total_latency_ns
            .fetch_add(latency.as_nanos() as u64, Ordering::Relaxed);
        match res.status {
            400..=499 => {
                self.client_errors.fetch_add(1, Ordering::Relaxed);
            }
            500..=599 => {
                self.server_errors.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
        let size = if may::coroutine::is_coroutine() {
            may::coroutine::current().stack_size()
        } else {
            may::config().get_stack_size()
        };
        self.stack_size.store(size, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_latency_without_requests_is_zero() {
        let metrics = MetricsMiddleware::new();
        assert_eq!(metrics.average_latency(), Duration::ZERO);
    }

    #[test]
    fn test_render_contains_all_series() {
        let metrics = MetricsMiddleware::new();
        metrics.inc_top_level_request();
        let text = metrics.render_prometheus();
        assert!(text.contains("pet_lookup_requests_total 0"));
        assert!(text.contains("pet_lookup_top_level_requests_total 1"));
        assert!(text.contains("pet_lookup_server_errors_total 0"));
    }
}
