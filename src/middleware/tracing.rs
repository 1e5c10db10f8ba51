use std::time::Duration;

use tracing::{error, info, warn};

use super::Middleware;
use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Emits one structured event per completed request.
///
/// The level follows the status: `error` for 5xx, `warn` for 4xx, `info`
/// otherwise.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn after(&self, req: &HandlerRequest, res: &mut HandlerResponse, latency: Duration) {
        let latency_ms = latency.as_millis() as u64;
        match res.status {
            500..=599 => error!(
                request_id = %req.request_id,
                method = %req.method,
                path = %req.path,
                handler = %req.handler_name,
                status = res.status,
                latency_ms,
                "Request failed"
            ),
            400..=499 => warn!(
                request_id = %req.request_id,
                method = %req.method,
                path = %req.path,
                handler = %req.handler_name,
                status = res.status,
                latency_ms,
                "Request rejected"
            ),
            _ => info!(
                request_id = %req.request_id,
                method = %req.method,
                path = %req.path,
                handler = %req.handler_name,
                status = res.status,
                latency_ms,
                "Request completed"
            ),
        }
    }
}
