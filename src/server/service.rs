use super::request::{parse_request, ParsedRequest};
use super::response::{write_handler_response, write_json_error, write_text};
use crate::dispatcher::Dispatcher;
use crate::ids::RequestId;
use crate::middleware::MetricsMiddleware;
use crate::router::Router;
use http::Method;
use may_minihttp::{HttpService, Request, Response};
use serde_json::json;
use std::io;
use std::sync::Arc;
use tracing::debug;

/// The `may_minihttp` service: built-in endpoints, then router, then dispatcher.
#[derive(Clone)]
pub struct AppService {
    pub router: Arc<Router>,
    pub dispatcher: Arc<Dispatcher>,
    pub metrics: Option<Arc<MetricsMiddleware>>,
}

impl AppService {
    #[must_use]
    pub fn new(router: Arc<Router>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            router,
            dispatcher,
            metrics: None,
        }
    }

    pub fn set_metrics_middleware(&mut self, metrics: Arc<MetricsMiddleware>) {
        self.metrics = Some(metrics);
    }

    /// Answer a parsed request. Split from [`HttpService::call`] so the whole
    /// pipeline can run without a socket.
    pub fn handle(&self, req: ParsedRequest, res: &mut Response) {
        let request_id = RequestId::from_header_or_new(req.get_header("x-request-id"));
        let ParsedRequest {
            method,
            path,
            headers,
        } = req;

        if let Some(metrics) = &self.metrics {
            metrics.inc_top_level_request();
        }

        if method == "GET" && path == "/health" {
            health_endpoint(res);
            return;
        }
        if method == "GET" && path == "/metrics" {
            match &self.metrics {
                Some(metrics) => metrics_endpoint(res, metrics),
                None => not_found(res, &method, &path),
            }
            return;
        }

        // httparse has already rejected non-token methods, so a failed
        // conversion here only means no route can match.
        let route_match = Method::from_bytes(method.as_bytes())
            .ok()
            .and_then(|m| self.router.route(m, &path));
        let Some(route_match) = route_match else {
            debug!(request_id = %request_id, method = %method, path = %path, "No route matched");
            not_found(res, &method, &path);
            return;
        };

        match self.dispatcher.dispatch(route_match, headers, request_id) {
            Some(hr) => write_handler_response(res, hr),
            None => write_json_error(
                res,
                500,
                json!({
                    "error": "Handler failed or not registered",
                    "method": method,
                    "path": path,
                }),
            ),
        }
    }
}

fn not_found(res: &mut Response, method: &str, path: &str) {
    write_json_error(
        res,
        404,
        json!({ "error": "Not Found", "method": method, "path": path }),
    );
}

/// Liveness probe returning `{"status":"ok"}`. Never touches the store.
pub fn health_endpoint(res: &mut Response) {
    write_json_error(res, 200, json!({ "status": "ok" }));
}

/// Prometheus text format statistics.
pub fn metrics_endpoint(res: &mut Response, metrics: &MetricsMiddleware) {
    write_text(res, 200, metrics.render_prometheus());
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let parsed = parse_request(&req);
        self.handle(parsed, res);
        Ok(())
    }
}
