use crate::ids::RequestId;
use crate::middleware::Middleware;
use crate::router::{ParamVec, RouteMatch};
use http::Method;
use may::coroutine;
use may::sync::mpsc;
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Maximum inline headers before heap allocation.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage for the hot path.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Request data passed to a handler coroutine.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// Unique request ID for tracing and correlation
    pub request_id: RequestId,
    pub method: Method,
    /// Route pattern that matched, e.g. `/api/pets/{id}`
    pub path: String,
    pub handler_name: String,
    pub path_params: ParamVec,
    /// HTTP headers with lowercase names
    pub headers: HeaderVec,
    /// Channel for sending the response back to the dispatcher
    pub reply_tx: mpsc::Sender<HandlerResponse>,
}

impl HandlerRequest {
    /// Get a path parameter by name (last occurrence wins).
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Send the response back to the waiting dispatcher.
    ///
    /// A closed channel means the dispatcher gave up on the request; that is
    /// logged and otherwise ignored.
    pub fn reply(&self, response: HandlerResponse) {
        if let Err(e) = self.reply_tx.send(response) {
            warn!(
                request_id = %self.request_id,
                handler_name = %self.handler_name,
                error = %e,
                "Reply channel closed before response was sent"
            );
        }
    }
}

/// Response data sent back from a handler coroutine.
#[derive(Debug, Clone)]
pub struct HandlerResponse {
    pub status: u16,
    pub headers: HeaderVec,
    pub body: Value,
}

impl HandlerResponse {
    /// Create a JSON response with a `content-type` header.
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create an `{"error": message}` response.
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }

    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header (case-insensitive name match).
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}

/// Channel sender that dispatches requests to a handler coroutine.
pub type HandlerSender = mpsc::Sender<HandlerRequest>;

/// Routes requests to registered handler coroutines.
///
/// Each handler name maps to the sending half of a channel drained by one
/// coroutine. Middleware runs around every dispatch in registration order.
#[derive(Clone, Default)]
pub struct Dispatcher {
    pub handlers: HashMap<String, HandlerSender>,
    pub middlewares: Vec<Arc<dyn Middleware>>,
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sender for `handler_name`.
    ///
    /// Replacing an existing name drops the old sender, which closes its
    /// channel and lets the old coroutine exit.
    pub fn add_handler_sender(&mut self, handler_name: &str, sender: HandlerSender) {
        if self.handlers.remove(handler_name).is_some() {
            warn!(
                handler_name = %handler_name,
                "Replaced existing handler - old coroutine will exit"
            );
        }
        self.handlers.insert(handler_name.to_string(), sender);
        info!(
            handler_name = %handler_name,
            total_handlers = self.handlers.len(),
            "Handler registered"
        );
    }

    /// Add middleware. Middleware runs in the order it is added.
    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) {
        self.middlewares.push(mw);
    }

    /// Spawn a coroutine that runs `handler_fn` for every request sent to `name`.
    ///
    /// Panics inside `handler_fn` are caught and answered with a 500; the
    /// coroutine keeps serving subsequent requests.
    ///
    /// # Safety
    ///
    /// Spawning a `may` coroutine is unsafe: the caller must ensure the `may`
    /// runtime is configured and that `handler_fn` does not block the worker
    /// thread on thread-local state that may migrate across coroutines.
    ///
    /// # Errors
    ///
    /// Returns the spawn error if the coroutine could not be created; the
    /// handler is not registered in that case.
    pub unsafe fn register_handler<F>(
        &mut self,
        name: &str,
        stack_size: usize,
        handler_fn: F,
    ) -> io::Result<()>
    where
        F: Fn(HandlerRequest) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<HandlerRequest>();
        let handler_name = name.to_string();

        // SAFETY: upheld by the caller, see the function's safety section.
        let spawn_result = unsafe {
            coroutine::Builder::new()
                .name(handler_name.clone())
                .stack_size(stack_size)
                .spawn(move || {
                    debug!(
                        handler_name = %handler_name,
                        stack_size = stack_size,
                        "Handler coroutine start"
                    );
                    for req in rx.iter() {
                        let reply_tx = req.reply_tx.clone();
                        let request_id = req.request_id;
                        let execution_start = Instant::now();

                        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(
                            || handler_fn(req),
                        ));
                        match outcome {
                            Ok(()) => {
                                debug!(
                                    request_id = %request_id,
                                    handler_name = %handler_name,
                                    execution_time_ms =
                                        execution_start.elapsed().as_millis() as u64,
                                    "Handler execution complete"
                                );
                            }
                            Err(panic) => {
                                let panic_message = panic_message(panic.as_ref());
                                error!(
                                    request_id = %request_id,
                                    handler_name = %handler_name,
                                    panic_message = %panic_message,
                                    "Handler panicked"
                                );
                                let response = HandlerResponse::error(
                                    500,
                                    &format!("Handler panicked: {panic_message}"),
                                );
                                if reply_tx.send(response).is_err() {
                                    warn!(
                                        request_id = %request_id,
                                        "Reply channel closed after handler panic"
                                    );
                                }
                            }
                        }
                    }
                    debug!(handler_name = %handler_name, "Handler coroutine exit");
                })
        };

        if let Err(e) = spawn_result {
            error!(
                handler_name = %name,
                error = %e,
                stack_size = stack_size,
                "Failed to spawn handler coroutine"
            );
            return Err(e);
        }

        self.add_handler_sender(name, tx);
        Ok(())
    }

    /// Dispatch a matched request to its handler and wait for the response.
    ///
    /// Returns `None` if no handler is registered for the route. A handler
    /// whose channel closed before replying yields a 503.
    #[must_use]
    pub fn dispatch(
        &self,
        route_match: RouteMatch,
        headers: HeaderVec,
        request_id: RequestId,
    ) -> Option<HandlerResponse> {
        let Some(tx) = self.handlers.get(&route_match.handler_name) else {
            let available: Vec<&String> = self.handlers.keys().collect();
            error!(
                request_id = %request_id,
                handler_name = %route_match.handler_name,
                available_handlers = ?available,
                "Handler not found"
            );
            return None;
        };

        let (reply_tx, reply_rx) = mpsc::channel();
        let mut request = HandlerRequest {
            request_id,
            method: route_match.route.method.clone(),
            path: route_match.route.path_pattern.clone(),
            handler_name: route_match.handler_name,
            path_params: route_match.path_params,
            headers,
            reply_tx,
        };

        let mut early_resp: Option<HandlerResponse> = None;
        for mw in &self.middlewares {
            let resp = mw.before(&request);
            if early_resp.is_none() {
                early_resp = resp;
            }
        }

        let (mut resp, latency) = match early_resp {
            Some(r) => {
                debug!(
                    request_id = %request_id,
                    status = r.status,
                    "Middleware returned early response"
                );
                (r, Duration::ZERO)
            }
            None => {
                let start = Instant::now();
                // The handler must hold the only reply sender, otherwise a
                // request dropped without a reply would block `recv` forever.
                let outbound = request.clone();
                request.reply_tx = mpsc::channel().0;
                if let Err(e) = tx.send(outbound) {
                    error!(
                        request_id = %request_id,
                        handler_name = %request.handler_name,
                        error = %e,
                        "Failed to send request to handler"
                    );
                    return None;
                }

                match reply_rx.recv() {
                    Ok(response) => (response, start.elapsed()),
                    Err(e) => {
                        error!(
                            request_id = %request_id,
                            handler_name = %request.handler_name,
                            elapsed_ms = start.elapsed().as_millis() as u64,
                            error = %e,
                            "Handler channel closed - handler may have crashed"
                        );
                        return Some(HandlerResponse::error(
                            503,
                            &format!("Handler '{}' is not responding", request.handler_name),
                        ));
                    }
                }
            }
        };

        for mw in &self.middlewares {
            mw.after(&request, &mut resp, latency);
        }

        Some(resp)
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
