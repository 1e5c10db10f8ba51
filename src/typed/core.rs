use crate::dispatcher::{Dispatcher, HandlerRequest, HandlerResponse};
use crate::ids::RequestId;
use crate::router::ParamVec;
use http::Method;
use serde::Serialize;
use serde_json::json;
use std::convert::TryFrom;
use std::io;
use thiserror::Error;
use tracing::{error, warn};

/// Failure returned by a typed handler, mapped onto an HTTP status.
///
/// Malformed input never reaches a handler: it is rejected with a 400 when
/// the request is converted.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The handler could not produce a result, e.g. the store failed.
    #[error("{0}")]
    Internal(String),
}

impl HandlerError {
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            HandlerError::Internal(_) => 500,
        }
    }

    #[must_use]
    pub fn into_response(self) -> HandlerResponse {
        HandlerResponse::error(self.status(), &self.to_string())
    }
}

/// Trait implemented by typed coroutine handlers.
///
/// The raw [`HandlerRequest`] is converted into `Self::Request` with
/// `TryFrom`; a failed conversion is answered with a 400 before `handle` runs.
pub trait Handler: Send + 'static {
    type Request: TryFrom<HandlerRequest, Error = anyhow::Error> + Send + 'static;
    type Response: Serialize + Send + 'static;

    fn handle(
        &self,
        req: TypedHandlerRequest<Self::Request>,
    ) -> Result<Self::Response, HandlerError>;
}

/// Typed request data passed to a [`Handler`].
#[derive(Debug, Clone)]
pub struct TypedHandlerRequest<T> {
    pub request_id: RequestId,
    pub method: Method,
    pub path: String,
    pub handler_name: String,
    pub path_params: ParamVec,
    /// Validated, strongly-typed request data
    pub data: T,
}

/// Convert a raw request into a typed one, keeping the HTTP metadata.
pub fn into_typed<T>(req: HandlerRequest) -> anyhow::Result<TypedHandlerRequest<T>>
where
    T: TryFrom<HandlerRequest, Error = anyhow::Error>,
{
    let data = T::try_from(req.clone())?;
    Ok(TypedHandlerRequest {
        request_id: req.request_id,
        method: req.method,
        path: req.path,
        handler_name: req.handler_name,
        path_params: req.path_params,
        data,
    })
}

/// Run one request through a typed handler and produce the response.
pub fn run_typed<H: Handler>(handler: &H, req: HandlerRequest) -> HandlerResponse {
    let request_id = req.request_id;
    let handler_name = req.handler_name.clone();

    let typed_req = match into_typed::<H::Request>(req) {
        Ok(r) => r,
        Err(err) => {
            warn!(
                request_id = %request_id,
                handler_name = %handler_name,
                error = %format!("{err:#}"),
                "Request conversion failed"
            );
            return HandlerResponse::json(
                400,
                json!({
                    "error": "Invalid request data",
                    "message": format!("{err:#}"),
                }),
            );
        }
    };

    match handler.handle(typed_req) {
        Ok(result) => match serde_json::to_value(result) {
            Ok(body) => HandlerResponse::json(200, body),
            Err(err) => {
                error!(
                    request_id = %request_id,
                    handler_name = %handler_name,
                    error = %err,
                    "Failed to serialize response"
                );
                HandlerResponse::error(500, "Failed to serialize response")
            }
        },
        Err(err) => err.into_response(),
    }
}

impl Dispatcher {
    /// Register a typed handler under `name`.
    ///
    /// # Safety
    ///
    /// Same contract as [`Dispatcher::register_handler`]: the `may` runtime
    /// must be configured before coroutines are spawned.
    ///
    /// # Errors
    ///
    /// Returns the spawn error if the handler coroutine could not be created.
    pub unsafe fn register_typed<H>(
        &mut self,
        name: &str,
        stack_size: usize,
        handler: H,
    ) -> io::Result<()>
    where
        H: Handler,
    {
        // SAFETY: forwarded to the caller.
        unsafe {
            self.register_handler(name, stack_size, move |req: HandlerRequest| {
                let reply = req.reply_tx.clone();
                let request_id = req.request_id;
                let response = run_typed(&handler, req);
                if reply.send(response).is_err() {
                    warn!(request_id = %request_id, "Reply channel closed before response was sent");
                }
            })
        }
    }
}
