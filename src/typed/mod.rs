//! # Typed Handlers
//!
//! Type-safe request/response handling on top of the dispatcher.
//!
//! A handler declares its request type (built from the raw
//! [`HandlerRequest`](crate::dispatcher::HandlerRequest) via `TryFrom`) and a
//! serializable response type. Conversion failures become 400 responses,
//! [`HandlerError`]s map to their status, and successful results are
//! serialized as the 200 body.

mod core;

pub use core::{into_typed, run_typed, Handler, HandlerError, TypedHandlerRequest};
