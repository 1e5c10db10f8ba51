//! # Dispatcher Module
//!
//! Coroutine-based request dispatch.
//!
//! - Every handler runs in its own `may` coroutine and drains a channel of
//!   [`HandlerRequest`]s.
//! - The dispatcher looks up the handler by the name the router matched,
//!   sends it the request, and blocks the calling coroutine on a reply
//!   channel until the [`HandlerResponse`] arrives.
//! - Middleware runs before and after every dispatch.
//! - A handler that panics is answered with a 500; the coroutine survives.
//!
//! ```rust,ignore
//! let mut dispatcher = Dispatcher::new();
//! unsafe {
//!     dispatcher.register_handler("echo", 0x10000, |req: HandlerRequest| {
//!         let id = req.get_path_param("id").unwrap_or_default().to_string();
//!         req.reply(HandlerResponse::json(200, serde_json::json!({ "id": id })));
//!     })?;
//! }
//! ```

mod core;

pub use core::{
    Dispatcher, HandlerRequest, HandlerResponse, HandlerSender, HeaderVec, MAX_INLINE_HEADERS,
};
