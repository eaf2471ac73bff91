//! # Dispatcher Module
//!
//! Turns one request into one response by consulting the route table and
//! calling the resolved handler.
//!
//! ## Request Flow
//!
//! 1. **Routing**: match the path against the route table. No match gives a
//!    404 with body `Not Found.`
//! 2. **Method check**: function handlers are gated by the route's allowed
//!    methods; resources by the verbs they implement. A miss gives a 405 with
//!    body `Method Not Allowed`
//! 3. **Invoking**: call the handler with the request, a fresh response and
//!    the extracted path parameters
//! 4. **Errors**: a failing handler is handed to the exception hook if one is
//!    installed, which decides the reply. Without a hook the error is returned
//!    to the caller unchanged
//!
//! Middleware is not the dispatcher's concern; see [`crate::middleware`].

mod core;

pub use core::{Dispatcher, ExceptionHook, Rejection, METHOD_NOT_ALLOWED_BODY, NOT_FOUND_BODY};
