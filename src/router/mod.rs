//! # Router Module
//!
//! Maps request paths to registered handlers.
//!
//! ## Overview
//!
//! The route table is an ordered list of path templates such as
//! `/hello/{name}`. Each template is compiled into an anchored regex when it is
//! registered; a request path is then tested against the templates in
//! registration order and the first full match wins.
//!
//! - Literal text must match exactly
//! - `{name}` binds one non-empty path segment (never spans `/`)
//! - Placeholders may sit inside a segment: `/files/{stem}.txt`
//! - Registering the same template string twice is an error
//!
//! ## Example
//!
//! ```rust
//! use switchyard::handler::function;
//! use switchyard::router::RouteTable;
//!
//! let mut table = RouteTable::new();
//! table
//!     .add("/hello/{name}", function(|_req, _res, _params| Ok(())), None)
//!     .unwrap();
//!
//! let m = table.match_path("/hello/John").unwrap();
//! assert_eq!(m.params.get("name"), Some("John"));
//! assert!(table.match_path("/hello/John/extra").is_none());
//! ```

mod core;
mod pattern;

pub use core::{ParamVec, PathParams, Route, RouteMatch, RouteTable, MAX_INLINE_PARAMS};
pub use pattern::CompiledPattern;
