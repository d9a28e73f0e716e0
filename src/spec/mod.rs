//! # Route Spec Module
//!
//! Value types for routes - methods, path segments, route specs - plus the
//! declarative nested table grammar and the normalizer that flattens it
//! into canonical entries. Everything here is compile-time data; nothing
//! in this module is consulted on the request hot path.

mod build;
mod table;
mod types;

pub use build::{normalize, FlatRoute};
pub use table::{route, scope, HandlerRef, RouteDef, RouteEntry, RouteTable, ScopeDef};
pub use types::{format_path, parse_path, MethodKey, PathSegment, PathVec, RouteSpec};
