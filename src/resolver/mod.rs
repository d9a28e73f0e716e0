//! # Argument Resolver Module
//!
//! A layered lookup that picks exactly one resolution strategy per declared
//! handler parameter. The registry holds tag-keyed factories and name-keyed
//! bindings; the resolution algorithm applies the strict five-rule
//! precedence order once at compile time, leaving each handler with a plain
//! ordered list of resolver functions.

mod registry;
mod resolve;

pub use registry::{
    ArgResolver, NameBinding, OverrideMode, ResolverFactory, ResolverOverrides, ResolverRegistry,
};
pub use resolve::resolve_params;
