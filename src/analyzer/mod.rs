//! # Table Analyzer Module
//!
//! The analysis pass between normalization and trie compilation: resolves
//! handler references through the catalog, merges module and handler
//! metadata, honors the first declared arity, classifies declared
//! parameters into route params and free params, and combines resolver
//! overrides into each entry's registry.

mod core;

pub use core::{analyze, AnalyzedHandler};
