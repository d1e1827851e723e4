//! Generation key and cache for the proxyforge engine.
//!
//! This crate owns the structural [`GenerationKey`] derived from a validated
//! configuration and the shared, concurrency-safe [`GenerationCache`] that
//! guarantees at most one generated class per distinct key.

mod cache;
mod key;

pub use cache::GenerationCache;
pub use key::{GenerationKey, filter_identity};
