//! Thread-scoped memoization for the Stratus cloud SDK.
//!
//! This crate provides:
//! - `memoize` / `start_memoizing` / `stop_memoizing` - Scope control
//! - `ResourceCache` / `ResponseCache` - Per-scope caches
//! - `CacheKeyBuilder` - Request fingerprints

mod cache;
mod context;
mod key;

pub use cache::*;
pub use context::*;
pub use key::*;
