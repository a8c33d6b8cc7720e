//! Public SDK for the Stratus cloud API.
//!
//! This crate re-exports all SDK functionality:
//!
//! ```ignore
//! use stratus_sdk::prelude::*;
//!
//! configure(ConfigOptions::new().region("eu-west-1"));
//!
//! let vaults = memoize(|| {
//!     let glacier = glacier().with_transport(my_transport);
//!     glacier.call("ListVaults", [("accountId", "-")])
//! })?;
//! ```

mod facade;

pub use facade::*;

pub use stratus_client;
pub use stratus_core;
pub use stratus_memo;
pub use stratus_observability;

pub use stratus_core::resolve_region;
pub use stratus_memo::{
    is_memoizing, memoize, resource_cache, response_cache, start_memoizing, stop_memoizing,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::facade::*;
    pub use stratus_client::prelude::*;
    pub use stratus_client::{Protocol, ServiceDefinition, StubTransport};
    pub use stratus_core::*;
    pub use stratus_memo::*;
    pub use stratus_observability::ClientLogger;
}
