//! Core configuration for the Stratus cloud SDK.
//!
//! This crate provides:
//! - `Configuration` - Immutable SDK configuration
//! - `ConfigOptions` - Named option overrides (builder, pairs, env, files)
//! - `Service` - Known services and their default endpoints
//! - `resolve_region` - Endpoint to region inference

mod config;
mod error;
mod log;
mod options;
mod region;
mod service;

pub use config::*;
pub use error::*;
pub use log::*;
pub use options::*;
pub use region::*;
pub use service::*;
