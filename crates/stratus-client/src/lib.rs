//! Service client plumbing for the Stratus cloud SDK.
//!
//! This crate provides:
//! - `ServiceClient` - Builds requests and consults the response cache
//! - `ServiceDefinition` - Static description of a service
//! - `Transport` / `StubTransport` - Request delivery
//! - `GlacierClient` / `ImportExportClient` - Shipped services

mod client;
mod error;
mod request;
mod response;
pub mod services;
mod transport;

pub use client::*;
pub use error::*;
pub use request::*;
pub use response::*;
pub use services::*;
pub use transport::*;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        ClientError, GlacierClient, ImportExportClient, Request, Response, ServiceClient,
        Transport,
    };
}
