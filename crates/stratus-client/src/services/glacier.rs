//! Amazon Glacier.

use stratus_core::Service;

use crate::{Protocol, Request, ServiceClient, ServiceDefinition};

/// Header carrying the Glacier API version on every request.
pub const GLACIER_VERSION_HEADER: &str = "x-amz-glacier-version";

/// Amazon Glacier (REST/JSON).
#[derive(Debug, Clone, Copy)]
pub struct Glacier;

impl ServiceDefinition for Glacier {
    const SERVICE: Service = Service::Glacier;
    const API_VERSION: &'static str = "2012-06-01";
    const PROTOCOL: Protocol = Protocol::RestJson;
    const CACHEABLE_REQUESTS: &'static [&'static str] = &[];

    fn customize_request(request: Request) -> Request {
        request.header(GLACIER_VERSION_HEADER, Self::API_VERSION)
    }
}

/// Client for Amazon Glacier.
pub type GlacierClient = ServiceClient<Glacier>;
