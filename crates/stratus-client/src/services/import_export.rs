//! AWS Import/Export.

use stratus_core::Service;

use crate::{Protocol, ServiceClient, ServiceDefinition};

/// AWS Import/Export (Query).
#[derive(Debug, Clone, Copy)]
pub struct ImportExport;

impl ServiceDefinition for ImportExport {
    const SERVICE: Service = Service::ImportExport;
    const API_VERSION: &'static str = "2010-06-01";
    const PROTOCOL: Protocol = Protocol::Query;
    const CACHEABLE_REQUESTS: &'static [&'static str] = &[];
}

/// Client for AWS Import/Export.
pub type ImportExportClient = ServiceClient<ImportExport>;
