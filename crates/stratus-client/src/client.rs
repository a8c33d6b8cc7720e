//! Generic service client.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use http::Method;
use stratus_core::{Configuration, Service};
use stratus_observability::ClientLogger;

use crate::transport::{StubTransport, Transport};
use crate::{ClientError, Request, Response};

/// Wire protocol spoken by a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// `POST /` with a url-encoded `Action`/`Version` form body.
    Query,
    /// `POST /<operation>` with a JSON body.
    RestJson,
}

/// Static description of a service.
pub trait ServiceDefinition {
    /// Service this definition targets.
    const SERVICE: Service;
    /// API version sent with every request.
    const API_VERSION: &'static str;
    /// Wire protocol.
    const PROTOCOL: Protocol;
    /// Operations whose responses may be served from the response cache.
    const CACHEABLE_REQUESTS: &'static [&'static str];

    /// Final adjustment of every built request.
    fn customize_request(request: Request) -> Request {
        request
    }
}

static STUB: StubTransport = StubTransport;

/// Client for the service described by `S`.
pub struct ServiceClient<S> {
    config: Arc<Configuration>,
    transport: Option<Arc<dyn Transport>>,
    logger: ClientLogger,
    _service: PhantomData<fn() -> S>,
}

impl<S: ServiceDefinition> ServiceClient<S> {
    /// Create a client bound to `config`.
    ///
    /// Without a transport, only stubbed requests succeed.
    pub fn new(config: Arc<Configuration>) -> Self {
        let logger = ClientLogger::from_config(S::SERVICE.code(), &config);
        Self {
            config,
            transport: None,
            logger,
            _service: PhantomData,
        }
    }

    /// Set the transport used for non-stubbed requests.
    pub fn with_transport(self, transport: impl Transport + 'static) -> Self {
        self.with_shared_transport(Arc::new(transport))
    }

    /// Set a shared transport used for non-stubbed requests.
    pub fn with_shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Configuration this client was built with.
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Endpoint requests are sent to.
    pub fn endpoint(&self) -> &str {
        self.config.endpoint(S::SERVICE)
    }

    /// Region of the endpoint.
    pub fn region(&self) -> String {
        self.config.region(S::SERVICE)
    }

    /// Check whether responses to `operation` may be served from cache.
    pub fn is_cacheable(operation: &str) -> bool {
        S::CACHEABLE_REQUESTS.contains(&operation)
    }

    fn user_agent(&self) -> String {
        let agent = format!("stratus-sdk/{}", env!("CARGO_PKG_VERSION"));
        match self.config.user_agent_prefix() {
            Some(prefix) => format!("{} {}", prefix, agent),
            None => agent,
        }
    }

    /// Build the request for `operation`.
    pub fn build_request<I, K, V>(&self, operation: &str, params: I) -> Result<Request, ClientError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        if operation.is_empty() {
            return Err(ClientError::Request("operation name is empty".to_string()));
        }
        let params: BTreeMap<String, String> = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let endpoint = self.endpoint();
        let request = Request::new(Method::POST, endpoint).scheme(self.config.scheme());
        let request = match S::PROTOCOL {
            Protocol::Query => request.form(
                [("Action", operation), ("Version", S::API_VERSION)]
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .chain(params),
            ),
            Protocol::RestJson => request.path(operation).json(&params)?,
        };
        let request = request
            .header("Host", endpoint)
            .header("User-Agent", self.user_agent())
            .header("x-amz-region", self.region());

        Ok(S::customize_request(request))
    }

    /// Call `operation`.
    ///
    /// While memoizing, successful responses are recorded in the response
    /// cache, and cacheable operations are answered from it when possible.
    pub fn call<I, K, V>(&self, operation: &str, params: I) -> Result<Response, ClientError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let log = self.logger.call(operation);
        let request = self.build_request(operation, params)?;
        let key = request.fingerprint();
        let cache = stratus_memo::response_cache();

        if Self::is_cacheable(operation) {
            if let Some(hit) = cache.as_ref().and_then(|c| c.get::<Response>(&key)) {
                log.status(hit.status).cached(true).emit();
                return Ok(hit);
            }
        }

        let response = match self.transport().and_then(|t| t.send(&request)) {
            Ok(response) => response,
            Err(e) => {
                log.error(&e).emit();
                return Err(e);
            }
        };

        let log = log.status(response.status);
        match response.error_for_status() {
            Ok(response) => {
                if let Some(cache) = &cache {
                    cache.add(operation, key, response.clone());
                }
                log.emit();
                Ok(response)
            }
            Err(e) => {
                log.error(&e).emit();
                Err(e)
            }
        }
    }

    fn transport(&self) -> Result<&dyn Transport, ClientError> {
        if self.config.stub_requests() {
            return Ok(&STUB as &dyn Transport);
        }
        self.transport
            .as_deref()
            .ok_or_else(|| ClientError::NoTransport(S::SERVICE.code().to_string()))
    }
}

impl<S> Clone for ServiceClient<S> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            transport: self.transport.clone(),
            logger: self.logger.clone(),
            _service: PhantomData,
        }
    }
}

impl<S: ServiceDefinition> fmt::Debug for ServiceClient<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceClient")
            .field("service", &S::SERVICE)
            .field("endpoint", &self.endpoint())
            .field("has_transport", &self.transport.is_some())
            .finish()
    }
}
