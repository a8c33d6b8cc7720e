//! SDK configuration.

use std::collections::BTreeMap;
use std::fmt;

use crate::log::{LogFormat, LogLevel};
use crate::options::ConfigOptions;
use crate::region::{resolve_region_or, DEFAULT_REGION};
use crate::service::Service;

/// Static credentials used to sign requests.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Access key id.
    pub access_key_id: Option<String>,
    /// Secret access key.
    pub secret_access_key: Option<String>,
    /// Session token for temporary credentials.
    pub session_token: Option<String>,
}

impl Credentials {
    /// Check whether both halves of the key pair are present.
    pub fn is_complete(&self) -> bool {
        self.access_key_id.is_some() && self.secret_access_key.is_some()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// An immutable SDK configuration.
///
/// Use [`Configuration::with`] to derive a modified copy.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    credentials: Credentials,
    region: String,
    stub_requests: bool,
    use_ssl: bool,
    user_agent_prefix: Option<String>,
    log_level: LogLevel,
    log_format: LogFormat,
    endpoints: BTreeMap<Service, String>,
    regions: BTreeMap<Service, String>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            region: DEFAULT_REGION.to_string(),
            stub_requests: false,
            use_ssl: true,
            user_agent_prefix: None,
            log_level: LogLevel::default(),
            log_format: LogFormat::default(),
            endpoints: BTreeMap::new(),
            regions: BTreeMap::new(),
        }
    }
}

impl Configuration {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a default configuration with credentials and region taken
    /// from the environment.
    pub fn from_env() -> Self {
        Self::default().with(ConfigOptions::from_env())
    }

    /// Derive a new configuration with `options` applied.
    ///
    /// `self` is left untouched.
    pub fn with(&self, options: ConfigOptions) -> Self {
        let mut next = self.clone();

        if let Some(v) = options.access_key_id {
            next.credentials.access_key_id = Some(v);
        }
        if let Some(v) = options.secret_access_key {
            next.credentials.secret_access_key = Some(v);
        }
        if let Some(v) = options.session_token {
            next.credentials.session_token = Some(v);
        }
        if let Some(v) = options.region {
            next.region = v;
        }
        if let Some(v) = options.stub_requests {
            next.stub_requests = v;
        }
        if let Some(v) = options.use_ssl {
            next.use_ssl = v;
        }
        if let Some(v) = options.user_agent_prefix {
            next.user_agent_prefix = Some(v);
        }
        if let Some(v) = options.log_level {
            next.log_level = v;
        }
        if let Some(v) = options.log_format {
            next.log_format = v;
        }
        next.endpoints.extend(options.endpoints);
        next.regions.extend(options.regions);

        next
    }

    /// Credentials used to sign requests.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Access key id, if configured.
    pub fn access_key_id(&self) -> Option<&str> {
        self.credentials.access_key_id.as_deref()
    }

    /// Fallback region for endpoints that name none.
    pub fn default_region(&self) -> &str {
        &self.region
    }

    /// Whether clients answer requests locally.
    pub fn stub_requests(&self) -> bool {
        self.stub_requests
    }

    /// Whether endpoints are reached over `https`.
    pub fn use_ssl(&self) -> bool {
        self.use_ssl
    }

    /// URL scheme implied by [`use_ssl`](Self::use_ssl).
    pub fn scheme(&self) -> &'static str {
        if self.use_ssl {
            "https"
        } else {
            "http"
        }
    }

    /// Prefix for the `User-Agent` header.
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Minimum level for client call logs.
    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    /// Output format for client call logs.
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Endpoint for `service`: the configured override or the service default.
    pub fn endpoint(&self, service: Service) -> &str {
        self.endpoints
            .get(&service)
            .map(String::as_str)
            .unwrap_or_else(|| service.default_endpoint())
    }

    /// Region for `service`.
    ///
    /// An explicit `<service>_region` override wins; otherwise the region is
    /// inferred from [`endpoint`](Self::endpoint), falling back to
    /// [`default_region`](Self::default_region).
    pub fn region(&self, service: Service) -> String {
        match self.regions.get(&service) {
            Some(region) => region.clone(),
            None => resolve_region_or(service.code(), self.endpoint(service), &self.region),
        }
    }
}
