//! Cache key composition.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use serde_json::json;

/// An opaque key identifying a memoized artifact.
///
/// Equality and hashing consider only the key string; the components are
/// kept for debugging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheKey {
    /// The computed key string.
    key: String,
    /// Components that make up the key (for debugging).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    components: Vec<String>,
}

impl CacheKey {
    /// Create a cache key from a string.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            components: Vec::new(),
        }
    }

    /// Get the key string.
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Get the key components (for debugging).
    pub fn components(&self) -> &[String] {
        &self.components
    }
}

impl PartialEq for CacheKey {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for CacheKey {}

impl Hash for CacheKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key)
    }
}

impl From<&str> for CacheKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CacheKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Builder for request fingerprints.
///
/// Parameters are sorted by name, so the order in which they are added does
/// not change the key.
#[derive(Debug, Clone, Default)]
pub struct CacheKeyBuilder {
    prefix: Option<String>,
    service: Option<String>,
    operation: Option<String>,
    params: BTreeMap<String, String>,
    body: Option<String>,
    custom: Vec<String>,
}

impl CacheKeyBuilder {
    /// Create a new cache key builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a prefix for the cache key.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Include the service (or host) the request targets.
    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Include the operation name.
    pub fn operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Include a request parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Include several request parameters.
    pub fn params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Include the request body.
    pub fn body(mut self, body: &[u8]) -> Self {
        self.body = if body.is_empty() {
            None
        } else {
            Some(body.iter().map(|b| format!("{:02x}", b)).collect())
        };
        self
    }

    /// Include a custom static value.
    pub fn custom(mut self, value: impl Into<String>) -> Self {
        self.custom.push(value.into());
        self
    }

    /// Build the cache key.
    ///
    /// The key is a JSON descriptor of every part, so part boundaries are
    /// unambiguous and distinct requests never share a key.
    pub fn build(&self) -> CacheKey {
        let mut component_descs = Vec::new();

        if let Some(service) = &self.service {
            component_descs.push(format!("service:{}", service));
        }
        if let Some(operation) = &self.operation {
            component_descs.push(format!("operation:{}", operation));
        }
        for name in self.params.keys() {
            component_descs.push(format!("param:{}", name));
        }
        if self.body.is_some() {
            component_descs.push("body".to_string());
        }
        for value in &self.custom {
            component_descs.push(format!("custom:{}", value));
        }

        let key = json!([
            self.prefix,
            self.service,
            self.operation,
            self.params,
            self.body,
            self.custom,
        ])
        .to_string();

        CacheKey {
            key,
            components: component_descs,
        }
    }
}
