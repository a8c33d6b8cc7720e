//! Outbound service requests.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use http::Method;
use serde::Serialize;
use stratus_memo::{CacheKey, CacheKeyBuilder};

use crate::ClientError;

/// A request to a service endpoint.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    scheme: String,
    host: String,
    path: String,
    headers: HashMap<String, String>,
    params: BTreeMap<String, String>,
    body: Vec<u8>,
}

impl Request {
    /// Create a request for `/` on `host` over https.
    pub fn new(method: Method, host: impl Into<String>) -> Self {
        Self {
            method,
            scheme: "https".to_string(),
            host: host.into(),
            path: "/".to_string(),
            headers: HashMap::new(),
            params: BTreeMap::new(),
            body: Vec::new(),
        }
    }

    /// Set the URL scheme.
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Set the path. A leading `/` is added if missing.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.path = if path.starts_with('/') {
            path
        } else {
            format!("/{}", path)
        };
        self
    }

    /// Add a header to the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add a query parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Set the request body as raw bytes.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: Serialize>(mut self, value: &T) -> Result<Self, ClientError> {
        self.body = serde_json::to_vec(value)?;
        self.headers.insert(
            "Content-Type".to_string(),
            "application/json".to_string(),
        );
        Ok(self)
    }

    /// Set the request body as a url-encoded form.
    pub fn form<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in fields {
            serializer.append_pair(k.as_ref(), v.as_ref());
        }
        self.body = serializer.finish().into_bytes();
        self.headers.insert(
            "Content-Type".to_string(),
            "application/x-www-form-urlencoded; charset=utf-8".to_string(),
        );
        self
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Host the request is sent to.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Request path.
    pub fn request_path(&self) -> &str {
        &self.path
    }

    /// All headers.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Get a header value.
    pub fn header_value(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Query parameters, sorted by name.
    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Raw body.
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Full URL including the query string.
    pub fn url(&self) -> String {
        let mut url = format!("{}://{}{}", self.scheme, self.host, self.path);
        if !self.params.is_empty() {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(&self.params)
                .finish();
            url.push('?');
            url.push_str(&query);
        }
        url
    }

    /// Key identifying this request in the response cache.
    ///
    /// Covers host, method, path, parameters and the full body. Headers are
    /// ignored.
    pub fn fingerprint(&self) -> CacheKey {
        CacheKeyBuilder::new()
            .service(&self.host)
            .operation(format!("{} {}", self.method, self.path))
            .params(&self.params)
            .body(&self.body)
            .build()
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> Request {
        Request::new(Method::POST, "glacier.us-east-1.amazonaws.com")
    }

    // === Builder Tests ===

    #[test]
    fn test_request_defaults() {
        let req = request();
        assert_eq!(*req.method(), Method::POST);
        assert_eq!(req.request_path(), "/");
        assert!(req.bytes().is_empty());
        assert_eq!(req.url(), "https://glacier.us-east-1.amazonaws.com/");
    }

    #[test]
    fn test_request_path_gets_leading_slash() {
        assert_eq!(request().path("ListVaults").request_path(), "/ListVaults");
        assert_eq!(request().path("/a/b").request_path(), "/a/b");
    }

    #[test]
    fn test_request_url_with_params() {
        let req = request()
            .scheme("http")
            .param("b", "two words")
            .param("a", "1");
        assert_eq!(
            req.url(),
            "http://glacier.us-east-1.amazonaws.com/?a=1&b=two+words"
        );
        assert_eq!(
            req.to_string(),
            "POST http://glacier.us-east-1.amazonaws.com/?a=1&b=two+words"
        );
    }

    #[test]
    fn test_request_header_case_insensitive() {
        let req = request().header("X-Amz-Region", "us-east-1");
        assert_eq!(req.header_value("x-amz-region"), Some("us-east-1"));
        assert_eq!(req.header_value("missing"), None);
    }

    #[test]
    fn test_request_form_body() {
        let req = request().form([("Action", "ListJobs"), ("Marker", "a&b")]);
        assert_eq!(req.bytes(), b"Action=ListJobs&Marker=a%26b");
        assert!(req
            .header_value("content-type")
            .unwrap()
            .starts_with("application/x-www-form-urlencoded"));
    }

    #[test]
    fn test_request_json_body() {
        let mut params = BTreeMap::new();
        params.insert("limit", "10");
        let req = request().json(&params).unwrap();
        assert_eq!(req.bytes(), br#"{"limit":"10"}"#);
    }

    // === Fingerprint Tests ===

    #[test]
    fn test_fingerprint_ignores_headers() {
        let a = request().body("x").header("User-Agent", "a");
        let b = request().body("x").header("User-Agent", "b");
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_fingerprint_distinguishes_requests() {
        let base = request().path("/ListVaults");
        assert_ne!(base.fingerprint(), base.clone().body("{}").fingerprint());
        assert_ne!(base.fingerprint(), base.clone().path("/ListJobs").fingerprint());
        assert_ne!(base.fingerprint(), base.clone().param("a", "1").fingerprint());
        assert_ne!(
            base.fingerprint(),
            Request::new(Method::POST, "glacier.eu-west-1.amazonaws.com")
                .path("/ListVaults")
                .fingerprint()
        );
    }

    #[test]
    fn test_fingerprint_param_value_with_separator() {
        let embedded = request().param("a", "1|b=2");
        let split = request().param("a", "1").param("b", "2");
        assert_ne!(embedded.fingerprint(), split.fingerprint());
    }
}
