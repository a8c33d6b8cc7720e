//! Named configuration options.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::error::ConfigError;
use crate::log::{LogFormat, LogLevel};
use crate::service::Service;

/// A set of option overrides applied with [`Configuration::with`].
///
/// Every field is optional; `None` leaves the current value untouched.
///
/// [`Configuration::with`]: crate::Configuration::with
#[derive(Clone, Default, PartialEq)]
pub struct ConfigOptions {
    /// Access key id.
    pub access_key_id: Option<String>,
    /// Secret access key.
    pub secret_access_key: Option<String>,
    /// Session token for temporary credentials.
    pub session_token: Option<String>,
    /// Fallback region for endpoints that carry none.
    pub region: Option<String>,
    /// Answer every request locally instead of using the network.
    pub stub_requests: Option<bool>,
    /// Use `https` for service endpoints.
    pub use_ssl: Option<bool>,
    /// Prefix prepended to the `User-Agent` header.
    pub user_agent_prefix: Option<String>,
    /// Minimum level for client call logs.
    pub log_level: Option<LogLevel>,
    /// Output format for client call logs.
    pub log_format: Option<LogFormat>,
    /// Per-service endpoint overrides (`<service>_endpoint`).
    pub endpoints: BTreeMap<Service, String>,
    /// Per-service region overrides (`<service>_region`).
    pub regions: BTreeMap<Service, String>,
}

impl fmt::Debug for ConfigOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigOptions")
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .field("region", &self.region)
            .field("stub_requests", &self.stub_requests)
            .field("use_ssl", &self.use_ssl)
            .field("user_agent_prefix", &self.user_agent_prefix)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .field("endpoints", &self.endpoints)
            .field("regions", &self.regions)
            .finish()
    }
}

impl ConfigOptions {
    /// Create an empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the access key id.
    pub fn access_key_id(mut self, value: impl Into<String>) -> Self {
        self.access_key_id = Some(value.into());
        self
    }

    /// Set the secret access key.
    pub fn secret_access_key(mut self, value: impl Into<String>) -> Self {
        self.secret_access_key = Some(value.into());
        self
    }

    /// Set both halves of a static credential pair.
    pub fn credentials(self, access_key_id: impl Into<String>, secret: impl Into<String>) -> Self {
        self.access_key_id(access_key_id).secret_access_key(secret)
    }

    /// Set the session token.
    pub fn session_token(mut self, value: impl Into<String>) -> Self {
        self.session_token = Some(value.into());
        self
    }

    /// Set the fallback region.
    pub fn region(mut self, value: impl Into<String>) -> Self {
        self.region = Some(value.into());
        self
    }

    /// Enable or disable request stubbing.
    pub fn stub_requests(mut self, value: bool) -> Self {
        self.stub_requests = Some(value);
        self
    }

    /// Enable or disable `https`.
    pub fn use_ssl(mut self, value: bool) -> Self {
        self.use_ssl = Some(value);
        self
    }

    /// Set the `User-Agent` prefix.
    pub fn user_agent_prefix(mut self, value: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(value.into());
        self
    }

    /// Set the client log level.
    pub fn log_level(mut self, value: LogLevel) -> Self {
        self.log_level = Some(value);
        self
    }

    /// Set the client log format.
    pub fn log_format(mut self, value: LogFormat) -> Self {
        self.log_format = Some(value);
        self
    }

    /// Override the endpoint of one service.
    pub fn endpoint(mut self, service: Service, value: impl Into<String>) -> Self {
        self.endpoints.insert(service, value.into());
        self
    }

    /// Override the region of one service.
    pub fn region_for(mut self, service: Service, value: impl Into<String>) -> Self {
        self.regions.insert(service, value.into());
        self
    }

    /// Check whether no option is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Set an option by name.
    ///
    /// Recognized names are the field names of this struct plus
    /// `<service>_endpoint` and `<service>_region` for every [`Service`].
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Result<(), ConfigError> {
        let value = value.into();
        match name {
            "access_key_id" => self.access_key_id = Some(value),
            "secret_access_key" => self.secret_access_key = Some(value),
            "session_token" => self.session_token = Some(value),
            "region" => self.region = Some(value),
            "stub_requests" => self.stub_requests = Some(parse_bool(name, &value)?),
            "use_ssl" => self.use_ssl = Some(parse_bool(name, &value)?),
            "user_agent_prefix" => self.user_agent_prefix = Some(value),
            "log_level" => {
                let level = value
                    .parse()
                    .map_err(|_| ConfigError::invalid(name, value.as_str()))?;
                self.log_level = Some(level);
            }
            "log_format" => {
                let format = value
                    .parse()
                    .map_err(|_| ConfigError::invalid(name, value.as_str()))?;
                self.log_format = Some(format);
            }
            _ => return self.set_service_option(name, value),
        }
        Ok(())
    }

    fn set_service_option(&mut self, name: &str, value: String) -> Result<(), ConfigError> {
        if let Some(code) = name.strip_suffix("_endpoint") {
            let service = service_for_option(name, code)?;
            self.endpoints.insert(service, value);
            return Ok(());
        }
        if let Some(code) = name.strip_suffix("_region") {
            let service = service_for_option(name, code)?;
            self.regions.insert(service, value);
            return Ok(());
        }
        Err(ConfigError::UnknownOption(name.to_string()))
    }

    /// Build options from `(name, value)` pairs.
    ///
    /// ```
    /// use stratus_core::{ConfigOptions, Service};
    ///
    /// let options = ConfigOptions::from_pairs([
    ///     ("access_key_id", "FOO"),
    ///     ("ec2_endpoint", "ec2.eu-west-1.amazonaws.com"),
    /// ])
    /// .unwrap();
    /// assert_eq!(options.access_key_id.as_deref(), Some("FOO"));
    /// assert!(options.endpoints.contains_key(&Service::Ec2));
    /// ```
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut options = Self::new();
        for (name, value) in pairs {
            options.set(name.as_ref(), value)?;
        }
        Ok(options)
    }

    /// Read credentials and region from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read credentials and region through `lookup`.
    ///
    /// Both the `AWS_` and the older `AMAZON_` variable names are accepted
    /// for the key pair; the `AWS_` name wins when both are present.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |names: &[&str]| {
            names
                .iter()
                .filter_map(|name| lookup(name))
                .find(|value| !value.is_empty())
        };

        Self {
            access_key_id: first(&["AWS_ACCESS_KEY_ID", "AMAZON_ACCESS_KEY_ID"]),
            secret_access_key: first(&["AWS_SECRET_ACCESS_KEY", "AMAZON_SECRET_ACCESS_KEY"]),
            session_token: first(&["AWS_SESSION_TOKEN", "AMAZON_SESSION_TOKEN"]),
            region: first(&["AWS_REGION"]),
            ..Self::default()
        }
    }

    /// Load named options from a file.
    ///
    /// Files ending in `.json` are read as a JSON object, anything else as a
    /// flat TOML table.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let parse_error = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };

        let pairs: Vec<(String, String)> = if path.extension().is_some_and(|ext| ext == "json") {
            let table: serde_json::Map<String, serde_json::Value> =
                serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))?;
            table
                .into_iter()
                .map(|(name, value)| {
                    let value = json_scalar(&name, value)?;
                    Ok((name, value))
                })
                .collect::<Result<_, ConfigError>>()?
        } else {
            let table: toml::Table =
                toml::from_str(&content).map_err(|e| parse_error(e.to_string()))?;
            table
                .into_iter()
                .map(|(name, value)| {
                    let value = toml_scalar(&name, value)?;
                    Ok((name, value))
                })
                .collect::<Result<_, ConfigError>>()?
        };

        Self::from_pairs(pairs)
    }

    /// Layer `other` on top of `self`; options set in `other` win.
    pub fn merge(mut self, other: ConfigOptions) -> Self {
        macro_rules! take {
            ($($field:ident),+) => {
                $(
                    if other.$field.is_some() {
                        self.$field = other.$field;
                    }
                )+
            };
        }

        take!(
            access_key_id,
            secret_access_key,
            session_token,
            region,
            stub_requests,
            use_ssl,
            user_agent_prefix,
            log_level,
            log_format
        );
        self.endpoints.extend(other.endpoints);
        self.regions.extend(other.regions);
        self
    }
}

fn service_for_option(option: &str, code: &str) -> Result<Service, ConfigError> {
    code.parse()
        .map_err(|_| ConfigError::UnknownOption(option.to_string()))
}

fn parse_bool(option: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(option, value)),
    }
}

fn json_scalar(option: &str, value: serde_json::Value) -> Result<String, ConfigError> {
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(ConfigError::invalid(option, other.to_string())),
    }
}

fn toml_scalar(option: &str, value: toml::Value) -> Result<String, ConfigError> {
    match value {
        toml::Value::String(s) => Ok(s),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        toml::Value::Integer(i) => Ok(i.to_string()),
        other => Err(ConfigError::invalid(option, other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    // === Named Options ===

    #[test]
    fn test_set_known_options() {
        let options = ConfigOptions::from_pairs([
            ("access_key_id", "AKID"),
            ("secret_access_key", "SECRET"),
            ("stub_requests", "true"),
            ("use_ssl", "no"),
            ("log_level", "debug"),
            ("log_format", "human"),
            ("region", "eu-west-1"),
        ])
        .unwrap();

        assert_eq!(options.access_key_id.as_deref(), Some("AKID"));
        assert_eq!(options.secret_access_key.as_deref(), Some("SECRET"));
        assert_eq!(options.stub_requests, Some(true));
        assert_eq!(options.use_ssl, Some(false));
        assert_eq!(options.log_level, Some(LogLevel::Debug));
        assert_eq!(options.log_format, Some(LogFormat::Human));
        assert_eq!(options.region.as_deref(), Some("eu-west-1"));
    }

    #[test]
    fn test_set_service_options() {
        let options = ConfigOptions::from_pairs([
            ("s3_endpoint", "s3-us-west-2.amazonaws.com"),
            ("import_export_region", "us-west-1"),
        ])
        .unwrap();

        assert_eq!(
            options.endpoints.get(&Service::S3).map(String::as_str),
            Some("s3-us-west-2.amazonaws.com")
        );
        assert_eq!(
            options.regions.get(&Service::ImportExport).map(String::as_str),
            Some("us-west-1")
        );
    }

    #[test]
    fn test_unknown_option_rejected() {
        let err = ConfigOptions::from_pairs([("access_key", "FOO")]).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownOption(name) if name == "access_key"));

        let err = ConfigOptions::from_pairs([("ec3_endpoint", "x")]).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownOption(name) if name == "ec3_endpoint"));
    }

    #[test]
    fn test_invalid_value_rejected() {
        let err = ConfigOptions::from_pairs([("stub_requests", "maybe")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { option, .. } if option == "stub_requests"));

        let err = ConfigOptions::from_pairs([("log_level", "loud")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let options = ConfigOptions::new()
            .credentials("AKID", "TOP-SECRET")
            .session_token("TOKEN");
        let debug = format!("{:?}", options);

        assert!(debug.contains("AKID"));
        assert!(!debug.contains("TOP-SECRET"));
        assert!(!debug.contains("\"TOKEN\""));
    }

    // === Environment ===

    #[test]
    fn test_from_lookup_prefers_aws_names() {
        let env: HashMap<&str, &str> = [
            ("AWS_ACCESS_KEY_ID", "AWS-KEY"),
            ("AMAZON_ACCESS_KEY_ID", "AMAZON-KEY"),
            ("AMAZON_SECRET_ACCESS_KEY", "AMAZON-SECRET"),
            ("AWS_REGION", "ap-northeast-1"),
        ]
        .into_iter()
        .collect();

        let options = ConfigOptions::from_lookup(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(options.access_key_id.as_deref(), Some("AWS-KEY"));
        assert_eq!(options.secret_access_key.as_deref(), Some("AMAZON-SECRET"));
        assert_eq!(options.session_token, None);
        assert_eq!(options.region.as_deref(), Some("ap-northeast-1"));
    }

    #[test]
    fn test_from_lookup_ignores_empty_values() {
        let options = ConfigOptions::from_lookup(|name| {
            (name == "AWS_ACCESS_KEY_ID").then(String::new)
        });
        assert!(options.is_empty());
    }

    // === Files ===

    #[test]
    fn test_load_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "access_key_id = \"FROM-FILE\"\nstub_requests = true\nec2_endpoint = \"ec2.us-west-1.amazonaws.com\""
        )
        .unwrap();

        let options = ConfigOptions::load(file.path()).unwrap();
        assert_eq!(options.access_key_id.as_deref(), Some("FROM-FILE"));
        assert_eq!(options.stub_requests, Some(true));
        assert!(options.endpoints.contains_key(&Service::Ec2));
    }

    #[test]
    fn test_load_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"region": "eu-west-1", "use_ssl": false}}"#).unwrap();

        let options = ConfigOptions::load(file.path()).unwrap();
        assert_eq!(options.region.as_deref(), Some("eu-west-1"));
        assert_eq!(options.use_ssl, Some(false));
    }

    #[test]
    fn test_load_rejects_nested_values() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"region": ["a", "b"]}}"#).unwrap();

        let err = ConfigOptions::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { option, .. } if option == "region"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ConfigOptions::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    // === Layering ===

    #[test]
    fn test_merge_prefers_other() {
        let base = ConfigOptions::new()
            .access_key_id("BASE")
            .region("us-west-1")
            .endpoint(Service::S3, "s3.amazonaws.com");
        let top = ConfigOptions::new()
            .access_key_id("TOP")
            .endpoint(Service::Ec2, "ec2.eu-west-1.amazonaws.com");

        let merged = base.merge(top);
        assert_eq!(merged.access_key_id.as_deref(), Some("TOP"));
        assert_eq!(merged.region.as_deref(), Some("us-west-1"));
        assert_eq!(merged.endpoints.len(), 2);
    }
}
