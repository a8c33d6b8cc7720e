//! Structured logging of service calls.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use stratus_core::{Configuration, LogFormat, LogLevel};

/// Target of every event emitted by [`ClientLogger`].
pub const CLIENT_LOG_TARGET: &str = "stratus::client";

/// A structured record of one service call.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    /// When the call finished.
    pub timestamp: DateTime<Utc>,
    /// Log level.
    pub level: LogLevel,
    /// Service code, e.g. `glacier`.
    pub service: String,
    /// Operation name.
    pub operation: String,
    /// HTTP status of the response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Call duration in microseconds.
    pub elapsed_us: u64,
    /// Whether the response came from the response cache.
    pub cached: bool,
    /// Error text for failed calls.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Additional structured fields.
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl LogEntry {
    /// Format as JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.to_human())
    }

    /// Format as human-readable string.
    pub fn to_human(&self) -> String {
        let mut s = format!("[{}] {}.{}", self.level, self.service, self.operation);

        if let Some(status) = self.status {
            s.push_str(&format!(" {}", status));
        }
        if self.cached {
            s.push_str(" (cached)");
        }
        s.push_str(&format!(" ({}us)", self.elapsed_us));
        if let Some(error) = &self.error {
            s.push_str(&format!(" error={}", error));
        }

        if !self.fields.is_empty() {
            s.push_str(" | ");
            let fields: Vec<String> = self
                .fields
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            s.push_str(&fields.join(" "));
        }

        s
    }
}

/// Logger for the calls of one service client.
#[derive(Debug, Clone)]
pub struct ClientLogger {
    service: String,
    min_level: LogLevel,
    format: LogFormat,
}

impl ClientLogger {
    /// Create a logger for `service` at info level, JSON format.
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            min_level: LogLevel::Info,
            format: LogFormat::Json,
        }
    }

    /// Create a logger using the level and format of `config`.
    pub fn from_config(service: impl Into<String>, config: &Configuration) -> Self {
        Self::new(service)
            .with_min_level(config.log_level())
            .with_format(config.log_format())
    }

    /// Set minimum log level.
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Set output format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Service this logger reports for.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Start recording a call to `operation`. The clock starts now.
    pub fn call(&self, operation: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, operation)
    }

    /// Render `entry`, or `None` if it falls below the minimum level.
    pub fn render(&self, entry: &LogEntry) -> Option<String> {
        if entry.level < self.min_level {
            return None;
        }
        Some(match self.format {
            LogFormat::Json => entry.to_json(),
            LogFormat::Human => entry.to_human(),
        })
    }

    /// Emit `entry` as a `tracing` event.
    pub fn log(&self, entry: &LogEntry) {
        let Some(output) = self.render(entry) else {
            return;
        };

        match entry.level {
            LogLevel::Trace => tracing::trace!(target: CLIENT_LOG_TARGET, "{}", output),
            LogLevel::Debug => tracing::debug!(target: CLIENT_LOG_TARGET, "{}", output),
            LogLevel::Info => tracing::info!(target: CLIENT_LOG_TARGET, "{}", output),
            LogLevel::Warn => tracing::warn!(target: CLIENT_LOG_TARGET, "{}", output),
            LogLevel::Error => tracing::error!(target: CLIENT_LOG_TARGET, "{}", output),
        }
    }
}

/// Builder for a call record with fluent API.
pub struct LogBuilder<'a> {
    logger: &'a ClientLogger,
    operation: String,
    start: Instant,
    level: Option<LogLevel>,
    status: Option<u16>,
    cached: bool,
    error: Option<String>,
    fields: BTreeMap<String, serde_json::Value>,
}

impl<'a> LogBuilder<'a> {
    /// Create a new log builder.
    pub fn new(logger: &'a ClientLogger, operation: impl Into<String>) -> Self {
        Self {
            logger,
            operation: operation.into(),
            start: Instant::now(),
            level: None,
            status: None,
            cached: false,
            error: None,
            fields: BTreeMap::new(),
        }
    }

    /// Override the level. Defaults to error for failed calls, info otherwise.
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    /// Record the HTTP status.
    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Record whether the response was served from cache.
    pub fn cached(mut self, cached: bool) -> Self {
        self.cached = cached;
        self
    }

    /// Record a failure.
    pub fn error(mut self, error: impl ToString) -> Self {
        self.error = Some(error.to_string());
        self
    }

    /// Add a structured field.
    pub fn field(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Add a duration field (in milliseconds).
    pub fn duration_ms(mut self, key: &str, duration: Duration) -> Self {
        self.fields
            .insert(key.to_string(), serde_json::json!(duration.as_millis() as u64));
        self
    }

    /// Finish the record without emitting it.
    pub fn finish(self) -> LogEntry {
        let level = self.level.unwrap_or(if self.error.is_some() {
            LogLevel::Error
        } else {
            LogLevel::Info
        });

        LogEntry {
            timestamp: Utc::now(),
            level,
            service: self.logger.service.clone(),
            operation: self.operation,
            status: self.status,
            elapsed_us: self.start.elapsed().as_micros() as u64,
            cached: self.cached,
            error: self.error,
            fields: self.fields,
        }
    }

    /// Emit the record.
    pub fn emit(self) {
        let logger = self.logger;
        logger.log(&self.finish());
    }
}
