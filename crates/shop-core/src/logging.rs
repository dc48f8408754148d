//! Structured request logging.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::LoggingConfig;
use crate::context::{RequestContext, RequestId};

/// Log level for structured logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trace => write!(f, "TRACE"),
            Self::Debug => write!(f, "DEBUG"),
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// Output format for logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line (for log aggregation).
    #[default]
    Json,
    /// Human-readable (for development).
    Human,
}

/// A structured log entry.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    /// RFC 3339 timestamp.
    pub ts: String,
    pub level: LogLevel,
    pub message: String,
    pub request_id: String,
    /// Handler mount that served the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    /// Microseconds since the request started.
    pub elapsed_us: u64,
    /// Additional structured fields, in insertion order.
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl LogEntry {
    /// Format as JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.message.clone())
    }

    /// Format as human-readable string.
    pub fn to_human(&self) -> String {
        let mut s = format!("[{}] {} {} ({}us)", self.level, self.request_id, self.message, self.elapsed_us);

        if !self.fields.is_empty() {
            let fields: Vec<String> = self
                .fields
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            s.push_str(" | ");
            s.push_str(&fields.join(" "));
        }

        s
    }
}

/// Per-request logger writing to stderr, which Spin captures.
#[derive(Debug, Clone)]
pub struct RequestLog {
    request_id: RequestId,
    handler: Option<String>,
    start_time: Instant,
    min_level: LogLevel,
    format: LogFormat,
}

impl RequestLog {
    /// Create a logger for a request.
    pub fn new(request_id: RequestId) -> Self {
        Self {
            request_id,
            handler: None,
            start_time: Instant::now(),
            min_level: LogLevel::Info,
            format: LogFormat::Json,
        }
    }

    /// Create a logger for a mounted request, using the logging config.
    pub fn for_request(ctx: &RequestContext, config: &LoggingConfig) -> Self {
        let handler = format!("{}{}", ctx.context_path, ctx.servlet_path);
        Self::new(ctx.request_id.clone())
            .with_handler(handler)
            .with_min_level(config.level)
            .with_format(config.format)
    }

    /// Set the handler name.
    pub fn with_handler(mut self, handler: impl Into<String>) -> Self {
        self.handler = Some(handler.into());
        self
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

    /// Start building an entry with fields.
    pub fn event(&self, level: LogLevel, message: impl Into<String>) -> LogEvent<'_> {
        LogEvent {
            log: self,
            level,
            message: message.into(),
            fields: serde_json::Map::new(),
        }
    }

    /// Render an entry, or `None` when it is below the minimum level.
    fn render(&self, level: LogLevel, message: String, fields: serde_json::Map<String, serde_json::Value>) -> Option<String> {
        if level < self.min_level {
            return None;
        }

        let entry = LogEntry {
            ts: chrono::Utc::now().to_rfc3339(),
            level,
            message,
            request_id: self.request_id.to_string(),
            handler: self.handler.clone(),
            elapsed_us: self.elapsed_us(),
            fields,
        };

        Some(match self.format {
            LogFormat::Json => entry.to_json(),
            LogFormat::Human => entry.to_human(),
        })
    }

    fn elapsed_us(&self) -> u64 {
        self.start_time.elapsed().as_micros() as u64
    }
}

/// Log entry under construction.
pub struct LogEvent<'a> {
    log: &'a RequestLog,
    level: LogLevel,
    message: String,
    fields: serde_json::Map<String, serde_json::Value>,
}

impl LogEvent<'_> {
    /// Add a field.
    pub fn field(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Render without writing.
    pub fn render(self) -> Option<String> {
        self.log.render(self.level, self.message, self.fields)
    }

    /// Write the entry to stderr.
    pub fn emit(self) {
        if let Some(line) = self.render() {
            eprintln!("{}", line);
        }
    }
}
