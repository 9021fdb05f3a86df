//! Engine event logging
//!
//! The engine never writes output directly. It hands [`LogEntry`] values to an
//! injected [`EventSink`]: [`RuleLog`] keeps them for inspection,
//! [`TracingSink`] forwards them to `tracing`, and [`NullSink`] drops them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Log level for engine events
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    /// Trace level - most verbose
    Trace,
    /// Debug level - skipped rules and other detail
    Debug,
    /// Info level - applied rules and batch summaries
    Info,
    /// Warning level - potential issues
    Warn,
    /// Error level - failures
    Error,
}

/// A single engine event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Time supplied by the engine's clock
    pub timestamp: DateTime<Utc>,
    /// Transaction ID if applicable
    pub transaction_id: Option<String>,
    /// Rule name if applicable
    pub rule_name: Option<String>,
    /// Log message
    pub message: String,
    /// Additional structured data
    pub metadata: Vec<(String, String)>,
}

impl LogEntry {
    /// Create a new log entry
    pub fn new(level: LogLevel, timestamp: DateTime<Utc>, message: impl Into<String>) -> Self {
        Self {
            level,
            timestamp,
            transaction_id: None,
            rule_name: None,
            message: message.into(),
            metadata: Vec::new(),
        }
    }

    /// Add transaction context
    pub fn with_transaction(mut self, id: impl Into<String>) -> Self {
        self.transaction_id = Some(id.into());
        self
    }

    /// Add rule context
    pub fn with_rule(mut self, name: impl Into<String>) -> Self {
        self.rule_name = Some(name.into());
        self
    }

    /// Add a metadata key-value pair
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.metadata.push((key.into(), value.to_string()));
        self
    }
}

/// Receiver for engine events
pub trait EventSink {
    fn emit(&mut self, entry: LogEntry);

    /// Lets the engine skip building entries nobody will keep
    fn enabled(&self, _level: LogLevel) -> bool {
        true
    }
}

impl<T: EventSink + ?Sized> EventSink for &mut T {
    fn emit(&mut self, entry: LogEntry) {
        (**self).emit(entry)
    }

    fn enabled(&self, level: LogLevel) -> bool {
        (**self).enabled(level)
    }
}

/// Collects entries in memory at or above a minimum level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleLog {
    entries: Vec<LogEntry>,
    min_level: LogLevel,
}

impl RuleLog {
    /// Create a log that keeps entries at `min_level` and above
    pub fn new(min_level: LogLevel) -> Self {
        Self {
            entries: Vec::new(),
            min_level,
        }
    }

    /// Capture all levels
    pub fn all() -> Self {
        Self::new(LogLevel::Trace)
    }

    /// All collected entries in emission order
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries at exactly `level`
    pub fn filter_by_level(&self, level: LogLevel) -> Vec<&LogEntry> {
        self.entries.iter().filter(|e| e.level == level).collect()
    }

    /// Entries about one transaction
    pub fn filter_by_transaction(&self, transaction_id: &str) -> Vec<&LogEntry> {
        self.entries
            .iter()
            .filter(|e| e.transaction_id.as_deref() == Some(transaction_id))
            .collect()
    }

    /// Entries about one rule
    pub fn filter_by_rule(&self, rule_name: &str) -> Vec<&LogEntry> {
        self.entries
            .iter()
            .filter(|e| e.rule_name.as_deref() == Some(rule_name))
            .collect()
    }
}

impl Default for RuleLog {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}

impl EventSink for RuleLog {
    fn emit(&mut self, entry: LogEntry) {
        if self.enabled(entry.level) {
            self.entries.push(entry);
        }
    }

    fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }
}

/// Forwards entries to the `tracing` subscriber
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, entry: LogEntry) {
        let transaction_id = entry.transaction_id.as_deref().unwrap_or("-");
        let rule = entry.rule_name.as_deref().unwrap_or("-");
        let metadata = entry
            .metadata
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ");

        match entry.level {
            LogLevel::Trace => tracing::trace!(transaction_id, rule, %metadata, "{}", entry.message),
            LogLevel::Debug => tracing::debug!(transaction_id, rule, %metadata, "{}", entry.message),
            LogLevel::Info => tracing::info!(transaction_id, rule, %metadata, "{}", entry.message),
            LogLevel::Warn => tracing::warn!(transaction_id, rule, %metadata, "{}", entry.message),
            LogLevel::Error => tracing::error!(transaction_id, rule, %metadata, "{}", entry.message),
        }
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _entry: LogEntry) {}

    fn enabled(&self, _level: LogLevel) -> bool {
        false
    }
}
