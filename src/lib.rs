//! YNAB Rules Engine
//!
//! A library for categorizing and annotating budget transactions through
//! user-defined condition → action rules.

pub mod action;
pub mod app;
pub mod clock;
pub mod condition;
pub mod config;
pub mod engine;
pub mod error;
pub mod hasher;
pub mod ids;
pub mod logging;
pub mod report;
pub mod rule;
pub mod source;
pub mod store;
pub mod traits;
pub mod types;

// Re-export core types and traits
pub use action::Action;
pub use app::{ProcessOutcome, RulesApp};
pub use clock::{Clock, FixedClock, SystemClock};
pub use condition::Condition;
pub use config::{load_dotenv, AppConfig, LedgerCredentials};
pub use engine::{apply_rules, RulesEngine, TransactionOutcome};
pub use error::{ConfigError, DecodeError, EngineError, RulesError, SourceError, StoreError};
pub use hasher::{RuleFingerprint, RuleSetHasher};
pub use ids::{RandomIds, SeededIds};
pub use logging::{EventSink, LogEntry, LogLevel, NullSink, RuleLog, TracingSink};
pub use report::{diff_records, ChangeReport, FieldChange, Modification};
pub use rule::{Rule, RuleDraft, RuleWarning};
pub use source::{apply_report, ApplyOutcome, JsonFileSource, MemorySource};
pub use store::{JsonFileStore, MemoryStore};
pub use traits::{IdGenerator, RuleStore, TransactionSource};
pub use types::{
    ActionField, ActionOperation, ConditionField, ConditionOperator, FieldValue, LogicOperator,
    TransactionRecord,
};
