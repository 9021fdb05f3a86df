//! Host facade tying the rule store, engine and transaction source together

use crate::config::AppConfig;
use crate::engine::RulesEngine;
use crate::error::{ConfigError, EngineError, RulesError, SourceError};
use crate::logging::{EventSink, TracingSink};
use crate::report::ChangeReport;
use crate::source::apply_report;
use crate::store::JsonFileStore;
use crate::traits::{RuleStore, TransactionSource};

/// Result of one processing run
#[derive(Debug)]
pub struct ProcessOutcome {
    pub report: ChangeReport,
    /// Field changes written to the source; `None` for dry runs
    pub changes_applied: Option<usize>,
    pub failures: Vec<SourceError>,
}

/// A rules engine plus the transaction source it processes
pub struct RulesApp<S: RuleStore, L: EventSink = TracingSink> {
    engine: RulesEngine<S, L>,
    source: Option<Box<dyn TransactionSource>>,
}

impl RulesApp<JsonFileStore> {
    /// App backed by the rules file named in `config`, with no source attached
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        config.ensure_config_dir()?;

        let store = JsonFileStore::new(config.rules_path());
        tracing::info!(path = %store.path().display(), "using rule storage");
        Ok(Self::new(RulesEngine::new(store)))
    }
}

impl<S: RuleStore, L: EventSink> RulesApp<S, L> {
    /// Wrap `engine` with no source attached
    pub fn new(engine: RulesEngine<S, L>) -> Self {
        Self { engine, source: None }
    }

    pub fn with_source(mut self, source: Box<dyn TransactionSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn engine(&self) -> &RulesEngine<S, L> {
        &self.engine
    }

    /// Store handle for rule edits
    pub fn store_mut(&mut self) -> &mut S {
        self.engine.store_mut()
    }

    pub fn source(&self) -> Option<&dyn TransactionSource> {
        self.source.as_deref()
    }

    /// Detach the source, e.g. to inspect it after a run
    pub fn take_source(&mut self) -> Option<Box<dyn TransactionSource>> {
        self.source.take()
    }

    /// Fetch transactions, run the rules and, unless `dry_run`, write changes back.
    ///
    /// Fails if no source is attached or the fetch fails. Individual update
    /// failures do not abort the run and are returned in the outcome.
    pub fn process(&mut self, dry_run: bool, parallel: bool) -> Result<ProcessOutcome, RulesError> {
        let source = self.source.as_mut().ok_or_else(|| EngineError::SourceUnavailable {
            reason: "attach a transaction source before processing".to_string(),
        })?;

        let transactions = source.fetch_transactions()?;
        let report = if parallel {
            self.engine.process_transactions_parallel(&transactions, dry_run)
        } else {
            self.engine.process_transactions(&transactions, dry_run)
        };

        if dry_run {
            return Ok(ProcessOutcome {
                report,
                changes_applied: None,
                failures: Vec::new(),
            });
        }

        let mut applied = apply_report(&report, source.as_mut());
        if applied.changes_applied > 0 {
            if let Err(e) = source.flush() {
                tracing::error!(error = %e, "failed to persist transaction updates");
                applied.failures.push(e);
            }
        }

        Ok(ProcessOutcome {
            report,
            changes_applied: Some(applied.changes_applied),
            failures: applied.failures,
        })
    }
}
