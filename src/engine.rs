//! Rules engine: priority-ordered rule application and change reporting

use crate::clock::{Clock, SystemClock};
use crate::hasher::RuleSetHasher;
use crate::logging::{EventSink, LogEntry, LogLevel, TracingSink};
use crate::report::ChangeReport;
use crate::rule::Rule;
use crate::traits::RuleStore;
use crate::types::TransactionRecord;
use chrono::{DateTime, Utc};
use rayon::prelude::*;

/// Result of running the rule sequence over one transaction
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionOutcome {
    pub transaction: TransactionRecord,
    /// Names of rules that changed the transaction, in application order
    pub applied_rules: Vec<String>,
}

impl TransactionOutcome {
    pub fn is_modified(&self) -> bool {
        !self.applied_rules.is_empty()
    }
}

fn log_with(sink: &mut dyn EventSink, level: LogLevel, entry: impl FnOnce() -> LogEntry) {
    if sink.enabled(level) {
        sink.emit(entry());
    }
}

/// Run `rules` (already in priority order) over one transaction.
///
/// Disabled rules are skipped. Each enabled rule sees the record as left by
/// the rules before it, and is reported only if it actually changed the record.
/// Events are stamped with `at`.
pub fn apply_rules(
    rules: &[Rule],
    transaction: &TransactionRecord,
    at: DateTime<Utc>,
    sink: &mut dyn EventSink,
) -> TransactionOutcome {
    let transaction_id = transaction.id().unwrap_or_else(|| "unknown".to_string());
    let mut current = transaction.clone();
    let mut applied_rules = Vec::new();

    for rule in rules {
        if !rule.enabled {
            log_with(sink, LogLevel::Debug, || {
                LogEntry::new(LogLevel::Debug, at, "Skipping disabled rule")
                    .with_transaction(transaction_id.clone())
                    .with_rule(rule.name.clone())
            });
            continue;
        }

        if !rule.evaluate(&current) {
            continue;
        }

        let next = rule.apply_actions(&current);
        if next != current {
            log_with(sink, LogLevel::Info, || {
                LogEntry::new(
                    LogLevel::Info,
                    at,
                    format!("Applied rule '{}' to transaction {}", rule.name, transaction_id),
                )
                .with_transaction(transaction_id.clone())
                .with_rule(rule.name.clone())
                .with_metadata("priority", rule.priority)
            });
            applied_rules.push(rule.name.clone());
            current = next;
        }
    }

    TransactionOutcome {
        transaction: current,
        applied_rules,
    }
}

/// Buffers entries on a worker thread, honouring the real sink's levels
struct BufferedSink {
    levels: [bool; 5],
    entries: Vec<LogEntry>,
}

impl EventSink for BufferedSink {
    fn emit(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    fn enabled(&self, level: LogLevel) -> bool {
        self.levels[level as usize]
    }
}

/// Engine that evaluates stored rules against transactions.
///
/// The engine keeps no state between calls other than its store handle and
/// event sink; every call works from a fresh rule snapshot.
#[derive(Debug)]
pub struct RulesEngine<S: RuleStore, L: EventSink = TracingSink> {
    store: S,
    sink: L,
    clock: Box<dyn Clock>,
    hasher: RuleSetHasher,
}

impl<S: RuleStore> RulesEngine<S> {
    /// Create an engine that logs through `tracing`
    pub fn new(store: S) -> Self {
        Self::with_sink(store, TracingSink)
    }
}

impl<S: RuleStore, L: EventSink> RulesEngine<S, L> {
    /// Create an engine that reports events to `sink`, stamped with wall-clock time
    pub fn with_sink(store: S, sink: L) -> Self {
        Self {
            store,
            sink,
            clock: Box::new(SystemClock),
            hasher: RuleSetHasher::new(),
        }
    }

    /// Replace the clock used to timestamp events
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// The backing rule store
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// The event sink, e.g. to read back a collecting [`RuleLog`](crate::logging::RuleLog)
    pub fn sink(&self) -> &L {
        &self.sink
    }


    /// All stored rules, highest priority first.
    ///
    /// The sort is stable so equal priorities keep store order. Disabled rules
    /// are included; they are skipped at processing time.
    pub fn load_rules(&self) -> Vec<Rule> {
        let mut rules = self.store.get_all_rules();
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        rules
    }

    /// Run every enabled rule over a single transaction
    pub fn process_transaction(&mut self, transaction: &TransactionRecord) -> TransactionOutcome {
        let rules = self.load_rules();
        let at = self.clock.now();
        apply_rules(&rules, transaction, at, &mut self.sink)
    }

    /// Run the rules over a batch and report what changed.
    ///
    /// `dry_run` is recorded in the report only; the engine never writes to the
    /// ledger.
    pub fn process_transactions(
        &mut self,
        transactions: &[TransactionRecord],
        dry_run: bool,
    ) -> ChangeReport {
        let rules = self.load_rules();
        let at = self.clock.now();
        let mut report = ChangeReport::new(dry_run, self.hasher.fingerprint(&rules).to_string());

        for transaction in transactions {
            let outcome = apply_rules(&rules, transaction, at, &mut self.sink);
            report.record(transaction, &outcome.transaction, &outcome.applied_rules);
        }

        self.log_summary(&report, at);
        report
    }

    /// Same as [`RulesEngine::process_transactions`], evaluating transactions
    /// on the rayon pool.
    ///
    /// Outcomes and their log entries are folded back in input order, so the
    /// report and the emitted events match the sequential run exactly.
    pub fn process_transactions_parallel(
        &mut self,
        transactions: &[TransactionRecord],
        dry_run: bool,
    ) -> ChangeReport {
        let rules = self.load_rules();
        let at = self.clock.now();
        let mut report = ChangeReport::new(dry_run, self.hasher.fingerprint(&rules).to_string());

        let mut levels = [false; 5];
        for level in [
            LogLevel::Trace,
            LogLevel::Debug,
            LogLevel::Info,
            LogLevel::Warn,
            LogLevel::Error,
        ] {
            levels[level as usize] = self.sink.enabled(level);
        }

        let outcomes: Vec<(TransactionOutcome, Vec<LogEntry>)> = transactions
            .par_iter()
            .map(|transaction| {
                let mut buffer = BufferedSink {
                    levels,
                    entries: Vec::new(),
                };
                let outcome = apply_rules(&rules, transaction, at, &mut buffer);
                (outcome, buffer.entries)
            })
            .collect();

        for (transaction, (outcome, entries)) in transactions.iter().zip(outcomes) {
            for entry in entries {
                self.sink.emit(entry);
            }
            report.record(transaction, &outcome.transaction, &outcome.applied_rules);
        }

        self.log_summary(&report, at);
        report
    }

    fn log_summary(&mut self, report: &ChangeReport, at: DateTime<Utc>) {
        log_with(&mut self.sink, LogLevel::Info, || {
            LogEntry::new(
                LogLevel::Info,
                at,
                format!(
                    "Processed {} transactions, {} modified",
                    report.total_transactions, report.modified_transactions
                ),
            )
            .with_metadata("dry_run", report.dry_run)
            .with_metadata("rules_fingerprint", &report.rules_fingerprint)
        });
    }
}
