//! Transaction source adapters and the glue that writes report changes back

use crate::error::SourceError;
use crate::report::{ChangeReport, FieldChange};
use crate::traits::TransactionSource;
use crate::types::TransactionRecord;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

fn apply_changes(record: &mut TransactionRecord, changes: &[FieldChange]) {
    for change in changes {
        match &change.new_value {
            Some(value) => record.insert(change.field.clone(), value.clone()),
            None => {
                record.remove(&change.field);
            }
        }
    }
}

/// Transactions held in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    transactions: Vec<TransactionRecord>,
}

impl MemorySource {
    pub fn new(transactions: Vec<TransactionRecord>) -> Self {
        Self { transactions }
    }

    pub fn transactions(&self) -> &[TransactionRecord] {
        &self.transactions
    }

    fn find_mut(&mut self, transaction_id: &str) -> Result<&mut TransactionRecord, SourceError> {
        self.transactions
            .iter_mut()
            .find(|t| t.id().as_deref() == Some(transaction_id))
            .ok_or_else(|| SourceError::NotFound {
                transaction_id: transaction_id.to_string(),
            })
    }
}

impl TransactionSource for MemorySource {
    fn fetch_transactions(&self) -> Result<Vec<TransactionRecord>, SourceError> {
        Ok(self.transactions.clone())
    }

    fn update_transaction(
        &mut self,
        transaction_id: &str,
        changes: &[FieldChange],
    ) -> Result<(), SourceError> {
        let record = self.find_mut(transaction_id)?;
        apply_changes(record, changes);
        Ok(())
    }
}

/// Transactions read from a JSON array file.
///
/// Updates are applied in memory and written out on flush, to the output path
/// if one is set and back to the input file otherwise.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
    output: Option<PathBuf>,
    inner: MemorySource,
}

impl JsonFileSource {
    /// Read and decode the whole file up front
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SourceError> {
        let path = path.into();
        let content = fs::read_to_string(&path).map_err(|e| SourceError::FetchFailed {
            reason: format!("{}: {}", path.display(), e),
        })?;
        let transactions: Vec<TransactionRecord> =
            serde_json::from_str(&content).map_err(|e| SourceError::FetchFailed {
                reason: format!("{}: {}", path.display(), e),
            })?;

        tracing::debug!(path = %path.display(), count = transactions.len(), "transactions loaded");
        Ok(Self {
            path,
            output: None,
            inner: MemorySource::new(transactions),
        })
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn transactions(&self) -> &[TransactionRecord] {
        self.inner.transactions()
    }

    /// Write the current records to the output path, or back to the input file
    pub fn persist(&self) -> Result<(), SourceError> {
        let target = self.output.as_deref().unwrap_or(&self.path);
        let json = to_pretty_json(self.inner.transactions()).map_err(|reason| {
            SourceError::UpdateFailed {
                transaction_id: "*".to_string(),
                reason,
            }
        })?;
        fs::write(target, json).map_err(|e| SourceError::UpdateFailed {
            transaction_id: "*".to_string(),
            reason: format!("{}: {}", target.display(), e),
        })
    }
}

fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| e.to_string())
}

impl TransactionSource for JsonFileSource {
    fn fetch_transactions(&self) -> Result<Vec<TransactionRecord>, SourceError> {
        self.inner.fetch_transactions()
    }

    fn update_transaction(
        &mut self,
        transaction_id: &str,
        changes: &[FieldChange],
    ) -> Result<(), SourceError> {
        self.inner.update_transaction(transaction_id, changes)
    }

    fn flush(&mut self) -> Result<(), SourceError> {
        self.persist()
    }
}

/// What happened when report changes were written to a source
#[derive(Debug, Default)]
pub struct ApplyOutcome {
    /// Field changes written successfully
    pub changes_applied: usize,
    /// Transactions whose update failed; earlier writes are not rolled back
    pub failures: Vec<SourceError>,
}

/// Write every modification in `report` to `source`, unless it is a dry run
pub fn apply_report(report: &ChangeReport, source: &mut dyn TransactionSource) -> ApplyOutcome {
    let mut outcome = ApplyOutcome::default();
    if report.dry_run {
        return outcome;
    }

    for modification in &report.modifications {
        match source.update_transaction(&modification.transaction_id, &modification.changes) {
            Ok(()) => {
                for change in &modification.changes {
                    tracing::info!(
                        transaction_id = %modification.transaction_id,
                        field = %change.field,
                        "updated transaction"
                    );
                }
                outcome.changes_applied += modification.changes.len();
            }
            Err(e) => {
                tracing::error!(error = %e, transaction_id = %modification.transaction_id, "update failed");
                outcome.failures.push(e);
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Modification;
    use crate::types::FieldValue;

    fn report(dry_run: bool, id: &str) -> ChangeReport {
        let mut report = ChangeReport::new(dry_run, String::new());
        report.modifications.push(Modification {
            transaction_id: id.to_string(),
            payee_name: "Uber".to_string(),
            applied_rules: vec!["rides".to_string()],
            changes: vec![FieldChange {
                field: "category_name".to_string(),
                old_value: None,
                new_value: Some(FieldValue::Text("Transport".into())),
            }],
        });
        report
    }

    fn source() -> MemorySource {
        MemorySource::new(vec![[("id", "t1"), ("payee_name", "Uber")].into_iter().collect()])
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let mut source = source();
        let outcome = apply_report(&report(true, "t1"), &mut source);

        assert_eq!(outcome.changes_applied, 0);
        assert!(!source.transactions()[0].contains_key("category_name"));
    }

    #[test]
    fn test_apply_writes_changes() {
        let mut source = source();
        let outcome = apply_report(&report(false, "t1"), &mut source);

        assert_eq!(outcome.changes_applied, 1);
        assert_eq!(source.transactions()[0].text_or_empty("category_name"), "Transport");
    }

    #[test]
    fn test_unknown_transaction_is_reported() {
        let mut source = source();
        let outcome = apply_report(&report(false, "missing"), &mut source);

        assert_eq!(outcome.changes_applied, 0);
        assert!(matches!(outcome.failures[0], SourceError::NotFound { .. }));
    }
}
