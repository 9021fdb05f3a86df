//! Change reports produced by batch processing

use crate::types::{FieldValue, TransactionRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One field that differs between the original and final record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    /// `None` when the field was added
    pub old_value: Option<FieldValue>,
    /// `None` when the field was removed
    pub new_value: Option<FieldValue>,
}

/// Changes to a single transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modification {
    pub transaction_id: String,
    pub payee_name: String,
    /// Rule names in the order they were applied
    pub applied_rules: Vec<String>,
    pub changes: Vec<FieldChange>,
}

/// Summary of what a batch run changed, or would change in a dry run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeReport {
    pub total_transactions: usize,
    /// Transactions at least one rule applied to, changed or not
    pub modified_transactions: usize,
    /// Rule name to the number of transactions it applied to
    pub rules_applied: BTreeMap<String, usize>,
    /// Only transactions whose fields actually changed, in input order
    pub modifications: Vec<Modification>,
    pub dry_run: bool,
    /// Fingerprint of the rule snapshot the batch ran against
    pub rules_fingerprint: String,
}

impl ChangeReport {
    pub fn new(dry_run: bool, rules_fingerprint: String) -> Self {
        Self {
            total_transactions: 0,
            modified_transactions: 0,
            rules_applied: BTreeMap::new(),
            modifications: Vec::new(),
            dry_run,
            rules_fingerprint,
        }
    }

    /// Fold one processed transaction into the report.
    ///
    /// Must be called in batch input order for the report to be deterministic.
    pub fn record(
        &mut self,
        original: &TransactionRecord,
        modified: &TransactionRecord,
        applied_rules: &[String],
    ) {
        self.total_transactions += 1;
        if applied_rules.is_empty() {
            return;
        }

        self.modified_transactions += 1;
        for name in applied_rules {
            *self.rules_applied.entry(name.clone()).or_insert(0) += 1;
        }

        let changes = diff_records(original, modified);
        if changes.is_empty() {
            return;
        }

        self.modifications.push(Modification {
            transaction_id: text_or_unknown(original, "id"),
            payee_name: text_or_unknown(original, "payee_name"),
            applied_rules: applied_rules.to_vec(),
            changes,
        });
    }

    /// Total number of field changes across all modifications
    pub fn change_count(&self) -> usize {
        self.modifications.iter().map(|m| m.changes.len()).sum()
    }
}

fn text_or_unknown(record: &TransactionRecord, field: &str) -> String {
    record
        .present(field)
        .map(FieldValue::to_text)
        .unwrap_or_else(|| "unknown".to_string())
}

/// Structural per-field diff: changed and added keys first, then removed keys
pub fn diff_records(original: &TransactionRecord, modified: &TransactionRecord) -> Vec<FieldChange> {
    let mut changes = Vec::new();

    for (key, new) in modified.iter() {
        match original.get(key) {
            Some(old) if old == new => {}
            old => changes.push(FieldChange {
                field: key.clone(),
                old_value: old.cloned(),
                new_value: Some(new.clone()),
            }),
        }
    }

    for (key, old) in original.iter() {
        if !modified.contains_key(key) {
            changes.push(FieldChange {
                field: key.clone(),
                old_value: Some(old.clone()),
                new_value: None,
            });
        }
    }

    changes
}

impl fmt::Display for ChangeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Processed {} transactions", self.total_transactions)?;
        writeln!(f, "Modified: {}", self.modified_transactions)?;
        writeln!(f, "Field changes: {}", self.change_count())?;

        if !self.rules_applied.is_empty() {
            writeln!(f, "\nRules applied:")?;
            for (name, count) in &self.rules_applied {
                writeln!(f, "- {}: {} transaction(s)", name, count)?;
            }
        }
        Ok(())
    }
}
