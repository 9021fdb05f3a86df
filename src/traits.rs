//! Seams between the rules core and its collaborators

use crate::error::{SourceError, StoreError};
use crate::report::FieldChange;
use crate::rule::Rule;
use crate::types::TransactionRecord;

/// Persistent collection of rules keyed by rule id.
///
/// Implementors provide the fallible `try_*` operations; the provided methods
/// are the store boundary used for rule edits and never surface storage
/// errors, degrading to an empty result or `false` after logging.
pub trait RuleStore {
    /// Every stored rule, in storage order
    fn try_get_all_rules(&self) -> Result<Vec<Rule>, StoreError>;

    /// Insert `rule`, replacing any stored rule with the same id
    fn try_save_rule(&mut self, rule: &Rule) -> Result<(), StoreError>;

    /// Remove the rule with `id`, reporting whether anything was removed
    fn try_delete_rule(&mut self, id: &str) -> Result<bool, StoreError>;

    fn get_all_rules(&self) -> Vec<Rule> {
        self.try_get_all_rules().unwrap_or_else(|e| {
            tracing::error!(error = %e, "error loading rules from storage");
            Vec::new()
        })
    }

    fn get_rule_by_id(&self, id: &str) -> Option<Rule> {
        self.get_all_rules().into_iter().find(|r| r.id == id)
    }

    fn save_rule(&mut self, rule: &Rule) -> bool {
        match self.try_save_rule(rule) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, rule_id = %rule.id, "failed to save rule");
                false
            }
        }
    }

    fn delete_rule(&mut self, id: &str) -> bool {
        self.try_delete_rule(id).unwrap_or_else(|e| {
            tracing::error!(error = %e, rule_id = %id, "failed to delete rule");
            false
        })
    }
}

/// Ledger-side supplier of transactions and sink for accepted changes
pub trait TransactionSource {
    /// Fetch every transaction the rules should run over
    fn fetch_transactions(&self) -> Result<Vec<TransactionRecord>, SourceError>;

    /// Write the given field changes to one transaction
    fn update_transaction(
        &mut self,
        transaction_id: &str,
        changes: &[FieldChange],
    ) -> Result<(), SourceError>;

    /// Make accepted updates durable; sources that write through need nothing here
    fn flush(&mut self) -> Result<(), SourceError> {
        Ok(())
    }
}

/// Source of identifiers for newly created rules
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}
