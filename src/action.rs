//! Field mutations applied to matching transactions

use crate::error::DecodeError;
use crate::types::{ActionField, ActionOperation, FieldValue, TransactionRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One rewrite of a transaction field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Field to rewrite
    pub field: ActionField,
    pub operation: ActionOperation,
    /// Ignored by `clear`
    #[serde(default)]
    pub value: String,
}

impl Action {
    /// `clear` actions drop `value`
    pub fn new(field: ActionField, operation: ActionOperation, value: impl Into<String>) -> Self {
        let value = match operation {
            ActionOperation::Clear => String::new(),
            _ => value.into(),
        };
        Self { field, operation, value }
    }

    pub fn set(field: ActionField, value: impl Into<String>) -> Self {
        Self::new(field, ActionOperation::Set, value)
    }

    pub fn clear(field: ActionField) -> Self {
        Self::new(field, ActionOperation::Clear, "")
    }

    /// Build an action from raw user input such as `("memo", "append", "#work")`
    pub fn parse(field: &str, operation: &str, value: &str) -> Result<Self, DecodeError> {
        Ok(Self::new(field.parse()?, operation.parse()?, value))
    }

    /// Return a copy of `transaction` with this action applied
    pub fn apply(&self, transaction: &TransactionRecord) -> TransactionRecord {
        let key = self.field.as_str();
        let current = transaction.text_or_empty(key);

        let next = match self.operation {
            ActionOperation::Set => self.value.clone(),
            ActionOperation::Append if !current.is_empty() => format!("{} {}", current, self.value),
            ActionOperation::Prepend if !current.is_empty() => format!("{} {}", self.value, current),
            ActionOperation::Append | ActionOperation::Prepend => self.value.clone(),
            ActionOperation::Clear => String::new(),
        };

        transaction.with_field(key, FieldValue::Text(next))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operation {
            ActionOperation::Clear => write!(f, "{} {}", self.field, self.operation),
            _ => write!(f, "{} {} '{}'", self.field, self.operation, self.value),
        }
    }
}
