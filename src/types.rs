//! Core data types: transaction records and the closed field/operator sets

use crate::error::DecodeError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A single value held by a transaction field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Explicit JSON null, treated as a missing field
    Null,
    /// Boolean flag such as `approved`
    Bool(bool),
    /// Amounts and other numeric fields
    Number(f64),
    /// Names, memos and identifiers
    Text(String),
    /// Arrays and objects (`subtransactions`, nested metadata), carried through untouched
    Other(serde_json::Value),
}

impl FieldValue {
    /// Whether the value counts as missing for condition evaluation
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Text form used by string operators and by append/prepend.
    ///
    /// Nested values render as compact JSON.
    pub fn to_text(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Other(v) => v.to_string(),
        }
    }

    /// Numeric reading for `greater_than`/`less_than`
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok(),
            FieldValue::Null | FieldValue::Bool(_) | FieldValue::Other(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

/// One ledger entry as an open map from field name to value.
///
/// Records are snapshots: every mutation goes through [`TransactionRecord::with_field`],
/// which returns a new record and leaves the receiver untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionRecord(BTreeMap<String, FieldValue>);

impl TransactionRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Look up a field, `None` if the key is missing
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field)
    }

    /// Look up a field, treating an explicit null like a missing key
    pub fn present(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field).filter(|v| !v.is_null())
    }

    /// Field coerced to text, empty when missing or null
    pub fn text_or_empty(&self, field: &str) -> String {
        self.0.get(field).map(FieldValue::to_text).unwrap_or_default()
    }

    /// Copy of this record with `field` set to `value`
    pub fn with_field(&self, field: &str, value: FieldValue) -> Self {
        let mut fields = self.0.clone();
        fields.insert(field.to_string(), value);
        Self(fields)
    }

    /// Set a field in place; used when assembling records, never by rules
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(field.into(), value.into());
    }

    /// Drop a field in place, returning its old value
    pub fn remove(&mut self, field: &str) -> Option<FieldValue> {
        self.0.remove(field)
    }

    pub fn contains_key(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Number of fields, nulls included
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fields in lexicographic key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    /// The record's `id` as text, if any
    pub fn id(&self) -> Option<String> {
        self.present("id").map(FieldValue::to_text)
    }
}

impl<K, V> FromIterator<(K, V)> for TransactionRecord
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<BTreeMap<String, FieldValue>> for TransactionRecord {
    fn from(fields: BTreeMap<String, FieldValue>) -> Self {
        Self(fields)
    }
}

fn parse_variant<T: Copy>(
    kind: &'static str,
    input: &str,
    all: &[T],
    name: fn(&T) -> &'static str,
) -> Result<T, DecodeError> {
    let wanted = input.trim().to_lowercase();
    all.iter()
        .copied()
        .find(|v| name(v) == wanted)
        .ok_or_else(|| DecodeError::UnknownVariant {
            kind,
            value: input.to_string(),
            expected: all.iter().map(name).collect::<Vec<_>>().join(", "),
        })
}

/// Transaction fields a condition may inspect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionField {
    /// Merchant or counterparty name
    PayeeName,
    /// Account the transaction was posted to
    AccountName,
    /// Amount leaving the account, usually compared numerically
    Outflow,
    /// Amount entering the account
    Inflow,
    /// Free-text note
    Memo,
    /// Budget category, empty when uncategorized
    CategoryName,
}

impl ConditionField {
    pub const ALL: [ConditionField; 6] = [
        ConditionField::PayeeName,
        ConditionField::AccountName,
        ConditionField::Outflow,
        ConditionField::Inflow,
        ConditionField::Memo,
        ConditionField::CategoryName,
    ];

    /// Record key this field reads
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionField::PayeeName => "payee_name",
            ConditionField::AccountName => "account_name",
            ConditionField::Outflow => "outflow",
            ConditionField::Inflow => "inflow",
            ConditionField::Memo => "memo",
            ConditionField::CategoryName => "category_name",
        }
    }
}

/// Comparison performed by a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    /// Case-insensitive whole-value match
    Equals,
    /// Case-insensitive substring match
    Contains,
    /// Case-insensitive prefix match
    StartsWith,
    /// Case-insensitive suffix match
    EndsWith,
    /// Numeric comparison; false when either side is not a number
    GreaterThan,
    /// Numeric comparison; false when either side is not a number
    LessThan,
    /// Case-insensitive regex search; invalid patterns never match
    Regex,
}

impl ConditionOperator {
    pub const ALL: [ConditionOperator; 7] = [
        ConditionOperator::Equals,
        ConditionOperator::Contains,
        ConditionOperator::StartsWith,
        ConditionOperator::EndsWith,
        ConditionOperator::GreaterThan,
        ConditionOperator::LessThan,
        ConditionOperator::Regex,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionOperator::Equals => "equals",
            ConditionOperator::Contains => "contains",
            ConditionOperator::StartsWith => "starts_with",
            ConditionOperator::EndsWith => "ends_with",
            ConditionOperator::GreaterThan => "greater_than",
            ConditionOperator::LessThan => "less_than",
            ConditionOperator::Regex => "regex",
        }
    }
}

/// Transaction fields an action may rewrite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionField {
    /// Merchant or counterparty name
    PayeeName,
    /// Budget category
    CategoryName,
    /// Free-text note
    Memo,
}

impl ActionField {
    pub const ALL: [ActionField; 3] = [
        ActionField::PayeeName,
        ActionField::CategoryName,
        ActionField::Memo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionField::PayeeName => "payee_name",
            ActionField::CategoryName => "category_name",
            ActionField::Memo => "memo",
        }
    }
}

/// Mutation performed by an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOperation {
    /// Replace the field with the action value
    Set,
    /// Add the value after the current text
    Append,
    /// Add the value before the current text
    Prepend,
    /// Set the field to empty text
    Clear,
}

impl ActionOperation {
    pub const ALL: [ActionOperation; 4] = [
        ActionOperation::Set,
        ActionOperation::Append,
        ActionOperation::Prepend,
        ActionOperation::Clear,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionOperation::Set => "set",
            ActionOperation::Append => "append",
            ActionOperation::Prepend => "prepend",
            ActionOperation::Clear => "clear",
        }
    }
}

/// How a rule combines its conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicOperator {
    /// Every condition must match
    #[default]
    And,
    /// At least one condition must match
    Or,
}

impl LogicOperator {
    pub const ALL: [LogicOperator; 2] = [LogicOperator::And, LogicOperator::Or];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogicOperator::And => "and",
            LogicOperator::Or => "or",
        }
    }
}

macro_rules! text_enum {
    ($ty:ty, $kind:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = DecodeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_variant($kind, s, &<$ty>::ALL, <$ty>::as_str)
            }
        }
    };
}

text_enum!(ConditionField, "condition field");
text_enum!(ConditionOperator, "condition operator");
text_enum!(ActionField, "action field");
text_enum!(ActionOperation, "action operation");
text_enum!(LogicOperator, "logic operator");
