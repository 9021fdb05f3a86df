//! Single-field predicates evaluated against a transaction record

use crate::error::DecodeError;
use crate::types::{ConditionField, ConditionOperator, FieldValue, TransactionRecord};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// A predicate over one transaction field.
///
/// Evaluation never fails: a missing or null field, a non-numeric operand for
/// `greater_than`/`less_than`, or an invalid `regex` pattern all yield `false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    field: ConditionField,
    operator: ConditionOperator,
    value: String,
    /// Compiled form of `value` for the `regex` operator, filled on first use
    #[serde(skip)]
    pattern: OnceLock<Option<Regex>>,
}

impl Condition {
    /// The regex, if any, is compiled lazily on first evaluation
    pub fn new(field: ConditionField, operator: ConditionOperator, value: impl Into<String>) -> Self {
        Self {
            field,
            operator,
            value: value.into(),
            pattern: OnceLock::new(),
        }
    }

    /// Build a condition from raw user input such as `("payee_name", "contains", "uber")`
    pub fn parse(field: &str, operator: &str, value: &str) -> Result<Self, DecodeError> {
        Ok(Self::new(field.parse()?, operator.parse()?, value))
    }

    /// Field the condition reads
    pub fn field(&self) -> ConditionField {
        self.field
    }

    pub fn operator(&self) -> ConditionOperator {
        self.operator
    }

    /// Operand exactly as written, before case folding or regex compilation
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Check whether the transaction satisfies this condition
    pub fn evaluate(&self, transaction: &TransactionRecord) -> bool {
        let Some(actual) = transaction.present(self.field.as_str()) else {
            return false;
        };

        match self.operator {
            ConditionOperator::Equals => lower(actual) == self.value.to_lowercase(),
            ConditionOperator::Contains => lower(actual).contains(&self.value.to_lowercase()),
            ConditionOperator::StartsWith => lower(actual).starts_with(&self.value.to_lowercase()),
            ConditionOperator::EndsWith => lower(actual).ends_with(&self.value.to_lowercase()),
            ConditionOperator::GreaterThan => self.compare(actual, |a, b| a > b),
            ConditionOperator::LessThan => self.compare(actual, |a, b| a < b),
            ConditionOperator::Regex => match self.compiled() {
                Some(re) => re.is_match(&actual.to_text()),
                None => false,
            },
        }
    }

    fn compare(&self, actual: &FieldValue, cmp: fn(f64, f64) -> bool) -> bool {
        let threshold = match self.value.trim().parse::<f64>() {
            Ok(t) => t,
            Err(_) => return false,
        };
        actual.as_number().map(|a| cmp(a, threshold)).unwrap_or(false)
    }

    fn compiled(&self) -> Option<&Regex> {
        self.pattern
            .get_or_init(|| RegexBuilder::new(&self.value).case_insensitive(true).build().ok())
            .as_ref()
    }
}

fn lower(value: &FieldValue) -> String {
    value.to_text().to_lowercase()
}

impl PartialEq for Condition {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field && self.operator == other.operator && self.value == other.value
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} '{}'", self.field, self.operator, self.value)
    }
}
