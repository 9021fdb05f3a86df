//! Rules: conditions combined by a logic operator, plus ordered actions

use crate::action::Action;
use crate::condition::Condition;
use crate::error::DecodeError;
use crate::ids::fresh_id;
use crate::traits::IdGenerator;
use crate::types::{LogicOperator, TransactionRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A persisted condition → action bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Stable identity, assigned once at creation
    #[serde(default = "fresh_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub conditions: Vec<Condition>,
    pub actions: Vec<Action>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Higher runs first
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub logic_operator: LogicOperator,
}

fn default_enabled() -> bool {
    true
}

/// Problems with a rule that still allow it to be saved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleWarning {
    NoConditions,
    NoActions,
}

impl fmt::Display for RuleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleWarning::NoConditions => {
                write!(f, "Rule has no conditions. It will not match any transactions.")
            }
            RuleWarning::NoActions => {
                write!(f, "Rule has no actions. It will not modify transactions.")
            }
        }
    }
}

impl Rule {
    /// Whether the rule's conditions match the transaction.
    ///
    /// A rule without conditions never matches.
    pub fn evaluate(&self, transaction: &TransactionRecord) -> bool {
        if self.conditions.is_empty() {
            return false;
        }

        match self.logic_operator {
            LogicOperator::And => self.conditions.iter().all(|c| c.evaluate(transaction)),
            LogicOperator::Or => self.conditions.iter().any(|c| c.evaluate(transaction)),
        }
    }

    /// Apply every action in order if the rule matches, otherwise return the input as is
    pub fn apply(&self, transaction: &TransactionRecord) -> TransactionRecord {
        if !self.evaluate(transaction) {
            return transaction.clone();
        }
        self.apply_actions(transaction)
    }

    /// Thread the transaction through every action without checking conditions
    pub(crate) fn apply_actions(&self, transaction: &TransactionRecord) -> TransactionRecord {
        self.actions
            .iter()
            .fold(transaction.clone(), |current, action| action.apply(&current))
    }

    pub fn warnings(&self) -> Vec<RuleWarning> {
        let mut warnings = Vec::new();
        if self.conditions.is_empty() {
            warnings.push(RuleWarning::NoConditions);
        }
        if self.actions.is_empty() {
            warnings.push(RuleWarning::NoActions);
        }
        warnings
    }

    /// A new rule with the draft's contents and this rule's id
    pub fn revise(&self, draft: RuleDraft) -> Result<Rule, DecodeError> {
        draft.into_rule(self.id.clone())
    }

    /// The editable parts of this rule
    pub fn to_draft(&self) -> RuleDraft {
        RuleDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            conditions: self.conditions.clone(),
            actions: self.actions.clone(),
            enabled: self.enabled,
            priority: self.priority,
            logic_operator: self.logic_operator,
        }
    }

    /// Decode one stored rule, filling defaults for omitted optional fields
    pub fn from_json(json: &str) -> Result<Rule, DecodeError> {
        serde_json::from_str(json).map_err(|e| DecodeError::Malformed {
            reason: e.to_string(),
        })
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.enabled { "✓" } else { "✗" };
        writeln!(f, "{} [{}] {}: {}", status, self.priority, self.name, self.description)?;

        writeln!(f, "  Conditions ({}):", self.logic_operator)?;
        if self.conditions.is_empty() {
            writeln!(f, "    (No conditions)")?;
        }
        for condition in &self.conditions {
            writeln!(f, "    - {}", condition)?;
        }

        writeln!(f, "  Actions:")?;
        if self.actions.is_empty() {
            writeln!(f, "    (No actions)")?;
        }
        for action in &self.actions {
            writeln!(f, "    - {}", action)?;
        }
        Ok(())
    }
}

/// Field-level input for creating or editing a rule
#[derive(Debug, Clone, PartialEq)]
pub struct RuleDraft {
    /// Must not be blank
    pub name: String,
    pub description: String,
    pub conditions: Vec<Condition>,
    pub actions: Vec<Action>,
    pub enabled: bool,
    pub priority: i64,
    pub logic_operator: LogicOperator,
}

impl Default for RuleDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            conditions: Vec::new(),
            actions: Vec::new(),
            enabled: true,
            priority: 0,
            logic_operator: LogicOperator::And,
        }
    }
}

impl RuleDraft {
    /// Enabled, priority 0, `and` logic, no conditions or actions
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn logic(mut self, logic_operator: LogicOperator) -> Self {
        self.logic_operator = logic_operator;
        self
    }

    /// Turn the draft into a rule with a newly generated id
    pub fn build(self, ids: &mut dyn IdGenerator) -> Result<Rule, DecodeError> {
        let id = ids.next_id();
        self.into_rule(id)
    }

    fn into_rule(self, id: String) -> Result<Rule, DecodeError> {
        if self.name.trim().is_empty() {
            return Err(DecodeError::InvalidRule {
                reason: "Name cannot be empty".to_string(),
            });
        }

        Ok(Rule {
            id,
            name: self.name,
            description: self.description,
            conditions: self.conditions,
            actions: self.actions,
            enabled: self.enabled,
            priority: self.priority,
            logic_operator: self.logic_operator,
        })
    }
}
