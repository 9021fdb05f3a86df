//! Rule persistence backends

use crate::error::StoreError;
use crate::rule::Rule;
use crate::traits::RuleStore;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Replace the rule with the same id, or append
fn upsert(rules: &mut Vec<Rule>, rule: &Rule) {
    match rules.iter_mut().find(|r| r.id == rule.id) {
        Some(existing) => *existing = rule.clone(),
        None => rules.push(rule.clone()),
    }
}

/// Rules kept as a pretty-printed JSON array in one file.
///
/// A missing file is an empty store. Unreadable or corrupt storage reads as
/// no rules, but saves and deletes against it fail and leave the file as is.
/// There is no locking: concurrent writers race and the last write wins.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn write(&self, rules: &[Rule]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_string_pretty(rules).map_err(|e| StoreError::Encode {
            reason: e.to_string(),
        })?;

        // Write beside the target and rename so readers never see a torn file
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, json).map_err(|e| self.io_error(e))?;
        fs::rename(&staging, &self.path).map_err(|e| self.io_error(e))?;

        tracing::debug!(path = %self.path.display(), count = rules.len(), "rules written");
        Ok(())
    }
}

impl RuleStore for JsonFileStore {
    fn try_get_all_rules(&self) -> Result<Vec<Rule>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }

    // Writes refuse to run over storage they cannot read, so a single bad
    // record never costs the rest of the file
    fn try_save_rule(&mut self, rule: &Rule) -> Result<(), StoreError> {
        let mut rules = self.try_get_all_rules()?;
        upsert(&mut rules, rule);
        self.write(&rules)
    }

    fn try_delete_rule(&mut self, id: &str) -> Result<bool, StoreError> {
        let mut rules = self.try_get_all_rules()?;
        let before = rules.len();
        rules.retain(|r| r.id != id);

        if rules.len() == before {
            return Ok(false);
        }
        self.write(&rules)?;
        Ok(true)
    }
}

/// Rules held in memory, for tests and embedding hosts
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rules: Vec<Rule>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Vec<Rule>) -> Self {
        Self { rules }
    }
}

impl RuleStore for MemoryStore {
    fn try_get_all_rules(&self) -> Result<Vec<Rule>, StoreError> {
        Ok(self.rules.clone())
    }

    fn try_save_rule(&mut self, rule: &Rule) -> Result<(), StoreError> {
        upsert(&mut self.rules, rule);
        Ok(())
    }

    fn try_delete_rule(&mut self, id: &str) -> Result<bool, StoreError> {
        let before = self.rules.len();
        self.rules.retain(|r| r.id != id);
        Ok(self.rules.len() < before)
    }
}
