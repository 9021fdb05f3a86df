//! Application configuration from the environment

use crate::error::ConfigError;
use std::fmt;
use std::fs;
use std::path::PathBuf;

pub const CONFIG_DIR_VAR: &str = "YNAB_RULES_CONFIG_DIR";
pub const RULES_FILE_VAR: &str = "YNAB_RULES_FILE";
pub const LOG_FILTER_VAR: &str = "YNAB_RULES_LOG";
pub const API_KEY_VAR: &str = "YNAB_API_KEY";
pub const BUDGET_ID_VAR: &str = "YNAB_BUDGET_ID";

const DEFAULT_DIR_NAME: &str = ".ynab_rules";
const RULES_FILE_NAME: &str = "rules.json";

/// Merge `.env` into the process environment.
///
/// A missing file is fine. Any other failure is returned so the caller can
/// report it once logging is up.
pub fn load_dotenv() -> Option<dotenvy::Error> {
    match dotenvy::dotenv() {
        Err(e) if !e.not_found() => Some(e),
        _ => None,
    }
}

/// Credentials for a remote ledger source
#[derive(Clone, PartialEq, Eq)]
pub struct LedgerCredentials {
    pub api_key: String,
    pub budget_id: String,
}

impl fmt::Debug for LedgerCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerCredentials")
            .field("api_key", &"<redacted>")
            .field("budget_id", &self.budget_id)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Directory holding rule storage, `~/.ynab_rules` by default
    pub config_dir: PathBuf,
    /// Explicit rules file; `None` means `<config_dir>/rules.json`
    pub rules_file: Option<PathBuf>,
    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub log_filter: String,
    pub credentials: Option<LedgerCredentials>,
}

impl AppConfig {
    /// Load from the process environment; run [`load_dotenv`] first to pick up `.env`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variable names
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config_dir = match non_empty(CONFIG_DIR_VAR) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::home_dir()
                .ok_or(ConfigError::NoHomeDir)?
                .join(DEFAULT_DIR_NAME),
        };

        let credentials = match (non_empty(API_KEY_VAR), non_empty(BUDGET_ID_VAR)) {
            (Some(api_key), Some(budget_id)) => Some(LedgerCredentials { api_key, budget_id }),
            _ => None,
        };

        Ok(Self {
            config_dir,
            rules_file: non_empty(RULES_FILE_VAR).map(PathBuf::from),
            log_filter: non_empty(LOG_FILTER_VAR).unwrap_or_else(|| "info".to_string()),
            credentials,
        })
    }

    /// Apply command-line overrides
    pub fn with_overrides(mut self, config_dir: Option<PathBuf>, rules_file: Option<PathBuf>) -> Self {
        if let Some(dir) = config_dir {
            self.config_dir = dir;
        }
        if rules_file.is_some() {
            self.rules_file = rules_file;
        }
        self
    }

    pub fn rules_path(&self) -> PathBuf {
        self.rules_file
            .clone()
            .unwrap_or_else(|| self.config_dir.join(RULES_FILE_NAME))
    }

    pub fn ensure_config_dir(&self) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.config_dir).map_err(|source| ConfigError::CreateDir {
            path: self.config_dir.display().to_string(),
            source,
        })
    }
}
