//! User settings for ledgerbook
//!
//! Manages user preferences: the default rulebook used by classification,
//! the log level, and default report policies.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths::LedgerPaths;
use crate::error::LedgerError;

/// User settings for ledgerbook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Rulebook used by `csv classify` when `--rulebook` is not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rulebook_path: Option<PathBuf>,

    /// Default log filter (overridden by `--log-level` and `LEDGERBOOK_LOG`)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Reports include pending posts unless told otherwise
    #[serde(default)]
    pub include_nonresolved: bool,

    /// Whether imports create accounts they have not seen before
    #[serde(default = "default_create_missing")]
    pub create_missing_accounts: bool,

    /// Default currency symbol
    #[serde(default = "default_currency")]
    pub currency_symbol: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_create_missing() -> bool {
    true
}

fn default_currency() -> String {
    "$".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            rulebook_path: None,
            log_level: default_log_level(),
            include_nonresolved: false,
            create_missing_accounts: default_create_missing(),
            currency_symbol: default_currency(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &LedgerPaths) -> Result<Self, LedgerError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| LedgerError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                LedgerError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &LedgerPaths) -> Result<(), LedgerError> {
        paths.ensure_directories()?;

        let settings_path = paths.settings_file();
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| LedgerError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(&settings_path, contents)
            .map_err(|e| LedgerError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Resolve the rulebook path, preferring an explicit one
    ///
    /// Fails with `Config` when neither the command line nor the settings
    /// file names a rulebook.
    pub fn resolve_rulebook(&self, explicit: Option<PathBuf>) -> Result<PathBuf, LedgerError> {
        explicit
            .or_else(|| self.rulebook_path.clone())
            .ok_or_else(|| {
                LedgerError::Config(
                    "Rulebook path not specified on command line, nor defined in config.json"
                        .into(),
                )
            })
    }
}
