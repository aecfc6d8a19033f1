//! Job settings
//!
//! Defaults for a merge run, loaded from an optional JSON file. Command-line
//! flags override whatever the file sets.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use doc_merge::{format_timestamp, SeedPolicy, TokenSet, DATETIME_TOKEN, REVISION_TOKEN};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default name of the composite document
pub const DEFAULT_OUTPUT: &str = "book-of-status.odt";

/// Order in which documents discovered in a directory are merged
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InputOrder {
    /// Lexicographic by file name
    #[default]
    Name,
    /// Oldest modification time first
    Modified,
}

/// Placeholder tokens the merged document is scanned for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenNames {
    pub datetime: String,
    pub revision: String,
}

impl Default for TokenNames {
    fn default() -> Self {
        Self {
            datetime: DATETIME_TOKEN.to_string(),
            revision: REVISION_TOKEN.to_string(),
        }
    }
}

impl TokenNames {
    /// Build the token set for one run
    pub fn token_set(&self, now: DateTime<Utc>, revision: &str) -> doc_merge::Result<TokenSet> {
        TokenSet::new()
            .with(self.datetime.as_str(), format_timestamp(now))?
            .with(self.revision.as_str(), revision)
    }
}

/// Settings of a merge run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobSettings {
    pub seed_policy: SeedPolicy,
    pub page_breaks: bool,
    pub output: PathBuf,
    pub order: InputOrder,
    pub tokens: TokenNames,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            seed_policy: SeedPolicy::default(),
            page_breaks: true,
            output: PathBuf::from(DEFAULT_OUTPUT),
            order: InputOrder::default(),
            tokens: TokenNames::default(),
        }
    }
}

/// Loads job settings from disk
#[derive(Debug, Clone)]
pub struct SettingsManager {
    settings_path: Option<PathBuf>,
}

impl SettingsManager {
    pub fn new(settings_path: Option<&Path>) -> Self {
        Self {
            settings_path: settings_path.map(Path::to_path_buf),
        }
    }

    /// Load settings, falling back to defaults when the file is absent or
    /// cannot be parsed. Only an unreadable existing file is an error.
    pub fn load_sync(&self) -> std::io::Result<JobSettings> {
        let Some(path) = &self.settings_path else {
            return Ok(JobSettings::default());
        };

        if !path.exists() {
            tracing::debug!("Settings file {} not found, using defaults", path.display());
            return Ok(JobSettings::default());
        }

        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str::<JobSettings>(&content) {
            Ok(settings) => {
                tracing::debug!("Loaded settings from {}", path.display());
                Ok(settings)
            }
            Err(e) => {
                tracing::warn!("Failed to parse settings file, using defaults: {}", e);
                Ok(JobSettings::default())
            }
        }
    }
}
