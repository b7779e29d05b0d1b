//! Helpdesk configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine configuration, usually read from a TOML file.
///
/// ```toml
/// overdue_after_days = 5
///
/// [limits]
/// comment_max_len = 4000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelpdeskConfig {
    /// Input size limits
    pub limits: ContentLimits,
    /// Days without activity after which an in-progress ticket is overdue
    pub overdue_after_days: i64,
}

/// Upper bound for `overdue_after_days` (about a century).
pub const MAX_OVERDUE_AFTER_DAYS: i64 = 36_500;

impl Default for HelpdeskConfig {
    fn default() -> Self {
        Self {
            limits: ContentLimits::default(),
            overdue_after_days: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentLimits {
    pub subject_max_len: usize,
    pub description_max_len: usize,
    pub comment_max_len: usize,
    pub feedback_max_len: usize,
    pub attachment_max_bytes: u64,
}

impl Default for ContentLimits {
    fn default() -> Self {
        Self {
            subject_max_len: 255,
            description_max_len: 5000,
            comment_max_len: 2000,
            feedback_max_len: 2000,
            attachment_max_bytes: 10 * 1024 * 1024,
        }
    }
}

impl HelpdeskConfig {
    /// Load from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = &self.limits;
        let named = [
            ("limits.subject_max_len", limits.subject_max_len as u64),
            ("limits.description_max_len", limits.description_max_len as u64),
            ("limits.comment_max_len", limits.comment_max_len as u64),
            ("limits.feedback_max_len", limits.feedback_max_len as u64),
            ("limits.attachment_max_bytes", limits.attachment_max_bytes),
        ];
        if let Some((name, _)) = named.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::Invalid(format!("{} must be greater than zero", name)));
        }
        if !(1..=MAX_OVERDUE_AFTER_DAYS).contains(&self.overdue_after_days) {
            return Err(ConfigError::Invalid(format!(
                "overdue_after_days must be between 1 and {}",
                MAX_OVERDUE_AFTER_DAYS
            )));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
