//! Feature catalog configuration.
//!
//! Loaded from YAML; every field has a default so an empty document is valid.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, FeatureResult};

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FeatureConfig {
    /// Maximum number of entries returned by one list call
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// What to do when a feature is registered under a key that already exists
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,

    /// Buffered list-changed events per subscriber before it starts lagging
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

/// Handling of registrations whose key is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Overwrite the stored entry
    #[default]
    Replace,
    /// Refuse the whole batch
    Reject,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_event_capacity() -> usize {
    64
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            duplicate_policy: DuplicatePolicy::default(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl FeatureConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> FeatureResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub async fn from_file(path: impl AsRef<Path>) -> FeatureResult<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_yaml_str(&content)
    }

    pub fn validate(&self) -> FeatureResult<()> {
        if self.page_size == 0 {
            return Err(FeatureError::Config(
                "page_size must be at least 1".to_string(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(FeatureError::Config(
                "event_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }
}
