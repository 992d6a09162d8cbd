//! Feature catalog error types.
//!
//! The registry itself never fails; these variants cover cursor decoding,
//! lookups by the serving layer, duplicate rejection, and configuration.

use thiserror::Error;

use crate::catalog::FeatureKind;

pub type FeatureResult<T> = Result<T, FeatureError>;

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Prompt not found: {0}")]
    PromptNotFound(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Resource template not found: {0}")]
    ResourceTemplateNotFound(String),

    #[error("Duplicate {kind} registration: {key}")]
    Duplicate { kind: FeatureKind, key: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl FeatureError {
    /// The not-found error matching a feature kind.
    pub fn not_found(kind: FeatureKind, key: impl Into<String>) -> Self {
        let key = key.into();
        match kind {
            FeatureKind::Tool => FeatureError::ToolNotFound(key),
            FeatureKind::Prompt => FeatureError::PromptNotFound(key),
            FeatureKind::Resource => FeatureError::ResourceNotFound(key),
            FeatureKind::ResourceTemplate => FeatureError::ResourceTemplateNotFound(key),
        }
    }
}
