//! Error types for sequence range resolution
//!
//! Only hard failures live here. "No frame token", "no template" and
//! "no SEQ field" are ordinary outcomes and never surface as errors.

use std::path::PathBuf;
use thiserror::Error;

/// Filesystem enumeration failures
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Path template service failures
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("no template matches path: {0}")]
    NoMatch(String),

    #[error("path {path} matches several templates: {}", .names.join(", "))]
    Ambiguous { path: String, names: Vec<String> },

    #[error("path does not match template '{template}': {path}")]
    Mismatch { template: String, path: String },

    #[error("template '{template}' uses undeclared key '{key}'")]
    UnknownKey { template: String, key: String },

    #[error("template '{template}' is malformed: {reason}")]
    Definition { template: String, reason: String },

    #[error("template '{template}': key '{key}' has conflicting values '{first}' and '{second}'")]
    InconsistentField {
        template: String,
        key: String,
        first: String,
        second: String,
    },

    #[error("template '{template}': invalid value '{value}' for key '{key}'")]
    InvalidValue {
        template: String,
        key: String,
        value: String,
    },

    #[error(transparent)]
    Listing(#[from] ListingError),
}

impl TemplateError {
    /// Classification failures make the caller fall back to pattern parsing.
    pub fn is_classification_failure(&self) -> bool {
        matches!(self, TemplateError::NoMatch(_) | TemplateError::Ambiguous { .. })
    }
}

/// Errors propagated out of range resolution
#[derive(Debug, Error)]
pub enum SequenceError {
    #[error(transparent)]
    Listing(#[from] ListingError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    /// A glob hit that does not carry an integer frame number.
    #[error("cannot read a frame number from {} (token: {})", .path.display(), .token.as_deref().unwrap_or("none"))]
    UnparsableFrame {
        path: PathBuf,
        token: Option<String>,
    },
}
