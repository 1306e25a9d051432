//! Application layer errors.
//!
//! These errors represent failures in orchestration, not rule violations.
//! Rule violations are `DomainError` from `crate::domain`.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during discovery, detection and generation.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// Input document missing, not a file, or not YAML.
    #[error("Input file {path} {reason}")]
    InputNotFound { path: PathBuf, reason: String },

    /// Output directory cannot be created at the requested place.
    #[error("Output directory {path} {reason}")]
    OutputDirNotFound { path: PathBuf, reason: String },

    /// Input content does not parse as YAML.
    #[error("Failed to parse {path}: {reason}")]
    ParseFailed { path: PathBuf, reason: String },

    /// The domain schema rejected the document.
    #[error("Failed to validate {domain}: {reason}")]
    ValidationFailed { domain: String, reason: String },

    /// Template engine failure.
    #[error("Failed to render template '{template}': {reason}")]
    RenderingFailed { template: String, reason: String },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// Request selects nothing to generate.
    #[error("No output formats selected")]
    NoOutputsSelected,

    /// Requested domain is not registered.
    #[error("Unknown domain '{name}'")]
    UnknownDomain { name: String, available: Vec<String> },

    /// No registered domain claims the document.
    #[error("Could not detect domain from input content")]
    DetectionFailed { available: Vec<String> },

    /// In-memory store lock poisoned.
    #[error("Filesystem store lock poisoned")]
    StoreLockError,
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InputNotFound { path, .. } => vec![
                format!("Check that {} exists", path.display()),
                "Input files must end in .yml or .yaml".into(),
            ],
            Self::OutputDirNotFound { path, .. } => vec![
                format!("Create the parent of {} first", path.display()),
                "Or pass a different directory with --output".into(),
            ],
            Self::ParseFailed { .. } => vec!["Check the YAML syntax of the input file".into()],
            Self::ValidationFailed { domain, .. } => vec![
                format!("The document does not match the '{}' schema", domain),
                "Run with --debug to see the full validation error".into(),
            ],
            Self::RenderingFailed { template, .. } => vec![
                format!("Template '{}' failed to render", template),
                "Check the template for undefined variables or syntax errors".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::NoOutputsSelected => vec![
                "Select at least one output format flag (e.g. --h)".into(),
                "Run with --help to list the available formats".into(),
            ],
            Self::UnknownDomain { available, .. } | Self::DetectionFailed { available } => vec![
                format!("Available domains: {}", Names(available)),
                "Try: embgen list to see what each domain expects".into(),
            ],
            Self::StoreLockError => vec![
                "The in-memory filesystem is locked".into(),
                "Try again in a moment".into(),
            ],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InputNotFound { .. }
            | Self::OutputDirNotFound { .. }
            | Self::UnknownDomain { .. } => ErrorCategory::NotFound,
            Self::ParseFailed { .. }
            | Self::ValidationFailed { .. }
            | Self::NoOutputsSelected
            | Self::DetectionFailed { .. } => ErrorCategory::Validation,
            Self::RenderingFailed { .. } => ErrorCategory::Rendering,
            Self::FilesystemError { .. } | Self::StoreLockError => ErrorCategory::Internal,
        }
    }
}

struct Names<'a>(&'a [String]);

impl fmt::Display for Names<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("(none)")
        } else {
            f.write_str(&self.0.join(", "))
        }
    }
}

/// A domain candidate that could not be loaded.
///
/// Never fatal: the registry logs it and moves on to the next candidate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("failed to load domain from {path}: {reason}")]
pub struct LoadError {
    pub path: PathBuf,
    pub reason: String,
}

impl LoadError {
    pub fn new(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
