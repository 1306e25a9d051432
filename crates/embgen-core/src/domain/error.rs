use thiserror::Error;

use crate::error::ErrorCategory;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (so services can report and keep them)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    #[error("Invalid output filename '{filename}': {reason}")]
    InvalidOutputFilename { filename: String, reason: String },

    #[error("Template '{filename}' carries a suffix but belongs to no multifile group")]
    SuffixWithoutGroup { filename: String },

    #[error("Template '{filename}' does not belong to multifile group '{group}'")]
    GroupMismatch { filename: String, group: String },

    #[error("Domain name cannot be empty")]
    EmptyDomainName,

    #[error("Input document must be a mapping, found {found}")]
    NotAMapping { found: String },

    // ========================================================================
    // Detection
    // ========================================================================
    #[error("Detection failed in domain '{domain}': {reason}")]
    DetectionFailed { domain: String, reason: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidOutputFilename { filename, .. } => vec![
                format!("'{}' cannot be used as an output file name", filename),
                "Set `file:` to a plain name without path separators".into(),
            ],
            Self::SuffixWithoutGroup { filename } => vec![
                format!("Rename '{}' to <prefix>.<group>_multi.<ext>.<suffix>.j2", filename),
            ],
            Self::NotAMapping { .. } => vec![
                "The input file must be a YAML mapping with at least a `name` key".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidOutputFilename { .. }
            | Self::SuffixWithoutGroup { .. }
            | Self::GroupMismatch { .. }
            | Self::EmptyDomainName
            | Self::NotAMapping { .. } => ErrorCategory::Validation,
            Self::DetectionFailed { .. } => ErrorCategory::Internal,
        }
    }
}

/// A domain schema rejected the input document.
///
/// `path` points at the offending location (e.g. `commands[2].args[0].type`)
/// when the domain can tell.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{}", match .path { Some(p) => format!("{p}: {}", .message), None => .message.clone() })]
pub struct ValidationError {
    pub message: String,
    pub path: Option<String>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
        }
    }

    pub fn at(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Some(path.into()),
        }
    }
}

impl From<DomainError> for ValidationError {
    fn from(err: DomainError) -> Self {
        Self::new(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_display_includes_path() {
        let err = ValidationError::at("commands[0].id", "expected an integer");
        assert_eq!(err.to_string(), "commands[0].id: expected an integer");
        assert_eq!(ValidationError::new("boom").to_string(), "boom");
    }

    #[test]
    fn suffix_without_group_is_validation() {
        let err = DomainError::SuffixWithoutGroup {
            filename: "template.h.1.j2".into(),
        };
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(!err.suggestions().is_empty());
    }
}
