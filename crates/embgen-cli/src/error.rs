//! Error handling for the embgen CLI.
//!
//! Provides structured errors with:
//! - User-friendly messages
//! - Actionable suggestions
//! - Proper error chaining

use std::error::Error as _;
use std::path::PathBuf;

use owo_colors::OwoColorize;
use thiserror::Error;

use embgen_core::error::{EmbgenError, ErrorCategory};

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// An error propagated from the core pipeline.
    #[error("{0}")]
    Core(#[from] EmbgenError),

    /// An I/O operation in the CLI layer failed.
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// A domain subcommand ran without any output flag.
    #[error("No output formats selected for '{domain}'")]
    NoOutputsSelected { domain: String, flags: Vec<String> },

    #[error("Domain directory already exists at {path}")]
    DomainExists { path: PathBuf },

    #[error("Invalid domain name '{name}': {reason}")]
    InvalidDomainName { name: String, reason: String },
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

impl CliError {
    /// User-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Core(core) => core.suggestions(),

            Self::IoError { .. } => vec![
                "Check file permissions".into(),
                "Ensure the parent directory exists".into(),
            ],

            Self::ConfigError { .. } => {
                let mut out = vec!["Check the file passed with --config".into()];
                if let Some(path) = crate::config::AppConfig::config_path() {
                    out.push(format!("Default config file: {}", path.display()));
                }
                out
            }

            Self::NoOutputsSelected { domain, flags } => {
                let mut out = vec![format!("Pass at least one output flag to '{domain}'")];
                if !flags.is_empty() {
                    out.push(format!("Available: {}", flags.join(", ")));
                }
                out.push(format!("See: embgen {domain} --help"));
                out
            }

            Self::DomainExists { path } => vec![
                "Choose a different domain name".into(),
                format!("Or remove the existing directory: {}", path.display()),
            ],

            Self::InvalidDomainName { .. } => vec![
                "Start with a letter; use letters, digits and underscores".into(),
                "Examples: sensor_map, pinmux, can_frames".into(),
            ],
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Core(core) => core.category(),
            Self::IoError { .. } => ErrorCategory::Internal,
            Self::ConfigError { .. } => ErrorCategory::Configuration,
            Self::NoOutputsSelected { .. }
            | Self::DomainExists { .. }
            | Self::InvalidDomainName { .. } => ErrorCategory::Validation,
        }
    }

    /// Exit code to pass to the OS. Every failure is 1.
    pub fn exit_code(&self) -> u8 {
        1
    }

    /// Format the error for display with colors and suggestions.
    pub fn format_colored(&self, verbose: bool) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "\n{} {}\n\n",
            "\u{2717}".red().bold(), // ✗
            "Error:".red().bold()
        ));
        output.push_str(&format!("  {}\n", self.to_string().red()));

        if verbose {
            let mut source = self.source();
            while let Some(err) = source {
                output.push_str(&format!(
                    "\n  {} {}\n",
                    "\u{2192}".dimmed(), // →
                    err.to_string().dimmed()
                ));
                source = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str(&format!("\n{}\n", "Suggestions:".yellow().bold()));
            for suggestion in suggestions {
                output.push_str(&format!("  {suggestion}\n"));
            }
        }

        if !verbose {
            output.push('\n');
            output.push_str(&format!(
                "{} {}\n",
                "\u{2139}".blue(), // ℹ
                "Use -d / --debug for more details.".dimmed(),
            ));
        }

        output
    }

    /// Plain-text version of [`Self::format_colored`].
    pub fn format_plain(&self, verbose: bool) -> String {
        let mut out = String::new();
        out.push_str(&format!("\nError: {self}\n"));

        if verbose {
            let mut src = self.source();
            while let Some(err) = src {
                out.push_str(&format!("  Caused by: {err}\n"));
                src = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str("\nSuggestions:\n");
            for s in &suggestions {
                out.push_str(&format!("  {s}\n"));
            }
        }

        if !verbose {
            out.push_str("\nUse -d / --debug for more details.\n");
        }

        out
    }

    /// Log the error using tracing.
    pub fn log(&self) {
        match self.category() {
            ErrorCategory::Validation => tracing::warn!("Invalid input: {}", self),
            ErrorCategory::NotFound => tracing::warn!("Not found: {}", self),
            ErrorCategory::Rendering => tracing::error!("Rendering failed: {}", self),
            ErrorCategory::Configuration => tracing::error!("Configuration error: {}", self),
            ErrorCategory::Internal => tracing::error!("Internal error: {}", self),
        }

        if let Some(source) = self.source() {
            tracing::debug!("Caused by: {}", source);
        }
    }
}
