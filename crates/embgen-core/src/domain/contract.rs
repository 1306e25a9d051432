//! The Domain contract.
//!
//! A domain is a pluggable generation unit: it recognises its documents,
//! validates them into a [`ValidatedConfig`], and knows where its templates
//! live. Built-in domains are compiled in; user domains are loaded at
//! runtime through [`crate::application::ports::DomainLoader`].

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::application::ApplicationError;
use crate::application::ports::{Filesystem, TemplateRenderer};
use crate::domain::config::ValidatedConfig;
use crate::domain::error::{DomainError, ValidationError};
use crate::error::EmbgenResult;

/// Parsed input document.
pub type Document = serde_json::Value;

/// A template compiled into the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedTemplate {
    pub name: &'static str,
    pub source: &'static str,
}

/// Where a domain keeps its templates and companion files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateLocation {
    Directory(PathBuf),
    Embedded(&'static [EmbeddedTemplate]),
}

impl TemplateLocation {
    /// Source of an embedded entry; always `None` for directories.
    pub fn embedded(&self, name: &str) -> Option<&'static str> {
        match self {
            Self::Embedded(entries) => entries.iter().find(|e| e.name == name).map(|e| e.source),
            Self::Directory(_) => None,
        }
    }

    /// Read a companion file (a non-template next to the templates).
    pub fn read_file(&self, name: &str, fs: &dyn Filesystem) -> EmbgenResult<String> {
        match self {
            Self::Directory(dir) => fs.read_to_string(&dir.join(name)),
            Self::Embedded(_) => self.embedded(name).map(str::to_string).ok_or_else(|| {
                ApplicationError::FilesystemError {
                    path: PathBuf::from(name),
                    reason: "no embedded file with this name".into(),
                }
                .into()
            }),
        }
    }
}

impl fmt::Display for TemplateLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory(dir) => write!(f, "{}", dir.display()),
            Self::Embedded(entries) => write!(f, "<embedded: {} files>", entries.len()),
        }
    }
}

/// Capability set every domain implements.
///
/// Implementations are immutable after construction and shared across the
/// process as `Arc<dyn Domain>`.
pub trait Domain: Send + Sync {
    /// Registry key and CLI subcommand. Must be non-empty.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Does `document` belong to this domain?
    ///
    /// An `Err` is treated by the detector as "no match" for this domain only.
    fn detect(&self, document: &Document) -> Result<bool, DomainError>;

    fn validate(&self, document: &Document) -> Result<ValidatedConfig, ValidationError>;

    fn templates_location(&self) -> TemplateLocation;

    /// Render one template. The default hands `config.render_context()` to
    /// the renderer.
    fn render(
        &self,
        config: &ValidatedConfig,
        template: &str,
        renderer: &dyn TemplateRenderer,
    ) -> EmbgenResult<String> {
        renderer.render(&self.templates_location(), template, &config.render_context())
    }

    /// Called once per run after every template is rendered.
    ///
    /// `generated` holds the extensions actually written. Returns the names
    /// of any extra files the hook wrote into `output`.
    fn post_generate(
        &self,
        config: &ValidatedConfig,
        output: &Path,
        generated: &BTreeSet<String>,
        fs: &dyn Filesystem,
    ) -> EmbgenResult<Vec<String>> {
        let _ = (config, output, generated, fs);
        Ok(Vec::new())
    }
}

impl fmt::Debug for dyn Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Domain").field("name", &self.name()).finish()
    }
}

/// Copy a companion file from `domain`'s template location into `output`.
///
/// Shared by post-generate hooks; returns the written file name.
pub fn copy_companion(
    domain: &dyn Domain,
    source: &str,
    target: &str,
    output: &Path,
    fs: &dyn Filesystem,
) -> EmbgenResult<String> {
    let content = domain.templates_location().read_file(source, fs)?;
    fs.write_file(&output.join(target), &content)?;
    Ok(target.to_string())
}
