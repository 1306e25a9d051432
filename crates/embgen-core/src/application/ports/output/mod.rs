//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `embgen-adapters` crate provides implementations.

use std::path::Path;
use std::sync::Arc;

use crate::application::LoadError;
use crate::domain::{Domain, RenderContext, TemplateLocation};
use crate::error::EmbgenResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `embgen_adapters::filesystem::LocalFilesystem` (production)
/// - `embgen_adapters::filesystem::MemoryFilesystem` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> EmbgenResult<()>;

    /// Write content to a file, replacing it if present.
    fn write_file(&self, path: &Path, content: &str) -> EmbgenResult<()>;

    fn read_to_string(&self, path: &Path) -> EmbgenResult<String>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    fn is_file(&self, path: &Path) -> bool;

    /// Names (not paths) of the immediate entries of a directory.
    fn list_dir(&self, path: &Path) -> EmbgenResult<Vec<String>>;
}

/// Port for template rendering.
///
/// Implemented by:
/// - `embgen_adapters::renderer::JinjaRenderer` (minijinja)
pub trait TemplateRenderer: Send + Sync {
    /// Render `template` from `location` with `context`.
    ///
    /// # Arguments
    ///
    /// * `location` - Where the template and anything it includes live
    /// * `template` - Template identifier, e.g. `template.h.j2`
    /// * `context` - Variables visible to the template
    fn render(
        &self,
        location: &TemplateLocation,
        template: &str,
        context: &RenderContext,
    ) -> EmbgenResult<String>;
}

/// Port for loading user-supplied domains from a directory.
///
/// Implemented by:
/// - `embgen_adapters::domain_loader::ManifestDomainLoader` (`domain.toml`)
pub trait DomainLoader: Send + Sync {
    /// One entry per candidate found under `dir`, in a stable order.
    ///
    /// A missing or unreadable `dir` yields no candidates.
    fn load_all(&self, dir: &Path) -> Vec<Result<Arc<dyn Domain>, LoadError>>;
}
