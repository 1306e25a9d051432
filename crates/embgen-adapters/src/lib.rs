//! Infrastructure adapters for embgen.
//!
//! This crate implements the ports defined in `embgen_core::application::ports`
//! and ships the built-in domains. It contains all external dependencies and
//! I/O operations.

pub mod builtin_domains;
pub mod domain_loader;
pub mod filesystem;
pub mod manifest_domain;
pub mod renderer;

// Re-export commonly used adapters
pub use domain_loader::ManifestDomainLoader;
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use manifest_domain::ManifestDomain;
pub use renderer::JinjaRenderer;
