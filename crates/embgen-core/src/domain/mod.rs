//! Core domain layer for embgen.
//!
//! Pure logic only: the contract every pluggable domain satisfies, the
//! template naming grammar, and the validated configuration model.
//! All filesystem and rendering concerns are reached through the ports
//! defined in the application layer.
//!
//! - **No async**: everything is synchronous, one pass per run
//! - **No I/O**: names in, classifications out
//! - **Immutable values**: descriptors and groups never change after discovery
pub mod config;
pub mod contract;
pub mod error;
pub mod template;

pub use config::{BaseConfig, RenderContext, ValidatedConfig};
pub use contract::{Document, Domain, EmbeddedTemplate, TemplateLocation, copy_companion};
pub use error::{DomainError, ValidationError};
pub use template::{
    MultifileGroup, PlannedOutput, SingleTemplate, TEMPLATE_SUFFIXES, TemplateDescriptor,
    TemplateName, TemplateSet, classify_name, file_type,
};
