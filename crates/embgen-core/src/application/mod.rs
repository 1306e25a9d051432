//! Application layer for embgen.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (registry, detection, template
//!   discovery, generation)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but holds no naming or
//! validation rules itself. Those live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

// Re-export main services
pub use services::{
    DiscoveryOptions, DomainRegistry, GenerationRequest, GenerationService, TemplateService,
    detect, discover_and_detect,
};

// Re-export port traits (for adapter implementation)
pub use ports::{DomainLoader, Filesystem, TemplateRenderer};

pub use error::{ApplicationError, LoadError};
