//! embgen Core - domain plugins, template classification and generation.
//!
//! This crate provides the domain and application layers for the embgen
//! code generator, following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            embgen-cli (CLI)             │
//! │   (subcommand per discovered domain)    │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │          Application Services           │
//! │  DomainRegistry, detection, Template-   │
//! │  Service, GenerationService             │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Application Ports (Traits)       │
//! │  Filesystem, TemplateRenderer,          │
//! │  DomainLoader                           │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     embgen-adapters (Infrastructure)    │
//! │  LocalFilesystem, JinjaRenderer,        │
//! │  ManifestDomainLoader, built-in domains │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Domain Layer (Pure Logic)        │
//! │  Domain contract, TemplateSet,          │
//! │  MultifileGroup, ValidatedConfig        │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use embgen_core::prelude::*;
//!
//! # fn run(
//! #     builtins: Vec<std::sync::Arc<dyn Domain>>,
//! #     loader: &dyn DomainLoader,
//! #     renderer: Box<dyn TemplateRenderer>,
//! #     filesystem: Box<dyn Filesystem>,
//! #     catalog_fs: &dyn Filesystem,
//! # ) -> EmbgenResult<()> {
//! // 1. Discover domains (built-ins plus an optional user directory)
//! let registry = DomainRegistry::discover(builtins, loader, &DiscoveryOptions::default());
//! let commands = registry.get("commands").expect("built-in domain");
//!
//! // 2. Look up what the domain can produce
//! let templates = TemplateService::new(catalog_fs).discover(commands.as_ref())?;
//!
//! // 3. Generate
//! let mut request = GenerationRequest::new("demo.yml", "generated");
//! if let Some(header) = templates.single("h") {
//!     request = request.with_single(header.clone());
//! }
//! let files = GenerationService::new(renderer, filesystem).generate(commands.as_ref(), &request)?;
//! # let _ = files;
//! # Ok(())
//! # }
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        DiscoveryOptions, DomainRegistry, GenerationRequest, GenerationService, LoadError,
        TemplateService,
        ports::{DomainLoader, Filesystem, TemplateRenderer},
    };
    pub use crate::domain::{
        BaseConfig, Document, Domain, EmbeddedTemplate, MultifileGroup, RenderContext,
        SingleTemplate, TemplateDescriptor, TemplateLocation, TemplateSet, ValidatedConfig,
        ValidationError,
    };
    pub use crate::error::{EmbgenError, EmbgenResult, ErrorCategory};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
