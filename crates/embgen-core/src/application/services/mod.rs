//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "find the domain for this file" or
//! "generate these outputs".

pub mod detection;
pub mod generation_service;
pub mod registry;
pub mod template_service;

pub use detection::{detect, discover_and_detect};
pub use generation_service::{GenerationRequest, GenerationService};
pub use registry::{DiscoveryOptions, DomainRegistry};
pub use template_service::TemplateService;
