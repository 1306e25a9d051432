//! Implementation of `embgen auto`: detect the domain, then generate.

use std::path::Path;

use tracing::{info, instrument};

use embgen_adapters::{JinjaRenderer, LocalFilesystem};
use embgen_core::application::{ApplicationError, DomainRegistry, GenerationService};
use embgen_core::error::EmbgenError;

use crate::{
    cli::{AUTO_COMMAND, Catalog, GenerateArgs},
    commands::generate,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all, fields(input = %args.input.display()))]
pub fn execute(
    registry: &DomainRegistry,
    catalog: &Catalog,
    args: &GenerateArgs,
    default_output: &Path,
    output: &OutputManager,
) -> CliResult<()> {
    if args.selects_nothing() {
        return Err(CliError::NoOutputsSelected {
            domain: AUTO_COMMAND.to_string(),
            flags: catalog.auto_flags(),
        });
    }

    let service = GenerationService::new(
        Box::new(JinjaRenderer::new()),
        Box::new(LocalFilesystem::new()),
    );

    let document = service.load_document(&args.input)?;
    let Some(domain) = registry.detect(&document) else {
        return Err(EmbgenError::from(ApplicationError::DetectionFailed {
            available: registry.names(),
        })
        .into());
    };
    info!(domain = %domain.name(), "Auto-detected domain");

    let entry = catalog.get(domain.name()).ok_or_else(|| {
        EmbgenError::from(ApplicationError::UnknownDomain {
            name: domain.name().to_string(),
            available: catalog.entries().iter().map(|e| e.domain.name().to_string()).collect(),
        })
    })?;
    output.info(&format!("Detected domain: {}", domain.name()))?;

    let request = generate::build_request(entry, args, default_output)?;
    generate::run(&service, entry, &request, output)
}
