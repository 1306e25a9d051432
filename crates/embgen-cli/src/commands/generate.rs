//! Implementation of the per-domain generation subcommands.

use std::path::Path;

use tracing::{info, instrument, warn};

use embgen_adapters::{JinjaRenderer, LocalFilesystem};
use embgen_core::application::{GenerationRequest, GenerationService};

use crate::{
    cli::{GenerateArgs, domains::CatalogEntry},
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Generate the outputs selected in `args` for `entry`'s domain.
#[instrument(skip_all, fields(domain = %entry.domain.name()))]
pub fn execute(
    entry: &CatalogEntry,
    args: &GenerateArgs,
    default_output: &Path,
    output: &OutputManager,
) -> CliResult<()> {
    let request = build_request(entry, args, default_output)?;
    let service = GenerationService::new(
        Box::new(JinjaRenderer::new()),
        Box::new(LocalFilesystem::new()),
    );
    run(&service, entry, &request, output)
}

/// Run `request` with an already built service.
pub(crate) fn run(
    service: &GenerationService,
    entry: &CatalogEntry,
    request: &GenerationRequest,
    output: &OutputManager,
) -> CliResult<()> {
    let files = service.generate(entry.domain.as_ref(), request)?;
    for file in &files {
        output.success(&format!("Generated {}", request.output.join(file).display()))?;
    }
    info!(count = files.len(), "Done");
    Ok(())
}

/// Selected templates in catalog order: singles, then groups.
///
/// A selection the domain does not offer (possible through `auto`) is
/// skipped with a warning.
pub fn build_request(
    entry: &CatalogEntry,
    args: &GenerateArgs,
    default_output: &Path,
) -> CliResult<GenerationRequest> {
    let templates = &entry.templates;
    let domain = entry.domain.name();

    for ext in args.singles.iter().filter(|e| templates.single(e).is_none()) {
        warn!(domain, flag = %format!("--{ext}"), "Domain has no such template, ignoring");
    }
    for group in args.groups.iter().filter(|g| templates.group(g).is_none()) {
        warn!(domain, flag = %format!("--{group}-multi"), "Domain has no such group, ignoring");
    }

    let out_dir = args.output.as_deref().unwrap_or(default_output);
    let mut request = GenerationRequest::new(&args.input, out_dir);
    for single in templates.singles().filter(|s| args.singles.contains(&s.extension)) {
        request = request.with_single(single.clone());
    }
    for group in templates.groups().filter(|g| args.groups.contains(g.name())) {
        request = request.with_group(group.clone());
    }

    if request.is_empty() {
        let flags = templates
            .singles()
            .map(|s| format!("--{}", s.extension))
            .chain(templates.groups().map(|g| format!("--{}-multi", g.name())))
            .collect();
        return Err(CliError::NoOutputsSelected {
            domain: domain.to_string(),
            flags,
        });
    }
    Ok(request)
}
