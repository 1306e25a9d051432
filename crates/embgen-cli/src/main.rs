//! # embgen CLI
//!
//! Code generator for embedded projects: YAML definitions in, headers,
//! sources and documentation out.
//!
//! ## Startup sequence
//!
//! 1. Pre-scan the raw arguments for the global flags.
//! 2. Initialise the tracing subscriber (logging).
//! 3. Load configuration (defaults, file, env).
//! 4. Discover domains and their templates.
//! 5. Build and parse the full command line.
//! 6. Dispatch to the appropriate command handler.
//! 7. Translate any [`CliError`] into a user-facing message.
//!
//! `--help` and `--version` exit with 0; every failure exits with 1.

use std::ffi::OsString;
use std::process::ExitCode;

use clap::error::ErrorKind;
use tracing::{debug, info, instrument};

use embgen_adapters::{LocalFilesystem, ManifestDomainLoader, builtin_domains};
use embgen_core::application::{ApplicationError, DiscoveryOptions, DomainRegistry};
use embgen_core::error::EmbgenError;

use crate::{
    cli::{Catalog, Commands, GlobalArgs, Invocation},
    config::AppConfig,
    error::{CliError, CliResult},
    logging::init_logging,
    output::OutputManager,
};

mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod output;

fn main() -> ExitCode {
    // Missing .env is fine.
    let _ = dotenvy::dotenv();

    let argv: Vec<OsString> = std::env::args_os().collect();

    // ── 1. Pre-scan + 2. tracing ──────────────────────────────────────────
    let early = cli::prescan(argv.iter().cloned());
    if let Err(e) = init_logging(&early) {
        eprintln!("Failed to initialise logging: {e}");
        return ExitCode::FAILURE;
    }
    debug!(verbose = early.verbose, quiet = early.quiet, debug = early.debug, "CLI started");

    // ── 3. Configuration ──────────────────────────────────────────────────
    let config = match AppConfig::load(early.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            return handle_error(
                CliError::ConfigError {
                    message: format!("{e:#}"),
                },
                &early,
            );
        }
    };

    // ── 4. Discovery ──────────────────────────────────────────────────────
    let options = match early.domains_dir.clone().or_else(|| config.domains_dir.clone()) {
        Some(dir) => DiscoveryOptions::with_extra_domains_dir(dir),
        None => DiscoveryOptions::default(),
    };
    let registry = DomainRegistry::discover(
        builtin_domains::all(),
        &ManifestDomainLoader::new(),
        &options,
    );
    let catalog = Catalog::build(&registry, &LocalFilesystem::new());

    // ── 5. Parse ──────────────────────────────────────────────────────────
    let command = cli::build_command(&catalog);
    let parsed = command
        .clone()
        .try_get_matches_from(&argv)
        .and_then(|matches| cli::resolve(&matches));
    let (global, invocation) = match parsed {
        Ok(parsed) => parsed,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    // ── 6. Dispatch + 7. Error handling ───────────────────────────────────
    let ctx = Context {
        output: OutputManager::new(&global, &config),
        config,
        registry,
        catalog,
        command,
    };
    match run(invocation, &ctx) {
        Ok(()) => {
            info!("embgen completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => handle_error(e, &global),
    }
}

/// Everything a handler may need, built once per run.
struct Context {
    config: AppConfig,
    registry: DomainRegistry,
    catalog: Catalog,
    command: clap::Command,
    output: OutputManager,
}

#[instrument(skip_all)]
fn run(invocation: Invocation, ctx: &Context) -> CliResult<()> {
    let default_output = &ctx.config.output_dir;
    match invocation {
        Invocation::Fixed(Commands::New(args)) => commands::new::execute(args, &ctx.output),
        Invocation::Fixed(Commands::List(args)) => {
            commands::list::execute(&args, &ctx.catalog, ctx.registry.skipped(), &ctx.output)
        }
        Invocation::Fixed(Commands::Completions(args)) => {
            commands::completions::execute(&args, ctx.command.clone())
        }
        Invocation::Auto(args) => commands::auto::execute(
            &ctx.registry,
            &ctx.catalog,
            &args,
            default_output,
            &ctx.output,
        ),
        Invocation::Domain { name, args } => {
            let entry = ctx.catalog.get(&name).ok_or_else(|| {
                EmbgenError::from(ApplicationError::UnknownDomain {
                    name: name.clone(),
                    available: ctx.registry.names(),
                })
            })?;
            commands::generate::execute(entry, &args, default_output, &ctx.output)
        }
    }
}

/// Print `err` to stderr and map it to the exit code.
fn handle_error(err: CliError, global: &GlobalArgs) -> ExitCode {
    err.log();

    let verbose = global.debug || global.verbose > 0;
    let colored = !global.no_color && std::io::IsTerminal::is_terminal(&std::io::stderr());
    let msg = if colored {
        err.format_colored(verbose)
    } else {
        err.format_plain(verbose)
    };
    eprint!("{msg}");
    if global.debug {
        eprintln!("\n{err:#?}");
    }

    ExitCode::from(err.exit_code())
}
