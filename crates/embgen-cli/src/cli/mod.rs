//! CLI argument definitions.
//!
//! The fixed part of the command line uses the clap derive API; the domain
//! subcommands and `auto` are added at runtime from [`domains::Catalog`].
//! No business logic lives here.

use std::path::PathBuf;

use clap::{ArgMatches, Args, CommandFactory, FromArgMatches, Parser, Subcommand, ValueEnum};

pub mod domains;
pub mod global;

pub use domains::{AUTO_COMMAND, Catalog, GenerateArgs};
pub use global::{GlobalArgs, prescan};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "embgen",
    bin_name = "embgen",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Embedded code generator - Generate code from YAML definitions",
    after_help = "EXAMPLES:\n\
        \x20 embgen commands protocol.yml --h --py -o build/\n\
        \x20 embgen auto regs.yml --md --c-multi\n\
        \x20 embgen --domains-dir ./domains list\n\
        \x20 embgen new sensor_map --location ./domains",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Fixed subcommand; `None` for domain subcommands and `auto`.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands that exist regardless of discovery.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a new domain scaffold.
    #[command(
        about = "Create a new domain scaffold",
        after_help = "EXAMPLES:\n\
            \x20 embgen new sensor_map\n\
            \x20 embgen new \"pin mux\" --location ./domains"
    )]
    New(NewArgs),

    /// List discovered domains.
    #[command(
        visible_alias = "ls",
        about = "List available domains and their output formats",
        after_help = "EXAMPLES:\n\
            \x20 embgen list\n\
            \x20 embgen --domains-dir ./domains list --format json"
    )]
    List(ListArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 embgen completions bash > ~/.local/share/bash-completion/completions/embgen\n\
            \x20 embgen completions zsh  > ~/.zfunc/_embgen\n\
            \x20 embgen completions fish > ~/.config/fish/completions/embgen.fish"
    )]
    Completions(CompletionsArgs),
}

// ── new ───────────────────────────────────────────────────────────────────────

/// Arguments for `embgen new`.
#[derive(Debug, Args)]
pub struct NewArgs {
    /// Domain name. Lowercased; spaces and dashes become underscores.
    #[arg(value_name = "NAME", help = "Name of the new domain")]
    pub name: String,

    #[arg(
        long = "location",
        value_name = "PATH",
        help = "Directory to create the domain in (default: current directory)"
    )]
    pub location: Option<PathBuf>,
}

// ── list ──────────────────────────────────────────────────────────────────────

/// Arguments for `embgen list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// Output format for the `list` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// JSON array.
    Json,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `embgen completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── Assembly ──────────────────────────────────────────────────────────────────

/// The full command: fixed subcommands, one per catalog domain, then `auto`.
pub fn build_command(catalog: &Catalog) -> clap::Command {
    let mut cmd = Cli::command();
    for entry in catalog.entries() {
        cmd = cmd.subcommand(domains::domain_command(entry));
    }
    cmd.subcommand(domains::auto_command(catalog))
}

/// What the user asked for.
#[derive(Debug)]
pub enum Invocation {
    Fixed(Commands),
    Auto(GenerateArgs),
    Domain { name: String, args: GenerateArgs },
}

/// Split parsed matches into global flags and an [`Invocation`].
pub fn resolve(matches: &ArgMatches) -> Result<(GlobalArgs, Invocation), clap::Error> {
    let cli = Cli::from_arg_matches(matches)?;
    if let Some(command) = cli.command {
        return Ok((cli.global, Invocation::Fixed(command)));
    }

    let Some((name, sub)) = matches.subcommand() else {
        return Err(clap::Error::new(clap::error::ErrorKind::MissingSubcommand));
    };
    let args = GenerateArgs::from_matches(sub);
    let invocation = if name == AUTO_COMMAND {
        Invocation::Auto(args)
    } else {
        Invocation::Domain {
            name: name.to_string(),
            args,
        }
    };
    Ok((cli.global, invocation))
}

// ── tests ─────────────────────────────────────────────────────────────────────
