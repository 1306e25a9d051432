//! Dynamic part of the command line: one subcommand per discovered domain.
//!
//! Every single template becomes `--<ext>` and every multifile group
//! `--<group>-multi`, each with an automatically derived short flag when a
//! free character is available.

use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::warn;

use embgen_core::application::{DomainRegistry, TemplateService, ports::Filesystem};
use embgen_core::domain::{Domain, MultifileGroup, SingleTemplate, TemplateSet};

/// Shorts owned by fixed arguments: output, debug, help, input, verbose,
/// quiet, config, version.
pub const RESERVED_SHORTS: [char; 8] = ['o', 'd', 'h', 'i', 'v', 'q', 'c', 'V'];

const RESERVED_LONGS: [&str; 9] = [
    "output",
    "debug",
    "help",
    "verbose",
    "quiet",
    "config",
    "no-color",
    "domains-dir",
    "version",
];

pub const AUTO_COMMAND: &str = "auto";

/// Subcommand names a domain cannot take.
pub(crate) const RESERVED_COMMANDS: [&str; 6] =
    [AUTO_COMMAND, "new", "list", "ls", "completions", "help"];

// ── Catalog ─────────────────────────────────────────────────────────────────

/// A domain together with the templates it offers.
#[derive(Debug)]
pub struct CatalogEntry {
    pub domain: Arc<dyn Domain>,
    pub templates: TemplateSet,
}

/// Template sets of every registered domain, in registration order.
#[derive(Debug, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Discover templates for each domain. A domain whose templates cannot
    /// be listed is kept with an empty set; a domain named like a built-in
    /// subcommand is dropped.
    pub fn build(registry: &DomainRegistry, fs: &dyn Filesystem) -> Self {
        let service = TemplateService::new(fs);
        let entries = registry
            .iter()
            .filter(|domain| {
                let reserved = RESERVED_COMMANDS.contains(&domain.name());
                if reserved {
                    warn!(domain = domain.name(), "Domain name is a built-in subcommand, skipping");
                }
                !reserved
            })
            .map(|domain| {
                let templates = service.discover(domain.as_ref()).unwrap_or_else(|e| {
                    warn!(domain = domain.name(), error = %e, "Failed to list templates");
                    TemplateSet::default()
                });
                CatalogEntry {
                    domain: Arc::clone(domain),
                    templates,
                }
            })
            .collect();
        Self { entries }
    }

    #[cfg(test)]
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.domain.name() == name)
    }

    /// Union of all domains' templates as offered by `auto`. A later domain
    /// replaces an earlier one's entry for the same extension or group, but
    /// the entry keeps its first position.
    fn union(&self) -> (Vec<&SingleTemplate>, Vec<&MultifileGroup>) {
        let mut singles: Vec<&SingleTemplate> = Vec::new();
        let mut groups: Vec<&MultifileGroup> = Vec::new();
        for entry in &self.entries {
            for single in entry.templates.singles() {
                match singles.iter_mut().find(|s| s.extension == single.extension) {
                    Some(slot) => *slot = single,
                    None => singles.push(single),
                }
            }
            for group in entry.templates.groups() {
                match groups.iter_mut().find(|g| g.name() == group.name()) {
                    Some(slot) => *slot = group,
                    None => groups.push(group),
                }
            }
        }
        (singles, groups)
    }

    /// Flags `auto` offers, as they are spelled on the command line.
    pub fn auto_flags(&self) -> Vec<String> {
        let (singles, groups) = self.union();
        plan_flags(singles, groups)
            .into_iter()
            .map(|f| format!("--{}", f.long))
            .collect()
    }
}

// ── Flag planning ───────────────────────────────────────────────────────────

/// One generated output flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFlag {
    pub id: String,
    pub long: String,
    pub short: Option<char>,
    pub help: String,
}

fn single_id(extension: &str) -> String {
    format!("single:{extension}")
}

fn group_id(group: &str) -> String {
    format!("multi:{group}")
}

/// Assign flags in order: singles first, then groups.
pub fn plan_flags<'a>(
    singles: impl IntoIterator<Item = &'a SingleTemplate>,
    groups: impl IntoIterator<Item = &'a MultifileGroup>,
) -> Vec<OutputFlag> {
    let mut used: HashSet<char> = HashSet::new();
    let mut flags = Vec::new();

    for single in singles {
        let long = single.extension.clone();
        if RESERVED_LONGS.contains(&long.as_str()) {
            warn!(flag = %long, "Template extension clashes with a built-in flag, skipping");
            continue;
        }
        let short = pick_short(&single.label.to_lowercase().replace(' ', ""), &mut used);
        flags.push(OutputFlag {
            id: single_id(&single.extension),
            long,
            short,
            help: format!("Generate {} output", single.label),
        });
    }

    for group in groups {
        let outputs: Vec<String> = group
            .templates()
            .iter()
            .map(|t| match t.suffix() {
                Some(s) => format!(".{} (#{s})", t.output_extension()),
                None => format!(".{}", t.output_extension()),
            })
            .collect();
        let short = pick_short(group.name(), &mut used);
        flags.push(OutputFlag {
            id: group_id(group.name()),
            long: format!("{}-multi", group.name()),
            short,
            help: format!("Generate {} outputs ({})", group.description(), outputs.join(", ")),
        });
    }
    flags
}

/// First character of `source` that is alphanumeric, not reserved and not
/// yet taken.
fn pick_short(source: &str, used: &mut HashSet<char>) -> Option<char> {
    let short = source
        .chars()
        .find(|c| c.is_ascii_alphanumeric() && !RESERVED_SHORTS.contains(c) && !used.contains(c))?;
    used.insert(short);
    Some(short)
}

// ── Commands ────────────────────────────────────────────────────────────────

fn generate_command(name: String, about: String, flags: &[OutputFlag]) -> Command {
    let mut cmd = Command::new(name)
        .about(about)
        .arg(
            Arg::new("input")
                .value_name("INPUT")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("Input YAML file"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Output directory (default: ./generated)"),
        );

    for flag in flags {
        let mut arg = Arg::new(flag.id.clone())
            .long(flag.long.clone())
            .action(ArgAction::SetTrue)
            .help(flag.help.clone())
            .help_heading("Output formats");
        if let Some(short) = flag.short {
            arg = arg.short(short);
        }
        cmd = cmd.arg(arg);
    }
    cmd
}

/// Subcommand for one domain.
pub fn domain_command(entry: &CatalogEntry) -> Command {
    let flags = plan_flags(entry.templates.singles(), entry.templates.groups());
    generate_command(
        entry.domain.name().to_string(),
        entry.domain.description().to_string(),
        &flags,
    )
}

/// `auto` carries the union of every domain's flags.
pub fn auto_command(catalog: &Catalog) -> Command {
    let (singles, groups) = catalog.union();
    let flags = plan_flags(singles, groups);
    generate_command(
        AUTO_COMMAND.to_string(),
        "Auto-detect domain from YAML content".to_string(),
        &flags,
    )
}

/// Parsed arguments of a domain or `auto` subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateArgs {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    /// Selected single extensions.
    pub singles: BTreeSet<String>,
    /// Selected group names.
    pub groups: BTreeSet<String>,
}

impl GenerateArgs {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        let mut singles = BTreeSet::new();
        let mut groups = BTreeSet::new();
        for id in matches.ids() {
            let id = id.as_str();
            if let Some(ext) = id.strip_prefix("single:") {
                if matches.get_flag(id) {
                    singles.insert(ext.to_string());
                }
            } else if let Some(group) = id.strip_prefix("multi:") {
                if matches.get_flag(id) {
                    groups.insert(group.to_string());
                }
            }
        }

        Self {
            input: matches.get_one::<PathBuf>("input").cloned().unwrap_or_default(),
            output: matches.get_one::<PathBuf>("output").cloned(),
            singles,
            groups,
        }
    }

    /// No output flag was given.
    pub fn selects_nothing(&self) -> bool {
        self.singles.is_empty() && self.groups.is_empty()
    }
}
