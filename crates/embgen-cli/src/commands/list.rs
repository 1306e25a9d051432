//! Implementation of the `embgen list` command.

use serde::Serialize;

use embgen_core::application::LoadError;

use crate::{
    cli::{
        Catalog, ListArgs, ListFormat,
        domains::{CatalogEntry, plan_flags},
    },
    error::{CliError, CliResult},
    output::OutputManager,
};

pub fn execute(
    args: &ListArgs,
    catalog: &Catalog,
    skipped: &[LoadError],
    output: &OutputManager,
) -> CliResult<()> {
    match args.format {
        ListFormat::Table => {
            output.header("Available domains:")?;
            for line in table_lines(catalog) {
                output.print(&line)?;
            }
            for err in skipped {
                output.warning(&format!("Skipped {}: {}", err.path.display(), err.reason))?;
            }
        }
        ListFormat::Json => {
            let json = to_json(catalog).map_err(|e| CliError::IoError {
                message: "failed to serialise domain list".into(),
                source: e.into(),
            })?;
            output.data(&json)?;
        }
    }
    Ok(())
}

fn table_lines(catalog: &Catalog) -> Vec<String> {
    let mut lines = Vec::new();
    for entry in catalog.entries() {
        lines.push(format!("  {} - {}", entry.domain.name(), entry.domain.description()));
        let flags = plan_flags(entry.templates.singles(), entry.templates.groups());
        if flags.is_empty() {
            lines.push("      (no templates)".into());
        }
        for flag in flags {
            let short = flag.short.map(|c| format!("-{c}, ")).unwrap_or_default();
            lines.push(format!("      {:<18} {}", format!("{short}--{}", flag.long), flag.help));
        }
    }
    lines
}

// ── JSON ──────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct DomainDto<'a> {
    name: &'a str,
    description: &'a str,
    singles: Vec<SingleDto<'a>>,
    groups: Vec<GroupDto<'a>>,
}

#[derive(Serialize)]
struct SingleDto<'a> {
    extension: &'a str,
    label: &'a str,
    template: &'a str,
}

#[derive(Serialize)]
struct GroupDto<'a> {
    name: &'a str,
    description: &'a str,
    outputs: Vec<String>,
}

impl<'a> From<&'a CatalogEntry> for DomainDto<'a> {
    fn from(entry: &'a CatalogEntry) -> Self {
        Self {
            name: entry.domain.name(),
            description: entry.domain.description(),
            singles: entry
                .templates
                .singles()
                .map(|s| SingleDto {
                    extension: &s.extension,
                    label: &s.label,
                    template: &s.template,
                })
                .collect(),
            groups: entry
                .templates
                .groups()
                .map(|g| GroupDto {
                    name: g.name(),
                    description: g.description(),
                    outputs: g.output_extensions(),
                })
                .collect(),
        }
    }
}

fn to_json(catalog: &Catalog) -> serde_json::Result<String> {
    let domains: Vec<DomainDto<'_>> = catalog.entries().iter().map(DomainDto::from).collect();
    serde_json::to_string_pretty(&domains)
}

#[cfg(test)]
mod tests {
    use super::*;
    use embgen_adapters::{LocalFilesystem, ManifestDomainLoader, builtin_domains};
    use embgen_core::application::{DiscoveryOptions, DomainRegistry};
    use serde_json::Value;

    fn builtin_catalog() -> Catalog {
        let registry = DomainRegistry::discover(
            builtin_domains::all(),
            &ManifestDomainLoader::new(),
            &DiscoveryOptions::default(),
        );
        Catalog::build(&registry, &LocalFilesystem::new())
    }

    #[test]
    fn json_lists_builtin_domains() {
        let json: Value = serde_json::from_str(&to_json(&builtin_catalog()).unwrap()).unwrap();
        let names: Vec<&str> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["commands", "registers"]);

        let commands = &json[0];
        assert!(
            commands["singles"]
                .as_array()
                .unwrap()
                .iter()
                .any(|s| s["extension"] == "h")
        );
    }

    #[test]
    fn table_shows_flags_per_domain() {
        let lines = table_lines(&builtin_catalog());
        assert!(lines[0].starts_with("  commands - "));
        assert!(lines.iter().any(|l| l.contains("--h") && l.contains("Generate C Header output")));
        assert!(lines.iter().any(|l| l.contains("--c-multi")));
    }

    #[test]
    fn empty_catalog_has_no_lines() {
        assert!(table_lines(&Catalog::default()).is_empty());
        assert_eq!(to_json(&Catalog::default()).unwrap(), "[]");
    }
}
