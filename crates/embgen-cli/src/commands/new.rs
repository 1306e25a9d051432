//! Implementation of the `embgen new` command.
//!
//! Scaffolds a manifest domain that `--domains-dir` can load right away:
//!
//! ```text
//! <location>/<name>/
//! ├── domain.toml
//! └── templates/
//!     └── template.md.j2
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use embgen_adapters::LocalFilesystem;
use embgen_core::application::ports::Filesystem;

use crate::{
    cli::{NewArgs, domains::RESERVED_COMMANDS},
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Words a template expression cannot use as a variable.
const TEMPLATE_KEYWORDS: [&str; 11] = [
    "and", "or", "not", "in", "is", "if", "else", "true", "false", "none", "loop",
];

#[instrument(skip_all, fields(domain = %args.name))]
pub fn execute(args: NewArgs, output: &OutputManager) -> CliResult<()> {
    let name = normalize_name(&args.name)?;
    let location = match args.location.clone() {
        Some(location) => location,
        None => std::env::current_dir()?,
    };

    info!(domain = %name, location = %location.display(), "Creating new domain");
    let created = scaffold(&name, &location, &LocalFilesystem::new())?;

    for file in &created {
        let shown = file.strip_prefix(&location).unwrap_or(file);
        output.success(&format!("Created {}", shown.display()))?;
    }
    output.success(&format!("Domain '{name}' scaffolded"))?;

    output.print("")?;
    output.header("Next steps:")?;
    output.print(&format!("  1. Edit {name}/domain.toml to adjust detection and the schema"))?;
    output.print(&format!("  2. Edit or add templates in {name}/templates/"))?;
    output.print(&format!(
        "  3. Use --domains-dir {} to load this domain",
        location.display()
    ))?;
    Ok(())
}

/// Lowercase; spaces and dashes become underscores. The result must be a
/// letter followed by letters, digits or underscores.
pub fn normalize_name(raw: &str) -> CliResult<String> {
    let name = raw.trim().to_lowercase().replace([' ', '-'], "_");
    let invalid = |reason: &str| CliError::InvalidDomainName {
        name: raw.to_string(),
        reason: reason.to_string(),
    };

    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err(invalid("must start with a letter"));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid("only letters, digits, spaces, dashes and underscores are allowed"));
    }
    if RESERVED_COMMANDS.contains(&name.as_str()) {
        return Err(invalid("name is a built-in subcommand"));
    }
    if TEMPLATE_KEYWORDS.contains(&name.as_str()) {
        return Err(invalid("name is a template keyword"));
    }
    Ok(name)
}

// ── Scaffold ──────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ManifestOut<'a> {
    domain: DomainOut<'a>,
    detect: DetectOut<'a>,
    schema: SchemaOut<'a>,
}

#[derive(Serialize)]
struct DomainOut<'a> {
    name: &'a str,
    description: String,
}

#[derive(Serialize)]
struct DetectOut<'a> {
    all_of: Vec<&'a str>,
}

#[derive(Serialize)]
struct SchemaOut<'a> {
    required: Vec<&'a str>,
    types: BTreeMap<&'a str, &'a str>,
}

fn manifest(name: &str) -> CliResult<String> {
    let manifest = ManifestOut {
        domain: DomainOut {
            name,
            description: format!("{name} domain"),
        },
        detect: DetectOut {
            all_of: vec![name],
        },
        schema: SchemaOut {
            required: vec!["name", name],
            types: BTreeMap::from([(name, "array")]),
        },
    };
    toml::to_string(&manifest).map_err(|e| CliError::ConfigError {
        message: format!("failed to serialise domain.toml: {e}"),
    })
}

fn markdown_template(name: &str) -> String {
    format!(
        "<!-- Generated by embgen on {{{{ generated_on }}}} -->\n\
         # {{{{ name }}}}\n\
         \n\
         {{% for item in {name} %}}\n\
         - {{{{ item }}}}\n\
         {{% endfor %}}\n"
    )
}

/// Write the scaffold for `name` under `location`; returns the created files.
pub fn scaffold(name: &str, location: &Path, fs: &dyn Filesystem) -> CliResult<Vec<PathBuf>> {
    let root = location.join(name);
    if fs.exists(&root) {
        return Err(CliError::DomainExists { path: root });
    }

    let templates = root.join("templates");
    fs.create_dir_all(&templates)?;

    let files = [
        (root.join("domain.toml"), manifest(name)?),
        (templates.join("template.md.j2"), markdown_template(name)),
    ];
    let mut created = Vec::with_capacity(files.len());
    for (path, content) in files {
        fs.write_file(&path, &content)?;
        debug!(path = %path.display(), "Wrote scaffold file");
        created.push(path);
    }
    Ok(created)
}
