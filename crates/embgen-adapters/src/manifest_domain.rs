//! Domains described by a `domain.toml` manifest.
//!
//! A manifest domain has no code of its own: detection is a key-presence
//! rule, validation is a required-key and JSON-type check, and the
//! post-generate hook copies companion files when a given extension was
//! produced. The whole document becomes the render context.
//!
//! # `domain.toml` format
//!
//! ```toml
//! [domain]
//! name = "testing"
//! description = "Testing domain"
//! templates = "templates"          # optional, relative to the domain dir
//!
//! [detect]
//! all_of = ["items"]
//! none_of = ["commands", "regmap"]
//!
//! [schema]
//! required = ["items"]
//!
//! [schema.types]
//! items = "array"
//!
//! [[post_generate]]
//! when = "txt"
//! source = "testing_helper.txt"
//! target = "{output_filename}_helper.txt"   # optional, defaults to source
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use embgen_core::{
    application::{LoadError, ports::Filesystem},
    domain::{
        BaseConfig, Document, Domain, DomainError, TemplateLocation, ValidatedConfig,
        ValidationError, copy_companion,
    },
    error::EmbgenResult,
};

/// Marker file that turns a directory into a domain candidate.
pub const MANIFEST_FILE: &str = "domain.toml";

const DEFAULT_TEMPLATES_DIR: &str = "templates";
const OUTPUT_FILENAME_PLACEHOLDER: &str = "{output_filename}";

// ── Manifest types ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub domain: DomainSection,
    #[serde(default)]
    pub detect: DetectSection,
    #[serde(default)]
    pub schema: SchemaSection,
    #[serde(default)]
    pub post_generate: Vec<CompanionRule>,
}

/// `[domain]`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DomainSection {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Templates directory relative to the domain directory.
    pub templates: Option<String>,
}

/// `[detect]`. No keys at all means the domain never matches.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetectSection {
    #[serde(default)]
    pub all_of: Vec<String>,
    #[serde(default)]
    pub none_of: Vec<String>,
}

impl DetectSection {
    fn is_empty(&self) -> bool {
        self.all_of.is_empty() && self.none_of.is_empty()
    }

    fn matches(&self, map: &serde_json::Map<String, Value>) -> bool {
        !self.is_empty()
            && self.all_of.iter().all(|k| map.contains_key(k))
            && !self.none_of.iter().any(|k| map.contains_key(k))
    }
}

/// `[schema]`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaSection {
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub types: BTreeMap<String, JsonType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl JsonType {
    fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

/// One `[[post_generate]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompanionRule {
    /// Extension that must have been generated.
    pub when: String,
    /// File name inside the templates directory.
    pub source: String,
    pub target: Option<String>,
}

impl CompanionRule {
    fn target_name(&self, output_filename: &str) -> String {
        self.target
            .as_deref()
            .unwrap_or(&self.source)
            .replace(OUTPUT_FILENAME_PLACEHOLDER, output_filename)
    }
}

// ── Domain ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ManifestDomain {
    manifest: Manifest,
    templates_dir: PathBuf,
}

impl ManifestDomain {
    /// Read `dir/domain.toml`.
    pub fn from_dir(dir: &Path) -> Result<Self, LoadError> {
        let path = dir.join(MANIFEST_FILE);
        let content = fs::read_to_string(&path).map_err(|e| LoadError::new(&path, e.to_string()))?;
        Self::from_manifest_str(dir, &content).map_err(|reason| LoadError::new(&path, reason))
    }

    /// Parse manifest text for a domain rooted at `dir`.
    pub fn from_manifest_str(dir: &Path, content: &str) -> Result<Self, String> {
        let manifest: Manifest = toml::from_str(content).map_err(|e| e.to_string())?;

        for rule in &manifest.post_generate {
            if !is_plain_file_name(&rule.source) {
                return Err(format!("post_generate source '{}' must be a file name", rule.source));
            }
            if let Some(target) = &rule.target {
                if !is_plain_file_name(target) {
                    return Err(format!("post_generate target '{target}' must be a file name"));
                }
            }
        }

        let templates = manifest.domain.templates.as_deref().unwrap_or(DEFAULT_TEMPLATES_DIR);
        let templates_dir = dir.join(templates);
        debug!(domain = %manifest.domain.name, templates = %templates_dir.display(), "parsed manifest");
        Ok(Self {
            manifest,
            templates_dir,
        })
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }
}

impl Domain for ManifestDomain {
    fn name(&self) -> &str {
        &self.manifest.domain.name
    }

    fn description(&self) -> &str {
        &self.manifest.domain.description
    }

    fn detect(&self, document: &Document) -> Result<bool, DomainError> {
        Ok(document
            .as_object()
            .is_some_and(|map| self.manifest.detect.matches(map)))
    }

    fn validate(&self, document: &Document) -> Result<ValidatedConfig, ValidationError> {
        let Some(map) = document.as_object() else {
            return Err(ValidationError::new("input document must be a mapping"));
        };

        let schema = &self.manifest.schema;
        if let Some(missing) = schema.required.iter().find(|k| !map.contains_key(*k)) {
            return Err(ValidationError::at(missing.as_str(), "field required"));
        }
        for (key, kind) in &schema.types {
            if let Some(value) = map.get(key) {
                if !kind.matches(value) {
                    return Err(ValidationError::at(
                        key.as_str(),
                        format!("expected {}", kind.as_str()),
                    ));
                }
            }
        }

        let base: BaseConfig = serde_json::from_value(document.clone())
            .map_err(|e| ValidationError::new(e.to_string()))?;
        Ok(ValidatedConfig::new(base, map.clone())?)
    }

    fn templates_location(&self) -> TemplateLocation {
        TemplateLocation::Directory(self.templates_dir.clone())
    }

    fn post_generate(
        &self,
        config: &ValidatedConfig,
        output: &Path,
        generated: &BTreeSet<String>,
        fs: &dyn Filesystem,
    ) -> EmbgenResult<Vec<String>> {
        let output_filename = config.output_filename();
        let mut written = Vec::new();
        for rule in self
            .manifest
            .post_generate
            .iter()
            .filter(|r| generated.contains(&r.when))
        {
            if !fs.is_file(&self.templates_dir.join(&rule.source)) {
                warn!(domain = %self.name(), source = %rule.source, "companion file not found, skipping");
                continue;
            }
            let target = rule.target_name(&output_filename);
            written.push(copy_companion(self, &rule.source, &target, output, fs)?);
        }
        Ok(written)
    }
}

fn is_plain_file_name(name: &str) -> bool {
    if name.contains(OUTPUT_FILENAME_PLACEHOLDER) {
        return is_plain_file_name(&name.replace(OUTPUT_FILENAME_PLACEHOLDER, "x"));
    }
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}
