//! Template naming grammar and classification.
//!
//! Template identifiers follow one of two shapes once the engine suffix
//! (`.j2` / `.jinja`) is stripped:
//!
//! ```text
//! <prefix>.<group>_multi.<ext>[.<suffix>]   member of multifile group <group>
//! <prefix>.<ext>                            single-file template
//! ```
//!
//! Anything else is not a template and is ignored. Classification only looks
//! at names; no template content is read.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::domain::error::DomainError;

/// Engine suffixes that mark a file as a template.
pub const TEMPLATE_SUFFIXES: [&str; 2] = [".j2", ".jinja"];

const MULTI_MARKER: &str = "_multi";

// ── Identifier parsing ──────────────────────────────────────────────────

/// Parsed form of a template identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateName {
    pub group: Option<String>,
    pub extension: String,
    pub suffix: Option<String>,
}

impl TemplateName {
    fn not_a_template() -> Self {
        Self {
            group: None,
            extension: String::new(),
            suffix: None,
        }
    }

    /// `false` for identifiers outside the grammar.
    pub fn is_template(&self) -> bool {
        !self.extension.is_empty()
    }
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_')
}

fn strip_template_suffix(identifier: &str) -> Option<&str> {
    TEMPLATE_SUFFIXES
        .iter()
        .find_map(|suffix| identifier.strip_suffix(suffix))
}

/// `Some(group)` when `segment` is `<group>_multi`.
fn multi_group(segment: &str) -> Option<&str> {
    segment
        .strip_suffix(MULTI_MARKER)
        .filter(|group| is_token(group))
}

fn has_prefix(segments: &[&str]) -> bool {
    !segments.is_empty() && !segments.join(".").is_empty()
}

/// Classify a template identifier.
///
/// Pure function of the string: `"template.c_multi.h.j2"` is
/// `(Some("c"), "h", None)`, `"readme.txt"` yields an empty extension.
pub fn classify_name(identifier: &str) -> TemplateName {
    let Some(base) = strip_template_suffix(identifier) else {
        return TemplateName::not_a_template();
    };
    let segments: Vec<&str> = base.split('.').collect();
    let n = segments.len();

    // <prefix>.<group>_multi.<ext>
    if n >= 3 && has_prefix(&segments[..n - 2]) && is_token(segments[n - 1]) {
        if let Some(group) = multi_group(segments[n - 2]) {
            return TemplateName {
                group: Some(group.to_string()),
                extension: segments[n - 1].to_string(),
                suffix: None,
            };
        }
    }

    // <prefix>.<group>_multi.<ext>.<suffix>
    if n >= 4
        && has_prefix(&segments[..n - 3])
        && is_token(segments[n - 2])
        && is_token(segments[n - 1])
    {
        if let Some(group) = multi_group(segments[n - 3]) {
            return TemplateName {
                group: Some(group.to_string()),
                extension: segments[n - 2].to_string(),
                suffix: Some(segments[n - 1].to_string()),
            };
        }
    }

    // <prefix>.<ext>
    if n >= 2 && has_prefix(&segments[..n - 1]) && is_token(segments[n - 1]) {
        return TemplateName {
            group: None,
            extension: segments[n - 1].to_string(),
            suffix: None,
        };
    }

    TemplateName::not_a_template()
}

/// Human-readable label for an output extension.
pub fn file_type(extension: &str) -> &'static str {
    match extension {
        "md" => "Markdown",
        "py" => "Python",
        "yml" => "YAML",
        "json" => "JSON",
        "tex" => "LaTeX",
        "typ" => "Typst",
        "h" => "C Header",
        "c" => "C Source",
        "rs" => "Rust",
        "txt" => "Text",
        "html" => "HTML",
        "sv" => "SystemVerilog",
        "v" => "Verilog",
        _ => "Unknown",
    }
}

// ── Descriptors ─────────────────────────────────────────────────────────

/// One physical template.
///
/// A descriptor without a group never carries a suffix; constructors
/// enforce it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateDescriptor {
    filename: String,
    output_extension: String,
    group: Option<String>,
    suffix: Option<String>,
}

impl TemplateDescriptor {
    pub fn new(
        filename: impl Into<String>,
        output_extension: impl Into<String>,
        group: Option<String>,
        suffix: Option<String>,
    ) -> Result<Self, DomainError> {
        let filename = filename.into();
        if group.is_none() && suffix.is_some() {
            return Err(DomainError::SuffixWithoutGroup { filename });
        }
        Ok(Self {
            filename,
            output_extension: output_extension.into(),
            group,
            suffix,
        })
    }

    pub fn single(filename: impl Into<String>, output_extension: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            output_extension: output_extension.into(),
            group: None,
            suffix: None,
        }
    }

    /// Parse an identifier; `None` when it is not a template.
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        let parsed = classify_name(identifier);
        if !parsed.is_template() {
            return None;
        }
        Some(Self {
            filename: identifier.to_string(),
            output_extension: parsed.extension,
            group: parsed.group,
            suffix: parsed.suffix,
        })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn output_extension(&self) -> &str {
        &self.output_extension
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    fn sort_key(&self) -> (&str, &str) {
        (&self.output_extension, self.suffix.as_deref().unwrap_or(""))
    }
}

/// A single-file template selectable by extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SingleTemplate {
    pub extension: String,
    pub label: String,
    pub template: String,
}

impl SingleTemplate {
    pub fn new(extension: impl Into<String>, template: impl Into<String>) -> Self {
        let extension = extension.into();
        Self {
            label: file_type(&extension).to_string(),
            extension,
            template: template.into(),
        }
    }

    /// `<output_filename>.<ext>`
    pub fn output_file(&self, output_filename: &str) -> String {
        format!("{}.{}", output_filename, self.extension)
    }
}

// ── Multifile groups ────────────────────────────────────────────────────

/// One file a group will write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedOutput {
    pub template: String,
    pub extension: String,
    pub filename: String,
}

/// Templates that together produce correlated outputs.
///
/// Descriptors are kept sorted by `(extension, suffix or "")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultifileGroup {
    name: String,
    description: String,
    templates: Vec<TemplateDescriptor>,
}

impl MultifileGroup {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            description: format!("{} Multi-file", name.to_uppercase()),
            name,
            templates: Vec::new(),
        }
    }

    /// Build a group from descriptors; every descriptor must belong to it.
    pub fn from_descriptors(
        name: impl Into<String>,
        descriptors: impl IntoIterator<Item = TemplateDescriptor>,
    ) -> Result<Self, DomainError> {
        let mut group = Self::new(name);
        for descriptor in descriptors {
            if descriptor.group() != Some(group.name.as_str()) {
                return Err(DomainError::GroupMismatch {
                    filename: descriptor.filename,
                    group: group.name,
                });
            }
            group.templates.push(descriptor);
        }
        group.sort();
        Ok(group)
    }

    fn sort(&mut self) {
        self.templates.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn templates(&self) -> &[TemplateDescriptor] {
        &self.templates
    }

    /// Distinct extensions, in enumeration order.
    pub fn output_extensions(&self) -> Vec<String> {
        let mut exts: Vec<String> = Vec::new();
        for t in &self.templates {
            if !exts.iter().any(|e| e == t.output_extension()) {
                exts.push(t.output_extension.clone());
            }
        }
        exts
    }

    /// Output file names for every member, in enumeration order.
    ///
    /// Explicit suffixes are used verbatim. An unsuffixed member is numbered
    /// when more than one member shares its extension; the counter only
    /// advances over unsuffixed members and skips numbers an explicit
    /// suffix of the same extension already claims.
    pub fn planned_outputs(&self, output_filename: &str) -> Vec<PlannedOutput> {
        let mut per_ext: HashMap<&str, usize> = HashMap::new();
        let mut claimed: HashSet<(&str, &str)> = HashSet::new();
        for t in &self.templates {
            *per_ext.entry(t.output_extension()).or_default() += 1;
            if let Some(s) = t.suffix() {
                claimed.insert((t.output_extension(), s));
            }
        }

        let mut counters: HashMap<&str, usize> = HashMap::new();
        self.templates
            .iter()
            .map(|t| {
                let ext = t.output_extension();
                let suffix = match t.suffix() {
                    Some(s) => Some(s.to_string()),
                    None => {
                        let n = counters.entry(ext).or_default();
                        *n += 1;
                        while claimed.contains(&(ext, n.to_string().as_str())) {
                            *n += 1;
                        }
                        (per_ext[ext] > 1).then(|| n.to_string())
                    }
                };
                let filename = match suffix {
                    Some(s) => format!("{output_filename}_{s}.{ext}"),
                    None => format!("{output_filename}.{ext}"),
                };
                PlannedOutput {
                    template: t.filename.clone(),
                    extension: ext.to_string(),
                    filename,
                }
            })
            .collect()
    }
}

// ── Classification ──────────────────────────────────────────────────────

/// Partition of a domain's templates into singles and multifile groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateSet {
    singles: BTreeMap<String, SingleTemplate>,
    groups: BTreeMap<String, MultifileGroup>,
}

impl TemplateSet {
    /// Classify a flat list of identifiers.
    ///
    /// Names are sorted first, so when two single templates produce the same
    /// extension the lexicographically greatest identifier wins.
    pub fn classify<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: Vec<String> = names.into_iter().map(|s| s.as_ref().to_string()).collect();
        names.sort();

        let mut set = Self::default();
        for name in &names {
            let Some(descriptor) = TemplateDescriptor::from_identifier(name) else {
                continue;
            };
            match descriptor.group.clone() {
                None => {
                    let single =
                        SingleTemplate::new(descriptor.output_extension, descriptor.filename);
                    set.singles.insert(single.extension.clone(), single);
                }
                Some(group) => set
                    .groups
                    .entry(group.clone())
                    .or_insert_with(|| MultifileGroup::new(group))
                    .templates
                    .push(descriptor),
            }
        }
        for group in set.groups.values_mut() {
            group.sort();
        }
        set
    }

    pub fn single(&self, extension: &str) -> Option<&SingleTemplate> {
        self.singles.get(extension)
    }

    pub fn singles(&self) -> impl Iterator<Item = &SingleTemplate> {
        self.singles.values()
    }

    pub fn group(&self, name: &str) -> Option<&MultifileGroup> {
        self.groups.get(name)
    }

    pub fn groups(&self) -> impl Iterator<Item = &MultifileGroup> {
        self.groups.values()
    }

    pub fn is_empty(&self) -> bool {
        self.singles.is_empty() && self.groups.is_empty()
    }
}
