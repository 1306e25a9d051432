//! Validated configuration model.
//!
//! Every domain produces a [`ValidatedConfig`]: the common [`BaseConfig`]
//! fields plus whatever domain-specific data its schema accepted.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::error::DomainError;

/// Variables handed to the template engine.
pub type RenderContext = Map<String, Value>;

/// Fields every input document carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl BaseConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Base name of every generated file: `file` verbatim when set,
    /// otherwise the lowercased `name`.
    pub fn output_filename(&self) -> String {
        match self.file.as_deref() {
            Some(file) if !file.is_empty() => file.to_string(),
            _ => self.name.to_lowercase(),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidOutputFilename {
                filename: self.name.clone(),
                reason: "`name` cannot be empty".into(),
            });
        }

        let filename = self.output_filename();
        let reason = if filename.trim().is_empty() {
            Some("output filename cannot be empty")
        } else if filename.contains('/') || filename.contains('\\') {
            Some("output filename cannot contain path separators")
        } else if filename == "." || filename == ".." {
            Some("output filename cannot be a relative directory reference")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(DomainError::InvalidOutputFilename {
                filename,
                reason: reason.into(),
            }),
            None => Ok(()),
        }
    }
}

/// Result of a successful domain validation. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConfig {
    base: BaseConfig,
    data: Map<String, Value>,
}

impl ValidatedConfig {
    /// Build a config after checking the base fields.
    pub fn new(base: BaseConfig, data: Map<String, Value>) -> Result<Self, DomainError> {
        base.validate()?;
        Ok(Self { base, data })
    }

    pub fn base(&self) -> &BaseConfig {
        &self.base
    }

    pub fn name(&self) -> &str {
        &self.base.name
    }

    pub fn output_filename(&self) -> String {
        self.base.output_filename()
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Domain data with `name`, `file` and `output_filename` merged in.
    /// The base fields win over same-named domain keys.
    pub fn render_context(&self) -> RenderContext {
        let mut ctx = self.data.clone();
        ctx.insert("name".into(), Value::String(self.base.name.clone()));
        ctx.insert(
            "file".into(),
            self.base
                .file
                .clone()
                .map(Value::String)
                .unwrap_or(Value::Null),
        );
        ctx.insert(
            "output_filename".into(),
            Value::String(self.output_filename()),
        );
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn output_filename_defaults_to_lowercased_name() {
        assert_eq!(BaseConfig::new("DemoBoard").output_filename(), "demoboard");
        assert_eq!(BaseConfig::new("Demo").output_filename(), "demo");
    }

    #[test]
    fn output_filename_keeps_file_casing() {
        let cfg = BaseConfig::new("Demo").with_file("MyCommands");
        assert_eq!(cfg.output_filename(), "MyCommands");
    }

    #[test]
    fn empty_file_falls_back_to_name() {
        let cfg = BaseConfig::new("Demo").with_file("");
        assert_eq!(cfg.output_filename(), "demo");
    }

    #[test]
    fn rejects_unsafe_output_filenames() {
        for file in ["a/b", "a\\b", ".", ".."] {
            let err = BaseConfig::new("Demo").with_file(file).validate().unwrap_err();
            assert!(matches!(err, DomainError::InvalidOutputFilename { .. }), "{file}");
        }
        assert!(BaseConfig::new("  ").validate().is_err());
    }

    #[test]
    fn deserializes_from_document() {
        let cfg: BaseConfig = serde_json::from_value(json!({"name": "X", "extra": 1})).unwrap();
        assert_eq!(cfg, BaseConfig::new("X"));
    }

    #[test]
    fn render_context_merges_base_fields() {
        let mut data = Map::new();
        data.insert("commands".into(), json!([]));
        data.insert("name".into(), json!("shadowed"));
        let cfg = ValidatedConfig::new(BaseConfig::new("Demo"), data).unwrap();

        let ctx = cfg.render_context();
        assert_eq!(ctx["name"], json!("Demo"));
        assert_eq!(ctx["file"], Value::Null);
        assert_eq!(ctx["output_filename"], json!("demo"));
        assert_eq!(ctx["commands"], json!([]));
    }
}
