//! Jinja renderer backed by `minijinja`.
//!
//! Directory locations are served through `path_loader`, so templates may
//! `{% include %}` or `{% extends %}` siblings. Embedded locations register
//! every entry ending in a template suffix.

use chrono::Local;
use minijinja::{AutoEscape, Environment, Error as JinjaError};
use tracing::{instrument, trace};

use embgen_core::{
    application::{ApplicationError, ports::TemplateRenderer},
    domain::{RenderContext, TEMPLATE_SUFFIXES, TemplateLocation},
    error::{EmbgenError, EmbgenResult},
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Renderer with `trim_blocks` and `lstrip_blocks` enabled and a
/// `generated_on` global.
#[derive(Debug, Clone, Default)]
pub struct JinjaRenderer {
    generated_on: Option<String>,
}

impl JinjaRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin `generated_on` instead of using the current local time.
    pub fn with_generated_on(mut self, stamp: impl Into<String>) -> Self {
        self.generated_on = Some(stamp.into());
        self
    }

    fn environment(&self, location: &TemplateLocation) -> EmbgenResult<Environment<'static>> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        // generated sources are never HTML, whatever their extension
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.add_filter("hex", hex);
        env.add_filter("macro", macro_case);
        env.add_filter("pascal", pascal_case);

        let stamp = self
            .generated_on
            .clone()
            .unwrap_or_else(|| Local::now().format(TIMESTAMP_FORMAT).to_string());
        env.add_global("generated_on", stamp);

        match location {
            TemplateLocation::Directory(dir) => env.set_loader(minijinja::path_loader(dir)),
            TemplateLocation::Embedded(entries) => {
                for entry in entries.iter().filter(|e| is_template(e.name)) {
                    env.add_template(entry.name, entry.source)
                        .map_err(|e| render_error(entry.name, e))?;
                }
            }
        }
        Ok(env)
    }
}

impl TemplateRenderer for JinjaRenderer {
    #[instrument(skip_all, fields(template = template))]
    fn render(
        &self,
        location: &TemplateLocation,
        template: &str,
        context: &RenderContext,
    ) -> EmbgenResult<String> {
        let env = self.environment(location)?;
        let tmpl = env
            .get_template(template)
            .map_err(|e| render_error(template, e))?;
        let out = tmpl.render(context).map_err(|e| render_error(template, e))?;
        trace!(bytes = out.len(), "Rendered template");
        Ok(out)
    }
}

fn is_template(name: &str) -> bool {
    TEMPLATE_SUFFIXES.iter().any(|s| name.ends_with(s))
}

/// `{{ 16 | hex(4) }}` → `0x0010`
fn hex(value: i64, width: Option<usize>) -> String {
    format!("0x{:0w$X}", value, w = width.unwrap_or(0))
}

/// `"my-board v2"` → `MY_BOARD_V2`
fn macro_case(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect()
}

/// `"set_led mode"` → `SetLedMode`
fn pascal_case(value: &str) -> String {
    value
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

fn render_error(template: &str, err: JinjaError) -> EmbgenError {
    let mut reason = err.to_string();
    if let Some(detail) = err.detail() {
        if !reason.contains(detail) {
            reason = format!("{reason} ({detail})");
        }
    }
    ApplicationError::RenderingFailed {
        template: template.to_string(),
        reason,
    }
    .into()
}
