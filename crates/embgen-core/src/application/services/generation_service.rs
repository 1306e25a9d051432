//! Generation Service - main application orchestrator.
//!
//! One run is a single linear pass:
//! 1. Parse the YAML input
//! 2. Validate it against the domain
//! 3. Prepare the output directory
//! 4. Render selected single templates
//! 5. Render selected multifile groups
//! 6. Run the domain's post-generate hook
//!
//! Any failure aborts the run. Files already written stay in place.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{Filesystem, TemplateRenderer},
    },
    domain::{Document, Domain, MultifileGroup, SingleTemplate, ValidatedConfig},
    error::EmbgenResult,
};

const INPUT_EXTENSIONS: [&str; 2] = ["yml", "yaml"];

/// Parameters of one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Rendered in this order.
    pub singles: Vec<SingleTemplate>,
    /// Rendered after all singles, in this order.
    pub groups: Vec<MultifileGroup>,
}

impl GenerationRequest {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            singles: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn with_single(mut self, single: SingleTemplate) -> Self {
        self.singles.push(single);
        self
    }

    pub fn with_group(mut self, group: MultifileGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// `true` when nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.singles.is_empty() && self.groups.is_empty()
    }
}

/// Main generation service.
pub struct GenerationService {
    renderer: Box<dyn TemplateRenderer>,
    filesystem: Box<dyn Filesystem>,
}

impl GenerationService {
    pub fn new(renderer: Box<dyn TemplateRenderer>, filesystem: Box<dyn Filesystem>) -> Self {
        Self {
            renderer,
            filesystem,
        }
    }

    /// Generate every selected output for `domain`.
    ///
    /// Returns file names (relative to the output directory) in render order:
    /// singles, then groups, then post-generate extras.
    #[instrument(
        skip_all,
        fields(
            domain = domain.name(),
            input = %request.input.display(),
            output = %request.output.display()
        )
    )]
    pub fn generate(
        &self,
        domain: &dyn Domain,
        request: &GenerationRequest,
    ) -> EmbgenResult<Vec<String>> {
        if request.is_empty() {
            return Err(ApplicationError::NoOutputsSelected.into());
        }

        let input = absolute(&request.input)?;
        let output = absolute(&request.output)?;

        // 1. Parse
        let document = self.parse(&input)?;

        // 2. Validate
        debug!("Validating {} configuration", domain.name());
        let config = domain
            .validate(&document)
            .map_err(|e| ApplicationError::ValidationFailed {
                domain: domain.name().to_string(),
                reason: e.to_string(),
            })?;

        // 3. Prepare output
        self.ensure_output_dir(&output)?;
        info!(output = %output.display(), "Generating into output directory");

        let mut run = Run::new(&output, config.output_filename());

        // 4. Singles
        for single in &request.singles {
            let content = domain.render(&config, &single.template, self.renderer.as_ref())?;
            let filename = single.output_file(&run.output_filename);
            self.write(&mut run, filename, &content)?;
            run.generated.insert(single.extension.clone());
        }

        // 5. Multifile groups
        for group in &request.groups {
            self.render_group(domain, &config, group, &mut run)?;
        }

        // 6. Post-generate
        let extras =
            domain.post_generate(&config, &output, &run.generated, self.filesystem.as_ref())?;
        for extra in &extras {
            debug!(file = %extra, "Post-generate wrote file");
        }
        run.files.extend(extras);

        info!(files = ?run.files, "Generation complete");
        Ok(run.files)
    }

    /// Parse `input` the way [`generate`](Self::generate) does, without
    /// validating it against any domain. Used for detection.
    pub fn load_document(&self, input: &Path) -> EmbgenResult<Document> {
        self.parse(&absolute(input)?)
    }

    fn parse(&self, input: &Path) -> EmbgenResult<Document> {
        let not_found = |reason: &str| ApplicationError::InputNotFound {
            path: input.to_path_buf(),
            reason: reason.to_string(),
        };

        if !self.filesystem.exists(input) {
            return Err(not_found("does not exist").into());
        }
        if !self.filesystem.is_file(input) {
            return Err(not_found("is not a file").into());
        }
        let is_yaml = input
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| INPUT_EXTENSIONS.contains(&e));
        if !is_yaml {
            return Err(not_found("is not a YAML file").into());
        }

        info!(input = %input.display(), "Loading YAML file");
        let content = self.filesystem.read_to_string(input)?;
        serde_yaml::from_str(&content).map_err(|e| {
            ApplicationError::ParseFailed {
                path: input.to_path_buf(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Create `output` when missing. Its parent must already be a directory.
    fn ensure_output_dir(&self, output: &Path) -> EmbgenResult<()> {
        let fail = |reason: &str| -> EmbgenResult<()> {
            Err(ApplicationError::OutputDirNotFound {
                path: output.to_path_buf(),
                reason: reason.to_string(),
            }
            .into())
        };

        if self.filesystem.exists(output) {
            if !self.filesystem.is_dir(output) {
                return fail("exists but is not a directory");
            }
            return Ok(());
        }

        match output.parent() {
            Some(parent) if self.filesystem.is_dir(parent) => {
                debug!(output = %output.display(), "Creating output directory");
                self.filesystem.create_dir_all(output)
            }
            _ => fail("cannot be created because its parent does not exist"),
        }
    }

    fn render_group(
        &self,
        domain: &dyn Domain,
        config: &ValidatedConfig,
        group: &MultifileGroup,
        run: &mut Run,
    ) -> EmbgenResult<()> {
        debug!(group = group.name(), "Rendering multifile group");
        for planned in group.planned_outputs(&run.output_filename) {
            let content = domain.render(config, &planned.template, self.renderer.as_ref())?;
            self.write(run, planned.filename, &content)?;
        }
        run.generated.extend(group.output_extensions());
        Ok(())
    }

    fn write(&self, run: &mut Run, filename: String, content: &str) -> EmbgenResult<()> {
        if !run.seen.insert(filename.clone()) {
            warn!(file = %filename, "Output written twice in one run, keeping the later one");
        }
        let path = run.output.join(&filename);
        self.filesystem.write_file(&path, content)?;
        debug!(file = %filename, "Wrote output");
        run.files.push(filename);
        Ok(())
    }
}

/// Mutable state of one `generate` call.
struct Run {
    output: PathBuf,
    output_filename: String,
    files: Vec<String>,
    seen: HashSet<String>,
    generated: BTreeSet<String>,
}

impl Run {
    fn new(output: &Path, output_filename: String) -> Self {
        Self {
            output: output.to_path_buf(),
            output_filename,
            files: Vec::new(),
            seen: HashSet::new(),
            generated: BTreeSet::new(),
        }
    }
}

fn absolute(path: &Path) -> EmbgenResult<PathBuf> {
    std::path::absolute(path).map_err(|e| {
        ApplicationError::FilesystemError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockFilesystem;
    use crate::domain::{
        BaseConfig, DomainError, RenderContext, TemplateLocation, TemplateSet, ValidationError,
    };
    use crate::error::{EmbgenError, ErrorCategory};
    use serde_json::Map;
    use std::sync::{Arc, Mutex};

    const INPUT: &str = "/in/demo.yml";

    /// Renders `<template>|<output_filename>`.
    struct EchoRenderer;

    impl TemplateRenderer for EchoRenderer {
        fn render(
            &self,
            _location: &TemplateLocation,
            template: &str,
            context: &RenderContext,
        ) -> EmbgenResult<String> {
            Ok(format!("{}|{}", template, context["output_filename"]))
        }
    }

    /// Domain requiring `items`; records what its hook saw.
    #[derive(Default)]
    struct RecordingDomain {
        seen: Mutex<Option<BTreeSet<String>>>,
    }

    impl Domain for RecordingDomain {
        fn name(&self) -> &str {
            "testing"
        }

        fn description(&self) -> &str {
            "Testing domain"
        }

        fn detect(&self, document: &Document) -> Result<bool, DomainError> {
            Ok(document.get("items").is_some())
        }

        fn validate(&self, document: &Document) -> Result<ValidatedConfig, ValidationError> {
            if document.get("items").is_none() {
                return Err(ValidationError::at("items", "field is required"));
            }
            let base: BaseConfig = serde_json::from_value(document.clone())
                .map_err(|e| ValidationError::new(e.to_string()))?;
            Ok(ValidatedConfig::new(base, Map::new())?)
        }

        fn templates_location(&self) -> TemplateLocation {
            TemplateLocation::Embedded(&[])
        }

        fn post_generate(
            &self,
            _config: &ValidatedConfig,
            _output: &Path,
            generated: &BTreeSet<String>,
            _fs: &dyn Filesystem,
        ) -> EmbgenResult<Vec<String>> {
            *self.seen.lock().unwrap() = Some(generated.clone());
            Ok(if generated.contains("py") {
                vec!["demo_base.py".into()]
            } else {
                vec![]
            })
        }
    }

    type Writes = Arc<Mutex<Vec<(PathBuf, String)>>>;

    /// Filesystem with `/in/demo.yml` holding `yaml` and an existing `/out`.
    fn filesystem(yaml: &'static str, writes: Writes) -> MockFilesystem {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().returning(|p| p == Path::new(INPUT));
        fs.expect_is_file().returning(|p| p == Path::new(INPUT));
        fs.expect_is_dir().returning(|p| p == Path::new("/out"));
        fs.expect_read_to_string()
            .returning(move |_| Ok(yaml.to_string()));
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_write_file().returning(move |p, c| {
            writes.lock().unwrap().push((p.to_path_buf(), c.to_string()));
            Ok(())
        });
        fs
    }

    fn service(fs: MockFilesystem) -> GenerationService {
        GenerationService::new(Box::new(EchoRenderer), Box::new(fs))
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new(INPUT, "/out/gen")
    }

    fn templates() -> TemplateSet {
        TemplateSet::classify([
            "template.txt.j2",
            "template.py.j2",
            "template.c_multi.h.j2",
            "template.c_multi.c.j2",
            "template.dat_multi.dat.1.j2",
            "template.dat_multi.dat.2.j2",
        ])
    }

    #[test]
    fn load_document_parses_without_validating() {
        let svc = service(filesystem("name: Demo\nunrelated: 1\n", Writes::default()));
        let doc = svc.load_document(Path::new(INPUT)).unwrap();
        assert_eq!(doc["unrelated"], serde_json::json!(1));
    }

    #[test]
    fn empty_selection_is_rejected_before_any_io() {
        // no expectations: any filesystem call would panic
        let svc = service(MockFilesystem::new());
        let err = svc.generate(&RecordingDomain::default(), &request()).unwrap_err();
        assert!(matches!(
            err,
            EmbgenError::Application(ApplicationError::NoOutputsSelected)
        ));
    }

    #[test]
    fn renders_singles_then_groups_then_extras() {
        let writes = Writes::default();
        let set = templates();
        let domain = RecordingDomain::default();
        let req = request()
            .with_single(set.single("py").unwrap().clone())
            .with_single(set.single("txt").unwrap().clone())
            .with_group(set.group("dat").unwrap().clone())
            .with_group(set.group("c").unwrap().clone());

        let files = service(filesystem("name: Demo\nitems: []\n", writes.clone()))
            .generate(&domain, &req)
            .unwrap();

        assert_eq!(
            files,
            ["demo.py", "demo.txt", "demo_1.dat", "demo_2.dat", "demo.c", "demo.h", "demo_base.py"]
        );
        let writes = writes.lock().unwrap();
        assert_eq!(writes[0].0, Path::new("/out/gen/demo.py"));
        assert_eq!(writes[0].1, "template.py.j2|\"demo\"");
        assert_eq!(writes.len(), 6);

        let seen = domain.seen.lock().unwrap().clone().unwrap();
        let expected: BTreeSet<String> =
            ["py", "txt", "dat", "c", "h"].into_iter().map(String::from).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn hook_sees_generated_not_requested_extensions() {
        let writes = Writes::default();
        let domain = RecordingDomain::default();
        let req = request().with_single(templates().single("txt").unwrap().clone());

        let files = service(filesystem("name: Demo\nitems: []\n", writes))
            .generate(&domain, &req)
            .unwrap();

        assert_eq!(files, ["demo.txt"]);
        let seen = domain.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.into_iter().collect::<Vec<_>>(), ["txt"]);
    }

    #[test]
    fn file_override_names_outputs() {
        let writes = Writes::default();
        let req = request().with_single(templates().single("txt").unwrap().clone());
        let files = service(filesystem("name: Demo\nfile: Custom\nitems: []\n", writes))
            .generate(&RecordingDomain::default(), &req)
            .unwrap();
        assert_eq!(files, ["Custom.txt"]);
    }

    #[test]
    fn validation_failure_names_domain() {
        let req = request().with_single(templates().single("txt").unwrap().clone());
        let err = service(filesystem("name: Demo\n", Writes::default()))
            .generate(&RecordingDomain::default(), &req)
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(err.to_string().contains("Failed to validate testing"));
        assert!(err.to_string().contains("items"));
    }

    #[test]
    fn invalid_yaml_is_parse_failure() {
        let req = request().with_single(templates().single("txt").unwrap().clone());
        let err = service(filesystem("name: [unclosed\n", Writes::default()))
            .generate(&RecordingDomain::default(), &req)
            .unwrap_err();
        assert!(matches!(
            err,
            EmbgenError::Application(ApplicationError::ParseFailed { .. })
        ));
    }

    #[test]
    fn missing_input_is_not_found() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().returning(|_| false);
        let req = GenerationRequest::new("/in/missing.yml", "/out/gen")
            .with_single(templates().single("txt").unwrap().clone());

        let err = service(fs).generate(&RecordingDomain::default(), &req).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn non_yaml_input_is_not_found() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().returning(|_| true);
        fs.expect_is_file().returning(|_| true);
        let req = GenerationRequest::new("/in/demo.json", "/out/gen")
            .with_single(templates().single("txt").unwrap().clone());

        let err = service(fs).generate(&RecordingDomain::default(), &req).unwrap_err();
        assert!(err.to_string().contains("is not a YAML file"));
    }

    #[test]
    fn missing_output_parent_is_not_found() {
        let req = GenerationRequest::new(INPUT, "/nowhere/gen")
            .with_single(templates().single("txt").unwrap().clone());
        let err = service(filesystem("name: Demo\nitems: []\n", Writes::default()))
            .generate(&RecordingDomain::default(), &req)
            .unwrap_err();
        assert!(matches!(
            err,
            EmbgenError::Application(ApplicationError::OutputDirNotFound { .. })
        ));
    }

    #[test]
    fn write_failure_propagates() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().returning(|p| p == Path::new(INPUT));
        fs.expect_is_file().returning(|_| true);
        fs.expect_is_dir().returning(|_| true);
        fs.expect_read_to_string()
            .returning(|_| Ok("name: Demo\nitems: []\n".into()));
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_write_file().times(1).returning(|p, _| {
            Err(ApplicationError::FilesystemError {
                path: p.to_path_buf(),
                reason: "disk full".into(),
            }
            .into())
        });

        let set = templates();
        let req = request()
            .with_single(set.single("txt").unwrap().clone())
            .with_single(set.single("py").unwrap().clone());
        let err = service(fs).generate(&RecordingDomain::default(), &req).unwrap_err();
        assert!(err.to_string().contains("disk full"));
    }
}
