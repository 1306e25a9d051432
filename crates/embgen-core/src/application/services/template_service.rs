//! Template Service - what a domain can generate.
//!
//! Lists template names from a domain's location and hands them to the
//! classifier. Only names are inspected.

use tracing::{debug, instrument};

use crate::{
    application::ports::Filesystem,
    domain::{Domain, TemplateLocation, TemplateSet},
    error::EmbgenResult,
};

/// Service for template discovery.
pub struct TemplateService<'a> {
    filesystem: &'a dyn Filesystem,
}

impl<'a> TemplateService<'a> {
    pub fn new(filesystem: &'a dyn Filesystem) -> Self {
        Self { filesystem }
    }

    /// Classify the templates of `domain`.
    #[instrument(skip_all, fields(domain = domain.name()))]
    pub fn discover(&self, domain: &dyn Domain) -> EmbgenResult<TemplateSet> {
        self.discover_at(&domain.templates_location())
    }

    /// Classify the templates at `location`. A missing directory is empty.
    pub fn discover_at(&self, location: &TemplateLocation) -> EmbgenResult<TemplateSet> {
        let names = match location {
            TemplateLocation::Embedded(entries) => {
                entries.iter().map(|e| e.name.to_string()).collect()
            }
            TemplateLocation::Directory(dir) => {
                if !self.filesystem.is_dir(dir) {
                    debug!(dir = %dir.display(), "Template directory missing");
                    return Ok(TemplateSet::default());
                }
                self.filesystem.list_dir(dir)?
            }
        };

        let set = TemplateSet::classify(names);
        debug!(
            singles = set.singles().count(),
            groups = set.groups().count(),
            "Templates classified"
        );
        Ok(set)
    }
}
