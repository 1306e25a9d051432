//! Domain Registry - the name → domain table for one run.
//!
//! Built-in domains come from a static list; user domains are loaded from an
//! optional directory through the [`DomainLoader`] port and replace built-ins
//! of the same name in place.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::application::{LoadError, ports::DomainLoader};
use crate::domain::{Document, Domain};

/// Discovery parameters, resolved once by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// Additional domains directory (CLI flag, else `EMBGEN_DOMAINS_DIR`).
    pub extra_domains_dir: Option<PathBuf>,
}

impl DiscoveryOptions {
    pub fn with_extra_domains_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            extra_domains_dir: Some(dir.into()),
        }
    }
}

/// Insertion-ordered domain table.
#[derive(Default)]
pub struct DomainRegistry {
    domains: Vec<Arc<dyn Domain>>,
    skipped: Vec<LoadError>,
}

impl DomainRegistry {
    /// Discover domains: built-ins first, then the extra directory if any.
    ///
    /// A candidate that fails to load is logged and recorded in
    /// [`skipped`](Self::skipped); discovery always completes.
    #[instrument(skip_all, fields(extra = ?options.extra_domains_dir))]
    pub fn discover(
        builtins: Vec<Arc<dyn Domain>>,
        loader: &dyn DomainLoader,
        options: &DiscoveryOptions,
    ) -> Self {
        let mut registry = Self::default();

        for domain in builtins {
            registry.accept(Ok(domain), Path::new("<builtin>"));
        }

        if let Some(dir) = &options.extra_domains_dir {
            debug!(dir = %dir.display(), "Scanning user domains directory");
            for candidate in loader.load_all(dir) {
                registry.accept(candidate, dir);
            }
        }

        info!(
            domains = registry.domains.len(),
            skipped = registry.skipped.len(),
            "Domain discovery complete"
        );
        registry
    }

    fn accept(&mut self, candidate: Result<Arc<dyn Domain>, LoadError>, origin: &Path) {
        let domain = match candidate {
            Ok(domain) if domain.name().is_empty() => {
                self.skip(LoadError::new(origin, "domain name cannot be empty"));
                return;
            }
            Ok(domain) => domain,
            Err(err) => {
                self.skip(err);
                return;
            }
        };

        match self.domains.iter().position(|d| d.name() == domain.name()) {
            Some(slot) => {
                debug!(domain = domain.name(), "User domain overrides existing entry");
                self.domains[slot] = domain;
            }
            None => {
                debug!(domain = domain.name(), "Registered domain");
                self.domains.push(domain);
            }
        }
    }

    fn skip(&mut self, err: LoadError) {
        warn!(
            path = %err.path.display(),
            reason = %err.reason,
            "Skipping domain candidate due to load error"
        );
        self.skipped.push(err);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Domain>> {
        self.domains.iter().find(|d| d.name() == name)
    }

    /// Domains in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Domain>> {
        self.domains.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.domains.iter().map(|d| d.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Candidates rejected during discovery.
    pub fn skipped(&self) -> &[LoadError] {
        &self.skipped
    }

    /// First domain in registration order that claims `document`.
    pub fn detect(&self, document: &Document) -> Option<Arc<dyn Domain>> {
        super::detection::detect(self, document)
    }
}

impl std::fmt::Debug for DomainRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainRegistry")
            .field("domains", &self.names())
            .field("skipped", &self.skipped)
            .finish()
    }
}
