//! Directory-based loader for user domains.
//!
//! ```text
//! domains/
//! ├── testing/
//! │   ├── domain.toml        ← marker + manifest (required)
//! │   └── templates/
//! │       └── template.txt.j2
//! └── _scratch/              ← ignored: leading underscore
//! ```

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument, trace, warn};
use walkdir::WalkDir;

use embgen_core::{
    application::{LoadError, ports::DomainLoader},
    domain::Domain,
};

use crate::manifest_domain::{MANIFEST_FILE, ManifestDomain};

/// Loads one [`ManifestDomain`] per immediate subdirectory carrying a
/// `domain.toml`, in file-name order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestDomainLoader;

impl ManifestDomainLoader {
    pub fn new() -> Self {
        Self
    }
}

impl DomainLoader for ManifestDomainLoader {
    #[instrument(skip(self), fields(dir = %dir.display()))]
    fn load_all(&self, dir: &Path) -> Vec<Result<Arc<dyn Domain>, LoadError>> {
        if !dir.is_dir() {
            debug!("extra domains directory does not exist");
            return Vec::new();
        }

        let mut candidates = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }
            let path = entry.path();
            let name = entry.file_name().to_string_lossy();
            if name.starts_with('_') {
                trace!(candidate = %name, "ignoring private directory");
                continue;
            }
            if !path.join(MANIFEST_FILE).is_file() {
                trace!(candidate = %name, "no manifest, not a domain");
                continue;
            }

            let loaded = ManifestDomain::from_dir(path).map(|d| Arc::new(d) as Arc<dyn Domain>);
            match &loaded {
                Ok(domain) => debug!(candidate = %name, domain = %domain.name(), "loaded domain"),
                Err(e) => debug!(candidate = %name, reason = %e.reason, "failed to load domain"),
            }
            candidates.push(loaded);
        }
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_domain(root: &Path, dir: &str, manifest: &str) {
        let path = root.join(dir);
        fs::create_dir_all(path.join("templates")).unwrap();
        fs::write(path.join(MANIFEST_FILE), manifest).unwrap();
    }

    fn manifest(name: &str) -> String {
        format!("[domain]\nname = \"{name}\"\ndescription = \"{name} domain\"\n")
    }

    #[test]
    fn missing_dir_yields_nothing() {
        let temp = TempDir::new().unwrap();
        assert!(ManifestDomainLoader.load_all(&temp.path().join("nope")).is_empty());
    }

    #[test]
    fn loads_in_file_name_order() {
        let temp = TempDir::new().unwrap();
        write_domain(temp.path(), "zeta", &manifest("zeta"));
        write_domain(temp.path(), "alpha", &manifest("alpha"));

        let names: Vec<String> = ManifestDomainLoader
            .load_all(temp.path())
            .into_iter()
            .map(|r| r.unwrap().name().to_string())
            .collect();
        assert_eq!(names, ["alpha", "zeta"]);
    }

    #[test]
    fn skips_private_plain_and_unmarked() {
        let temp = TempDir::new().unwrap();
        write_domain(temp.path(), "_private", &manifest("private"));
        fs::create_dir_all(temp.path().join("no_manifest")).unwrap();
        fs::write(temp.path().join("domain.toml"), manifest("top")).unwrap();
        write_domain(temp.path(), "real", &manifest("real"));

        let loaded = ManifestDomainLoader.load_all(temp.path());
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].as_ref().unwrap().name(), "real");
    }

    #[test]
    fn broken_manifest_is_an_error_entry() {
        let temp = TempDir::new().unwrap();
        write_domain(temp.path(), "broken", "[domain\nname = ");
        write_domain(temp.path(), "good", &manifest("good"));

        let loaded = ManifestDomainLoader.load_all(temp.path());
        assert_eq!(loaded.len(), 2);
        let err = loaded[0].as_ref().unwrap_err();
        assert!(err.path.ends_with("broken/domain.toml"));
        assert!(loaded[1].is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn follows_symlinked_domain_directories() {
        let store = TempDir::new().unwrap();
        write_domain(store.path(), "shared", &manifest("shared"));
        let temp = TempDir::new().unwrap();
        std::os::unix::fs::symlink(store.path().join("shared"), temp.path().join("linked")).unwrap();

        let loaded = ManifestDomainLoader.load_all(temp.path());
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].as_ref().unwrap().name(), "shared");
    }
}
