//! Domain Detector - pick the domain a document belongs to.
//!
//! First match in registration order wins. A detector that errors counts as
//! "no match" for that domain only; the error is logged at WARN.

use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::application::{
    ports::DomainLoader,
    services::registry::{DiscoveryOptions, DomainRegistry},
};
use crate::domain::{Document, Domain};

/// First domain in `registry` whose predicate accepts `document`.
#[instrument(skip_all, fields(candidates = registry.len()))]
pub fn detect(registry: &DomainRegistry, document: &Document) -> Option<Arc<dyn Domain>> {
    for domain in registry.iter() {
        match domain.detect(document) {
            Ok(true) => {
                debug!(domain = domain.name(), "Domain detected");
                return Some(Arc::clone(domain));
            }
            Ok(false) => {}
            Err(e) => warn!(
                domain = domain.name(),
                error = %e,
                "Detector failed, treating as no match"
            ),
        }
    }
    debug!("No domain matched the document");
    None
}

/// Run discovery, then [`detect`].
pub fn discover_and_detect(
    builtins: Vec<Arc<dyn Domain>>,
    loader: &dyn DomainLoader,
    options: &DiscoveryOptions,
    document: &Document,
) -> Option<Arc<dyn Domain>> {
    let registry = DomainRegistry::discover(builtins, loader, options);
    detect(&registry, document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::registry::tests::{FixedLoader, StubDomain};
    use serde_json::json;

    fn registry(domains: Vec<Arc<dyn Domain>>) -> DomainRegistry {
        DomainRegistry::discover(domains, &FixedLoader(vec![]), &DiscoveryOptions::default())
    }

    #[test]
    fn first_match_wins() {
        let reg = registry(vec![
            StubDomain::new("commands", "", "commands"),
            StubDomain::new("greedy", "", "name"),
        ]);
        let doc = json!({"name": "Demo", "commands": []});
        assert_eq!(detect(&reg, &doc).unwrap().name(), "commands");

        let doc = json!({"name": "Demo"});
        assert_eq!(detect(&reg, &doc).unwrap().name(), "greedy");
    }

    #[test]
    fn no_match_is_none() {
        let reg = registry(vec![StubDomain::new("commands", "", "commands")]);
        assert!(detect(&reg, &json!({"name": "x", "regmap": []})).is_none());
        assert!(reg.detect(&json!("scalar")).is_none());
    }

    #[test]
    fn failing_detector_does_not_stop_detection() {
        let reg = registry(vec![
            StubDomain::new("flaky", "", "!fail"),
            StubDomain::new("registers", "", "regmap"),
        ]);
        let found = detect(&reg, &json!({"name": "x", "regmap": []})).unwrap();
        assert_eq!(found.name(), "registers");
    }

    #[test]
    fn discover_and_detect_sees_user_domains() {
        let loader = FixedLoader(vec![Ok(StubDomain::new("testing", "", "items"))]);
        let found = discover_and_detect(
            vec![StubDomain::new("commands", "", "commands")],
            &loader,
            &DiscoveryOptions::with_extra_domains_dir("/d"),
            &json!({"name": "x", "items": []}),
        );
        assert_eq!(found.unwrap().name(), "testing");
    }
}
