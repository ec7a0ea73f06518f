//! Resolution of the RDF mapping annotations on knowledge model nodes.

use kmimport_graph::Term;
use kmimport_km::Annotation;
use kmimport_shared::CrawlConfig;

/// First annotation under `key` with a non-empty value.
pub fn find<'a>(annotations: &'a [Annotation], key: &str) -> Option<&'a str> {
    annotations
        .iter()
        .find(|a| a.key == key && !a.value.is_empty())
        .map(|a| a.value.as_str())
}

/// Reads `rdfType` / `rdfProperty` / `rdfValue` (or whatever keys are
/// configured) and turns them into resource terms.
#[derive(Debug, Clone)]
pub struct RdfAnnotations {
    config: CrawlConfig,
}

impl RdfAnnotations {
    pub fn new(config: CrawlConfig) -> Self {
        Self { config }
    }

    /// Class whose instances become list items.
    pub fn rdf_type(&self, annotations: &[Annotation]) -> Option<Term> {
        self.resource(annotations, &self.config.type_key)
    }

    /// Property read from the current subject.
    pub fn rdf_property(&self, annotations: &[Annotation]) -> Option<Term> {
        self.resource(annotations, &self.config.property_key)
    }

    /// Value an answer or choice stands for.
    pub fn rdf_value(&self, annotations: &[Annotation]) -> Option<Term> {
        self.resource(annotations, &self.config.value_key)
    }

    fn resource(&self, annotations: &[Annotation], key: &str) -> Option<Term> {
        find(annotations, key).map(|value| Term::iri(self.config.expand(value)))
    }
}

impl Default for RdfAnnotations {
    fn default() -> Self {
        Self::new(CrawlConfig::default())
    }
}
