//! Knowledge-model crawler: maps an RDF graph onto a question tree.
//!
//! This crate provides:
//! - [`Crawler`] — recursive, annotation-driven traversal of the knowledge model
//! - [`annotations`] — lookup of the `rdfType` / `rdfProperty` / `rdfValue` tags

pub mod annotations;
pub mod engine;

pub use annotations::RdfAnnotations;
pub use engine::{CrawlSummary, Crawler};
