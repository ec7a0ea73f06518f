//! RDF graph model and the triple-store boundary consumed by the crawler.
//!
//! This crate provides:
//! - [`Term`] and [`Statement`] — the RDF data model
//! - [`Pattern`] and [`TripleStore`] — wildcard pattern queries
//! - [`Graph`] — an in-memory, insertion-ordered store
//! - [`ntriples`] — N-Triples / N-Quads reader

pub mod ntriples;
pub mod store;
pub mod term;

pub use store::{Graph, Pattern, TripleStore};
pub use term::{RDF_TYPE, Statement, Term};
