//! Wildcard pattern queries and the in-memory [`Graph`] store.

use std::collections::HashMap;
use std::hash::{BuildHasher, RandomState};

use kmimport_shared::Result;

use crate::term::{Statement, Term};

// ---------------------------------------------------------------------------
// Pattern
// ---------------------------------------------------------------------------

/// A statement pattern. Every `None` field is a wildcard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pattern<'a> {
    pub subject: Option<&'a Term>,
    pub predicate: Option<&'a Term>,
    pub object: Option<&'a Term>,
    pub graph: Option<&'a Term>,
}

impl<'a> Pattern<'a> {
    /// A pattern that matches every statement.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn subject(mut self, subject: Option<&'a Term>) -> Self {
        self.subject = subject;
        self
    }

    pub fn predicate(mut self, predicate: &'a Term) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn object(mut self, object: &'a Term) -> Self {
        self.object = Some(object);
        self
    }

    pub fn graph(mut self, graph: &'a Term) -> Self {
        self.graph = Some(graph);
        self
    }

    /// Check a statement against every constrained field.
    pub fn matches(&self, stmt: &Statement) -> bool {
        fn field(want: Option<&Term>, have: &Term) -> bool {
            want.is_none_or(|w| w == have)
        }

        field(self.subject, &stmt.subject)
            && field(self.predicate, &stmt.predicate)
            && field(self.object, &stmt.object)
            && self
                .graph
                .is_none_or(|g| stmt.graph.as_ref() == Some(g))
    }
}

// ---------------------------------------------------------------------------
// TripleStore
// ---------------------------------------------------------------------------

/// Read-only source of statements.
///
/// Implementations return matches in a stable, store-defined order; the
/// crawler relies on that order for "first match wins" decisions.
pub trait TripleStore {
    /// Every statement matching `pattern`.
    fn statements_matching(&self, pattern: &Pattern<'_>) -> Result<Vec<Statement>>;
}

impl<T: TripleStore + ?Sized> TripleStore for &T {
    fn statements_matching(&self, pattern: &Pattern<'_>) -> Result<Vec<Statement>> {
        (**self).statements_matching(pattern)
    }
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// In-memory statement set in insertion order.
///
/// Queries are linear scans. Duplicate detection keys statement hashes to
/// positions in `statements`, so each statement is stored once.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    statements: Vec<Statement>,
    positions: HashMap<u64, Vec<usize>>,
    hasher: RandomState,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a statement. Returns `false` if an identical statement is already present.
    pub fn insert(&mut self, stmt: Statement) -> bool {
        let slots = self
            .positions
            .entry(self.hasher.hash_one(&stmt))
            .or_default();
        if slots.iter().any(|&idx| self.statements[idx] == stmt) {
            return false;
        }
        slots.push(self.statements.len());
        self.statements.push(stmt);
        true
    }

    /// Convenience for `insert(Statement::new(s, p, o))`.
    pub fn add(&mut self, subject: Term, predicate: Term, object: Term) -> bool {
        self.insert(Statement::new(subject, predicate, object))
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter()
    }
}

impl TripleStore for Graph {
    fn statements_matching(&self, pattern: &Pattern<'_>) -> Result<Vec<Statement>> {
        Ok(self
            .statements
            .iter()
            .filter(|stmt| pattern.matches(stmt))
            .cloned()
            .collect())
    }
}

impl Extend<Statement> for Graph {
    fn extend<I: IntoIterator<Item = Statement>>(&mut self, iter: I) {
        for stmt in iter {
            self.insert(stmt);
        }
    }
}

impl FromIterator<Statement> for Graph {
    fn from_iter<I: IntoIterator<Item = Statement>>(iter: I) -> Self {
        let mut graph = Self::new();
        graph.extend(iter);
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::RDF_TYPE;

    fn ex(local: &str) -> Term {
        Term::iri(format!("http://example.org/{local}"))
    }

    fn people() -> Graph {
        let mut graph = Graph::new();
        graph.add(ex("alice"), Term::iri(RDF_TYPE), ex("Person"));
        graph.add(ex("alice"), ex("name"), Term::literal("Alice"));
        graph.add(ex("bob"), Term::iri(RDF_TYPE), ex("Person"));
        graph.add(ex("alice"), ex("knows"), ex("bob"));
        graph
    }

    #[test]
    fn duplicate_statements_ignored() {
        let mut graph = people();
        assert!(!graph.add(ex("alice"), ex("name"), Term::literal("Alice")));
        assert_eq!(graph.len(), 4);
    }

    #[test]
    fn near_duplicates_are_kept() {
        let mut graph = Graph::new();
        let name = ex("name");
        assert!(graph.add(ex("alice"), name.clone(), Term::literal("Alice")));
        assert!(graph.add(ex("alice"), name.clone(), Term::lang_literal("Alice", "en")));
        assert!(graph.insert(
            Statement::new(ex("alice"), name.clone(), Term::literal("Alice")).in_graph(ex("doc1"))
        ));
        assert!(!graph.insert(
            Statement::new(ex("alice"), name.clone(), Term::literal("Alice")).in_graph(ex("doc1"))
        ));
        assert!(!graph.add(ex("alice"), name, Term::lang_literal("Alice", "en")));

        let graphs: Vec<_> = graph.iter().map(|s| s.graph.clone()).collect();
        assert_eq!(graphs, vec![None, None, Some(ex("doc1"))]);
    }

    #[test]
    fn empty_pattern_matches_everything() {
        let graph = people();
        let all = graph.statements_matching(&Pattern::any()).unwrap();
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn wildcard_subject_in_insertion_order() {
        let graph = people();
        let rdf_type = Term::iri(RDF_TYPE);
        let person = ex("Person");
        let found = graph
            .statements_matching(&Pattern::any().predicate(&rdf_type).object(&person))
            .unwrap();

        let subjects: Vec<_> = found.iter().map(|s| s.subject.value()).collect();
        assert_eq!(
            subjects,
            vec!["http://example.org/alice", "http://example.org/bob"]
        );
    }

    #[test]
    fn bound_subject_and_predicate() {
        let graph = people();
        let alice = ex("alice");
        let name = ex("name");
        let found = graph
            .statements_matching(&Pattern::any().subject(Some(&alice)).predicate(&name))
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].object, Term::literal("Alice"));

        let bob = ex("bob");
        let none = graph
            .statements_matching(&Pattern::any().subject(Some(&bob)).predicate(&name))
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn graph_constraint_requires_tagged_statement() {
        let mut graph = people();
        let source = ex("doc1");
        graph.insert(Statement::new(ex("carol"), ex("name"), Term::literal("Carol")).in_graph(source.clone()));

        let found = graph
            .statements_matching(&Pattern::any().graph(&source))
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].subject, ex("carol"));
    }
}
