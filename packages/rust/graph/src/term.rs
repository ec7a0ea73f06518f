//! RDF terms and statements.

use serde::{Deserialize, Serialize};

/// The `rdf:type` predicate IRI.
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// A node or value in an RDF graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "termType", rename_all = "camelCase")]
pub enum Term {
    /// A resource identified by an IRI.
    Iri { value: String },
    /// A document-local anonymous resource (`_:label`).
    BlankNode { value: String },
    /// A literal with an optional datatype IRI or language tag.
    Literal {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        datatype: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
}

impl Term {
    pub fn iri(value: impl Into<String>) -> Self {
        Self::Iri {
            value: value.into(),
        }
    }

    pub fn blank(label: impl Into<String>) -> Self {
        Self::BlankNode {
            value: label.into(),
        }
    }

    /// A plain string literal.
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
            datatype: Some(datatype.into()),
            language: None,
        }
    }

    pub fn lang_literal(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
            datatype: None,
            language: Some(language.into()),
        }
    }

    /// The comparable text of the term: the IRI, the blank-node label, or the
    /// literal's lexical form.
    pub fn value(&self) -> &str {
        match self {
            Self::Iri { value } | Self::BlankNode { value } | Self::Literal { value, .. } => value,
        }
    }
}

/// N-Triples rendering.
impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Iri { value } => {
                f.write_str("<")?;
                write_iri_chars(f, value)?;
                f.write_str(">")
            }
            Self::BlankNode { value } => write!(f, "_:{value}"),
            Self::Literal {
                value,
                datatype,
                language,
            } => {
                f.write_str("\"")?;
                for c in value.chars() {
                    match c {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\r' => f.write_str("\\r")?,
                        _ => write!(f, "{c}")?,
                    }
                }
                f.write_str("\"")?;
                if let Some(lang) = language {
                    write!(f, "@{lang}")
                } else if let Some(dt) = datatype {
                    f.write_str("^^<")?;
                    write_iri_chars(f, dt)?;
                    f.write_str(">")
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Characters the IRI grammar forbids are written as `\uXXXX`.
fn write_iri_chars(f: &mut std::fmt::Formatter<'_>, iri: &str) -> std::fmt::Result {
    for c in iri.chars() {
        if c.is_whitespace() || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\') {
            write!(f, "\\u{:04X}", u32::from(c))?;
        } else {
            write!(f, "{c}")?;
        }
    }
    Ok(())
}

/// A (subject, predicate, object) fact, optionally tagged with the named
/// graph (source) it was read from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Statement {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<Term>,
}

impl Statement {
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
            graph: None,
        }
    }

    pub fn in_graph(mut self, graph: Term) -> Self {
        self.graph = Some(graph);
        self
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)?;
        if let Some(graph) = &self.graph {
            write!(f, " {graph}")?;
        }
        f.write_str(" .")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_ignores_term_kind() {
        assert_eq!(Term::iri("http://example.org/no").value(), "http://example.org/no");
        assert_eq!(Term::literal("no").value(), "no");
        assert_eq!(Term::lang_literal("non", "fr").value(), "non");
        assert_eq!(Term::blank("b0").value(), "b0");
    }

    #[test]
    fn literals_compare_structurally() {
        assert_ne!(Term::literal("42"), Term::typed_literal("42", "http://www.w3.org/2001/XMLSchema#integer"));
        assert_ne!(Term::literal("x"), Term::iri("x"));
    }

    #[test]
    fn statement_display() {
        let stmt = Statement::new(
            Term::iri("http://example.org/alice"),
            Term::iri("http://example.org/name"),
            Term::lang_literal("Al\"ice", "en"),
        );
        assert_eq!(
            stmt.to_string(),
            r#"<http://example.org/alice> <http://example.org/name> "Al\"ice"@en ."#
        );
    }
}
