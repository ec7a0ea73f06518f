//! N-Triples and N-Quads reader.
//!
//! Line-based, one statement per line:
//! - `<subject> <predicate> <object> .`
//! - `<subject> <predicate> <object> <graph> .` (N-Quads)
//!
//! Subjects and graph labels may be blank nodes (`_:b0`); objects may also be
//! literals (`"text"`, `"text"@en`, `"42"^^<http://www.w3.org/2001/XMLSchema#integer>`).
//!
//! Reference: <https://www.w3.org/TR/n-triples/>, <https://www.w3.org/TR/n-quads/>

use std::path::Path;

use kmimport_shared::{ImportError, Result};
use tracing::debug;

use crate::store::Graph;
use crate::term::{Statement, Term};

/// Parse an N-Triples / N-Quads document into a [`Graph`].
///
/// Any malformed line aborts the whole parse with [`ImportError::Parse`].
pub fn parse(input: &str) -> Result<Graph> {
    let mut graph = Graph::new();
    let mut duplicates = 0usize;

    for (idx, line) in input.lines().enumerate() {
        if let Some(stmt) = parse_line(line, idx + 1)? {
            if !graph.insert(stmt) {
                duplicates += 1;
            }
        }
    }

    debug!(statements = graph.len(), duplicates, "parsed graph");
    Ok(graph)
}

/// Read and parse a graph file.
pub fn read_file(path: &Path) -> Result<Graph> {
    let content = std::fs::read_to_string(path).map_err(|e| ImportError::io(path, e))?;
    parse(&content)
}

/// Parse one line. Blank lines and comment lines yield `None`.
pub fn parse_line(line: &str, line_no: usize) -> Result<Option<Statement>> {
    let mut cursor = Cursor::new(line, line_no);
    cursor.skip_ws();
    if cursor.at_end() || cursor.peek() == Some('#') {
        return Ok(None);
    }

    let subject = match cursor.peek() {
        Some('<') => cursor.iri()?,
        Some('_') => cursor.blank_node()?,
        _ => return Err(cursor.error("subject must be an IRI or blank node")),
    };
    cursor.skip_ws();

    let predicate = match cursor.peek() {
        Some('<') => cursor.iri()?,
        _ => return Err(cursor.error("predicate must be an IRI")),
    };
    cursor.skip_ws();

    let object = match cursor.peek() {
        Some('<') => cursor.iri()?,
        Some('_') => cursor.blank_node()?,
        Some('"') => cursor.literal()?,
        _ => return Err(cursor.error("object must be an IRI, blank node or literal")),
    };
    cursor.skip_ws();

    let graph = match cursor.peek() {
        Some('<') => Some(cursor.iri()?),
        Some('_') => Some(cursor.blank_node()?),
        _ => None,
    };
    cursor.skip_ws();

    if cursor.bump() != Some('.') {
        return Err(cursor.error("expected '.' at end of statement"));
    }
    cursor.skip_ws();
    if !cursor.at_end() && cursor.peek() != Some('#') {
        return Err(cursor.error("unexpected content after '.'"));
    }

    let mut stmt = Statement::new(subject, predicate, object);
    stmt.graph = graph;
    Ok(Some(stmt))
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

struct Cursor {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Cursor {
    fn new(text: &str, line: usize) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            line,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t')) {
            self.pos += 1;
        }
    }

    fn error(&self, msg: &str) -> ImportError {
        ImportError::parse(self.line, format!("{msg} (column {})", self.pos + 1))
    }

    fn expect(&mut self, want: char) -> Result<()> {
        match self.bump() {
            Some(c) if c == want => Ok(()),
            _ => Err(self.error(&format!("expected '{want}'"))),
        }
    }

    /// `<...>`
    fn iri(&mut self) -> Result<Term> {
        Ok(Term::iri(self.iri_text()?))
    }

    fn iri_text(&mut self) -> Result<String> {
        self.expect('<')?;
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('>') => break,
                Some('\\') => value.push(self.unicode_escape()?),
                Some(c) if c.is_whitespace() || matches!(c, '<' | '"' | '{' | '}' | '|' | '^' | '`') => {
                    return Err(self.error(&format!("invalid character {c:?} in IRI")));
                }
                Some(c) => value.push(c),
                None => return Err(self.error("unterminated IRI")),
            }
        }
        if value.is_empty() {
            return Err(self.error("empty IRI"));
        }
        Ok(value)
    }

    /// `_:label`
    fn blank_node(&mut self) -> Result<Term> {
        self.expect('_')?;
        self.expect(':')?;
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || matches!(c, '_' | '-' | '.')) {
            self.pos += 1;
        }
        // A label never ends with '.', that dot terminates the statement.
        while self.pos > start && self.chars[self.pos - 1] == '.' {
            self.pos -= 1;
        }
        if self.pos == start {
            return Err(self.error("empty blank node label"));
        }
        Ok(Term::blank(self.chars[start..self.pos].iter().collect::<String>()))
    }

    /// `"..."`, `"..."@lang` or `"..."^^<datatype>`
    fn literal(&mut self) -> Result<Term> {
        self.expect('"')?;
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => break,
                Some('\\') => value.push(self.string_escape()?),
                Some(c) => value.push(c),
                None => return Err(self.error("unterminated literal")),
            }
        }

        match self.peek() {
            Some('@') => {
                self.pos += 1;
                let start = self.pos;
                while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '-') {
                    self.pos += 1;
                }
                let lang: String = self.chars[start..self.pos].iter().collect();
                if lang.is_empty() || lang.starts_with('-') || lang.ends_with('-') {
                    return Err(self.error("invalid language tag"));
                }
                Ok(Term::lang_literal(value, lang))
            }
            Some('^') => {
                self.pos += 1;
                self.expect('^')?;
                let datatype = self.iri_text()?;
                Ok(Term::typed_literal(value, datatype))
            }
            _ => Ok(Term::literal(value)),
        }
    }

    fn string_escape(&mut self) -> Result<char> {
        match self.peek() {
            Some('t') => self.skip_then('\t'),
            Some('b') => self.skip_then('\u{8}'),
            Some('n') => self.skip_then('\n'),
            Some('r') => self.skip_then('\r'),
            Some('f') => self.skip_then('\u{c}'),
            Some('"') => self.skip_then('"'),
            Some('\'') => self.skip_then('\''),
            Some('\\') => self.skip_then('\\'),
            _ => self.unicode_escape(),
        }
    }

    fn skip_then(&mut self, c: char) -> Result<char> {
        self.pos += 1;
        Ok(c)
    }

    /// `\uXXXX` or `\UXXXXXXXX`; the backslash is already consumed.
    fn unicode_escape(&mut self) -> Result<char> {
        let width = match self.bump() {
            Some('u') => 4,
            Some('U') => 8,
            _ => return Err(self.error("invalid escape sequence")),
        };
        if self.pos + width > self.chars.len() {
            return Err(self.error("truncated unicode escape"));
        }
        let hex: String = self.chars[self.pos..self.pos + width].iter().collect();
        self.pos += width;
        u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.error(&format!("invalid unicode escape \\u{hex}")))
    }
}
