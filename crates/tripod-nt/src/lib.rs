//! Line-based N-Triples-like decoder.
//!
//! One triple (or triple pattern) per line, `#` comments, optional
//! trailing `.`:
//!
//! ```text
//! <http://example.org/a> <http://example.org/name> "Alice" .
//! _:b1 <http://example.org/knows> <http://example.org/a>
//! ?s <http://example.org/name> ?name          # patterns only
//! "hei"@nb  "42"^^<http://www.w3.org/2001/XMLSchema#integer>
//! ```
//!
//! This is a deliberately small surface for feeding the store and its
//! tests; it is not a conforming Turtle parser (no prefixes, no multi-line
//! statements).

use oxrdf::{BlankNode, Literal, NamedNode, Term, Triple, Variable};
use thiserror::Error;
use tripod_store::{TermPattern, TriplePattern};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error on line {line}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl ParseError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Parse a whole document of triple patterns (variables allowed).
pub fn parse_patterns(input: &str) -> Result<Vec<TriplePattern>, ParseError> {
    let mut out = Vec::new();
    for (idx, raw) in input.lines().enumerate() {
        let line = idx + 1;
        if let Some(pattern) = parse_line(raw, line)? {
            out.push(pattern);
        }
    }
    Ok(out)
}

/// Parse a whole document of concrete triples.
pub fn parse_triples(input: &str) -> Result<Vec<Triple>, ParseError> {
    let mut out = Vec::new();
    for (idx, raw) in input.lines().enumerate() {
        let line = idx + 1;
        let Some(pattern) = parse_line(raw, line)? else {
            continue;
        };
        let Some(triple) = pattern.to_triple() else {
            return Err(ParseError::new(
                line,
                "expected a concrete triple, found a variable or a malformed statement",
            ));
        };
        out.push(triple);
    }
    Ok(out)
}

/// Parse a single statement; `None` for blank lines and comments.
pub fn parse_line(raw: &str, line: usize) -> Result<Option<TriplePattern>, ParseError> {
    let text = raw.trim();
    if text.is_empty() || text.starts_with('#') {
        return Ok(None);
    }

    let mut rest = text;
    let subject = take_term(&mut rest, line)?;
    let predicate = take_term(&mut rest, line)?;
    let object = take_term(&mut rest, line)?;

    let mut tail = rest.trim_start();
    if let Some(after) = tail.strip_prefix('.') {
        tail = after.trim_start();
    }
    if !tail.is_empty() && !tail.starts_with('#') {
        return Err(ParseError::new(
            line,
            format!("unexpected trailing input: {tail:?}"),
        ));
    }

    Ok(Some(TriplePattern {
        subject,
        predicate,
        object,
    }))
}

fn take_term(rest: &mut &str, line: usize) -> Result<TermPattern, ParseError> {
    *rest = rest.trim_start();
    let mut chars = rest.chars();
    match chars.next() {
        Some('<') => {
            let end = rest
                .find('>')
                .ok_or_else(|| ParseError::new(line, "unterminated IRI"))?;
            let iri = &rest[1..end];
            *rest = &rest[end + 1..];
            let named = NamedNode::new(iri)
                .map_err(|e| ParseError::new(line, format!("invalid IRI {iri:?}: {e}")))?;
            Ok(TermPattern::Term(named.into()))
        }
        Some('_') => {
            let body = rest
                .strip_prefix("_:")
                .ok_or_else(|| ParseError::new(line, "expected ':' after '_'"))?;
            let end = body
                .find(|c: char| c.is_whitespace())
                .unwrap_or(body.len());
            let label = &body[..end];
            *rest = &body[end..];
            let blank = BlankNode::new(label)
                .map_err(|e| ParseError::new(line, format!("invalid blank label {label:?}: {e}")))?;
            Ok(TermPattern::Term(blank.into()))
        }
        Some('?') => {
            let body = &rest[1..];
            let end = body
                .find(|c: char| c.is_whitespace())
                .unwrap_or(body.len());
            let name = &body[..end];
            *rest = &body[end..];
            let variable = Variable::new(name)
                .map_err(|e| ParseError::new(line, format!("invalid variable {name:?}: {e}")))?;
            Ok(TermPattern::Variable(variable))
        }
        Some('"') => take_literal(rest, line),
        Some(other) => Err(ParseError::new(
            line,
            format!("unexpected character {other:?}"),
        )),
        None => Err(ParseError::new(line, "expected a term, found end of line")),
    }
}

fn take_literal(rest: &mut &str, line: usize) -> Result<TermPattern, ParseError> {
    let body = &rest[1..];
    let mut value = String::new();
    let mut chars = body.char_indices();
    let mut closed_at = None;
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => {
                closed_at = Some(i);
                break;
            }
            '\\' => match chars.next() {
                Some((_, 'n')) => value.push('\n'),
                Some((_, 'r')) => value.push('\r'),
                Some((_, 't')) => value.push('\t'),
                Some((_, '"')) => value.push('"'),
                Some((_, '\\')) => value.push('\\'),
                Some((_, other)) => {
                    return Err(ParseError::new(
                        line,
                        format!("unsupported escape '\\{other}'"),
                    ));
                }
                None => return Err(ParseError::new(line, "unterminated escape")),
            },
            c => value.push(c),
        }
    }
    let closed_at =
        closed_at.ok_or_else(|| ParseError::new(line, "unterminated string literal"))?;
    let mut tail = &body[closed_at + 1..];

    let literal = if let Some(after) = tail.strip_prefix('@') {
        let end = after
            .find(|c: char| c.is_whitespace())
            .unwrap_or(after.len());
        let lang = &after[..end];
        tail = &after[end..];
        Literal::new_language_tagged_literal(value, lang)
            .map_err(|e| ParseError::new(line, format!("invalid language tag {lang:?}: {e}")))?
    } else if let Some(after) = tail.strip_prefix("^^") {
        let after = after
            .strip_prefix('<')
            .ok_or_else(|| ParseError::new(line, "expected '<' after '^^'"))?;
        let end = after
            .find('>')
            .ok_or_else(|| ParseError::new(line, "unterminated datatype IRI"))?;
        let iri = &after[..end];
        tail = &after[end + 1..];
        let datatype = NamedNode::new(iri)
            .map_err(|e| ParseError::new(line, format!("invalid datatype IRI {iri:?}: {e}")))?;
        Literal::new_typed_literal(value, datatype)
    } else {
        Literal::new_simple_literal(value)
    };

    *rest = tail;
    Ok(TermPattern::Term(Term::from(literal)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_nodes_and_literals() {
        let triples = parse_triples(
            "<http://example.org/a> <http://example.org/name> \"Alice\" .\n\
             # a comment\n\
             \n\
             <http://example.org/a> <http://example.org/age> \"42\"^^<http://www.w3.org/2001/XMLSchema#integer>\n",
        )
        .unwrap();
        assert_eq!(triples.len(), 2);
        assert_eq!(
            triples[0].object,
            Term::from(Literal::new_simple_literal("Alice"))
        );
    }

    #[test]
    fn parses_blank_nodes_and_language_tags() {
        let triples =
            parse_triples("_:b1 <http://example.org/name> \"hei\"@nb .").unwrap();
        assert_eq!(triples.len(), 1);
        assert!(matches!(triples[0].subject, oxrdf::Subject::BlankNode(_)));
    }

    #[test]
    fn parses_variables_in_patterns() {
        let patterns =
            parse_patterns("?s <http://example.org/name> ?name .").unwrap();
        assert_eq!(patterns.len(), 1);
        assert!(patterns[0].subject.is_variable());
        assert!(patterns[0].object.is_variable());
    }

    #[test]
    fn rejects_variables_in_triples() {
        let err = parse_triples("?s <http://example.org/name> \"x\" .").unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn string_escapes_round_trip() {
        let triples = parse_triples(
            "<http://example.org/a> <http://example.org/p> \"line\\nbreak \\\"quoted\\\" \\\\\" .",
        )
        .unwrap();
        assert_eq!(
            triples[0].object,
            Term::from(Literal::new_simple_literal("line\nbreak \"quoted\" \\"))
        );
    }

    #[test]
    fn reports_the_failing_line() {
        let err = parse_triples(
            "<http://example.org/a> <http://example.org/p> \"ok\" .\n\
             <http://example.org/a> <http://example.org/p> <unterminated",
        )
        .unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn rejects_trailing_garbage() {
        let err =
            parse_triples("<http://example.org/a> <http://example.org/p> \"x\" extra").unwrap_err();
        assert!(err.message.contains("trailing"));
    }
}
