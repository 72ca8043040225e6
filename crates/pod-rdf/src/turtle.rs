//! Turtle / N-Triples subset.
//!
//! Parsing covers prefixes, base IRIs, predicate and object lists, `a`,
//! labelled and anonymous blank nodes, and string, numeric and boolean
//! literals. Collections are rejected as unsupported. N-Triples is a subset
//! of this grammar, so the same parser reads both.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use pod_types::{Term, Triple};

use crate::error::{RdfError, Result};
use crate::parser::{Parser, TermMode};
use crate::vocab::rdf;

/// Parse a Turtle document. Relative IRIs resolve against `base`.
pub fn parse_turtle(input: &str, base: Option<&str>) -> Result<Vec<Triple>> {
    let mut parser = Parser::new(input, base)?;
    parser.mode = TermMode::Data;
    let mut patterns = Vec::new();
    while !parser.at_end() {
        if parser.directive()? {
            continue;
        }
        parser.triples(&mut patterns)?;
        parser.expect_punct('.')?;
    }
    patterns
        .into_iter()
        .map(|p| {
            p.to_triple()
                .ok_or_else(|| RdfError::syntax(0, "variables are not allowed in data"))
        })
        .collect()
}

/// Parse UTF-8 bytes as Turtle.
pub fn parse_turtle_bytes(input: &[u8], base: Option<&str>) -> Result<Vec<Triple>> {
    let text = std::str::from_utf8(input).map_err(|_| RdfError::Encoding)?;
    parse_turtle(text, base)
}

/// Serialize triples as N-Triples, one statement per line.
pub fn to_ntriples<'a>(triples: impl IntoIterator<Item = &'a Triple>) -> String {
    let mut out = String::new();
    for triple in triples {
        let _ = writeln!(out, "{triple}");
    }
    out
}

/// Serialize triples as Turtle, grouping statements by subject.
pub fn to_turtle<'a>(triples: impl IntoIterator<Item = &'a Triple>) -> String {
    let mut by_subject: BTreeMap<&Term, Vec<&Triple>> = BTreeMap::new();
    for triple in triples {
        by_subject.entry(&triple.subject).or_default().push(triple);
    }
    let mut out = String::new();
    for (subject, statements) in by_subject {
        let _ = write!(out, "{subject}");
        for (idx, triple) in statements.iter().enumerate() {
            let separator = if idx == 0 { " " } else { ";\n    " };
            let predicate = match triple.predicate.as_iri() {
                Some(rdf::TYPE) => "a".to_owned(),
                _ => triple.predicate.to_string(),
            };
            let _ = write!(out, "{separator}{predicate} {}", triple.object);
        }
        out.push_str(".\n");
    }
    out
}
