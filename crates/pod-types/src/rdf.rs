//! RDF terms and triples carried by `internal/quads` representations.

use std::fmt;

pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
pub const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

/// An RDF literal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    pub value: String,
    pub datatype: String,
    pub language: Option<String>,
}

impl Literal {
    pub fn simple(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: XSD_STRING.into(),
            language: None,
        }
    }

    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: datatype.into(),
            language: None,
        }
    }

    pub fn lang(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: RDF_LANG_STRING.into(),
            language: Some(language.into().to_ascii_lowercase()),
        }
    }
}

/// A ground RDF term.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    NamedNode(String),
    BlankNode(String),
    Literal(Literal),
}

impl Term {
    pub fn named(iri: impl Into<String>) -> Self {
        Term::NamedNode(iri.into())
    }

    pub fn blank(id: impl Into<String>) -> Self {
        Term::BlankNode(id.into())
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal(Literal::simple(value))
    }

    /// The IRI of a named node.
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::NamedNode(iri) => Some(iri),
            _ => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal(_))
    }
}

impl fmt::Display for Term {
    /// N-Triples syntax.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::NamedNode(iri) => write!(f, "<{iri}>"),
            Term::BlankNode(id) => write!(f, "_:{id}"),
            Term::Literal(lit) => {
                f.write_str("\"")?;
                for ch in lit.value.chars() {
                    match ch {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\r' => f.write_str("\\r")?,
                        '\t' => f.write_str("\\t")?,
                        other => write!(f, "{other}")?,
                    }
                }
                f.write_str("\"")?;
                if let Some(lang) = &lit.language {
                    write!(f, "@{lang}")
                } else if lit.datatype != XSD_STRING {
                    write!(f, "^^<{}>", lit.datatype)
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// A single statement in the default graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Triple {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_node_display() {
        assert_eq!(Term::named("http://a/b").to_string(), "<http://a/b>");
    }

    #[test]
    fn literal_display_escapes() {
        let term = Term::literal("say \"hi\"\n");
        assert_eq!(term.to_string(), "\"say \\\"hi\\\"\\n\"");
    }

    #[test]
    fn typed_and_language_literals() {
        let typed = Term::Literal(Literal::typed("1", "http://www.w3.org/2001/XMLSchema#integer"));
        assert_eq!(
            typed.to_string(),
            "\"1\"^^<http://www.w3.org/2001/XMLSchema#integer>"
        );
        let tagged = Term::Literal(Literal::lang("hallo", "DE"));
        assert_eq!(tagged.to_string(), "\"hallo\"@de");
    }

    #[test]
    fn triple_display() {
        let triple = Triple::new(
            Term::named("http://s"),
            Term::named("http://p"),
            Term::blank("b0"),
        );
        assert_eq!(triple.to_string(), "<http://s> <http://p> _:b0 .");
    }
}
