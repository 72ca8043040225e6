//! Triple-block parser shared by Turtle documents and SPARQL templates.

use std::collections::HashMap;

use pod_types::{Literal, Term};

use crate::error::{RdfError, Result};
use crate::graph::{PatternTerm, TriplePattern};
use crate::lexer::{tokenize, Spanned, Token};
use crate::vocab::{rdf, xsd};

/// How variables and blank nodes are read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TermMode {
    /// Plain data: variables are an error.
    Data,
    /// Templates: variables allowed, blank nodes stay blank nodes.
    Template,
    /// Query patterns: variables allowed, blank nodes act as variables.
    Pattern,
}

pub(crate) struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    prefixes: HashMap<String, String>,
    base: Option<String>,
    blank_counter: usize,
    pub(crate) mode: TermMode,
}

impl Parser {
    pub(crate) fn new(input: &str, base: Option<&str>) -> Result<Self> {
        Ok(Self {
            tokens: tokenize(input)?,
            pos: 0,
            prefixes: HashMap::new(),
            base: base.map(str::to_owned),
            blank_counter: 0,
            mode: TermMode::Data,
        })
    }

    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    pub(crate) fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|s| s.token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|s| s.line)
            .unwrap_or(1)
    }

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(crate) fn error(&self, message: impl Into<String>) -> RdfError {
        RdfError::syntax(self.line(), message)
    }

    pub(crate) fn eat_punct(&mut self, ch: char) -> bool {
        if self.peek() == Some(&Token::Punct(ch)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_punct(&mut self, ch: char) -> Result<()> {
        if self.eat_punct(ch) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{ch}'")))
        }
    }

    /// Case-insensitive keyword check without consuming.
    pub(crate) fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Word(w)) if w.eq_ignore_ascii_case(keyword))
    }

    pub(crate) fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_keyword(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.error(format!("expected {keyword}")))
        }
    }

    /// `@prefix`, `@base`, `PREFIX`, `BASE`. Returns `false` if the next
    /// token is not a directive.
    pub(crate) fn directive(&mut self) -> Result<bool> {
        let (is_prefix, turtle_style) = match self.peek() {
            Some(Token::At(word)) if word == "prefix" => (true, true),
            Some(Token::At(word)) if word == "base" => (false, true),
            Some(Token::Word(word)) if word.eq_ignore_ascii_case("prefix") => (true, false),
            Some(Token::Word(word)) if word.eq_ignore_ascii_case("base") => (false, false),
            _ => return Ok(false),
        };
        self.pos += 1;
        if is_prefix {
            let prefix = match self.next() {
                Some(Token::Prefixed(prefix, local)) if local.is_empty() => prefix,
                _ => return Err(self.error("expected a prefix name like 'ex:'")),
            };
            let iri = self.iri_ref()?;
            self.prefixes.insert(prefix, iri);
        } else {
            self.base = Some(self.iri_ref()?);
        }
        if turtle_style {
            self.expect_punct('.')?;
        }
        Ok(true)
    }

    fn iri_ref(&mut self) -> Result<String> {
        match self.next() {
            Some(Token::Iri(iri)) => Ok(resolve_iri(self.base.as_deref(), &iri)),
            _ => Err(self.error("expected an IRI")),
        }
    }

    /// `{ triples }`, consuming both braces.
    pub(crate) fn block(&mut self, out: &mut Vec<TriplePattern>) -> Result<()> {
        self.expect_punct('{')?;
        loop {
            if self.eat_punct('}') {
                return Ok(());
            }
            if self.at_end() {
                return Err(self.error("unterminated '{' block"));
            }
            self.reject_unsupported_pattern()?;
            self.triples(out)?;
            self.reject_unsupported_pattern()?;
            if !self.eat_punct('.') && self.peek() != Some(&Token::Punct('}')) {
                return Err(self.error("expected '.' or '}'"));
            }
        }
    }

    fn reject_unsupported_pattern(&self) -> Result<()> {
        for keyword in ["graph", "filter", "optional", "union", "minus", "bind", "values"] {
            if self.peek_keyword(keyword) {
                return Err(RdfError::Unsupported(format!(
                    "{} in patterns",
                    keyword.to_ascii_uppercase()
                )));
            }
        }
        Ok(())
    }

    /// One subject with its predicate-object list.
    pub(crate) fn triples(&mut self, out: &mut Vec<TriplePattern>) -> Result<()> {
        if self.eat_punct('[') {
            let subject = self.fresh_blank();
            if !self.eat_punct(']') {
                self.predicate_objects(&subject, out)?;
                self.expect_punct(']')?;
            }
            // `[ ... ] .` is a complete statement on its own.
            if matches!(self.peek(), Some(Token::Punct('.' | '}')) | None) {
                return Ok(());
            }
            return self.predicate_objects(&subject, out);
        }
        let subject = self.subject()?;
        self.predicate_objects(&subject, out)
    }

    fn predicate_objects(&mut self, subject: &PatternTerm, out: &mut Vec<TriplePattern>) -> Result<()> {
        loop {
            let predicate = self.verb()?;
            loop {
                let object = self.object(out)?;
                out.push(TriplePattern::new(subject.clone(), predicate.clone(), object));
                if !self.eat_punct(',') {
                    break;
                }
            }
            if !self.eat_punct(';') {
                return Ok(());
            }
            while self.eat_punct(';') {}
            if matches!(self.peek(), Some(Token::Punct('.' | ']' | '}')) | None) {
                return Ok(());
            }
        }
    }

    fn subject(&mut self) -> Result<PatternTerm> {
        match self.next() {
            Some(Token::Iri(iri)) => Ok(named(resolve_iri(self.base.as_deref(), &iri))),
            Some(Token::Prefixed(prefix, local)) => self.expand(&prefix, &local).map(named),
            Some(Token::Blank(label)) => Ok(self.blank(label)),
            Some(Token::Var(name)) => self.variable(name),
            Some(Token::Punct('(')) => Err(RdfError::Unsupported("RDF collections".into())),
            _ => {
                self.pos = self.pos.saturating_sub(1);
                Err(self.error("expected a subject"))
            }
        }
    }

    fn verb(&mut self) -> Result<PatternTerm> {
        match self.next() {
            Some(Token::Word(word)) if word == "a" => Ok(named(rdf::TYPE.to_owned())),
            Some(Token::Iri(iri)) => Ok(named(resolve_iri(self.base.as_deref(), &iri))),
            Some(Token::Prefixed(prefix, local)) => self.expand(&prefix, &local).map(named),
            Some(Token::Var(name)) => self.variable(name),
            _ => {
                self.pos = self.pos.saturating_sub(1);
                Err(self.error("expected a predicate"))
            }
        }
    }

    fn object(&mut self, out: &mut Vec<TriplePattern>) -> Result<PatternTerm> {
        match self.next() {
            Some(Token::Iri(iri)) => Ok(named(resolve_iri(self.base.as_deref(), &iri))),
            Some(Token::Prefixed(prefix, local)) => self.expand(&prefix, &local).map(named),
            Some(Token::Blank(label)) => Ok(self.blank(label)),
            Some(Token::Var(name)) => self.variable(name),
            Some(Token::Str(value)) => self.literal_tail(value),
            Some(Token::Number(text)) => {
                let datatype = if text.contains('e') {
                    xsd::DOUBLE
                } else if text.contains('.') {
                    xsd::DECIMAL
                } else {
                    xsd::INTEGER
                };
                Ok(PatternTerm::Term(Term::Literal(Literal::typed(text, datatype))))
            }
            Some(Token::Word(word)) if word == "true" || word == "false" => Ok(PatternTerm::Term(
                Term::Literal(Literal::typed(word, xsd::BOOLEAN)),
            )),
            Some(Token::Punct('[')) => {
                let node = self.fresh_blank();
                if !self.eat_punct(']') {
                    self.predicate_objects(&node, out)?;
                    self.expect_punct(']')?;
                }
                Ok(node)
            }
            Some(Token::Punct('(')) => Err(RdfError::Unsupported("RDF collections".into())),
            _ => {
                self.pos = self.pos.saturating_sub(1);
                Err(self.error("expected an object"))
            }
        }
    }

    fn literal_tail(&mut self, value: String) -> Result<PatternTerm> {
        let literal = match self.peek() {
            Some(Token::At(lang)) => {
                let lang = lang.clone();
                self.pos += 1;
                Literal::lang(value, lang)
            }
            Some(Token::Carets) => {
                self.pos += 1;
                let datatype = match self.next() {
                    Some(Token::Iri(iri)) => resolve_iri(self.base.as_deref(), &iri),
                    Some(Token::Prefixed(prefix, local)) => self.expand(&prefix, &local)?,
                    _ => return Err(self.error("expected a datatype IRI after '^^'")),
                };
                Literal::typed(value, datatype)
            }
            _ => Literal::simple(value),
        };
        Ok(PatternTerm::Term(Term::Literal(literal)))
    }

    fn expand(&self, prefix: &str, local: &str) -> Result<String> {
        self.prefixes
            .get(prefix)
            .map(|ns| format!("{ns}{local}"))
            .ok_or_else(|| self.error(format!("undeclared prefix '{prefix}:'")))
    }

    fn variable(&self, name: String) -> Result<PatternTerm> {
        if self.mode == TermMode::Data {
            return Err(self.error(format!("variable ?{name} not allowed here")));
        }
        Ok(PatternTerm::Variable(name))
    }

    fn blank(&self, label: String) -> PatternTerm {
        if self.mode == TermMode::Pattern {
            PatternTerm::Variable(format!("_:{label}"))
        } else {
            PatternTerm::Term(Term::blank(label))
        }
    }

    fn fresh_blank(&mut self) -> PatternTerm {
        self.blank_counter += 1;
        let label = format!("anon{}", self.blank_counter);
        self.blank(label)
    }
}

fn named(iri: String) -> PatternTerm {
    PatternTerm::Term(Term::NamedNode(iri))
}

fn has_scheme(iri: &str) -> bool {
    match iri.find(':') {
        Some(idx) if idx > 0 => {
            let scheme = &iri[..idx];
            scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

/// Resolve `iri` against `base` (RFC 3986 reference resolution, minus
/// query handling).
pub(crate) fn resolve_iri(base: Option<&str>, iri: &str) -> String {
    let base = match base {
        Some(base) if !has_scheme(iri) => base,
        _ => return iri.to_owned(),
    };
    let base = base.split('#').next().unwrap_or(base);
    if iri.is_empty() {
        return base.to_owned();
    }
    if iri.starts_with('#') {
        return format!("{base}{iri}");
    }
    let (origin, path) = split_origin(base);
    if let Some(rest) = iri.strip_prefix("//") {
        let scheme = base.split(':').next().unwrap_or("http");
        return format!("{scheme}://{rest}");
    }
    let (reference, fragment) = match iri.split_once('#') {
        Some((reference, fragment)) => (reference, Some(fragment)),
        None => (iri, None),
    };
    let merged = if reference.starts_with('/') {
        reference.to_owned()
    } else {
        let dir = &path[..path.rfind('/').map(|idx| idx + 1).unwrap_or(0)];
        format!("{dir}{reference}")
    };
    let mut resolved = format!("{origin}{}", remove_dot_segments(&merged));
    if let Some(fragment) = fragment {
        resolved.push('#');
        resolved.push_str(fragment);
    }
    resolved
}

fn split_origin(base: &str) -> (&str, &str) {
    match base.find("://") {
        Some(idx) => match base[idx + 3..].find('/') {
            Some(slash) => base.split_at(idx + 3 + slash),
            None => (base, "/"),
        },
        None => ("", base),
    }
}

fn remove_dot_segments(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').collect();
    let last = segments.len().saturating_sub(1);
    let mut out: Vec<&str> = Vec::new();
    for (idx, segment) in segments.iter().enumerate() {
        match *segment {
            "." => {
                if idx == last {
                    out.push("");
                }
            }
            ".." => {
                if out.len() > 1 {
                    out.pop();
                }
                if idx == last {
                    out.push("");
                }
            }
            other => out.push(other),
        }
    }
    out.join("/")
}
