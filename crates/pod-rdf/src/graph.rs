//! Set-semantics triple graph with basic graph pattern matching.

use std::collections::{BTreeMap, BTreeSet};

use pod_types::{Term, Triple};

/// Variable name → bound term.
pub type Bindings = BTreeMap<String, Term>;

/// A term position in a pattern: either fixed or a variable.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PatternTerm {
    Term(Term),
    Variable(String),
}

impl PatternTerm {
    fn unify(&self, term: &Term, bindings: &mut Bindings) -> bool {
        match self {
            PatternTerm::Term(fixed) => fixed == term,
            PatternTerm::Variable(name) => match bindings.get(name) {
                Some(bound) => bound == term,
                None => {
                    bindings.insert(name.clone(), term.clone());
                    true
                }
            },
        }
    }

    fn resolve(&self, bindings: &Bindings) -> Option<Term> {
        match self {
            PatternTerm::Term(term) => Some(term.clone()),
            PatternTerm::Variable(name) => bindings.get(name).cloned(),
        }
    }
}

impl From<Term> for PatternTerm {
    fn from(term: Term) -> Self {
        PatternTerm::Term(term)
    }
}

/// A triple whose positions may hold variables.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriplePattern {
    pub subject: PatternTerm,
    pub predicate: PatternTerm,
    pub object: PatternTerm,
}

impl TriplePattern {
    pub fn new(subject: PatternTerm, predicate: PatternTerm, object: PatternTerm) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    /// The ground triple, if the pattern has no variables.
    pub fn to_triple(&self) -> Option<Triple> {
        self.instantiate(&Bindings::new())
    }

    /// Substitute bindings. `None` if a variable stays unbound.
    pub fn instantiate(&self, bindings: &Bindings) -> Option<Triple> {
        Some(Triple::new(
            self.subject.resolve(bindings)?,
            self.predicate.resolve(bindings)?,
            self.object.resolve(bindings)?,
        ))
    }

    fn unify(&self, triple: &Triple, bindings: &Bindings) -> Option<Bindings> {
        let mut extended = bindings.clone();
        let ok = self.subject.unify(&triple.subject, &mut extended)
            && self.predicate.unify(&triple.predicate, &mut extended)
            && self.object.unify(&triple.object, &mut extended);
        ok.then_some(extended)
    }
}

impl From<Triple> for TriplePattern {
    fn from(triple: Triple) -> Self {
        Self::new(
            triple.subject.into(),
            triple.predicate.into(),
            triple.object.into(),
        )
    }
}

/// An RDF graph. Inserting a present triple is a no-op, removing an absent
/// one is a no-op.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Graph {
    triples: BTreeSet<Triple>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, triple: Triple) -> bool {
        self.triples.insert(triple)
    }

    pub fn remove(&mut self, triple: &Triple) -> bool {
        self.triples.remove(triple)
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    pub fn into_triples(self) -> Vec<Triple> {
        self.triples.into_iter().collect()
    }

    /// Objects of all `(subject, predicate, ?)` triples.
    pub fn objects<'a>(
        &'a self,
        subject: &'a Term,
        predicate: &'a str,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        self.triples
            .iter()
            .filter(move |t| &t.subject == subject && t.predicate.as_iri() == Some(predicate))
            .map(|t| &t.object)
    }

    /// Subjects of all `(?, predicate, object)` triples.
    pub fn subjects<'a>(
        &'a self,
        predicate: &'a str,
        object: &'a Term,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        self.triples
            .iter()
            .filter(move |t| t.predicate.as_iri() == Some(predicate) && &t.object == object)
            .map(|t| &t.subject)
    }

    /// All solutions of a basic graph pattern, joined left to right.
    pub fn evaluate(&self, patterns: &[TriplePattern]) -> Vec<Bindings> {
        let mut solutions = vec![Bindings::new()];
        for pattern in patterns {
            let mut next = Vec::new();
            for bindings in &solutions {
                for triple in &self.triples {
                    if let Some(extended) = pattern.unify(triple, bindings) {
                        next.push(extended);
                    }
                }
            }
            solutions = next;
            if solutions.is_empty() {
                break;
            }
        }
        solutions
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        Self {
            triples: iter.into_iter().collect(),
        }
    }
}

impl Extend<Triple> for Graph {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        self.triples.extend(iter);
    }
}
