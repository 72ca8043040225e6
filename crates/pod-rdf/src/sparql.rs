//! SPARQL Update subset used for patching.
//!
//! Supported forms, several per request separated by `;`:
//!
//! - `INSERT DATA { ... }`
//! - `DELETE DATA { ... }`
//! - `DELETE { ... } INSERT { ... } WHERE { ... }` (either template optional)
//! - `DELETE WHERE { ... }`
//!
//! preceded by optional `PREFIX` / `BASE` declarations.

use pod_types::{Term, Triple};
use tracing::debug;

use crate::error::{RdfError, Result};
use crate::graph::{Graph, PatternTerm, TriplePattern};
use crate::parser::{Parser, TermMode};

/// A single update operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpdateOperation {
    InsertData(Vec<Triple>),
    DeleteData(Vec<Triple>),
    /// Conditional update. `DELETE WHERE { P }` is `Modify` with `delete = P`
    /// and `pattern = P`.
    Modify {
        delete: Vec<TriplePattern>,
        insert: Vec<TriplePattern>,
        pattern: Vec<TriplePattern>,
    },
}

/// A parsed SPARQL Update request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SparqlUpdate {
    pub operations: Vec<UpdateOperation>,
}

impl SparqlUpdate {
    /// Parse an update. Relative IRIs resolve against `base`.
    pub fn parse(input: &str, base: Option<&str>) -> Result<Self> {
        let mut parser = Parser::new(input, base)?;
        let mut operations = Vec::new();
        loop {
            while parser.directive()? {}
            if parser.at_end() {
                break;
            }
            operations.push(operation(&mut parser)?);
            if !parser.eat_punct(';') {
                break;
            }
        }
        if !parser.at_end() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(Self { operations })
    }

    /// Parse UTF-8 bytes.
    pub fn parse_bytes(input: &[u8], base: Option<&str>) -> Result<Self> {
        let text = std::str::from_utf8(input).map_err(|_| RdfError::Encoding)?;
        Self::parse(text, base)
    }

    /// Returns `true` if any operation can remove triples.
    pub fn has_deletions(&self) -> bool {
        self.operations.iter().any(|op| match op {
            UpdateOperation::DeleteData(triples) => !triples.is_empty(),
            UpdateOperation::Modify { delete, .. } => !delete.is_empty(),
            UpdateOperation::InsertData(_) => false,
        })
    }

    /// Apply every operation in order to `graph`.
    ///
    /// Each operation evaluates its WHERE clause against the graph as it is
    /// when that operation starts, removes all instantiated deletions, then
    /// adds all instantiated insertions.
    pub fn apply_to(&self, graph: &mut Graph) {
        for op in &self.operations {
            let (deletions, insertions) = match op {
                UpdateOperation::InsertData(triples) => (Vec::new(), triples.clone()),
                UpdateOperation::DeleteData(triples) => (triples.clone(), Vec::new()),
                UpdateOperation::Modify {
                    delete,
                    insert,
                    pattern,
                } => {
                    let solutions = graph.evaluate(pattern);
                    let instantiate = |templates: &[TriplePattern]| -> Vec<Triple> {
                        solutions
                            .iter()
                            .flat_map(|bindings| {
                                templates.iter().filter_map(move |t| t.instantiate(bindings))
                            })
                            .collect()
                    };
                    (instantiate(delete), instantiate(insert))
                }
            };
            debug!(
                deletions = deletions.len(),
                insertions = insertions.len(),
                "applying update operation"
            );
            for triple in &deletions {
                graph.remove(triple);
            }
            graph.extend(insertions);
        }
    }
}

fn operation(parser: &mut Parser) -> Result<UpdateOperation> {
    for unsupported in ["with", "load", "clear", "drop", "create", "add", "move", "copy"] {
        if parser.peek_keyword(unsupported) {
            return Err(RdfError::Unsupported(format!(
                "{} operations",
                unsupported.to_ascii_uppercase()
            )));
        }
    }

    if parser.eat_keyword("insert") {
        if parser.eat_keyword("data") {
            return Ok(UpdateOperation::InsertData(data_block(parser)?));
        }
        let insert = template(parser)?;
        let pattern = where_clause(parser)?;
        return Ok(UpdateOperation::Modify {
            delete: Vec::new(),
            insert,
            pattern,
        });
    }

    if parser.eat_keyword("delete") {
        if parser.eat_keyword("data") {
            let triples = data_block(parser)?;
            if triples.iter().any(has_blank_node) {
                return Err(parser.error("blank nodes are not allowed in DELETE DATA"));
            }
            return Ok(UpdateOperation::DeleteData(triples));
        }
        if parser.peek_keyword("where") {
            let pattern = where_clause(parser)?;
            return Ok(UpdateOperation::Modify {
                delete: pattern.clone(),
                insert: Vec::new(),
                pattern,
            });
        }
        let delete = template(parser)?;
        let insert = if parser.eat_keyword("insert") {
            template(parser)?
        } else {
            Vec::new()
        };
        let pattern = where_clause(parser)?;
        return Ok(UpdateOperation::Modify {
            delete,
            insert,
            pattern,
        });
    }

    Err(parser.error("expected INSERT or DELETE"))
}

fn data_block(parser: &mut Parser) -> Result<Vec<Triple>> {
    parser.mode = TermMode::Data;
    let mut patterns = Vec::new();
    parser.block(&mut patterns)?;
    Ok(patterns.iter().filter_map(TriplePattern::to_triple).collect())
}

fn template(parser: &mut Parser) -> Result<Vec<TriplePattern>> {
    parser.mode = TermMode::Template;
    let mut patterns = Vec::new();
    parser.block(&mut patterns)?;
    Ok(patterns)
}

fn where_clause(parser: &mut Parser) -> Result<Vec<TriplePattern>> {
    parser.expect_keyword("where")?;
    parser.mode = TermMode::Pattern;
    let mut patterns = Vec::new();
    parser.block(&mut patterns)?;
    Ok(patterns)
}

fn has_blank_node(triple: &Triple) -> bool {
    [&triple.subject, &triple.object]
        .iter()
        .any(|term| matches!(term, Term::BlankNode(_)))
}

/// Variables mentioned by a pattern list, for diagnostics.
pub fn variables(patterns: &[TriplePattern]) -> Vec<&str> {
    let mut names: Vec<&str> = patterns
        .iter()
        .flat_map(|p| [&p.subject, &p.predicate, &p.object])
        .filter_map(|term| match term {
            PatternTerm::Variable(name) => Some(name.as_str()),
            PatternTerm::Term(_) => None,
        })
        .collect();
    names.sort_unstable();
    names.dedup();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn t(s: &str, p: &str, o: &str) -> Triple {
        Triple::new(Term::named(s), Term::named(p), Term::named(o))
    }

    fn graph(triples: &[Triple]) -> Graph {
        triples.iter().cloned().collect()
    }

    #[test]
    fn insert_data() {
        let update =
            SparqlUpdate::parse("INSERT DATA { <http://s> <http://p> <http://o> . }", None)
                .unwrap();
        assert!(!update.has_deletions());
        let mut g = Graph::new();
        update.apply_to(&mut g);
        assert!(g.contains(&t("http://s", "http://p", "http://o")));
    }

    #[test]
    fn delete_data_of_missing_triple_is_not_an_error() {
        let update =
            SparqlUpdate::parse("DELETE DATA { <http://s> <http://p> <http://o> }", None).unwrap();
        assert!(update.has_deletions());
        let mut g = graph(&[t("http://a", "http://b", "http://c")]);
        update.apply_to(&mut g);
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn deletions_happen_before_insertions() {
        let update = SparqlUpdate::parse(
            "DELETE { <http://s> <http://p> <http://o> } \
             INSERT { <http://s> <http://p> <http://o> } WHERE {}",
            None,
        )
        .unwrap();
        let mut g = graph(&[t("http://s", "http://p", "http://o")]);
        update.apply_to(&mut g);
        assert!(g.contains(&t("http://s", "http://p", "http://o")));
    }

    #[test]
    fn conditional_update_uses_bindings() {
        let update = SparqlUpdate::parse(
            "PREFIX ex: <http://ex.org/>\n\
             DELETE { ?s ex:status ex:open } INSERT { ?s ex:status ex:closed }\n\
             WHERE { ?s ex:status ex:open }",
            None,
        )
        .unwrap();
        let mut g = graph(&[
            t("http://ex.org/1", "http://ex.org/status", "http://ex.org/open"),
            t("http://ex.org/2", "http://ex.org/status", "http://ex.org/open"),
            t("http://ex.org/3", "http://ex.org/status", "http://ex.org/closed"),
        ]);
        update.apply_to(&mut g);
        assert_eq!(g.len(), 3);
        assert!(g
            .iter()
            .all(|triple| triple.object == Term::named("http://ex.org/closed")));
    }

    #[test]
    fn delete_where_removes_matches() {
        let update =
            SparqlUpdate::parse("DELETE WHERE { <http://s> <http://p> ?o }", None).unwrap();
        let mut g = graph(&[
            t("http://s", "http://p", "http://o1"),
            t("http://s", "http://p", "http://o2"),
            t("http://s", "http://q", "http://o3"),
        ]);
        update.apply_to(&mut g);
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn where_sees_snapshot_at_operation_start() {
        // The insert would match the WHERE pattern if it were evaluated
        // after insertion; it must not cascade.
        let update = SparqlUpdate::parse(
            "INSERT { ?o <http://p> <http://z> } WHERE { ?s <http://p> ?o }",
            None,
        )
        .unwrap();
        let mut g = graph(&[t("http://a", "http://p", "http://b")]);
        update.apply_to(&mut g);
        assert_eq!(g.len(), 2);
        assert!(g.contains(&t("http://b", "http://p", "http://z")));
    }

    #[test]
    fn multiple_operations_run_in_sequence() {
        let update = SparqlUpdate::parse(
            "INSERT DATA { <http://s> <http://p> <http://o> };\n\
             DELETE WHERE { <http://s> <http://p> ?x }",
            None,
        )
        .unwrap();
        assert_eq!(update.operations.len(), 2);
        let mut g = Graph::new();
        update.apply_to(&mut g);
        assert!(g.is_empty());
    }

    #[test]
    fn relative_iris_use_base() {
        let update = SparqlUpdate::parse(
            "INSERT DATA { <> <#p> <other> }",
            Some("http://test.com/dir/doc"),
        )
        .unwrap();
        assert_eq!(
            update.operations[0],
            UpdateOperation::InsertData(vec![t(
                "http://test.com/dir/doc",
                "http://test.com/dir/doc#p",
                "http://test.com/dir/other"
            )])
        );
    }

    #[test]
    fn malformed_updates() {
        assert!(matches!(
            SparqlUpdate::parse("INSERT DATA { <http://s> <http://p> }", None),
            Err(RdfError::Syntax { .. })
        ));
        assert!(matches!(
            SparqlUpdate::parse("SELECT * WHERE { ?s ?p ?o }", None),
            Err(RdfError::Syntax { .. })
        ));
        assert!(matches!(
            SparqlUpdate::parse("INSERT DATA { ?s <http://p> <http://o> }", None),
            Err(RdfError::Syntax { .. })
        ));
        assert!(matches!(
            SparqlUpdate::parse("DELETE DATA { _:b <http://p> <http://o> }", None),
            Err(RdfError::Syntax { .. })
        ));
        assert!(matches!(
            SparqlUpdate::parse("INSERT DATA { <http://s> <http://p> <http://o> } garbage", None),
            Err(RdfError::Syntax { .. })
        ));
    }

    #[test]
    fn unsupported_forms() {
        assert!(matches!(
            SparqlUpdate::parse("CLEAR DEFAULT", None),
            Err(RdfError::Unsupported(_))
        ));
        assert!(matches!(
            SparqlUpdate::parse(
                "DELETE { ?s ?p ?o } WHERE { ?s ?p ?o FILTER(?o) }",
                None
            ),
            Err(RdfError::Unsupported(_))
        ));
    }

    #[test]
    fn variables_are_listed_once() {
        let update = SparqlUpdate::parse(
            "DELETE { ?s ?p ?o } INSERT { ?s ?p ?x } WHERE { ?s ?p ?o . ?o ?p ?x }",
            None,
        )
        .unwrap();
        match &update.operations[0] {
            UpdateOperation::Modify { pattern, .. } => {
                assert_eq!(variables(pattern), vec!["o", "p", "s", "x"]);
            }
            other => panic!("unexpected operation {other:?}"),
        }
    }

    fn arb_triple() -> impl Strategy<Value = Triple> {
        ("[a-c]", "[p-q]", "[x-z]").prop_map(|(s, p, o)| {
            t(
                &format!("http://ex.org/{s}"),
                &format!("http://ex.org/{p}"),
                &format!("http://ex.org/{o}"),
            )
        })
    }

    proptest! {
        #[test]
        fn exact_delete_insert_is_idempotent(
            initial in proptest::collection::vec(arb_triple(), 0..8),
            deletes in proptest::collection::vec(arb_triple(), 0..4),
            inserts in proptest::collection::vec(arb_triple(), 0..4),
        ) {
            let update = SparqlUpdate {
                operations: vec![
                    UpdateOperation::DeleteData(deletes),
                    UpdateOperation::InsertData(inserts),
                ],
            };
            let mut once = graph(&initial);
            update.apply_to(&mut once);
            let mut twice = once.clone();
            update.apply_to(&mut twice);
            prop_assert_eq!(once, twice);
        }
    }
}
