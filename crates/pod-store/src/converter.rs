//! Representation converters and their ordered registry.

use std::sync::Arc;

use pod_rdf::turtle::{parse_turtle_bytes, to_ntriples, to_turtle};
use pod_types::content_types::{APPLICATION_N_TRIPLES, INTERNAL_QUADS, TEXT_TURTLE};
use pod_types::representation::keys;
use pod_types::{
    matches_media_type, Representation, RepresentationData, RepresentationPreferences,
};

use crate::error::{StoreError, StoreResult};

/// Converts representations between content-types.
///
/// A converter supports every `(input, output)` pair drawn from its input
/// and output lists, except identity pairs.
pub trait RepresentationConverter: Send + Sync {
    /// Stable name used in configuration and logs.
    fn name(&self) -> &str;

    /// Accepted input types.
    fn input_types(&self) -> &[&'static str];

    /// Produced output types, in declaration order.
    fn output_types(&self) -> &[&'static str];

    fn supports(&self, input: &str, output: &str) -> bool {
        !input.eq_ignore_ascii_case(output)
            && self.accepts_input(input)
            && self
                .output_types()
                .iter()
                .any(|t| t.eq_ignore_ascii_case(output))
    }

    fn accepts_input(&self, input: &str) -> bool {
        self.input_types()
            .iter()
            .any(|t| t.eq_ignore_ascii_case(input))
    }

    /// Convert `representation` to `output_type`. The identifier is kept.
    fn convert(
        &self,
        representation: Representation,
        output_type: &str,
    ) -> StoreResult<Representation>;
}

/// Parses Turtle and N-Triples into `internal/quads`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TurtleToQuadConverter;

impl TurtleToQuadConverter {
    pub const NAME: &'static str = "turtle-to-quads";
}

impl RepresentationConverter for TurtleToQuadConverter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn input_types(&self) -> &[&'static str] {
        &[TEXT_TURTLE, APPLICATION_N_TRIPLES]
    }

    fn output_types(&self) -> &[&'static str] {
        &[INTERNAL_QUADS]
    }

    fn convert(
        &self,
        representation: Representation,
        output_type: &str,
    ) -> StoreResult<Representation> {
        check_pair(self, &representation, output_type)?;
        let Representation {
            identifier,
            mut metadata,
            data,
        } = representation;
        let RepresentationData::Binary(bytes) = data else {
            return Err(StoreError::MalformedInput(format!(
                "{} data must be serialized bytes",
                metadata.content_type()
            )));
        };
        let base = identifier.as_ref().map(|id| id.as_str());
        let triples = parse_turtle_bytes(&bytes, base)?;

        metadata.set_content_type(INTERNAL_QUADS);
        metadata.remove(keys::CONTENT_LENGTH);
        Ok(Representation {
            identifier,
            metadata,
            data: RepresentationData::Quads(triples),
        })
    }
}

/// Serializes `internal/quads` as Turtle or N-Triples.
#[derive(Debug, Default, Clone, Copy)]
pub struct QuadToRdfConverter;

impl QuadToRdfConverter {
    pub const NAME: &'static str = "quads-to-rdf";
}

impl RepresentationConverter for QuadToRdfConverter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn input_types(&self) -> &[&'static str] {
        &[INTERNAL_QUADS]
    }

    fn output_types(&self) -> &[&'static str] {
        &[TEXT_TURTLE, APPLICATION_N_TRIPLES]
    }

    fn convert(
        &self,
        representation: Representation,
        output_type: &str,
    ) -> StoreResult<Representation> {
        check_pair(self, &representation, output_type)?;
        let Representation {
            identifier,
            mut metadata,
            data,
        } = representation;
        let RepresentationData::Quads(triples) = data else {
            return Err(StoreError::Internal(
                "internal/quads representation carries bytes".into(),
            ));
        };
        let text = if output_type.eq_ignore_ascii_case(TEXT_TURTLE) {
            to_turtle(&triples)
        } else {
            to_ntriples(&triples)
        };

        metadata.set_content_type(output_type.to_ascii_lowercase());
        metadata.set(keys::CONTENT_LENGTH, text.len().to_string());
        Ok(Representation {
            identifier,
            metadata,
            data: RepresentationData::Binary(text.into()),
        })
    }
}

fn check_pair(
    converter: &dyn RepresentationConverter,
    representation: &Representation,
    output_type: &str,
) -> StoreResult<()> {
    if converter.supports(representation.content_type(), output_type) {
        Ok(())
    } else {
        Err(StoreError::Internal(format!(
            "{} cannot convert {} to {output_type}",
            converter.name(),
            representation.content_type()
        )))
    }
}

/// Converters in configuration order.
///
/// Selection is deterministic: the first converter accepting the input
/// that can emit any acceptable type wins.
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    converters: Vec<Arc<dyn RepresentationConverter>>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in converters, `turtle-to-quads` first.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.push(Arc::new(TurtleToQuadConverter));
        registry.push(Arc::new(QuadToRdfConverter));
        registry
    }

    /// Built-in converter by configuration name.
    pub fn builtin(name: &str) -> Option<Arc<dyn RepresentationConverter>> {
        match name {
            TurtleToQuadConverter::NAME => Some(Arc::new(TurtleToQuadConverter)),
            QuadToRdfConverter::NAME => Some(Arc::new(QuadToRdfConverter)),
            _ => None,
        }
    }

    pub fn push(&mut self, converter: Arc<dyn RepresentationConverter>) {
        self.converters.push(converter);
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.converters.iter().map(|c| c.name()).collect()
    }

    /// Pick a converter and output type for content negotiation.
    ///
    /// Among the winning converter's outputs the highest weight is chosen;
    /// ties go to the earlier output.
    pub fn select(
        &self,
        input: &str,
        preferences: &RepresentationPreferences,
    ) -> Option<(&dyn RepresentationConverter, &'static str)> {
        self.converters.iter().find_map(|converter| {
            if !converter.accepts_input(input) {
                return None;
            }
            let mut best: Option<(&'static str, f32)> = None;
            for &output in converter.output_types() {
                if output.eq_ignore_ascii_case(input) {
                    continue;
                }
                let weight = preferences.weight_for(output);
                if weight > 0.0 && best.map_or(true, |(_, w)| weight > w) {
                    best = Some((output, weight));
                }
            }
            best.map(|(output, _)| (converter.as_ref(), output))
        })
    }

    /// First converter able to turn `input` into `output`.
    pub fn find(&self, input: &str, output: &str) -> Option<&dyn RepresentationConverter> {
        self.converters
            .iter()
            .find(|c| {
                c.accepts_input(input)
                    && c.output_types()
                        .iter()
                        .any(|t| matches_media_type(output, t) && !t.eq_ignore_ascii_case(input))
            })
            .map(|c| c.as_ref())
    }
}

impl std::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("converters", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use pod_types::{ResourceIdentifier, Term};

    const DOC: &str = "<http://test.com/s> <http://test.com/p> <o> .";

    fn turtle() -> Representation {
        Representation::binary(TEXT_TURTLE, Bytes::from_static(DOC.as_bytes()))
            .with_identifier(ResourceIdentifier::new("http://test.com/doc"))
    }

    // -----------------------------------------------------------------------
    // Built-in converters
    // -----------------------------------------------------------------------

    #[test]
    fn turtle_to_quads_resolves_against_identifier() {
        let rep = TurtleToQuadConverter.convert(turtle(), INTERNAL_QUADS).unwrap();
        assert_eq!(rep.content_type(), INTERNAL_QUADS);
        assert_eq!(rep.metadata.get(keys::CONTENT_LENGTH), None);
        assert_eq!(rep.identifier.as_ref().unwrap().as_str(), "http://test.com/doc");
        let RepresentationData::Quads(triples) = rep.into_data() else {
            panic!("expected quads");
        };
        assert_eq!(triples[0].object, Term::named("http://test.com/o"));
    }

    #[test]
    fn turtle_to_quads_rejects_bad_syntax() {
        let rep = Representation::binary(TEXT_TURTLE, Bytes::from_static(b"<a> <b>"));
        let err = TurtleToQuadConverter.convert(rep, INTERNAL_QUADS).unwrap_err();
        assert!(matches!(err, StoreError::MalformedInput(_)));
    }

    #[test]
    fn quads_to_ntriples() {
        let quads = TurtleToQuadConverter.convert(turtle(), INTERNAL_QUADS).unwrap();
        let rep = QuadToRdfConverter
            .convert(quads, APPLICATION_N_TRIPLES)
            .unwrap();
        assert_eq!(rep.content_type(), APPLICATION_N_TRIPLES);
        let body = rep.into_bytes().unwrap();
        assert_eq!(
            &body[..],
            b"<http://test.com/s> <http://test.com/p> <http://test.com/o> .\n"
        );
    }

    #[test]
    fn unsupported_pair_is_rejected() {
        let err = QuadToRdfConverter.convert(turtle(), TEXT_TURTLE).unwrap_err();
        assert!(matches!(err, StoreError::Internal(_)));
        assert!(!TurtleToQuadConverter.supports(TEXT_TURTLE, TEXT_TURTLE));
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    #[test]
    fn select_prefers_highest_weight_output() {
        let registry = ConverterRegistry::with_defaults();
        let prefs = RepresentationPreferences::from_types(&[
            (TEXT_TURTLE, 0.5),
            (APPLICATION_N_TRIPLES, 0.9),
        ]);
        let (converter, output) = registry.select(INTERNAL_QUADS, &prefs).unwrap();
        assert_eq!(converter.name(), QuadToRdfConverter::NAME);
        assert_eq!(output, APPLICATION_N_TRIPLES);
    }

    #[test]
    fn select_breaks_ties_by_declaration_order() {
        let registry = ConverterRegistry::with_defaults();
        let prefs = RepresentationPreferences::parse_accept("*/*").unwrap();
        for _ in 0..3 {
            let (_, output) = registry.select(INTERNAL_QUADS, &prefs).unwrap();
            assert_eq!(output, TEXT_TURTLE);
        }
    }

    #[test]
    fn wildcards_never_select_internal_types() {
        let registry = ConverterRegistry::with_defaults();
        let prefs = RepresentationPreferences::parse_accept("*/*").unwrap();
        assert!(registry.select(TEXT_TURTLE, &prefs).is_none());

        let explicit = RepresentationPreferences::single(INTERNAL_QUADS);
        let (converter, _) = registry.select(TEXT_TURTLE, &explicit).unwrap();
        assert_eq!(converter.name(), TurtleToQuadConverter::NAME);
    }

    #[test]
    fn first_matching_converter_wins() {
        struct Shadow;
        impl RepresentationConverter for Shadow {
            fn name(&self) -> &str {
                "shadow"
            }
            fn input_types(&self) -> &[&'static str] {
                &[INTERNAL_QUADS]
            }
            fn output_types(&self) -> &[&'static str] {
                &[TEXT_TURTLE]
            }
            fn convert(&self, rep: Representation, _: &str) -> StoreResult<Representation> {
                Ok(rep)
            }
        }

        let mut registry = ConverterRegistry::new();
        registry.push(Arc::new(Shadow));
        registry.push(Arc::new(QuadToRdfConverter));
        let prefs = RepresentationPreferences::single(TEXT_TURTLE);
        let (converter, _) = registry.select(INTERNAL_QUADS, &prefs).unwrap();
        assert_eq!(converter.name(), "shadow");
        assert_eq!(registry.names(), vec!["shadow", QuadToRdfConverter::NAME]);
    }

    #[test]
    fn find_and_builtin_lookup() {
        let registry = ConverterRegistry::with_defaults();
        assert!(registry.find(TEXT_TURTLE, INTERNAL_QUADS).is_some());
        assert!(registry.find("text/plain", INTERNAL_QUADS).is_none());
        assert!(ConverterRegistry::builtin("quads-to-rdf").is_some());
        assert!(ConverterRegistry::builtin("nope").is_none());
    }
}
