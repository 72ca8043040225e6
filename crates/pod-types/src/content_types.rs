//! Well-known content types.

pub const APPLICATION_JSON: &str = "application/json";
pub const APPLICATION_OCTET_STREAM: &str = "application/octet-stream";
pub const APPLICATION_SPARQL_UPDATE: &str = "application/sparql-update";
pub const APPLICATION_N_TRIPLES: &str = "application/n-triples";
pub const TEXT_HTML: &str = "text/html";
pub const TEXT_PLAIN: &str = "text/plain";
pub const TEXT_TURTLE: &str = "text/turtle";

// Internal content types are never exposed to clients and are not matched by
// wildcard media ranges.
pub const INTERNAL_ALL: &str = "internal/*";
pub const INTERNAL_QUADS: &str = "internal/quads";

/// Returns `true` for `internal/*` content types.
pub fn is_internal(content_type: &str) -> bool {
    content_type.starts_with("internal/")
}

/// Returns `true` for the RDF serializations the pod can parse.
pub fn is_rdf_serialization(content_type: &str) -> bool {
    matches!(content_type, TEXT_TURTLE | APPLICATION_N_TRIPLES)
}
