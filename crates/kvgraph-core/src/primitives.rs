//! # Primitives
//!
//! Fixed constants of the engine: the KV key scheme, defaults and input limits.
//!
//! ## Key Scheme
//!
//! | Record          | Key                     | Value                         |
//! |-----------------|-------------------------|-------------------------------|
//! | node            | `node:<id>`             | JSON attribute bag            |
//! | adjacency list  | `adj:<id>`              | JSON array of `{to, weight?}` |
//! | edge            | `edge:<from>:<to>`      | JSON `{from, to, weight?, label?}` |
//! | metadata        | `__meta__:<name>`       | decimal count or `true`/`false` |
//!
//! Endpoint ids inside edge keys are escaped (see [`escape_key_part`]) so an
//! id containing `:` cannot produce the same key as a different pair.

/// Prefix of node records.
pub const NODE_PREFIX: &str = "node:";

/// Prefix of adjacency-list records.
pub const ADJ_PREFIX: &str = "adj:";

/// Prefix of edge records.
pub const EDGE_PREFIX: &str = "edge:";

/// Prefix of scalar metadata.
pub const META_PREFIX: &str = "__meta__:";

/// Metadata key of the node counter.
pub const META_NODE_COUNT: &str = "__meta__:node_count";

/// Metadata key of the logical edge counter.
pub const META_EDGE_COUNT: &str = "__meta__:edge_count";

/// Metadata key of the directedness flag.
pub const META_DIRECTED: &str = "__meta__:directed";

/// Metadata key of the weightedness flag.
pub const META_WEIGHTED: &str = "__meta__:weighted";

/// Weight of an edge when none is given.
pub const DEFAULT_EDGE_WEIGHT: f64 = 1.0;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length of a node identifier, in bytes.
///
/// Longer (or empty) identifiers are rejected by `add_node`.
pub const MAX_NODE_ID_LENGTH: usize = 256;

/// Page size of `search_nodes` when none is given.
pub const DEFAULT_SEARCH_LIMIT: usize = 100;

/// Cap on enumerated simple paths used by the CLI when none is given.
pub const DEFAULT_MAX_PATHS: usize = 10;

/// Check that a node identifier is non-empty and within bounds.
#[must_use]
pub fn is_valid_node_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= MAX_NODE_ID_LENGTH
}

// =============================================================================
// KEY CONSTRUCTION
// =============================================================================

/// Escape `%` and `:` so the part can sit between `:` separators.
#[must_use]
pub fn escape_key_part(part: &str) -> String {
    let mut escaped = String::with_capacity(part.len());
    for ch in part.chars() {
        match ch {
            '%' => escaped.push_str("%25"),
            ':' => escaped.push_str("%3A"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// `node:<id>`
#[must_use]
pub fn node_key(id: &str) -> String {
    format!("{NODE_PREFIX}{id}")
}

/// `adj:<id>`
#[must_use]
pub fn adj_key(id: &str) -> String {
    format!("{ADJ_PREFIX}{id}")
}

/// `edge:<from>:<to>` with escaped endpoints.
#[must_use]
pub fn edge_key(from: &str, to: &str) -> String {
    format!(
        "{EDGE_PREFIX}{}:{}",
        escape_key_part(from),
        escape_key_part(to)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_keys_do_not_collide_on_colons() {
        assert_ne!(edge_key("a:b", "c"), edge_key("a", "b:c"));
    }

    #[test]
    fn plain_ids_keep_readable_keys() {
        assert_eq!(edge_key("A", "B"), "edge:A:B");
        assert_eq!(node_key("A"), "node:A");
        assert_eq!(adj_key("A"), "adj:A");
    }

    #[test]
    fn node_id_limits() {
        assert!(is_valid_node_id("A"));
        assert!(!is_valid_node_id(""));
        assert!(!is_valid_node_id(&"x".repeat(MAX_NODE_ID_LENGTH + 1)));
    }
}
