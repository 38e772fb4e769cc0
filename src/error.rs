//! Error taxonomy for the document generation pipeline.
//!
//! Fatal errors abort the run with no output written; an incomplete schema
//! document is strictly worse than no document, since protocol clients are
//! generated against it. Warnings are collected and returned alongside the
//! result but never block completion.

use thiserror::Error;

/// Fatal pipeline errors. All variants are deterministic functions of the
/// input type graph and the override registry; there is no retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    /// A raw node has no recognizable shape (none of type, $ref, enum,
    /// properties, or a union list). Raised during normalization.
    #[error("schema for '{type_name}' has no recognizable shape (expected one of type, $ref, enum, properties, anyOf/oneOf/allOf)")]
    SchemaShape {
        /// The type whose raw node could not be classified.
        type_name: String,
    },

    /// An operation binds a request or response schema that is absent from
    /// the component map. Raised at assembly time, before serialization.
    #[error("operation '{method} {path}' references unknown component '{component}'")]
    UnknownComponent {
        /// The missing component name.
        component: String,
        /// HTTP method of the offending operation.
        method: String,
        /// Path of the offending operation.
        path: String,
    },

    /// An internal-only marker node or a dangling reference reached the
    /// serializer boundary. Indicates an invariant violation in
    /// normalization or assembly; should never occur.
    #[error("document rejected at serializer boundary: {reason}")]
    SerializationRejected {
        /// Description of the offending node.
        reason: String,
    },
}

/// Non-fatal warning: an override rule's field path was absent from the
/// canonical schema at application time. The rule is skipped so the run
/// tolerates drift between the extractor's output and the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("override for '{type_name}': field path '{field_path}' not present, rule skipped")]
pub struct OverrideWarning {
    /// The type the rule targeted.
    pub type_name: String,
    /// The dotted field path that did not resolve.
    pub field_path: String,
}
