//! Schema translation pipeline: raw type graph to OpenAPI document.
//!
//! The pipeline is strictly sequential and single pass:
//! 1. Normalize: raw nodes -> canonical component schemas (overrides applied)
//! 2. Assemble: components + operation table -> immutable Document
//! 3. Emit: boundary check + deterministic JSON rendering
//!
//! Any failure in an earlier phase prevents entry into later phases; an
//! aborted run produces no output at all.
//!
//! ## Module Structure
//!
//! - `schema`: canonical schema IR and its deterministic serialization
//! - `normalize`: raw graph -> component map (memoized, cycle-safe)
//! - `overrides`: declarative per-type rewrite rules
//! - `assemble`: component map + operation table -> Document
//! - `emit`: serializer boundary (exhaustive check, JSON rendering)

mod assemble;
mod emit;
mod normalize;
mod overrides;
mod schema;

pub use assemble::{
    Document, DocumentConfig, HttpMethod, OperationSpec, ResponseSpec, assemble,
};
pub use emit::{check_document, render_json};
pub use normalize::{NormalizedComponents, Normalizer};
pub use overrides::{OverrideAction, OverrideRegistry, OverrideRule};
pub use schema::{CanonicalSchema, ObjectSchema, PrimitiveSchema, PrimitiveType, UnionKind};
