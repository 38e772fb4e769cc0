//! OpenAPI document generator for the swap-quote wire protocol.
//!
//! Translates the raw type graph produced by an external type-declaration
//! extractor into a normalized, diff-stable OpenAPI document: component
//! schemas plus the protocol's fixed operation table. The pipeline is
//! strictly sequential, single pass, and deterministic: re-running it on an
//! unchanged graph yields byte-identical output.
//!
//! 1. Extract (external): native declarations -> [`raw::RawGraph`]
//! 2. Normalize + override: raw nodes -> canonical component schemas
//! 3. Assemble: components + operation table -> immutable [`document::Document`]
//! 4. Serialize: boundary check + deterministic JSON rendering
//!
//! Structural errors abort the whole run with no partial output; skipped
//! override rules surface as warnings without blocking completion.

pub mod document;
pub mod error;
pub mod protocol;
pub mod raw;

use tracing::debug;

pub use document::{Document, DocumentConfig, OverrideRegistry, render_json};
pub use error::{GenerateError, OverrideWarning};
pub use raw::RawGraph;

use document::{NormalizedComponents, Normalizer, assemble};

/// A successfully assembled document together with the non-fatal warnings
/// collected along the way.
#[derive(Debug)]
pub struct DocumentBuild {
    /// The immutable output document.
    pub document: Document,
    /// Override rules skipped because their field path was absent.
    pub warnings: Vec<OverrideWarning>,
}

/// Run normalization, override application, and assembly over one raw type
/// graph. Fails on the first structural error and produces nothing partial.
pub fn build_document(
    graph: &RawGraph,
    registry: &OverrideRegistry,
    config: &DocumentConfig,
) -> Result<DocumentBuild, GenerateError> {
    debug!(title = %config.title, "Building schema document.");

    let NormalizedComponents {
        components,
        warnings,
    } = Normalizer::new(graph, registry).normalize_graph()?;

    let document = assemble(components, config)?;

    debug!(
        components = document.components().len(),
        warnings = warnings.len(),
        "Schema document built."
    );

    Ok(DocumentBuild { document, warnings })
}
