//! Serializer boundary for assembled documents.
//!
//! The core guarantees it never hands the serializer a document containing
//! an unresolved internal marker or a dangling reference. This module is
//! that guarantee: [`check_document`] walks the whole document (every
//! component body and every operation binding, not a sample) and rejects
//! violations with an assertion-style error before any text is rendered.
//! Rendering itself is purely mechanical: serde_json over the document's
//! declaration-ordered `Serialize` impls, so an unchanged input graph
//! yields byte-identical output.

use indexmap::IndexMap;
use tracing::debug;

use super::assemble::Document;
use super::schema::CanonicalSchema;
use crate::error::GenerateError;
use crate::raw::TypeName;

/// Exhaustively verify that `document` is fit for serialization: no
/// in-flight marker nodes, and every reference anywhere in the document
/// resolves to a key of the component map.
pub fn check_document(document: &Document) -> Result<(), GenerateError> {
    let components = document.components();

    for (name, schema) in components {
        check_schema(schema, name, components)?;
    }

    // Operation bindings were validated at assembly; re-checked here so the
    // boundary holds even if a document was built some other way.
    for operation in document.operations() {
        let mut bindings: Vec<&TypeName> = operation.request.iter().collect();
        bindings.extend(
            operation
                .responses
                .iter()
                .filter_map(|response| response.schema.as_ref()),
        );
        for component in bindings {
            if !components.contains_key(component) {
                return Err(GenerateError::SerializationRejected {
                    reason: format!(
                        "operation '{} {}' references component '{component}' absent from the component map",
                        operation.method.as_str(),
                        operation.path
                    ),
                });
            }
        }
    }

    Ok(())
}

/// Render the document to deterministic JSON text, checking the boundary
/// contract first.
pub fn render_json(document: &Document) -> Result<String, GenerateError> {
    check_document(document)?;
    let text = serde_json::to_string_pretty(document).map_err(|e| {
        GenerateError::SerializationRejected {
            reason: e.to_string(),
        }
    })?;
    debug!(bytes = text.len(), "Document rendered.");
    Ok(text)
}

fn check_schema(
    schema: &CanonicalSchema,
    owner: &str,
    components: &IndexMap<TypeName, CanonicalSchema>,
) -> Result<(), GenerateError> {
    match schema {
        CanonicalSchema::Pending { type_name } => Err(GenerateError::SerializationRejected {
            reason: format!(
                "internal marker node for '{type_name}' leaked into component '{owner}'"
            ),
        }),
        CanonicalSchema::Ref { target, .. } => {
            if components.contains_key(target) {
                Ok(())
            } else {
                Err(GenerateError::SerializationRejected {
                    reason: format!(
                        "dangling reference to '{target}' inside component '{owner}'"
                    ),
                })
            }
        }
        CanonicalSchema::Object(object) => {
            for property in object.properties.values() {
                check_schema(property, owner, components)?;
            }
            Ok(())
        }
        CanonicalSchema::Array { items, .. } => check_schema(items, owner, components),
        CanonicalSchema::Union { variants, .. } => {
            for variant in variants {
                check_schema(variant, owner, components)?;
            }
            Ok(())
        }
        CanonicalSchema::Primitive(_) | CanonicalSchema::OpenMap { .. } => Ok(()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::document::assemble::{DocumentConfig, assemble};
    use crate::document::schema::ObjectSchema;
    use indexmap::indexmap;

    #[test]
    fn test_dangling_reference_rejected() {
        let components = indexmap! {
            "Quote".to_string() => CanonicalSchema::Object(ObjectSchema {
                properties: indexmap! {
                    "amount".to_string() => CanonicalSchema::reference("Amount"),
                },
                required: vec!["amount".to_string()],
                ..ObjectSchema::default()
            }),
        };
        let document = assemble(components, &DocumentConfig::default()).unwrap();

        let err = check_document(&document).unwrap_err();
        assert!(matches!(err, GenerateError::SerializationRejected { .. }));
        assert!(err.to_string().contains("Amount"));
    }

    #[test]
    fn test_pending_marker_rejected() {
        let components = indexmap! {
            "Quote".to_string() => CanonicalSchema::Pending {
                type_name: "Quote".to_string(),
            },
        };
        let document = assemble(components, &DocumentConfig::default()).unwrap();

        let err = check_document(&document).unwrap_err();
        assert!(matches!(err, GenerateError::SerializationRejected { .. }));
    }

    #[test]
    fn test_well_formed_document_renders() {
        let components = indexmap! {
            "Amount".to_string() => CanonicalSchema::string_pattern("^[0-9]+$"),
            "Quote".to_string() => CanonicalSchema::Object(ObjectSchema {
                properties: indexmap! {
                    "amount".to_string() => CanonicalSchema::reference("Amount"),
                },
                required: vec!["amount".to_string()],
                ..ObjectSchema::default()
            }),
        };
        let document = assemble(components, &DocumentConfig::default()).unwrap();

        let text = render_json(&document).unwrap();
        assert!(text.contains("#/components/schemas/Amount"));
    }
}
