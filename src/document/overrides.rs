//! Override registry: declarative per-type rewrite rules.
//!
//! Generic extraction from native type aliases cannot recover semantic
//! constraints (regex patterns, closed value sets), so a small set of
//! well-known types is owned by this registry instead of the extractor. The
//! registry is pure configuration: an immutable value constructed once and
//! passed to the normalizer, never ambient state. New special cases become
//! registry entries, not new code paths.
//!
//! Rules for a type are applied in declaration order; when two rules target
//! the same field path the later rule wins. A rule whose field path does not
//! exist in the canonical schema is skipped with a non-fatal warning, so the
//! run tolerates drift between extractor output and registry expectations.

use indexmap::IndexMap;
use tracing::warn;

use super::schema::{CanonicalSchema, ObjectSchema, PrimitiveType};
use crate::error::OverrideWarning;
use crate::raw::TypeName;

/// A single rewrite action applied at a field path.
#[derive(Debug, Clone, PartialEq)]
pub enum OverrideAction {
    /// Replace the whole schema at the path with this literal. At the root
    /// path this makes the registry, not the extractor, authoritative for
    /// the type.
    ReplaceWholeSchema(CanonicalSchema),
    /// Force the schema at the path to be a reference to a named component
    /// rather than an inlined shape.
    SetRef(TypeName),
    /// Force a closed, order-preserving string value set.
    SetEnum(Vec<String>),
    /// Attach or override the human-readable description.
    SetDescription(String),
    /// Mark the object at the path as an open map (`true`) or explicitly
    /// closed (`false`). Closed objects are emitted with a literal
    /// `additionalProperties: false`.
    MarkAdditionalProperties(bool),
}

/// One rule: a field path into the type's canonical schema plus the action
/// to apply there. An empty path addresses the type's root schema; nested
/// properties are addressed with dotted paths (`"details.lock"`).
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideRule {
    /// Dotted property path; empty for the root schema.
    pub field_path: String,
    /// The rewrite to perform.
    pub action: OverrideAction,
}

/// Ordered per-type rule table.
#[derive(Debug, Clone, Default)]
pub struct OverrideRegistry {
    rules: IndexMap<TypeName, Vec<OverrideRule>>,
}

impl OverrideRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule for `type_name` at `field_path`.
    pub fn add(
        &mut self,
        type_name: impl Into<TypeName>,
        field_path: impl Into<String>,
        action: OverrideAction,
    ) {
        self.rules.entry(type_name.into()).or_default().push(OverrideRule {
            field_path: field_path.into(),
            action,
        });
    }

    /// Append a whole-schema replacement for `type_name`. The extractor's
    /// node for that type will never be consulted.
    pub fn replace(&mut self, type_name: impl Into<TypeName>, schema: CanonicalSchema) {
        self.add(type_name, "", OverrideAction::ReplaceWholeSchema(schema));
    }

    /// Rules registered for a type, in declaration order.
    pub fn rules_for(&self, type_name: &str) -> &[OverrideRule] {
        self.rules
            .get(type_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The authoritative root replacement for a type, if one is registered.
    /// When several replacement rules exist the last one wins.
    pub fn replacement(&self, type_name: &str) -> Option<&CanonicalSchema> {
        self.rules_for(type_name)
            .iter()
            .rev()
            .find_map(|rule| match &rule.action {
                OverrideAction::ReplaceWholeSchema(schema) if rule.field_path.is_empty() => {
                    Some(schema)
                }
                _ => None,
            })
    }

    /// Apply every rule registered for `type_name` to `schema`, in
    /// declaration order. Missing field paths are recorded in `warnings`
    /// and skipped. Application is idempotent: a second pass over an
    /// already-overridden schema leaves it unchanged.
    pub fn apply(
        &self,
        type_name: &str,
        schema: &mut CanonicalSchema,
        warnings: &mut Vec<OverrideWarning>,
    ) {
        for rule in self.rules_for(type_name) {
            let Some(slot) = resolve_path(schema, &rule.field_path) else {
                warn!(
                    type_name,
                    field_path = %rule.field_path,
                    "Override field path not present, rule skipped."
                );
                warnings.push(OverrideWarning {
                    type_name: type_name.to_string(),
                    field_path: rule.field_path.clone(),
                });
                continue;
            };
            apply_action(slot, &rule.action);
        }
    }
}

/// Resolve a dotted field path to the addressed schema node. The empty path
/// addresses the root. Only object properties are traversable.
fn resolve_path<'a>(
    schema: &'a mut CanonicalSchema,
    field_path: &str,
) -> Option<&'a mut CanonicalSchema> {
    if field_path.is_empty() {
        return Some(schema);
    }
    let mut current = schema;
    for segment in field_path.split('.') {
        match current {
            CanonicalSchema::Object(object) => {
                current = object.properties.get_mut(segment)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

fn apply_action(slot: &mut CanonicalSchema, action: &OverrideAction) {
    match action {
        OverrideAction::ReplaceWholeSchema(literal) => {
            *slot = literal.clone();
        }
        OverrideAction::SetRef(target) => {
            *slot = CanonicalSchema::reference(target.clone());
        }
        OverrideAction::SetEnum(values) => match slot {
            CanonicalSchema::Primitive(primitive) => {
                primitive.enum_values = Some(values.clone());
                if primitive.ty.is_none() {
                    primitive.ty = Some(PrimitiveType::String);
                }
            }
            _ => {
                *slot = CanonicalSchema::string_enum(values.clone());
            }
        },
        OverrideAction::SetDescription(text) => {
            slot.set_description(text.clone());
        }
        OverrideAction::MarkAdditionalProperties(open) => mark_additional(slot, *open),
    }
}

/// Flip a node between open-map and closed-object form.
fn mark_additional(slot: &mut CanonicalSchema, open: bool) {
    match slot {
        CanonicalSchema::Object(object) => {
            if open && object.properties.is_empty() {
                *slot = CanonicalSchema::OpenMap {
                    description: object.description.take(),
                };
            } else {
                object.additional_properties = Some(open);
            }
        }
        CanonicalSchema::OpenMap { description } => {
            if !open {
                *slot = CanonicalSchema::Object(ObjectSchema {
                    additional_properties: Some(false),
                    description: description.take(),
                    ..ObjectSchema::default()
                });
            }
        }
        _ => {
            // Non-object nodes are rewritten outright; the registry asked
            // for map semantics at this path.
            *slot = if open {
                CanonicalSchema::OpenMap { description: None }
            } else {
                CanonicalSchema::Object(ObjectSchema {
                    additional_properties: Some(false),
                    ..ObjectSchema::default()
                })
            };
        }
    }
}
