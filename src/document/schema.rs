//! Canonical schema IR for document assembly.
//!
//! This module defines the post-normalization schema representation:
//! - CanonicalSchema: resolved, override-applied schema nodes
//! - PrimitiveType / UnionKind: leaf vocabularies
//! - A manual `Serialize` impl that emits keys in fixed declaration order,
//!   so serialized output is byte-identical across runs
//!
//! References are a feature of the output document, not something flattened
//! away: a canonical schema may still contain `Ref` nodes, each pointing at a
//! key of the component map.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::raw::TypeName;

/// Scalar types of the wire protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    /// JSON string
    String,
    /// JSON integer
    Integer,
    /// JSON number
    Number,
    /// JSON boolean
    Boolean,
}

impl PrimitiveType {
    /// The OpenAPI `type` keyword for this primitive.
    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveType::String => "string",
            PrimitiveType::Integer => "integer",
            PrimitiveType::Number => "number",
            PrimitiveType::Boolean => "boolean",
        }
    }

    /// Map an extractor type keyword onto a primitive, if it names one.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "string" => Some(PrimitiveType::String),
            "integer" => Some(PrimitiveType::Integer),
            "number" => Some(PrimitiveType::Number),
            "boolean" => Some(PrimitiveType::Boolean),
            _ => None,
        }
    }
}

/// Union flavor preserved into the output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnionKind {
    /// `anyOf`
    AnyOf,
    /// `oneOf`
    OneOf,
    /// `allOf`
    AllOf,
}

impl UnionKind {
    /// The OpenAPI keyword for this union kind.
    pub fn keyword(self) -> &'static str {
        match self {
            UnionKind::AnyOf => "anyOf",
            UnionKind::OneOf => "oneOf",
            UnionKind::AllOf => "allOf",
        }
    }
}

/// A scalar schema: type plus optional pattern and closed value set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PrimitiveSchema {
    /// Scalar type; `None` for bare enum nodes that declared no type.
    pub ty: Option<PrimitiveType>,
    /// Regex pattern for string validation.
    pub pattern: Option<String>,
    /// Closed set of string values, in declaration order.
    pub enum_values: Option<Vec<String>>,
    /// Human-readable description.
    pub description: Option<String>,
}

/// An object schema with declaration-ordered properties.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectSchema {
    /// Properties in declaration order.
    pub properties: IndexMap<String, CanonicalSchema>,
    /// Required property names, as declared by the extractor.
    pub required: Vec<String>,
    /// Whether undeclared keys are allowed. `Some(false)` is emitted as a
    /// literal `additionalProperties: false`, never silently omitted.
    pub additional_properties: Option<bool>,
    /// Human-readable description.
    pub description: Option<String>,
}

/// Post-normalization, override-applied schema ready for assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalSchema {
    /// Scalar node.
    Primitive(PrimitiveSchema),
    /// Object node with declared properties.
    Object(ObjectSchema),
    /// Dynamically-keyed map: `{type: object, additionalProperties: true}`.
    /// The canonical form of an object node with zero declared properties.
    OpenMap {
        /// Human-readable description.
        description: Option<String>,
    },
    /// Array node.
    Array {
        /// Item schema.
        items: Box<CanonicalSchema>,
        /// Human-readable description.
        description: Option<String>,
    },
    /// Stable pointer into the component map.
    Ref {
        /// Component key the pointer resolves to.
        target: TypeName,
        /// Optional description carried next to the pointer.
        description: Option<String>,
    },
    /// Union of schemas under a declared kind.
    Union {
        /// anyOf / oneOf / allOf.
        kind: UnionKind,
        /// Variant schemas in declaration order.
        variants: Vec<CanonicalSchema>,
        /// Human-readable description.
        description: Option<String>,
    },
    /// Internal marker: the type's body is still being normalized. Used for
    /// cycle short-circuiting inside the normalizer and must never survive
    /// into an assembled document; the serializer boundary rejects it.
    Pending {
        /// The type whose body is in flight.
        type_name: TypeName,
    },
}

impl CanonicalSchema {
    /// A reference node pointing at `target`.
    pub fn reference(target: impl Into<TypeName>) -> Self {
        CanonicalSchema::Ref {
            target: target.into(),
            description: None,
        }
    }

    /// A string schema constrained to a closed, order-preserving value set.
    pub fn string_enum<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CanonicalSchema::Primitive(PrimitiveSchema {
            ty: Some(PrimitiveType::String),
            enum_values: Some(values.into_iter().map(Into::into).collect()),
            ..PrimitiveSchema::default()
        })
    }

    /// A string schema constrained by a regex pattern.
    pub fn string_pattern(pattern: impl Into<String>) -> Self {
        CanonicalSchema::Primitive(PrimitiveSchema {
            ty: Some(PrimitiveType::String),
            pattern: Some(pattern.into()),
            ..PrimitiveSchema::default()
        })
    }

    /// Attach or replace the human-readable description on this node.
    pub fn set_description(&mut self, text: impl Into<String>) {
        let text = text.into();
        match self {
            CanonicalSchema::Primitive(p) => p.description = Some(text),
            CanonicalSchema::Object(o) => o.description = Some(text),
            CanonicalSchema::OpenMap { description }
            | CanonicalSchema::Array { description, .. }
            | CanonicalSchema::Ref { description, .. }
            | CanonicalSchema::Union { description, .. } => *description = Some(text),
            CanonicalSchema::Pending { .. } => {}
        }
    }

    /// Builder form of [`Self::set_description`].
    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        self.set_description(text);
        self
    }
}

// Key emission order is fixed per variant so that serialized output is
// byte-identical across runs: type, description, pattern, enum for scalars;
// type, description, required, properties, additionalProperties for objects.
impl Serialize for CanonicalSchema {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            CanonicalSchema::Primitive(p) => {
                let mut map = serializer.serialize_map(None)?;
                if let Some(ty) = p.ty {
                    map.serialize_entry("type", ty.as_str())?;
                }
                if let Some(description) = &p.description {
                    map.serialize_entry("description", description)?;
                }
                if let Some(pattern) = &p.pattern {
                    map.serialize_entry("pattern", pattern)?;
                }
                if let Some(values) = &p.enum_values {
                    map.serialize_entry("enum", values)?;
                }
                map.end()
            }
            CanonicalSchema::Object(o) => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("type", "object")?;
                if let Some(description) = &o.description {
                    map.serialize_entry("description", description)?;
                }
                if !o.required.is_empty() {
                    map.serialize_entry("required", &o.required)?;
                }
                map.serialize_entry("properties", &o.properties)?;
                if let Some(additional) = o.additional_properties {
                    map.serialize_entry("additionalProperties", &additional)?;
                }
                map.end()
            }
            CanonicalSchema::OpenMap { description } => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("type", "object")?;
                if let Some(description) = description {
                    map.serialize_entry("description", description)?;
                }
                map.serialize_entry("additionalProperties", &true)?;
                map.end()
            }
            CanonicalSchema::Array { items, description } => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("type", "array")?;
                if let Some(description) = description {
                    map.serialize_entry("description", description)?;
                }
                map.serialize_entry("items", items)?;
                map.end()
            }
            CanonicalSchema::Ref {
                target,
                description,
            } => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("$ref", &format!("#/components/schemas/{target}"))?;
                if let Some(description) = description {
                    map.serialize_entry("description", description)?;
                }
                map.end()
            }
            CanonicalSchema::Union {
                kind,
                variants,
                description,
            } => {
                let mut map = serializer.serialize_map(None)?;
                if let Some(description) = description {
                    map.serialize_entry("description", description)?;
                }
                map.serialize_entry(kind.keyword(), variants)?;
                map.end()
            }
            CanonicalSchema::Pending { type_name } => Err(serde::ser::Error::custom(format!(
                "internal marker node for '{type_name}' reached serialization"
            ))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_key_order() {
        let schema = CanonicalSchema::Primitive(PrimitiveSchema {
            ty: Some(PrimitiveType::String),
            pattern: Some("^0x[0-9a-f]+$".to_string()),
            enum_values: None,
            description: Some("hex".to_string()),
        });
        let json = serde_json::to_string(&schema).unwrap();
        assert_eq!(
            json,
            r#"{"type":"string","description":"hex","pattern":"^0x[0-9a-f]+$"}"#
        );
    }

    #[test]
    fn test_ref_serializes_as_component_pointer() {
        let schema = CanonicalSchema::reference("Address");
        let json = serde_json::to_string(&schema).unwrap();
        assert_eq!(json, r##"{"$ref":"#/components/schemas/Address"}"##);
    }

    #[test]
    fn test_open_map_shape() {
        let schema = CanonicalSchema::OpenMap { description: None };
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "object", "additionalProperties": true })
        );
    }

    #[test]
    fn test_closed_object_emits_literal_false() {
        let schema = CanonicalSchema::Object(ObjectSchema {
            additional_properties: Some(false),
            ..ObjectSchema::default()
        });
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["additionalProperties"], serde_json::json!(false));
    }

    #[test]
    fn test_pending_marker_fails_serialization() {
        let schema = CanonicalSchema::Pending {
            type_name: "Quote".to_string(),
        };
        assert!(serde_json::to_string(&schema).is_err());
    }

    #[test]
    fn test_enum_order_preserved() {
        let schema =
            CanonicalSchema::string_enum(["price", "speed", "input-priority", "trust-minimization"]);
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(
            json["enum"],
            serde_json::json!(["price", "speed", "input-priority", "trust-minimization"])
        );
    }
}
