//! Raw schema nodes as produced by the type-declaration extractor.
//!
//! This module defines the input boundary of the pipeline: a graph of
//! JSON-Schema-shaped nodes keyed by type name. The core makes no assumption
//! about how the graph was produced, only about its shape. Classification
//! into the recognized node kinds happens lazily via [`RawSchema::shape`];
//! unclassifiable nodes are reported during normalization, not here.

use indexmap::IndexMap;
use serde::Deserialize;

/// Unique string identifier for a declared type; keys the component map.
pub type TypeName = String;

/// One raw schema node. A single struct of optional fields rather than an
/// enum, because extractor output is free-form JSON and the interesting
/// classification (see [`RawShape`]) depends on which fields are populated.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSchema {
    /// The declared type (string, integer, number, boolean, object, array).
    #[serde(rename = "type")]
    pub schema_type: Option<String>,

    /// Reference to another declared type, either bare or as a
    /// `#/components/schemas/...` pointer.
    #[serde(rename = "$ref")]
    pub ref_target: Option<String>,

    /// Regex pattern for string validation.
    pub pattern: Option<String>,

    /// Human-readable description carried through to the document.
    pub description: Option<String>,

    /// Closed set of string values.
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<String>>,

    /// Properties for object nodes, in declaration order.
    pub properties: Option<IndexMap<String, RawSchema>>,

    /// Required property names for object nodes.
    pub required: Option<Vec<String>>,

    /// Item schema for array nodes.
    pub items: Option<Box<RawSchema>>,

    /// Union: any of these schemas.
    #[serde(rename = "anyOf")]
    pub any_of: Option<Vec<RawSchema>>,

    /// Union: exactly one of these schemas.
    #[serde(rename = "oneOf")]
    pub one_of: Option<Vec<RawSchema>>,

    /// Intersection: all of these schemas combined.
    #[serde(rename = "allOf")]
    pub all_of: Option<Vec<RawSchema>>,
}

/// Union flavor of a raw union node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawUnionKind {
    /// `anyOf`
    AnyOf,
    /// `oneOf`
    OneOf,
    /// `allOf`
    AllOf,
}

/// Classified view of a raw node. Borrowed from the underlying [`RawSchema`].
#[derive(Debug)]
pub enum RawShape<'a> {
    /// Scalar node: string/integer/number/boolean, possibly with a pattern
    /// or a closed enum. A bare `enum` with no `type` also lands here.
    Primitive(&'a RawSchema),
    /// Object node with declared properties (possibly none).
    Object(&'a RawSchema),
    /// Array node.
    Array(&'a RawSchema),
    /// Reference to another declared type.
    Ref(&'a str),
    /// Union node with its declared kind.
    Union(RawUnionKind, &'a [RawSchema]),
    /// None of the recognized fields are present.
    Unrecognized,
}

impl RawSchema {
    /// Classify this node into one of the recognized shapes.
    ///
    /// Precedence mirrors normalization order: `$ref` first, then union
    /// lists, then object/array/primitive by declared type. A node carrying
    /// `properties` but no `type` still classifies as an object.
    pub fn shape(&self) -> RawShape<'_> {
        if let Some(target) = &self.ref_target {
            return RawShape::Ref(ref_to_type_name(target));
        }
        if let Some(variants) = &self.any_of {
            return RawShape::Union(RawUnionKind::AnyOf, variants);
        }
        if let Some(variants) = &self.one_of {
            return RawShape::Union(RawUnionKind::OneOf, variants);
        }
        if let Some(variants) = &self.all_of {
            return RawShape::Union(RawUnionKind::AllOf, variants);
        }
        match self.schema_type.as_deref() {
            Some("object") => RawShape::Object(self),
            Some("array") => RawShape::Array(self),
            Some(_) => RawShape::Primitive(self),
            None => {
                if self.properties.is_some() {
                    RawShape::Object(self)
                } else if self.enum_values.is_some() {
                    RawShape::Primitive(self)
                } else {
                    RawShape::Unrecognized
                }
            }
        }
    }

    /// Whether this node is a bare string literal: a string-typed node (or
    /// untyped enum node) whose value set is non-empty. Unions made entirely
    /// of such nodes collapse to a single enum schema.
    pub fn is_string_literal(&self) -> bool {
        let string_typed = matches!(self.schema_type.as_deref(), Some("string") | None);
        string_typed
            && self.ref_target.is_none()
            && self.properties.is_none()
            && self
                .enum_values
                .as_ref()
                .is_some_and(|values| !values.is_empty())
    }
}

/// The full raw type graph, keyed by type name in extraction order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct RawGraph {
    /// Raw nodes in extraction order.
    pub types: IndexMap<TypeName, RawSchema>,
}

impl RawGraph {
    /// Parse a raw graph from the extractor's JSON output.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Failed to parse raw type graph: {e}"))
    }

    /// Look up a raw node by type name.
    pub fn get(&self, name: &str) -> Option<&RawSchema> {
        self.types.get(name)
    }
}

/// Extract the bare type name from a reference target, stripping the
/// document-pointer prefix if present.
pub fn ref_to_type_name(target: &str) -> &str {
    target
        .strip_prefix("#/components/schemas/")
        .unwrap_or(target)
}
