//! Normalization from the raw type graph to canonical component schemas.
//!
//! This module handles all the extractor-facing logic:
//! - Raw node to canonical schema conversion, property order preserved
//! - Open-map detection (zero properties, zero required)
//! - Union collapsing (literal-string unions, discriminated ref unions)
//! - Memoized, cycle-safe traversal of the type graph
//!
//! Each type name is normalized at most once per run. While a body is being
//! expanded its component slot holds a [`CanonicalSchema::Pending`] marker;
//! a re-entrant visit through a reference short-circuits to a pointer, so
//! self-referential structures terminate and never expand a body twice.

use indexmap::IndexMap;
use tracing::debug;

use super::overrides::OverrideRegistry;
use super::schema::{
    CanonicalSchema, ObjectSchema, PrimitiveSchema, PrimitiveType, UnionKind,
};
use crate::error::{GenerateError, OverrideWarning};
use crate::raw::{RawGraph, RawSchema, RawShape, RawUnionKind, TypeName};

/// Result of a graph normalization pass: the component map in extraction
/// order plus the non-fatal warnings collected while applying overrides.
#[derive(Debug)]
pub struct NormalizedComponents {
    /// Canonical schemas keyed by type name, in extraction order.
    pub components: IndexMap<TypeName, CanonicalSchema>,
    /// Override rules skipped because their field path was absent.
    pub warnings: Vec<OverrideWarning>,
}

/// Single-pass normalizer over one raw type graph.
#[derive(Debug)]
pub struct Normalizer<'a> {
    graph: &'a RawGraph,
    registry: &'a OverrideRegistry,
    components: IndexMap<TypeName, CanonicalSchema>,
    warnings: Vec<OverrideWarning>,
}

impl<'a> Normalizer<'a> {
    /// Create a normalizer over `graph`, consulting `registry` for
    /// per-type override rules.
    pub fn new(graph: &'a RawGraph, registry: &'a OverrideRegistry) -> Self {
        Self {
            graph,
            registry,
            components: IndexMap::new(),
            warnings: Vec::new(),
        }
    }

    /// Normalize every type in the graph. Aborts on the first structural
    /// error; no partial component map is returned.
    pub fn normalize_graph(mut self) -> Result<NormalizedComponents, GenerateError> {
        debug!(types = self.graph.types.len(), "Normalizing raw type graph.");

        for name in self.graph.types.keys() {
            self.normalize_type(name)?;
        }

        // Visit order is demand-driven (references are normalized as they
        // are encountered), but the emitted map follows extraction order.
        let mut components = IndexMap::with_capacity(self.components.len());
        for name in self.graph.types.keys() {
            if let Some(schema) = self.components.swap_remove(name) {
                components.insert(name.clone(), schema);
            }
        }

        debug!(
            components = components.len(),
            warnings = self.warnings.len(),
            "Raw type graph normalized."
        );

        Ok(NormalizedComponents {
            components,
            warnings: self.warnings,
        })
    }

    /// Normalize one named type into its component slot. Memoized: the
    /// first call expands the body, later calls (including re-entrant ones
    /// from cycles, which observe the `Pending` marker) return immediately.
    fn normalize_type(&mut self, name: &str) -> Result<(), GenerateError> {
        if self.components.contains_key(name) {
            return Ok(());
        }
        let graph: &'a RawGraph = self.graph;
        let Some(raw) = graph.get(name) else {
            // A dangling reference target; left for the serializer boundary
            // walk to report with full document context.
            return Ok(());
        };

        self.components.insert(
            name.to_string(),
            CanonicalSchema::Pending {
                type_name: name.to_string(),
            },
        );

        // For types with a registered whole-schema replacement the registry
        // is authoritative and the extractor's node is never consulted.
        let mut canonical = match self.registry.replacement(name) {
            Some(seed) => seed.clone(),
            None => self.normalize_node(name, raw)?,
        };
        self.registry
            .apply(name, &mut canonical, &mut self.warnings);

        // Replaces the Pending marker in place, keeping the slot's position.
        self.components.insert(name.to_string(), canonical);
        Ok(())
    }

    /// Normalize one raw node. `type_name` is the named type whose body the
    /// node belongs to, used for error attribution.
    fn normalize_node(
        &mut self,
        type_name: &str,
        raw: &RawSchema,
    ) -> Result<CanonicalSchema, GenerateError> {
        match raw.shape() {
            RawShape::Ref(target) => {
                self.normalize_type(target)?;
                Ok(CanonicalSchema::Ref {
                    target: target.to_string(),
                    description: raw.description.clone(),
                })
            }
            RawShape::Primitive(node) => Ok(CanonicalSchema::Primitive(PrimitiveSchema {
                ty: node
                    .schema_type
                    .as_deref()
                    .and_then(PrimitiveType::from_keyword),
                pattern: node.pattern.clone(),
                enum_values: node.enum_values.clone(),
                description: node.description.clone(),
            })),
            RawShape::Object(node) => self.normalize_object(type_name, node),
            RawShape::Array(node) => {
                let items = match &node.items {
                    Some(items) => self.normalize_node(type_name, items)?,
                    // Item type unrecoverable from the declaration; emit the
                    // canonical dynamic shape.
                    None => CanonicalSchema::OpenMap { description: None },
                };
                Ok(CanonicalSchema::Array {
                    items: Box::new(items),
                    description: node.description.clone(),
                })
            }
            RawShape::Union(kind, variants) => {
                self.normalize_union(type_name, kind, variants, raw.description.clone())
            }
            RawShape::Unrecognized => Err(GenerateError::SchemaShape {
                type_name: type_name.to_string(),
            }),
        }
    }

    /// Normalize an object node. An object with zero declared properties and
    /// zero required fields denotes a dynamically-keyed map and converts to
    /// the explicit open-map schema.
    fn normalize_object(
        &mut self,
        type_name: &str,
        node: &RawSchema,
    ) -> Result<CanonicalSchema, GenerateError> {
        let no_properties = node.properties.as_ref().is_none_or(IndexMap::is_empty);
        let no_required = node.required.as_ref().is_none_or(Vec::is_empty);
        if no_properties && no_required {
            return Ok(CanonicalSchema::OpenMap {
                description: node.description.clone(),
            });
        }

        let mut properties = IndexMap::new();
        if let Some(raw_properties) = &node.properties {
            for (property, raw_property) in raw_properties {
                let schema = self.normalize_node(type_name, raw_property)?;
                properties.insert(property.clone(), schema);
            }
        }

        Ok(CanonicalSchema::Object(ObjectSchema {
            properties,
            required: node.required.clone().unwrap_or_default(),
            additional_properties: None,
            description: node.description.clone(),
        }))
    }

    /// Normalize a union node.
    ///
    /// Two structural patterns are detected:
    /// - every variant a bare string literal: collapsed to one
    ///   `{type: string, enum: [...]}` in declaration order, never sorted;
    /// - every variant a reference to a named type: kept as an explicit
    ///   `oneOf` list of references (discriminated union), never inlined.
    ///
    /// Anything else keeps its declared kind with variants normalized
    /// recursively.
    fn normalize_union(
        &mut self,
        type_name: &str,
        kind: RawUnionKind,
        variants: &[RawSchema],
        description: Option<String>,
    ) -> Result<CanonicalSchema, GenerateError> {
        if !variants.is_empty() && variants.iter().all(RawSchema::is_string_literal) {
            let mut values: Vec<String> = Vec::new();
            for variant in variants {
                for value in variant.enum_values.as_deref().unwrap_or_default() {
                    if !values.contains(value) {
                        values.push(value.clone());
                    }
                }
            }
            return Ok(CanonicalSchema::Primitive(PrimitiveSchema {
                ty: Some(PrimitiveType::String),
                pattern: None,
                enum_values: Some(values),
                description,
            }));
        }

        let all_refs = !variants.is_empty()
            && variants
                .iter()
                .all(|variant| matches!(variant.shape(), RawShape::Ref(_)));

        let normalized = variants
            .iter()
            .map(|variant| self.normalize_node(type_name, variant))
            .collect::<Result<Vec<_>, _>>()?;

        let kind = if all_refs {
            UnionKind::OneOf
        } else {
            match kind {
                RawUnionKind::AnyOf => UnionKind::AnyOf,
                RawUnionKind::OneOf => UnionKind::OneOf,
                RawUnionKind::AllOf => UnionKind::AllOf,
            }
        };

        Ok(CanonicalSchema::Union {
            kind,
            variants: normalized,
            description,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn normalize(graph_json: &str) -> NormalizedComponents {
        let graph = RawGraph::from_json(graph_json).unwrap();
        let registry = OverrideRegistry::new();
        Normalizer::new(&graph, &registry)
            .normalize_graph()
            .unwrap()
    }

    #[test]
    fn test_empty_object_becomes_open_map() {
        let normalized = normalize(r#"{ "QuoteMetadata": { "type": "object" } }"#);
        assert_eq!(
            normalized.components["QuoteMetadata"],
            CanonicalSchema::OpenMap { description: None }
        );
    }

    #[test]
    fn test_literal_union_collapses_in_declared_order() {
        let normalized = normalize(
            r#"{
                "QuotePreference": {
                    "anyOf": [
                        { "type": "string", "enum": ["price"] },
                        { "type": "string", "enum": ["speed"] },
                        { "type": "string", "enum": ["input-priority"] },
                        { "type": "string", "enum": ["trust-minimization"] }
                    ]
                }
            }"#,
        );
        assert_eq!(
            normalized.components["QuotePreference"],
            CanonicalSchema::string_enum(["price", "speed", "input-priority", "trust-minimization"])
        );
    }

    #[test]
    fn test_ref_union_stays_one_of_references() {
        let normalized = normalize(
            r##"{
                "NativeLock": { "type": "object", "required": ["txid"], "properties": { "txid": { "type": "string" } } },
                "ContractLock": { "type": "object", "required": ["vault"], "properties": { "vault": { "type": "string" } } },
                "AssetLockReference": {
                    "anyOf": [
                        { "$ref": "#/components/schemas/NativeLock" },
                        { "$ref": "#/components/schemas/ContractLock" }
                    ]
                }
            }"##,
        );
        let CanonicalSchema::Union { kind, variants, .. } =
            &normalized.components["AssetLockReference"]
        else {
            unreachable!("union expected");
        };
        assert_eq!(*kind, UnionKind::OneOf);
        assert_eq!(
            variants,
            &[
                CanonicalSchema::reference("NativeLock"),
                CanonicalSchema::reference("ContractLock"),
            ]
        );
    }

    #[test]
    fn test_self_referential_type_terminates() {
        let normalized = normalize(
            r##"{
                "OrderNode": {
                    "type": "object",
                    "required": ["id"],
                    "properties": {
                        "id": { "type": "string" },
                        "next": { "$ref": "#/components/schemas/OrderNode" }
                    }
                }
            }"##,
        );
        let CanonicalSchema::Object(object) = &normalized.components["OrderNode"] else {
            unreachable!("object expected");
        };
        assert_eq!(
            object.properties["next"],
            CanonicalSchema::reference("OrderNode")
        );
    }

    #[test]
    fn test_components_follow_extraction_order() {
        let normalized = normalize(
            r##"{
                "GetQuoteRequest": {
                    "type": "object",
                    "required": ["amount"],
                    "properties": { "amount": { "$ref": "#/components/schemas/Amount" } }
                },
                "Amount": { "type": "string" }
            }"##,
        );
        let names: Vec<_> = normalized.components.keys().cloned().collect();
        assert_eq!(names, vec!["GetQuoteRequest", "Amount"]);
    }

    #[test]
    fn test_unrecognizable_node_names_offending_type() {
        let graph = RawGraph::from_json(r#"{ "Mystery": {} }"#).unwrap();
        let registry = OverrideRegistry::new();
        let err = Normalizer::new(&graph, &registry)
            .normalize_graph()
            .unwrap_err();
        assert_eq!(
            err,
            GenerateError::SchemaShape {
                type_name: "Mystery".to_string()
            }
        );
    }

    #[test]
    fn test_replacement_skips_extractor_node_entirely() {
        // The extractor node is unclassifiable; with a replacement
        // registered the run must still succeed with the literal.
        let graph = RawGraph::from_json(r#"{ "Address": {} }"#).unwrap();
        let mut registry = OverrideRegistry::new();
        registry.replace(
            "Address",
            CanonicalSchema::string_pattern("^0x[0-9a-fA-F]{40}$"),
        );

        let normalized = Normalizer::new(&graph, &registry)
            .normalize_graph()
            .unwrap();
        assert_eq!(
            normalized.components["Address"],
            CanonicalSchema::string_pattern("^0x[0-9a-fA-F]{40}$")
        );
    }

    #[test]
    fn test_rerun_yields_identical_components() {
        let graph_json = r##"{
            "Amount": { "type": "string", "pattern": "^[0-9]+$" },
            "Quote": {
                "type": "object",
                "required": ["amount"],
                "properties": { "amount": { "$ref": "#/components/schemas/Amount" } }
            }
        }"##;
        let first = normalize(graph_json);
        let second = normalize(graph_json);
        assert_eq!(first.components, second.components);
    }
}
