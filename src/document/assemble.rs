//! Document assembly: canonical components plus the fixed operation table.
//!
//! The assembler validates every request/response schema binding against the
//! component map before the document exists, so a broken reference fails the
//! run instead of reaching serialization. Configuration (title, version,
//! servers, tags, summaries, the operation table itself) is forwarded
//! unmodified; the assembler interprets none of it.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

use super::schema::CanonicalSchema;
use crate::error::GenerateError;
use crate::raw::TypeName;

/// HTTP method of a declared operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
}

impl HttpMethod {
    /// Upper-case method name, for error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Lower-case keyword used as the key inside a path item.
    pub fn keyword(self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
        }
    }
}

/// One declared response binding: status code, description, and an optional
/// response schema named by component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSpec {
    /// Status code as it appears in the document (e.g. "200").
    pub status: String,
    /// Human-readable description.
    pub description: String,
    /// Response body component, if the response carries one.
    pub schema: Option<TypeName>,
}

/// One declared operation: a (path, method) pair with its request/response
/// schema bindings. Supplied by configuration and forwarded unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSpec {
    /// URL path (e.g. "/v1/quote").
    pub path: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Human-readable summary.
    pub summary: String,
    /// Request body component, if the operation takes one.
    pub request: Option<TypeName>,
    /// Response bindings in declaration order.
    pub responses: Vec<ResponseSpec>,
}

/// Document-level configuration, forwarded unmodified into the output.
#[derive(Debug, Clone, Default)]
pub struct DocumentConfig {
    /// Document title.
    pub title: String,
    /// Document version.
    pub version: String,
    /// Free-text description.
    pub description: String,
    /// Server base URLs.
    pub servers: Vec<String>,
    /// Tag names.
    pub tags: Vec<String>,
    /// The fixed operation table, in declaration order.
    pub operations: Vec<OperationSpec>,
    /// Components emitted first, in this order; everything else follows in
    /// extraction order. Keeps diffs between regenerations minimal.
    pub component_order: Vec<TypeName>,
}

/// The assembled, write-once output document. No component can be added,
/// removed, or mutated after assembly; access is read-only.
#[derive(Debug)]
pub struct Document {
    title: String,
    version: String,
    description: String,
    servers: Vec<String>,
    tags: Vec<String>,
    components: IndexMap<TypeName, CanonicalSchema>,
    paths: Vec<OperationSpec>,
}

impl Document {
    /// The component map, in emission order.
    pub fn components(&self) -> &IndexMap<TypeName, CanonicalSchema> {
        &self.components
    }

    /// The declared operations, in declaration order.
    pub fn operations(&self) -> &[OperationSpec] {
        &self.paths
    }

    /// Document title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Document version.
    pub fn version(&self) -> &str {
        &self.version
    }
}

/// Combine normalized components with the declared operation table into one
/// immutable document.
///
/// Every request/response binding must name a component present in the map;
/// a missing component raises [`GenerateError::UnknownComponent`] naming the
/// offending operation, before any output exists.
pub fn assemble(
    mut components: IndexMap<TypeName, CanonicalSchema>,
    config: &DocumentConfig,
) -> Result<Document, GenerateError> {
    for operation in &config.operations {
        let mut bindings: Vec<&TypeName> = operation.request.iter().collect();
        bindings.extend(
            operation
                .responses
                .iter()
                .filter_map(|response| response.schema.as_ref()),
        );
        for component in bindings {
            if !components.contains_key(component) {
                return Err(GenerateError::UnknownComponent {
                    component: component.clone(),
                    method: operation.method.as_str().to_string(),
                    path: operation.path.clone(),
                });
            }
        }
    }

    // Preference list first, then whatever remains in extraction order.
    let mut ordered = IndexMap::with_capacity(components.len());
    for name in &config.component_order {
        if let Some(schema) = components.shift_remove(name) {
            ordered.insert(name.clone(), schema);
        }
    }
    ordered.extend(components);

    debug!(
        components = ordered.len(),
        operations = config.operations.len(),
        "Document assembled."
    );

    Ok(Document {
        title: config.title.clone(),
        version: config.version.clone(),
        description: config.description.clone(),
        servers: config.servers.clone(),
        tags: config.tags.clone(),
        components: ordered,
        paths: config.operations.clone(),
    })
}

// --- Serialization -----------------------------------------------------------
//
// Key order is fixed (openapi, info, servers, tags, paths, components) and
// every nested map preserves declaration order, so serializing the same
// document twice yields identical text.

impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(6))?;
        map.serialize_entry("openapi", "3.0.3")?;
        map.serialize_entry(
            "info",
            &Info {
                title: &self.title,
                version: &self.version,
                description: &self.description,
            },
        )?;
        let servers: Vec<Server<'_>> = self.servers.iter().map(|url| Server { url }).collect();
        map.serialize_entry("servers", &servers)?;
        let tags: Vec<TagObject<'_>> = self.tags.iter().map(|name| TagObject { name }).collect();
        map.serialize_entry("tags", &tags)?;
        map.serialize_entry("paths", &Paths(&self.paths))?;
        map.serialize_entry(
            "components",
            &Components {
                schemas: &self.components,
            },
        )?;
        map.end()
    }
}

#[derive(serde::Serialize)]
struct Info<'a> {
    title: &'a str,
    version: &'a str,
    description: &'a str,
}

#[derive(serde::Serialize)]
struct Server<'a> {
    url: &'a str,
}

#[derive(serde::Serialize)]
struct TagObject<'a> {
    name: &'a str,
}

#[derive(serde::Serialize)]
struct Components<'a> {
    schemas: &'a IndexMap<TypeName, CanonicalSchema>,
}

/// Groups the flat operation list into the OpenAPI paths map: operations
/// sharing a path land in one path item, methods in declaration order.
struct Paths<'a>(&'a [OperationSpec]);

impl Serialize for Paths<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut grouped: IndexMap<&str, Vec<&OperationSpec>> = IndexMap::new();
        for operation in self.0 {
            grouped
                .entry(operation.path.as_str())
                .or_default()
                .push(operation);
        }

        let mut map = serializer.serialize_map(Some(grouped.len()))?;
        for (path, operations) in grouped {
            map.serialize_entry(path, &PathItem(operations))?;
        }
        map.end()
    }
}

struct PathItem<'a>(Vec<&'a OperationSpec>);

impl Serialize for PathItem<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for operation in &self.0 {
            map.serialize_entry(operation.method.keyword(), &OperationObject(operation))?;
        }
        map.end()
    }
}

struct OperationObject<'a>(&'a OperationSpec);

impl Serialize for OperationObject<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("summary", &self.0.summary)?;
        if let Some(request) = &self.0.request {
            map.serialize_entry("requestBody", &RequestBody { schema: request })?;
        }
        map.serialize_entry("responses", &Responses(&self.0.responses))?;
        map.end()
    }
}

struct RequestBody<'a> {
    schema: &'a str,
}

impl Serialize for RequestBody<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("required", &true)?;
        map.serialize_entry("content", &JsonContent { schema: self.schema })?;
        map.end()
    }
}

struct Responses<'a>(&'a [ResponseSpec]);

impl Serialize for Responses<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for response in self.0 {
            map.serialize_entry(&response.status, &ResponseObject(response))?;
        }
        map.end()
    }
}

struct ResponseObject<'a>(&'a ResponseSpec);

impl Serialize for ResponseObject<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("description", &self.0.description)?;
        if let Some(schema) = &self.0.schema {
            map.serialize_entry("content", &JsonContent { schema })?;
        }
        map.end()
    }
}

struct JsonContent<'a> {
    schema: &'a str,
}

impl Serialize for JsonContent<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut content = serializer.serialize_map(Some(1))?;
        content.serialize_entry(
            "application/json",
            &serde_json::json!({
                "schema": { "$ref": format!("#/components/schemas/{}", self.schema) }
            }),
        )?;
        content.end()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use indexmap::indexmap;

    fn quote_components() -> IndexMap<TypeName, CanonicalSchema> {
        indexmap! {
            "GetQuoteRequest".to_string() => CanonicalSchema::OpenMap { description: None },
            "GetQuoteResponse".to_string() => CanonicalSchema::OpenMap { description: None },
            "Address".to_string() => CanonicalSchema::string_pattern("^0x[0-9a-fA-F]{40}$"),
        }
    }

    fn quote_operation() -> OperationSpec {
        OperationSpec {
            path: "/v1/quote".to_string(),
            method: HttpMethod::Post,
            summary: "Request a swap quote".to_string(),
            request: Some("GetQuoteRequest".to_string()),
            responses: vec![ResponseSpec {
                status: "200".to_string(),
                description: "Quote".to_string(),
                schema: Some("GetQuoteResponse".to_string()),
            }],
        }
    }

    #[test]
    fn test_missing_component_names_operation() {
        let mut components = quote_components();
        components.shift_remove("GetQuoteResponse");
        let config = DocumentConfig {
            operations: vec![quote_operation()],
            ..DocumentConfig::default()
        };

        let err = assemble(components, &config).unwrap_err();
        assert_eq!(
            err,
            GenerateError::UnknownComponent {
                component: "GetQuoteResponse".to_string(),
                method: "POST".to_string(),
                path: "/v1/quote".to_string(),
            }
        );
    }

    #[test]
    fn test_component_order_preference_then_extraction() {
        let config = DocumentConfig {
            operations: vec![quote_operation()],
            component_order: vec!["Address".to_string(), "NotPresent".to_string()],
            ..DocumentConfig::default()
        };

        let document = assemble(quote_components(), &config).unwrap();
        let names: Vec<_> = document.components().keys().cloned().collect();
        assert_eq!(names, vec!["Address", "GetQuoteRequest", "GetQuoteResponse"]);
    }

    #[test]
    fn test_paths_entry_carries_both_schema_refs() {
        let config = DocumentConfig {
            title: "Swap API".to_string(),
            version: "1.0.0".to_string(),
            operations: vec![quote_operation()],
            ..DocumentConfig::default()
        };

        let document = assemble(quote_components(), &config).unwrap();
        let value = serde_json::to_value(&document).unwrap();
        let operation = &value["paths"]["/v1/quote"]["post"];
        assert_eq!(
            operation["requestBody"]["content"]["application/json"]["schema"]["$ref"],
            serde_json::json!("#/components/schemas/GetQuoteRequest")
        );
        assert_eq!(
            operation["responses"]["200"]["content"]["application/json"]["schema"]["$ref"],
            serde_json::json!("#/components/schemas/GetQuoteResponse")
        );
    }
}
