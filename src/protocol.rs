//! Declarative tables for the swap-quote wire protocol.
//!
//! Everything in this module is data: the override registry for types whose
//! generic extraction is unreliable, the fixed operation table, and the
//! document metadata. The generic machinery in [`crate::document`]
//! interprets these tables; new special cases become new entries here, not
//! new code paths.

use crate::document::{
    CanonicalSchema, DocumentConfig, HttpMethod, OperationSpec, OverrideAction, OverrideRegistry,
    ResponseSpec,
};

/// Override registry for the protocol's branded and semantically constrained
/// types. Whole-schema replacements are registered for types whose native
/// declarations are aliases the extractor cannot see through: the registry,
/// not the extractor, is authoritative for them.
pub fn override_registry() -> OverrideRegistry {
    let mut registry = OverrideRegistry::new();

    // Branded string aliases: the regex constraint lives only here.
    registry.replace(
        "Address",
        CanonicalSchema::string_pattern("^(0x[0-9a-fA-F]{40}|bc1[02-9ac-hj-np-z]{8,87})$")
            .with_description("On-chain account address, EVM hex or bech32 form."),
    );
    registry.replace(
        "Amount",
        CanonicalSchema::string_pattern("^[0-9]+$")
            .with_description("Asset amount in base units, encoded as a decimal string."),
    );

    // Closed value sets lost by alias extraction.
    registry.replace(
        "QuotePreference",
        CanonicalSchema::string_enum(["price", "speed", "input-priority", "trust-minimization"])
            .with_description("Ranking applied when selecting among candidate quotes."),
    );

    // Field-level rewrites on composite request/response types.
    registry.add(
        "GetQuoteRequest",
        "lock",
        OverrideAction::SetRef("AssetLockReference".to_string()),
    );
    registry.add(
        "GetQuoteRequest",
        "metadata",
        OverrideAction::MarkAdditionalProperties(true),
    );
    registry.add(
        "GetQuoteRequest",
        "metadata",
        OverrideAction::SetDescription("Opaque client metadata forwarded to solvers.".to_string()),
    );
    registry.add(
        "GetQuoteResponse",
        "expiry",
        OverrideAction::SetDescription("Unix timestamp after which the quote is void.".to_string()),
    );

    registry
}

/// The fixed operation table. Paths and bindings are declared here and
/// forwarded unmodified; the assembler only validates that every named
/// component exists.
pub fn operations() -> Vec<OperationSpec> {
    vec![
        OperationSpec {
            path: "/v1/quote".to_string(),
            method: HttpMethod::Post,
            summary: "Request a swap quote".to_string(),
            request: Some("GetQuoteRequest".to_string()),
            responses: vec![
                ResponseSpec {
                    status: "200".to_string(),
                    description: "Best available quote for the requested swap".to_string(),
                    schema: Some("GetQuoteResponse".to_string()),
                },
                ResponseSpec {
                    status: "400".to_string(),
                    description: "Malformed or unsatisfiable quote request".to_string(),
                    schema: Some("ErrorResponse".to_string()),
                },
            ],
        },
        OperationSpec {
            path: "/v1/swap".to_string(),
            method: HttpMethod::Post,
            summary: "Execute a previously quoted swap".to_string(),
            request: Some("ExecuteSwapRequest".to_string()),
            responses: vec![
                ResponseSpec {
                    status: "200".to_string(),
                    description: "Swap accepted for settlement".to_string(),
                    schema: Some("ExecuteSwapResponse".to_string()),
                },
                ResponseSpec {
                    status: "400".to_string(),
                    description: "Quote expired or lock invalid".to_string(),
                    schema: Some("ErrorResponse".to_string()),
                },
            ],
        },
        OperationSpec {
            path: "/v1/swap/status".to_string(),
            method: HttpMethod::Get,
            summary: "Poll settlement status of a swap".to_string(),
            request: None,
            responses: vec![
                ResponseSpec {
                    status: "200".to_string(),
                    description: "Current settlement state".to_string(),
                    schema: Some("SwapStatusResponse".to_string()),
                },
                ResponseSpec {
                    status: "404".to_string(),
                    description: "Unknown swap identifier".to_string(),
                    schema: Some("ErrorResponse".to_string()),
                },
            ],
        },
    ]
}

/// Full document configuration: metadata, the operation table, and the
/// preferred component emission order (shared primitives first, then
/// composites), keeping regeneration diffs minimal.
pub fn document_config() -> DocumentConfig {
    DocumentConfig {
        title: "Swap Quote API".to_string(),
        version: "1.0.0".to_string(),
        description: "Quote discovery and swap settlement over the swap-quote wire protocol."
            .to_string(),
        servers: vec!["https://api.swap.example.com".to_string()],
        tags: vec!["quotes".to_string(), "swaps".to_string()],
        operations: operations(),
        component_order: vec![
            "Address".to_string(),
            "Amount".to_string(),
            "QuotePreference".to_string(),
            "AssetLockReference".to_string(),
            "ErrorResponse".to_string(),
            "GetQuoteRequest".to_string(),
            "GetQuoteResponse".to_string(),
            "ExecuteSwapRequest".to_string(),
            "ExecuteSwapResponse".to_string(),
            "SwapStatusResponse".to_string(),
        ],
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_preference_replacement_is_registered() {
        let registry = override_registry();
        let replacement = registry.replacement("QuotePreference").unwrap();
        assert_eq!(
            replacement,
            &CanonicalSchema::string_enum([
                "price",
                "speed",
                "input-priority",
                "trust-minimization"
            ])
            .with_description("Ranking applied when selecting among candidate quotes.")
        );
    }

    #[test]
    fn test_every_operation_binding_is_in_component_order() {
        let config = document_config();
        for operation in &config.operations {
            for component in operation
                .request
                .iter()
                .chain(operation.responses.iter().filter_map(|r| r.schema.as_ref()))
            {
                assert!(
                    config.component_order.contains(component),
                    "{component} missing from component order"
                );
            }
        }
    }
}
