//! NLU collaborator boundary.
//!
//! The assistant talks to an external language model through one narrow
//! trait: give it a prompt plus a structured-output schema and get back
//! either a typed argument map or free text. Everything downstream of this
//! boundary is deterministic.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod gemini;

pub use gemini::GeminiProvider;

/// Structured arguments returned by a function call, decoded once at the
/// boundary into a typed union instead of duck-typing the provider's
/// native wrapper objects.
pub type StructuredArgs = HashMap<String, ArgValue>;

/// A single argument value. Providers wrap lists in their own iterable
/// types on the wire; by the time a value reaches this enum it is plain
/// JSON, and the filter model flattens `List` down to primitive vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    Null,
    Number(f64),
    Text(String),
    List(Vec<ArgValue>),
}

impl ArgValue {
    /// Numeric view. Numeric strings ("2", "1.5") are tolerated because
    /// some models quote numbers in function-call arguments.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ArgValue::Number(n) => Some(*n),
            ArgValue::Text(t) => t.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ArgValue::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Collect every numeric leaf, flattening nested lists. A scalar is
    /// treated as a one-element list.
    pub fn flatten_numbers(&self) -> Vec<f64> {
        match self {
            ArgValue::List(items) => items.iter().flat_map(|v| v.flatten_numbers()).collect(),
            other => other.as_number().into_iter().collect(),
        }
    }

    /// Collect every text leaf, flattening nested lists.
    pub fn flatten_texts(&self) -> Vec<String> {
        match self {
            ArgValue::List(items) => items.iter().flat_map(|v| v.flatten_texts()).collect(),
            ArgValue::Text(t) => vec![t.clone()],
            _ => Vec::new(),
        }
    }
}

/// Function-declaration schema handed to the provider. The `parameters`
/// value is the provider-facing JSON schema for the expected arguments.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionSchema {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// The five-field extraction contract. Every field is required so the
/// model always emits a complete filter set; the resolver still merges
/// defensively in case fields come back missing.
pub fn extraction_schema() -> FunctionSchema {
    FunctionSchema {
        name: "find_properties".to_string(),
        description: "Extracts filters for a property search from a user's natural language \
                      query and conversation history."
            .to_string(),
        parameters: serde_json::json!({
            "type": "OBJECT",
            "properties": {
                "city": {
                    "type": "STRING",
                    "description": "The city for the property search, e.g., 'Pune' or 'Mumbai'."
                },
                "bhk_list": {
                    "type": "ARRAY",
                    "items": {"type": "NUMBER"},
                    "description": "A list of BHK numbers, e.g., [2, 3]."
                },
                "budget_min_cr": {
                    "type": "NUMBER",
                    "description": "The MINIMUM budget in Crores. e.g., for 'between 1 and 2 Cr', this would be 1."
                },
                "budget_max_cr": {
                    "type": "NUMBER",
                    "description": "The MAXIMUM budget in Crores. e.g., for 'under 1.2 Cr' or 'between 1 and 2 Cr', this would be 2."
                },
                "status_list": {
                    "type": "ARRAY",
                    "items": {"type": "STRING"},
                    "description": "List of possession statuses, e.g., ['Ready to Move']."
                }
            },
            "required": ["city", "bhk_list", "budget_min_cr", "budget_max_cr", "status_list"]
        }),
    }
}

/// External NLU provider. One blocking request/response per call, no retry;
/// callers own the deterministic fallback when a call fails.
#[async_trait]
pub trait NluProvider: Send + Sync {
    /// Ask for a structured function call matching `schema`. Err covers
    /// unreachable endpoints, malformed responses, and the model answering
    /// with free text instead of a call.
    async fn extract(&self, prompt: &str, schema: &FunctionSchema) -> Result<StructuredArgs>;

    /// Free-text generation.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arg_value_untagged_decoding() {
        let raw = r#"{"city":"Pune","bhk_list":[2,3],"budget_min_cr":null,"budget_max_cr":1.2,"status_list":["Ready to Move"]}"#;
        let args: StructuredArgs = serde_json::from_str(raw).unwrap();
        assert_eq!(args["city"], ArgValue::Text("Pune".to_string()));
        assert_eq!(args["budget_min_cr"], ArgValue::Null);
        assert_eq!(args["budget_max_cr"], ArgValue::Number(1.2));
        assert_eq!(
            args["bhk_list"],
            ArgValue::List(vec![ArgValue::Number(2.0), ArgValue::Number(3.0)])
        );
    }

    #[test]
    fn test_flatten_numbers_handles_nesting_and_quoted_numbers() {
        let value = ArgValue::List(vec![
            ArgValue::Number(2.0),
            ArgValue::Text("3".to_string()),
            ArgValue::List(vec![ArgValue::Number(4.0)]),
            ArgValue::Null,
        ]);
        assert_eq!(value.flatten_numbers(), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_flatten_texts_skips_non_text_leaves() {
        let value = ArgValue::List(vec![
            ArgValue::Text("Ready to Move".to_string()),
            ArgValue::Number(1.0),
        ]);
        assert_eq!(value.flatten_texts(), vec!["Ready to Move".to_string()]);
    }

    #[test]
    fn test_extraction_schema_requires_all_five_fields() {
        let schema = extraction_schema();
        let required = schema.parameters["required"].as_array().unwrap();
        assert_eq!(required.len(), 5);
        for field in ["city", "bhk_list", "budget_min_cr", "budget_max_cr", "status_list"] {
            assert!(required.iter().any(|v| v.as_str() == Some(field)));
            assert!(schema.parameters["properties"].get(field).is_some());
        }
    }
}
