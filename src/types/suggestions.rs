//! Structured suggestion output.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A named prompt suggested by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Suggestion {
    /// Short display name.
    pub name: String,
    /// Prompt to apply when the suggestion is chosen.
    pub prompt: String,
}

/// Top-level structured output for suggestions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SuggestionList {
    /// The suggestions, in model order.
    pub suggestions: Vec<Suggestion>,
}

/// Response schema: an object with a `suggestions` array of `{name, prompt}`.
pub fn suggestion_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "suggestions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": {"type": "STRING"},
                        "prompt": {"type": "STRING"}
                    },
                    "required": ["name", "prompt"]
                }
            }
        },
        "required": ["suggestions"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_requires_suggestions() {
        let schema = suggestion_schema();
        assert_eq!(schema["required"][0], "suggestions");
        assert_eq!(schema["properties"]["suggestions"]["type"], "ARRAY");
    }

    #[test]
    fn test_parse_list() {
        let list: SuggestionList = serde_json::from_str(
            r#"{"suggestions":[{"name":"Noir","prompt":"black and white film noir"}]}"#,
        )
        .unwrap();
        assert_eq!(list.suggestions[0].name, "Noir");
    }

    #[test]
    fn test_missing_suggestions_field_is_rejected() {
        let result = serde_json::from_str::<SuggestionList>(r#"{"ideas":[{"name":"x","prompt":"y"}]}"#);
        assert!(result.is_err());
    }
}
