//! Response models requested from the LLM and the canonical results the
//! query operations return.
//!
//! Each response model is a flat record. Deserialization rejects unknown
//! fields and wrong types, so a model can only be constructed from output
//! that conforms to the declared shape.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// An output shape the LLM is asked to produce.
pub trait ResponseModel: DeserializeOwned + JsonSchema {
    /// Schema name sent to the API.
    const NAME: &'static str;

    /// Checks the schema cannot express. Runs after deserialization.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated constraint.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// A yes/no answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct BoolResponse {
    /// The answer.
    pub answer: bool,
}

/// A single integer answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct IntResponse {
    /// The answer.
    pub answer: i64,
}

/// A list of integers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct IntArrayResponse {
    /// The answer.
    pub answer: Vec<i64>,
}

/// A single string answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct StrResponse {
    /// The answer.
    pub answer: String,
}

/// A list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct StrArrayResponse {
    /// The answer.
    pub answer: Vec<String>,
}

/// Search keywords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct KeywordsResponse {
    /// Extracted keywords.
    pub keywords: Vec<String>,
}

/// A query broken into simpler queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SubQueriesResponse {
    /// The sub-queries, in the order they should be answered.
    pub sub_queries: Vec<String>,
}

/// One edge of a table's graph schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SchemaRelationship {
    /// Source entity type.
    pub head: String,
    /// Relation label.
    pub relation: String,
    /// Target entity type.
    pub tail: String,
}

/// The graph schema between a table's entity types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SchemaResponse {
    /// Relationships between entity types.
    pub relationships: Vec<SchemaRelationship>,
}

macro_rules! response_model {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl ResponseModel for $ty {
                const NAME: &'static str = $name;
            }
        )*
    };
}

response_model!(
    BoolResponse => "bool_response",
    IntResponse => "int_response",
    IntArrayResponse => "int_array_response",
    StrResponse => "str_response",
    StrArrayResponse => "str_array_response",
    KeywordsResponse => "keywords_response",
    SubQueriesResponse => "sub_queries_response",
);

impl ResponseModel for SchemaResponse {
    const NAME: &'static str = "schema_response";

    fn validate(&self) -> Result<(), String> {
        for (i, rel) in self.relationships.iter().enumerate() {
            if rel.head.trim().is_empty() || rel.relation.trim().is_empty() || rel.tail.trim().is_empty() {
                return Err(format!("relationship {i} has an empty head, relation or tail"));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Canonical results
// ---------------------------------------------------------------------------

/// A typed answer, serialized as the bare value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    /// From [`BoolResponse`].
    Bool(bool),
    /// From [`IntResponse`].
    Int(i64),
    /// From [`StrResponse`].
    Str(String),
    /// From [`IntArrayResponse`].
    IntArray(Vec<i64>),
    /// From [`StrArrayResponse`].
    StrArray(Vec<String>),
}

/// `{"answer": ...}`; the default `{"answer": null}` is the fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResult {
    /// The answer, or `None` when the call failed.
    pub answer: Option<Answer>,
}

/// `{"keywords": [...]}`; the default empty list is the fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordsResult {
    /// The keywords.
    pub keywords: Vec<String>,
}

/// `{"sub-queries": [...]}`; the default empty list is the fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubQueriesResult {
    /// The sub-queries.
    #[serde(rename = "sub-queries")]
    pub sub_queries: Vec<String>,
}

/// `{"schema": {"relationships": [...]}}`; the default no-relationship
/// schema is the fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaResult {
    /// The generated schema.
    pub schema: SchemaResponse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn models_reject_wrong_types_and_unknown_fields() {
        assert!(serde_json::from_str::<IntResponse>(r#"{"answer": "twelve"}"#).is_err());
        assert!(serde_json::from_str::<BoolResponse>(r#"{"answer": true, "why": "x"}"#).is_err());
        assert!(serde_json::from_str::<KeywordsResponse>("{}").is_err());
    }

    #[test]
    fn fallbacks_have_the_canonical_shapes() {
        assert_eq!(serde_json::to_value(AnswerResult::default()).expect("ser"), json!({"answer": null}));
        assert_eq!(serde_json::to_value(KeywordsResult::default()).expect("ser"), json!({"keywords": []}));
        assert_eq!(
            serde_json::to_value(SubQueriesResult::default()).expect("ser"),
            json!({"sub-queries": []})
        );
        assert_eq!(
            serde_json::to_value(SchemaResult::default()).expect("ser"),
            json!({"schema": {"relationships": []}})
        );
    }

    #[test]
    fn answers_serialize_as_bare_values() {
        let result = AnswerResult { answer: Some(Answer::StrArray(vec!["a".into()])) };
        assert_eq!(serde_json::to_value(result).expect("ser"), json!({"answer": ["a"]}));
        let result = AnswerResult { answer: Some(Answer::Bool(true)) };
        assert_eq!(serde_json::to_value(result).expect("ser"), json!({"answer": true}));
    }

    #[test]
    fn schema_rejects_blank_relationship_parts() {
        let schema = SchemaResponse {
            relationships: vec![SchemaRelationship {
                head: "Company".into(),
                relation: " ".into(),
                tail: "Person".into(),
            }],
        };
        assert!(schema.validate().is_err());
        assert!(SchemaResponse::default().validate().is_ok());
    }

    #[test]
    fn model_names_are_distinct() {
        let names = [
            BoolResponse::NAME,
            IntResponse::NAME,
            IntArrayResponse::NAME,
            StrResponse::NAME,
            StrArrayResponse::NAME,
            KeywordsResponse::NAME,
            SubQueriesResponse::NAME,
            SchemaResponse::NAME,
        ];
        let unique: std::collections::HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }
}
