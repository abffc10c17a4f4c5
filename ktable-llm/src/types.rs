//! Core types for structured completion requests.

use schemars::JsonSchema;
use schemars::r#gen::SchemaSettings;
use serde::Serialize;
use serde_json::{Value, json};

/// Speaker role in a chat conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The caller's prompt.
    User,
}

/// A chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Who is speaking.
    pub role: Role,
    /// What they say.
    pub content: String,
}

impl Message {
    /// A user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// The output shape requested from the model: a named JSON Schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseFormat {
    /// Schema name sent to the API.
    pub name: String,
    /// The JSON Schema the output must satisfy.
    pub schema: Value,
    /// Whether the API should enforce the schema strictly.
    pub strict: bool,
}

impl ResponseFormat {
    /// Derive the response format for `T` from its `schemars` schema.
    ///
    /// Subschemas are inlined and integer `format` hints dropped, since
    /// strict structured-output mode accepts neither `definitions` references
    /// nor numeric formats.
    #[must_use]
    pub fn for_model<T: JsonSchema>(name: &str, strict: bool) -> Self {
        let generator = SchemaSettings::draft07()
            .with(|s| {
                s.inline_subschemas = true;
                s.meta_schema = None;
            })
            .into_generator();
        let root = generator.into_root_schema_for::<T>();
        let mut schema = serde_json::to_value(root).unwrap_or_else(|_| json!({"type": "object"}));
        strip_numeric_formats(&mut schema);

        Self {
            name: name.to_string(),
            schema,
            strict,
        }
    }

    /// The `response_format` object of a chat completions request.
    #[must_use]
    pub fn to_request_json(&self) -> Value {
        json!({
            "type": "json_schema",
            "json_schema": {
                "name": self.name,
                "schema": self.schema,
                "strict": self.strict,
            }
        })
    }
}

fn strip_numeric_formats(schema: &mut Value) {
    match schema {
        Value::Object(map) => {
            let numeric = matches!(
                map.get("type").and_then(Value::as_str),
                Some("integer" | "number")
            );
            if numeric {
                map.remove("format");
                map.remove("minimum");
            }
            for value in map.values_mut() {
                strip_numeric_formats(value);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(strip_numeric_formats),
        _ => {}
    }
}

/// A single structured completion call.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model identifier.
    pub model: String,
    /// The conversation.
    pub messages: Vec<Message>,
    /// Requested output shape.
    pub response_format: ResponseFormat,
}

impl CompletionRequest {
    /// The chat completions request body.
    #[must_use]
    pub fn to_request_json(&self) -> Value {
        json!({
            "model": self.model,
            "messages": self.messages,
            "response_format": self.response_format.to_request_json(),
        })
    }
}
