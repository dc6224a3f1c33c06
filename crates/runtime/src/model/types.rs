use super::errors::ModelError;
use bridge::ToolOutcome;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;

/// Prefix of the text fed back to the model when a tool fails.
pub const TOOL_ERROR_PREFIX: &str = "Tool error: ";

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A tool call requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Opaque id assigned by the model service; correlates the result.
    pub id: String,
    pub name: String,
    pub input: Value,
}

/// The result the runtime returned for a tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_call_id: String,
    /// A string, or structured output passed through as JSON.
    pub content: Value,
    #[serde(default)]
    pub is_error: bool,
}

impl ToolResult {
    /// Fold an outcome into a result. Failures become `Tool error: ...` text.
    pub fn from_outcome(tool_call_id: impl Into<String>, outcome: ToolOutcome) -> Self {
        let tool_call_id = tool_call_id.into();
        match outcome {
            ToolOutcome::Success(content) => Self {
                tool_call_id,
                content,
                is_error: false,
            },
            ToolOutcome::Failure(message) => Self {
                tool_call_id,
                content: Value::String(format!("{TOOL_ERROR_PREFIX}{message}")),
                is_error: true,
            },
        }
    }

    /// Content as the text the model sees.
    pub fn content_text(&self) -> String {
        match &self.content {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

/// A part of a message, which can be text or a tool interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Part {
    Text { text: String },
    ToolCall(ToolCall),
    ToolResult(ToolResult),
}

impl Part {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text { text: s.into() }
    }
}

/// A message, consisting of a role and one or more parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Message {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part::text(text)],
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    /// A user message carrying one result per tool call, in call order.
    pub fn tool_results(results: Vec<ToolResult>) -> Self {
        Self {
            role: Role::User,
            parts: results.into_iter().map(Part::ToolResult).collect(),
        }
    }

    pub fn from_parts(role: Role, parts: Vec<Part>) -> Self {
        Self { role, parts }
    }

    /// Text parts joined by newlines, in order.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Text { text } => Some(text.as_str()),
                Part::ToolCall(_) | Part::ToolResult(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Extract all tool calls, in order.
    pub fn tool_calls(&self) -> Vec<&ToolCall> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::ToolCall(call) => Some(call),
                Part::Text { .. } | Part::ToolResult(_) => None,
            })
            .collect()
    }
}

/// A tool definition exposed to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl From<&catalog::ToolSchema> for ToolSpec {
    fn from(schema: &catalog::ToolSchema) -> Self {
        Self {
            name: schema.name.to_string(),
            description: schema.description.to_string(),
            input_schema: schema.input_schema(),
        }
    }
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Everything needed for a model request.
#[derive(Debug, Clone)]
pub struct ModelRequest<'a> {
    pub system: &'a str,
    pub messages: &'a [Message],
    pub tools: &'a [ToolSpec],
}

/// The response from a model.
#[derive(Debug, Clone)]
pub struct ModelResponse {
    pub message: Message,
    pub usage: Usage,
}

/// Trait for LLM provider backends.
pub trait Backend: Send + Sync {
    fn call(
        &self,
        request: ModelRequest<'_>,
    ) -> impl Future<Output = Result<ModelResponse, ModelError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_text_extraction() {
        let msg = Message::from_parts(
            Role::Assistant,
            vec![
                Part::text("Checking the sensor."),
                Part::ToolCall(ToolCall {
                    id: "1".into(),
                    name: "get_current_occupancy".into(),
                    input: json!({}),
                }),
                Part::text("One moment."),
            ],
        );
        assert_eq!(msg.text(), "Checking the sensor.\nOne moment.");
    }

    #[test]
    fn message_tool_calls_extraction() {
        let msg = Message::from_parts(
            Role::Assistant,
            vec![
                Part::text("Let me help"),
                Part::ToolCall(ToolCall {
                    id: "1".into(),
                    name: "get_serial_status".into(),
                    input: json!({}),
                }),
                Part::ToolCall(ToolCall {
                    id: "2".into(),
                    name: "get_current_occupancy".into(),
                    input: json!({}),
                }),
            ],
        );
        let calls = msg.tool_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].name, "get_serial_status");
        assert_eq!(calls[1].id, "2");
    }

    #[test]
    fn failed_outcome_becomes_tool_error_text() {
        let result = ToolResult::from_outcome("c1", ToolOutcome::failure("serial port not found"));
        assert!(result.is_error);
        assert_eq!(result.content_text(), "Tool error: serial port not found");
    }

    #[test]
    fn structured_outcome_is_kept_structured() {
        let result = ToolResult::from_outcome("c1", ToolOutcome::Success(json!({"count": 3})));
        assert!(!result.is_error);
        assert_eq!(result.content, json!({"count": 3}));
        assert_eq!(result.content_text(), r#"{"count":3}"#);
    }

    #[test]
    fn string_outcome_is_passed_as_text() {
        let result = ToolResult::from_outcome("c1", ToolOutcome::Success(json!("3 people")));
        assert_eq!(result.content_text(), "3 people");
    }

    #[test]
    fn spec_from_catalog_schema() {
        let catalog = catalog::Catalog::occupancy();
        let spec = ToolSpec::from(catalog.get("preprocess_occupancy_data").unwrap());
        assert_eq!(spec.name, "preprocess_occupancy_data");
        assert_eq!(spec.input_schema["required"], json!(["input_path"]));
    }
}
