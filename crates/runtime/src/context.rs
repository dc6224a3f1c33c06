//! Session context: system prompt, initial history, uploaded file.

use crate::model::{Message, Role};
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;

/// Fixed assistant persona.
pub const PERSONA: &str = "You are a building analytics assistant.";

/// Longest building-context excerpt placed in the system prompt, in chars.
pub const BUILDING_CONTEXT_CHARS: usize = 8000;

/// One message as the dashboard sends it.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    pub role: Role,
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default)]
    pub text: Option<String>,
}

impl From<InboundMessage> for Message {
    fn from(inbound: InboundMessage) -> Self {
        let text = match inbound.content {
            Some(Value::String(content)) => content,
            Some(Value::Null) | None => inbound.text.unwrap_or_default(),
            Some(other) => other.to_string(),
        };
        Message::new(inbound.role, text)
    }
}

/// Body of a chat request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatPayload {
    #[serde(default)]
    pub messages: Vec<InboundMessage>,
    #[serde(default, rename = "buildingData")]
    pub building_data: Option<Value>,
}

/// Read-only inputs of one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    pub system_prompt: String,
    /// Local path of a file uploaded with the request.
    pub uploaded_file_path: Option<PathBuf>,
}

impl SessionContext {
    pub fn new(building_data: Option<&Value>, uploaded_file_path: Option<PathBuf>) -> Self {
        Self {
            system_prompt: system_prompt(building_data),
            uploaded_file_path,
        }
    }
}

/// Build the session context and initial history for a turn.
pub fn prepare(payload: ChatPayload, upload: Option<PathBuf>) -> (SessionContext, Vec<Message>) {
    let context = SessionContext::new(payload.building_data.as_ref(), upload);
    let history = payload.messages.into_iter().map(Message::from).collect();
    (context, history)
}

/// Persona, followed by a bounded JSON excerpt of the building data.
pub fn system_prompt(building_data: Option<&Value>) -> String {
    match building_data {
        None | Some(Value::Null) => PERSONA.to_string(),
        Some(data) => {
            let excerpt: String = data.to_string().chars().take(BUILDING_CONTEXT_CHARS).collect();
            format!("{PERSONA} Building context:\n{excerpt}")
        }
    }
}
