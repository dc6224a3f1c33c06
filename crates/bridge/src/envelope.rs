//! Executor wire format.
//!
//! Invocation: `--tool <name> --args <json> [--port <port>] [--baud <baud>]`.
//! Result: one JSON object on stdout, `{"ok": true, "output": ...}` or
//! `{"ok": false, "error": "..."}`.
//!
//! This format is shared with the executor script and must stay stable.

use serde::Deserialize;
use serde_json::Value;

/// Longest slice of raw output quoted in a malformed-output failure.
pub const MALFORMED_PREFIX_CHARS: usize = 200;

/// Normalized result of one tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    Success(Value),
    Failure(String),
}

impl ToolOutcome {
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(message.into())
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

/// Encoded command-line tail for one executor run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub tool: String,
    /// Arguments serialized as JSON, keys in the order the model sent them.
    pub arguments: String,
    pub port: Option<String>,
    pub baud: Option<String>,
}

impl Invocation {
    /// Encode a tool call. A missing (`null`) argument value becomes `{}`.
    pub fn encode(tool: impl Into<String>, arguments: &Value) -> Self {
        let arguments = match arguments {
            Value::Null => "{}".to_string(),
            other => other.to_string(),
        };
        Self {
            tool: tool.into(),
            arguments,
            port: None,
            baud: None,
        }
    }

    pub fn with_port(mut self, port: Option<String>) -> Self {
        self.port = port;
        self
    }

    pub fn with_baud(mut self, baud: Option<String>) -> Self {
        self.baud = baud;
        self
    }

    /// Arguments to append after the executor's own program arguments.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "--tool".to_string(),
            self.tool.clone(),
            "--args".to_string(),
            self.arguments.clone(),
        ];
        if let Some(port) = &self.port {
            args.push("--port".to_string());
            args.push(port.clone());
        }
        if let Some(baud) = &self.baud {
            args.push("--baud".to_string());
            args.push(baud.clone());
        }
        args
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    ok: bool,
    #[serde(default)]
    output: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Decode the executor's stdout into an outcome.
pub fn decode(raw: &str) -> ToolOutcome {
    let envelope: Envelope = match serde_json::from_str(raw.trim()) {
        Ok(envelope) => envelope,
        Err(_) => return malformed(raw),
    };

    match envelope {
        Envelope {
            error: Some(error), ..
        } => ToolOutcome::Failure(error),
        Envelope { ok: false, .. } => malformed(raw),
        Envelope { output, .. } => ToolOutcome::Success(output.unwrap_or(Value::Null)),
    }
}

fn malformed(raw: &str) -> ToolOutcome {
    let prefix: String = raw.trim().chars().take(MALFORMED_PREFIX_CHARS).collect();
    ToolOutcome::Failure(format!("malformed executor output: {prefix}"))
}
