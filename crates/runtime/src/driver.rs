//! The bounded tool loop.
//!
//! A turn alternates between asking the model (`Thinking`) and running the
//! tool calls it asked for (`Executing`). It ends `Done` when the model answers
//! with text only, or `Exhausted` once the round limit is reached.

use crate::context::SessionContext;
use crate::model::{Backend, Message, ModelRequest, ToolCall, ToolResult, Usage};
use crate::tools::ToolHost;
use crate::Result;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// Model round-trips allowed per turn.
pub const DEFAULT_MAX_ROUNDS: usize = 6;

/// Answer text reported when the round limit is hit.
pub const EXHAUSTED_MESSAGE: &str = "Tool loop exceeded max steps.";

/// History and round counter, owned by one turn.
#[derive(Debug, Clone, Default)]
pub struct LoopState {
    pub history: Vec<Message>,
    pub round: usize,
}

/// How a turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The model produced a final text answer.
    Done(String),
    /// The model kept requesting tools until the round limit.
    Exhausted,
}

/// A finished turn.
#[derive(Debug, Clone)]
pub struct Turn {
    pub outcome: Outcome,
    pub state: LoopState,
    pub model_calls: usize,
    pub usage: Usage,
}

/// Drives one conversation turn between a model backend and a tool host.
///
/// Holds no per-turn state; a single driver serves concurrent turns.
pub struct Driver<B, T> {
    backend: B,
    tools: T,
    max_rounds: usize,
}

impl<B: Backend, T: ToolHost> Driver<B, T> {
    pub fn new(backend: B, tools: T) -> Self {
        Self {
            backend,
            tools,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn tools(&self) -> &T {
        &self.tools
    }

    /// Run the loop until the model answers or the round limit is reached.
    ///
    /// Only a model-service failure returns `Err`.
    pub async fn run(&self, context: &SessionContext, history: Vec<Message>) -> Result<Turn> {
        let mut state = LoopState { history, round: 0 };
        let mut usage = Usage::default();
        let mut model_calls = 0;

        loop {
            if state.round >= self.max_rounds {
                warn!(rounds = state.round, "tool loop exhausted");
                return Ok(Turn {
                    outcome: Outcome::Exhausted,
                    state,
                    model_calls,
                    usage,
                });
            }

            let response = self
                .backend
                .call(ModelRequest {
                    system: &context.system_prompt,
                    messages: &state.history,
                    tools: self.tools.specs(),
                })
                .await?;
            model_calls += 1;
            usage.input_tokens += response.usage.input_tokens;
            usage.output_tokens += response.usage.output_tokens;

            let message = response.message;
            let calls: Vec<ToolCall> = message.tool_calls().into_iter().cloned().collect();
            if calls.is_empty() {
                info!(model_calls, "turn answered");
                return Ok(Turn {
                    outcome: Outcome::Done(message.text()),
                    state,
                    model_calls,
                    usage,
                });
            }

            debug!(round = state.round, calls = calls.len(), "executing tool calls");
            state.history.push(message);

            let mut results = Vec::with_capacity(calls.len());
            for call in &calls {
                let call = inject_upload(context, self.tools.upload_argument(&call.name), call);
                let outcome = self.tools.execute(&call).await;
                if let bridge::ToolOutcome::Failure(message) = &outcome {
                    warn!(tool = %call.name, id = %call.id, error = %message, "tool failed");
                }
                results.push(ToolResult::from_outcome(&call.id, outcome));
            }

            state.history.push(Message::tool_results(results));
            state.round += 1;
        }
    }
}

/// Point the upload argument of `call` at the stored upload, if both exist.
///
/// Whatever the model put in that argument is replaced.
fn inject_upload(context: &SessionContext, argument: Option<&str>, call: &ToolCall) -> ToolCall {
    let mut call = call.clone();
    let (Some(path), Some(argument)) = (&context.uploaded_file_path, argument) else {
        return call;
    };

    let path = Value::String(path.to_string_lossy().into_owned());
    match &mut call.input {
        Value::Object(map) => {
            map.insert(argument.to_string(), path);
        }
        other => {
            let mut map = Map::new();
            map.insert(argument.to_string(), path);
            *other = Value::Object(map);
        }
    }
    call
}
