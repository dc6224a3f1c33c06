//! Building assistant runtime: the bounded tool loop between a model
//! service and the occupancy tools.
//!
//! # Overview
//!
//! - **Backend**: a model service that answers with text and tool calls
//!   ([`AnthropicBackend`] talks to the Anthropic Messages API).
//! - **ToolHost**: runs the tools the model asks for
//!   ([`ProcessToolHost`] validates against the catalog and spawns the
//!   executor once per call).
//! - **Driver**: alternates model calls and tool rounds until the model
//!   answers or the round limit is hit.
//!
//! # Example
//!
//! ```no_run
//! use bridge::{Executor, ExecutorConfig};
//! use catalog::Catalog;
//! use runtime::{AnthropicBackend, ChatPayload, Driver, Outcome, ProcessToolHost, DEFAULT_MODEL};
//!
//! # async fn example() -> runtime::Result<()> {
//! let backend = AnthropicBackend::builder("sk-ant-api03-...", DEFAULT_MODEL).build();
//! let executor = Executor::new(ExecutorConfig::new("python3").arg("app/scripts/mcp_call.py"));
//! let driver = Driver::new(backend, ProcessToolHost::new(Catalog::occupancy(), executor));
//!
//! let payload: ChatPayload = serde_json::from_str(
//!     r#"{"messages":[{"role":"user","content":"What's the occupancy?"}]}"#,
//! ).unwrap();
//! let (context, history) = runtime::prepare(payload, None);
//! let turn = driver.run(&context, history).await?;
//! if let Outcome::Done(text) = turn.outcome {
//!     println!("{text}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod context;
mod driver;
mod error;
pub mod model;
pub mod providers;
mod tools;

pub use context::{prepare, ChatPayload, InboundMessage, SessionContext};
pub use driver::{Driver, LoopState, Outcome, Turn, DEFAULT_MAX_ROUNDS, EXHAUSTED_MESSAGE};
pub use error::{Error, Result};
pub use model::{
    Backend, Message, ModelError, ModelRequest, ModelResponse, Part, Role, ToolCall, ToolResult,
    ToolSpec, Usage, TOOL_ERROR_PREFIX,
};
pub use providers::{AnthropicBackend, AnthropicBackendBuilder, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
pub use tools::{ProcessToolHost, ToolHost};

pub use bridge::ToolOutcome;
