//! Out-of-process tool execution.
//!
//! Each tool call runs a fresh executor process. The call is encoded on the
//! command line, the process's output is collected until it exits, and the
//! result is classified into a [`ToolOutcome`]. Launch errors, non-zero exits,
//! timeouts and malformed output all become [`ToolOutcome::Failure`].
//!
//! # Example
//!
//! ```no_run
//! use bridge::{Executor, ExecutorConfig, ToolOutcome};
//! use serde_json::json;
//!
//! # async fn example() {
//! let executor = Executor::new(
//!     ExecutorConfig::new("python3").arg("app/scripts/mcp_call.py"),
//! );
//!
//! match executor.invoke("get_current_occupancy", &json!({})).await {
//!     ToolOutcome::Success(output) => println!("occupancy: {output}"),
//!     ToolOutcome::Failure(message) => eprintln!("tool failed: {message}"),
//! }
//! # }
//! ```

pub mod envelope;
mod error;
mod executor;

pub use envelope::{Invocation, MALFORMED_PREFIX_CHARS, ToolOutcome, decode};
pub use error::{Error, Result};
pub use executor::{DEFAULT_TIMEOUT, Executor, ExecutorConfig, MAX_OUTPUT_SIZE};
