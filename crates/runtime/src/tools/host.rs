//! Tool host trait.

use crate::model::{ToolCall, ToolSpec};
use bridge::ToolOutcome;
use std::future::Future;

/// Trait for tool execution hosts.
///
/// Implementations provide tool specifications and execute tool calls.
/// Execution always yields an outcome; failures are data, not errors.
pub trait ToolHost: Send + Sync {
    /// Get available tool specifications.
    fn specs(&self) -> &[ToolSpec];

    /// Argument of `tool` that should receive an uploaded file's path.
    fn upload_argument(&self, _tool: &str) -> Option<&str> {
        None
    }

    /// Execute a tool call.
    fn execute(&self, call: &ToolCall) -> impl Future<Output = ToolOutcome> + Send;
}
