//! Model service contract: message types and the backend trait.

pub mod errors;
pub mod types;

pub use errors::ModelError;
pub use types::{
    Backend, Message, ModelRequest, ModelResponse, Part, Role, TOOL_ERROR_PREFIX, ToolCall,
    ToolResult, ToolSpec, Usage,
};
