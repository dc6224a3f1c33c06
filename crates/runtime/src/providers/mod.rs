//! Model service adapters.
//!
//! Each provider implements [`Backend`](crate::model::Backend) for its API.

mod anthropic;

pub use anthropic::{
    AnthropicBackend, AnthropicBackendBuilder, DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
};
