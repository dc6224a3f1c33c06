//! Bridge error types.
//!
//! These never escape [`Executor::invoke`](crate::Executor::invoke); they are
//! folded into [`ToolOutcome::Failure`](crate::ToolOutcome::Failure) there.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The executor could not be started. Carries the system error message.
    #[error("{0}")]
    Spawn(#[from] std::io::Error),

    /// The executor exited with a non-zero status.
    /// Carries stderr, else stdout, else the exit status.
    #[error("{0}")]
    Exited(String),

    #[error("tool {tool} timed out after {timeout:?}")]
    Timeout { tool: String, timeout: Duration },

    #[error("output too large: {size} bytes (max {max})")]
    OutputTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
