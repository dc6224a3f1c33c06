//! Tool hosts: the boundary between the model loop and side effects.

mod host;
mod process;

pub use host::ToolHost;
pub use process::ProcessToolHost;
