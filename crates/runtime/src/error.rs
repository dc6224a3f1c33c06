use crate::model::ModelError;
use thiserror::Error;

/// Errors that end a turn without an answer.
///
/// Tool failures are not here: they are fed back to the model as results.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("model service error: {0}")]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, Error>;
