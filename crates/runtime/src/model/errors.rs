use thiserror::Error;

/// Errors from model service calls.
///
/// Any of these ends the current turn; the driver does not retry.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModelError {
    /// The request never reached the service or the connection dropped.
    #[error("network: {0}")]
    Network(String),

    /// The service answered with a non-success status.
    #[error("provider api ({status}): {body}")]
    Api { status: u16, body: String },

    /// The response body could not be parsed.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}
