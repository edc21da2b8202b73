use thiserror::Error;

/// Errors from a completion call.
///
/// `Display` renders only the human-readable message so callers can show it
/// as-is.
#[derive(Debug, Error)]
pub enum Error {
    /// The credential is missing or still the placeholder. Raised before any
    /// request is sent.
    #[error("{0}")]
    Config(String),

    /// The HTTP exchange itself failed.
    #[error("network error: {0}")]
    Network(String),

    /// The endpoint answered with a non-success status.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// A success response could not be interpreted.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, Error>;
