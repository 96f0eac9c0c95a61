/// Result alias used across the crate.
pub type ScrollSeqResult<T> = Result<T, ScrollSeqError>;

/// Errors surfaced by configuration, decoding and rendering.
///
/// Per-frame load failures are not reported through this type at the player boundary; they are
/// recorded in the frame store and the frame is treated as never ready.
#[derive(thiserror::Error, Debug)]
pub enum ScrollSeqError {
    /// Invalid configuration or argument.
    #[error("validation error: {0}")]
    Validation(String),

    /// Image bytes could not be read or decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The drawing surface could not be (re)allocated or painted.
    #[error("render error: {0}")]
    Render(String),

    /// Configuration (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other error with its source chain preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScrollSeqError {
    /// Build a [`ScrollSeqError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ScrollSeqError::Decode`].
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`ScrollSeqError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`ScrollSeqError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
