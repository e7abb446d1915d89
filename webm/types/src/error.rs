/*!
    Error types shared across the webm crate ecosystem.
*/

/**
    Errors produced by the webm crates.

    Variants group by recovery policy: `Setup` is fatal to construction and
    leaves no usable instance, `Usage` is a lifecycle violation by the caller,
    and the remaining variants are per-operation failures that leave the
    component consistent and able to accept further calls.
*/
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Unrecoverable misconfiguration during setup.
    #[error("setup failed: {0}")]
    Setup(String),

    /// The video codec reported an error.
    #[error("codec error: {0}")]
    Codec(String),

    /// Pixel conversion preconditions were violated.
    #[error("conversion error: {0}")]
    Conversion(String),

    /// The container serializer rejected an operation.
    #[error("mux error: {0}")]
    Mux(String),

    /// Input data failed validation.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// An operation was called in a state that forbids it.
    #[error("usage error: {0}")]
    Usage(String),

    /// An underlying I/O operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /**
        Create a setup error.
    */
    pub fn setup(msg: impl Into<String>) -> Self {
        Self::Setup(msg.into())
    }

    /**
        Create a codec error.
    */
    pub fn codec(msg: impl Into<String>) -> Self {
        Self::Codec(msg.into())
    }

    /**
        Create a conversion error.
    */
    pub fn conversion(msg: impl Into<String>) -> Self {
        Self::Conversion(msg.into())
    }

    /**
        Create a mux error.
    */
    pub fn mux(msg: impl Into<String>) -> Self {
        Self::Mux(msg.into())
    }

    /**
        Create an invalid-data error.
    */
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    /**
        Create a usage error.
    */
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }
}

/// Result alias used across the webm crates.
pub type Result<T> = std::result::Result<T, Error>;
