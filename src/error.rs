use thiserror::Error;

/// Result type for classlift operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the classlift transformer
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Class format error: {message}")]
    ClassFormat { message: String },

    #[error("Bytecode error: {message}")]
    Bytecode { message: String },

    #[error("Unsupported feature: {feature}")]
    Unsupported { feature: String },

    #[error("Internal transformer error: {message}")]
    Internal { message: String },
}

impl Error {
    /// Create a class format error
    pub fn class_format(message: impl Into<String>) -> Self {
        Self::ClassFormat { message: message.into() }
    }

    /// Create a bytecode error
    pub fn bytecode(message: impl Into<String>) -> Self {
        Self::Bytecode { message: message.into() }
    }

    /// Create an unsupported-feature error
    pub fn unsupported(feature: impl Into<String>) -> Self {
        Self::Unsupported { feature: feature.into() }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }
}
