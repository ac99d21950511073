//! Error types for the cmdlink binding layer

use std::fmt;

/// Result type alias for binding operations
pub type Result<T> = std::result::Result<T, BindingError>;

/// Main error type for binding operations
///
/// Protocol violations (use of a released handle, dereferencing a stale
/// output address) have no variant here: the `Session` type makes them
/// unrepresentable rather than detectable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    /// Engine rejected the resource archive at initialization
    Init(String),

    /// Engine arena could not satisfy an allocation request
    Allocation(String),

    /// Typed read or write past the end of linear memory
    OutOfBounds(String),

    /// Malformed response payload (bad UTF-16, unknown classification byte)
    Decode(String),

    /// Malformed manifest document or version string
    Manifest(String),

    /// I/O errors while loading a manifest or archive
    Io(String),
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingError::Init(msg) => write!(f, "Initialization failed: {}", msg),
            BindingError::Allocation(msg) => write!(f, "Allocation failed: {}", msg),
            BindingError::OutOfBounds(msg) => write!(f, "Out of bounds: {}", msg),
            BindingError::Decode(msg) => write!(f, "Decode error: {}", msg),
            BindingError::Manifest(msg) => write!(f, "Manifest error: {}", msg),
            BindingError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for BindingError {}

impl From<std::io::Error> for BindingError {
    fn from(err: std::io::Error) -> Self {
        BindingError::Io(err.to_string())
    }
}

impl From<std::string::FromUtf16Error> for BindingError {
    fn from(err: std::string::FromUtf16Error) -> Self {
        BindingError::Decode(err.to_string())
    }
}
