//! Error types for the encoder library

use thiserror::Error;

/// Encoder error types
///
/// Encoding itself never fails: malformed markup degrades to literal text
/// and unencodable characters degrade through the charset fallback chain.
/// The only fallible operation is resolving a charset by name.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Charset name not present in the registry
    #[error("Unknown charset: {0}")]
    UnknownCharset(String),
}

/// Result type for encoder operations
pub type EncodeResult<T> = Result<T, EncodeError>;
