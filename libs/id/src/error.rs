//! Error types for codec construction.

use thiserror::Error;

/// Errors that can occur when building a [`crate::PublicIdCodec`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The alphabet has too few unique characters.
    #[error("alphabet must contain at least {min} unique characters, got {actual}")]
    AlphabetTooShort { min: usize, actual: usize },

    /// The alphabet contains a whitespace character.
    #[error("alphabet cannot contain whitespace")]
    AlphabetContainsWhitespace,
}

impl CodecError {
    /// Returns true if this error is about the alphabet size.
    pub fn is_too_short(&self) -> bool {
        matches!(self, CodecError::AlphabetTooShort { .. })
    }
}
