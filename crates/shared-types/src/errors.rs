//! # Error Types
//!
//! Parsing errors for the numeric encodings used on the wire.

use thiserror::Error;

/// A numeric string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Empty input.
    #[error("empty numeric string")]
    Empty,

    /// Not a valid decimal or `0x`-prefixed hexadecimal number.
    #[error("invalid number: {0}")]
    Invalid(String),

    /// Does not fit the target width.
    #[error("number out of range: {0}")]
    Overflow(String),
}
