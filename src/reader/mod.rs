//! Support for reading canonical S-expressions from byte buffers.

use std::io::ErrorKind;

use crate::data::Value;
use parse::parse;
pub use token::{tokenize, Token, TokenOffset, Tokenizer};

mod parse;
mod token;

/// Decode the buffer as exactly one canonical S-expression.
pub fn decode(input: &[u8]) -> ReadResult<Value> {
    let result = parse(tokenize(input));
    match &result {
        Ok(_) => tracing::debug!("decoded {} bytes", input.len()),
        Err(e) => tracing::debug!("failed to decode {} bytes: {e}", input.len()),
    }
    result
}

/// Error type if a decode does not complete.
///
/// Every error is terminal: decoding is all-or-nothing, and no partial tree is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The byte at `offset` does not start a list, end a list, or start an atom.
    Lexical { offset: usize, message: String },
    /// The atom header at `offset` declares more bytes than remain in the input.
    TruncatedAtom {
        offset: usize,
        declared: usize,
        available: usize,
    },
    /// A list was closed without being opened, or the input ended with lists still open.
    /// `depth` is the number of lists open at that point.
    UnbalancedParentheses { offset: usize, depth: usize },
    /// The input held `count` top-level expressions, rather than exactly one.
    MalformedTopLevel { count: usize },
}

impl DecodeError {
    /// Byte offset in the input where the error was detected, if it has one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            DecodeError::Lexical { offset, .. }
            | DecodeError::TruncatedAtom { offset, .. }
            | DecodeError::UnbalancedParentheses { offset, .. } => Some(*offset),
            DecodeError::MalformedTopLevel { .. } => None,
        }
    }
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::result::Result<(), std::fmt::Error> {
        match self {
            DecodeError::Lexical { offset, message } => {
                write!(f, "lexical error at byte {offset}: {message}")
            }
            DecodeError::TruncatedAtom {
                offset,
                declared,
                available,
            } => write!(
                f,
                "truncated atom at byte {offset}: declared {declared} bytes, only {available} available"
            ),
            DecodeError::UnbalancedParentheses { offset, depth: 0 } => {
                write!(f, "unbalanced parentheses: close at byte {offset} without matching open")
            }
            DecodeError::UnbalancedParentheses { offset, depth } => write!(
                f,
                "unbalanced parentheses: input ended at byte {offset} with {depth} list(s) open"
            ),
            DecodeError::MalformedTopLevel { count } => write!(
                f,
                "malformed top level: expected exactly one expression, found {count}"
            ),
        }
    }
}

impl std::error::Error for DecodeError {}

/// The main result type for this module:
/// a T (token, value, etc), or an error.
pub type ReadResult<T> = Result<T, DecodeError>;

impl From<DecodeError> for std::io::Error {
    fn from(value: DecodeError) -> Self {
        std::io::Error::new(ErrorKind::InvalidData, value)
    }
}
