//! Error types for the rowtext encoder and decoder.
//!
//! ## Error Categories
//!
//! - **Structural mismatches**: a value's variant or arity disagrees with its
//!   declared type. This signals a defect in the producer upstream; it is
//!   fatal and never retried.
//! - **Unsupported types**: a type keyword with no encoding rule. Raised
//!   while the schema is announced, before any row is streamed.
//! - **Sink failures**: the underlying writer stopped accepting text (for
//!   example, the transport closed). Propagated upward; the stream aborts.
//! - **Syntax errors**: decoder-side parse failures, reported with the byte
//!   offset of the offending input.
//!
//! Encoding is total over well-formed input, so a well-typed value tree never
//! produces an error other than `Sink`.
//!
//! ## Examples
//!
//! ```rust
//! use rowtext::{parse_type, Error};
//!
//! let result = parse_type("STRUCT<a:INTEGER");
//! assert!(matches!(result, Err(Error::Syntax { .. })));
//! ```

use std::fmt;
use thiserror::Error;

/// All errors produced by rowtext encoding, decoding, and streaming.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// A value's variant or arity does not match its declared type.
    ///
    /// This indicates a producer bug, not a runtime condition to recover
    /// from. Retrying reproduces the same failure.
    #[error("structural mismatch: {0}")]
    StructuralMismatch(String),

    /// A type keyword has no encoding rule.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// The underlying sink rejected a write.
    #[error("sink failure: {0}")]
    Sink(String),

    /// The decoder hit malformed input.
    #[error("syntax error at offset {offset}: {msg}")]
    Syntax { offset: usize, msg: String },
}

impl Error {
    /// Creates a structural mismatch error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rowtext::Error;
    ///
    /// let err = Error::structural("struct has 2 children, type declares 3");
    /// assert!(err.to_string().contains("structural mismatch"));
    /// ```
    pub fn structural<T: fmt::Display>(msg: T) -> Self {
        Error::StructuralMismatch(msg.to_string())
    }

    /// Creates an unsupported type error for a keyword with no encoding rule.
    pub fn unsupported<T: fmt::Display>(name: T) -> Self {
        Error::UnsupportedType(name.to_string())
    }

    /// Creates a sink failure, typically from an [`std::io::Error`].
    pub fn sink<T: fmt::Display>(msg: T) -> Self {
        Error::Sink(msg.to_string())
    }

    /// Creates a syntax error at the given byte offset of the input.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rowtext::Error;
    ///
    /// let err = Error::syntax(17, "expected '>'");
    /// assert!(err.to_string().contains("offset 17"));
    /// ```
    pub fn syntax<T: fmt::Display>(offset: usize, msg: T) -> Self {
        Error::Syntax {
            offset,
            msg: msg.to_string(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::sink(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
