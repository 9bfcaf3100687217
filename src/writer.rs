//! Structural token sink with depth-tracked indentation.
//!
//! [`StructuralWriter`] is the lowest layer of the output path. It accepts
//! text tokens and infers nesting purely from each token's last character:
//! a trailing opening delimiter (`<` or `(`) increases the depth, a trailing
//! closing delimiter (`>` or `)`) decreases it. In pretty mode every opening
//! token is preceded by a newline and depth-proportional indentation; in the
//! compact wire mode tokens pass through verbatim. Depth is tracked either
//! way.
//!
//! The writer knows nothing about types or values, so a different framing
//! layer can replace it without touching the encoders. One writer instance
//! serves one outbound stream; instances are never shared.
//!
//! ## Examples
//!
//! ```rust
//! use rowtext::{StructuralWriter, TextOptions};
//!
//! let mut out = Vec::new();
//! let mut w = StructuralWriter::new(&mut out);
//! w.write("LIST<").unwrap();
//! assert_eq!(w.depth(), 1);
//! w.write("INTEGER").unwrap();
//! w.write(">").unwrap();
//! assert_eq!(w.depth(), 0);
//! assert_eq!(out, b"LIST<INTEGER>");
//! ```

use std::io::Write;

use crate::{Result, TextOptions};

enum TokenShape {
    Opening,
    Closing,
    Plain,
}

fn shape_of(token: &str) -> TokenShape {
    match token.chars().last() {
        Some('<') | Some('(') => TokenShape::Opening,
        Some('>') | Some(')') => TokenShape::Closing,
        _ => TokenShape::Plain,
    }
}

/// A text sink that tracks nesting depth from paired delimiter tokens.
pub struct StructuralWriter<W: Write> {
    sink: W,
    options: TextOptions,
    depth: usize,
}

impl<W: Write> StructuralWriter<W> {
    /// Creates a compact-mode writer over `sink`.
    pub fn new(sink: W) -> Self {
        Self::with_options(sink, TextOptions::default())
    }

    pub fn with_options(sink: W, options: TextOptions) -> Self {
        StructuralWriter {
            sink,
            options,
            depth: 0,
        }
    }

    /// Current nesting depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Appends one token to the sink.
    ///
    /// Unbalanced input is tolerated: closing below depth 0 leaves the depth
    /// at 0. This layer is a readability aid, not protocol validation.
    ///
    /// # Errors
    ///
    /// [`Error::Sink`](crate::Error::Sink) when the underlying writer rejects
    /// the bytes.
    pub fn write(&mut self, token: &str) -> Result<()> {
        match shape_of(token) {
            TokenShape::Opening => {
                if self.options.pretty {
                    self.sink.write_all(b"\n")?;
                    for _ in 0..self.depth * self.options.indent {
                        self.sink.write_all(b" ")?;
                    }
                }
                self.sink.write_all(token.as_bytes())?;
                self.depth += 1;
            }
            TokenShape::Closing => {
                self.sink.write_all(token.as_bytes())?;
                self.depth = self.depth.saturating_sub(1);
            }
            TokenShape::Plain => {
                self.sink.write_all(token.as_bytes())?;
            }
        }
        Ok(())
    }

    /// Flushes the sink. Call once the stream is complete.
    pub fn finish(&mut self) -> Result<()> {
        self.sink.flush()?;
        Ok(())
    }

    /// Consumes the writer, returning the sink.
    pub fn into_inner(self) -> W {
        self.sink
    }
}
