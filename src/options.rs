//! Configuration options for text output.
//!
//! [`TextOptions`] controls the debug-readability formatting of the
//! [`StructuralWriter`](crate::StructuralWriter). The wire default is compact
//! (tokens emitted verbatim); pretty mode adds a newline and depth-based
//! indentation in front of every opening token.
//!
//! Protocol conventions that must stay fixed across both peers live here as
//! constants rather than options: union tags are member ordinals, and array
//! types carry their fixed length in the type text (`ARRAY<T,n>`).
//!
//! ## Examples
//!
//! ```rust
//! use rowtext::{type_to_string_with_options, CompoundType, TextOptions};
//!
//! let ty = CompoundType::list(CompoundType::primitive("INTEGER"));
//! let pretty = type_to_string_with_options(&ty, TextOptions::pretty()).unwrap();
//! assert!(pretty.contains('\n'));
//! ```

/// Version of the textual protocol emitted by this crate.
///
/// Version 1 fixes two conventions left open by earlier iterations of the
/// format: union values carry the member *ordinal* (never the member name),
/// and array types announce their fixed length as `ARRAY<elem,len>`.
pub const PROTOCOL_VERSION: u32 = 1;

/// Configuration for structural text output.
///
/// # Examples
///
/// ```rust
/// use rowtext::TextOptions;
///
/// // Compact wire form (the default)
/// let options = TextOptions::new();
///
/// // Indented debug form
/// let options = TextOptions::pretty().with_indent(4);
/// ```
#[derive(Clone, Debug)]
pub struct TextOptions {
    /// Emit a newline plus indentation before every opening token.
    pub pretty: bool,
    /// Spaces per nesting level in pretty mode.
    pub indent: usize,
}

impl Default for TextOptions {
    fn default() -> Self {
        TextOptions {
            pretty: false,
            indent: 3,
        }
    }
}

impl TextOptions {
    /// Creates the default compact options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for indented debug output.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rowtext::TextOptions;
    ///
    /// let options = TextOptions::pretty();
    /// assert!(options.pretty);
    /// ```
    #[must_use]
    pub fn pretty() -> Self {
        TextOptions {
            pretty: true,
            ..Default::default()
        }
    }

    /// Sets the indentation width (spaces per nesting level).
    ///
    /// Only affects pretty output.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}
