//! # rowtext
//!
//! A recursive textual wire encoding for nested query-result types and
//! values.
//!
//! rowtext converts an in-memory, arbitrarily-nested compound value, along
//! with its compound type descriptor, into a deterministic text stream whose
//! nesting mirrors the type structure exactly. A remote peer can rebuild
//! types and values from the text alone: no shared binary schema, no
//! out-of-band negotiation.
//!
//! ## How the protocol fits together
//!
//! The type channel announces a result's schema once, before any data:
//!
//! ```text
//! ROW<INTEGER,STRUCT<a:MAP<VARCHAR,INTEGER>>>
//! ```
//!
//! The value channel then streams rows positionally. Struct children carry
//! no field names (the schema already fixed them), maps travel as two
//! parallel sequences (`((k1,k2),(v1,v2))`), enum values as bare ordinals,
//! union values as `(ordinal:child)`. The framing tokens `RESULT_DATA`,
//! `CHUNK_DATA`, and `ROW_DATA` delimit logical units so the receiver can
//! resynchronize on structure rather than length prefixes.
//!
//! ## Components
//!
//! - [`StructuralWriter`]: the leaf sink; tracks nesting depth from paired
//!   delimiter tokens and handles debug indentation.
//! - [`TypeEncoder`] / [`ValueEncoder`]: the recursive encoders, one
//!   exhaustive match arm per compound kind.
//! - [`ResultStreamer`]: drives a [`ChunkSource`] to completion with
//!   result/chunk/row framing.
//! - [`parse_type`] / [`parse_schema`] / [`parse_value`]: the receiving
//!   half.
//!
//! ## Quick Start
//!
//! ```rust
//! use rowtext::{parse_value, type_to_string, value_to_string, CompoundType, Field, Value};
//!
//! let ty = CompoundType::struct_of(vec![
//!     Field::new("id", CompoundType::primitive("INTEGER")),
//!     Field::new("name", CompoundType::primitive("VARCHAR")),
//! ]);
//! assert_eq!(type_to_string(&ty).unwrap(), "STRUCT<id:INTEGER,name:VARCHAR>");
//!
//! let v = Value::Struct(vec![Value::from(1), Value::from("duck")]);
//! let text = value_to_string(&v).unwrap();
//! assert_eq!(text, "(1,'duck')");
//!
//! // The receiver rebuilds the value from the announced type.
//! assert_eq!(parse_value(&text, &ty).unwrap(), v);
//! ```
//!
//! ## Streaming a result
//!
//! ```rust
//! use rowtext::{stream_result, Chunk, CompoundType, MemorySource, Schema, Value};
//!
//! let schema = Schema::new().with_column("n", CompoundType::primitive("INTEGER"));
//! let mut source = MemorySource::new(vec![Chunk::new(vec![vec![Value::from(7)]])]);
//!
//! let mut out = Vec::new();
//! stream_result(&mut out, &schema, &mut source).unwrap();
//! assert_eq!(
//!     String::from_utf8(out).unwrap(),
//!     "ROW<INTEGER>RESULT_DATA(CHUNK_DATA(ROW_DATA(7)))"
//! );
//! ```
//!
//! ## Concurrency model
//!
//! Single-threaded, synchronous, cooperative pull. The only operation that
//! may block is [`ChunkSource::fetch`]. One [`StructuralWriter`] per
//! outbound stream; nothing here is shared across streams.

pub mod de;
pub mod error;
pub mod options;
pub mod scalar;
pub mod schema;
pub mod ser;
pub mod stream;
pub mod value;
pub mod writer;

pub use de::{parse_schema, parse_type, parse_value};
pub use error::{Error, Result};
pub use options::{TextOptions, PROTOCOL_VERSION};
pub use scalar::Scalar;
pub use schema::{CompoundType, Field, Schema};
pub use ser::{TypeEncoder, ValueEncoder};
pub use stream::{Chunk, ChunkSource, MemorySource, ResultStreamer, Row};
pub use value::Value;
pub use writer::StructuralWriter;

use std::io;

/// Encodes one type descriptor to a compact string.
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] for an unknown primitive keyword.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn type_to_string(ty: &CompoundType) -> Result<String> {
    type_to_string_with_options(ty, TextOptions::default())
}

/// Encodes one type descriptor with custom formatting options.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn type_to_string_with_options(ty: &CompoundType, options: TextOptions) -> Result<String> {
    collect(options, |writer| TypeEncoder::new(writer).encode(ty))
}

/// Encodes a schema announcement (`ROW<...>`) to a compact string.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn schema_to_string(schema: &Schema) -> Result<String> {
    schema_to_string_with_options(schema, TextOptions::default())
}

/// Encodes a schema announcement with custom formatting options.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn schema_to_string_with_options(schema: &Schema, options: TextOptions) -> Result<String> {
    collect(options, |writer| {
        TypeEncoder::new(writer).encode_schema(schema)
    })
}

/// Encodes one value tree to a compact string.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn value_to_string(value: &Value) -> Result<String> {
    value_to_string_with_options(value, TextOptions::default())
}

/// Encodes one value tree with custom formatting options.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn value_to_string_with_options(value: &Value, options: TextOptions) -> Result<String> {
    collect(options, |writer| ValueEncoder::new(writer).encode(value))
}

/// Encodes one value tree to any writer.
///
/// # Errors
///
/// [`Error::Sink`] if the writer rejects bytes.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn value_to_writer<W: io::Write>(sink: W, value: &Value) -> Result<()> {
    let mut writer = StructuralWriter::new(sink);
    ValueEncoder::new(&mut writer).encode(value)?;
    writer.finish()
}

/// Streams one full result to a sink: schema announcement, then framed
/// data.
///
/// # Errors
///
/// See [`ResultStreamer::stream`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn stream_result<W: io::Write>(
    sink: W,
    schema: &Schema,
    source: &mut dyn ChunkSource,
) -> Result<()> {
    stream_result_with_options(sink, schema, source, TextOptions::default())
}

/// Streams one full result with custom formatting options.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn stream_result_with_options<W: io::Write>(
    sink: W,
    schema: &Schema,
    source: &mut dyn ChunkSource,
    options: TextOptions,
) -> Result<()> {
    let mut writer = StructuralWriter::with_options(sink, options);
    ResultStreamer::new(&mut writer).stream(schema, source)
}

fn collect<F>(options: TextOptions, f: F) -> Result<String>
where
    F: FnOnce(&mut StructuralWriter<Vec<u8>>) -> Result<()>,
{
    let mut writer = StructuralWriter::with_options(Vec::new(), options);
    f(&mut writer)?;
    writer.finish()?;
    Ok(String::from_utf8(writer.into_inner()).expect("encoders emit valid UTF-8"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_and_value_round_trip() {
        let ty = CompoundType::map(
            CompoundType::primitive("VARCHAR"),
            CompoundType::list(CompoundType::primitive("INTEGER")),
        );
        let text = type_to_string(&ty).unwrap();
        assert_eq!(parse_type(&text).unwrap(), ty);

        let v = Value::Map(vec![(
            Value::from("xs"),
            Value::List(vec![Value::from(1), Value::from(2)]),
        )]);
        let text = value_to_string(&v).unwrap();
        assert_eq!(parse_value(&text, &ty).unwrap(), v);
    }

    #[test]
    fn pretty_output_parses_like_compact() {
        let ty = CompoundType::struct_of(vec![
            Field::new("a", CompoundType::primitive("INTEGER")),
            Field::new(
                "b",
                CompoundType::struct_of(vec![Field::new(
                    "c",
                    CompoundType::primitive("VARCHAR"),
                )]),
            ),
        ]);
        let pretty = type_to_string_with_options(&ty, TextOptions::pretty()).unwrap();
        assert!(pretty.contains('\n'));
        assert_eq!(parse_type(&pretty).unwrap(), ty);
    }

    #[test]
    fn protocol_version_is_stable() {
        assert_eq!(PROTOCOL_VERSION, 1);
    }
}
