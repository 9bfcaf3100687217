//! Driving a result to completion over a sink.
//!
//! The query engine is an external collaborator; it shows up here only as a
//! [`ChunkSource`], a forward-only pull iterator of row batches. A source is
//! exhausted after one full pass and is never restarted, and `fetch` may
//! block on upstream computation; it is the only suspending operation in
//! the crate.
//!
//! [`ResultStreamer`] drives a source to completion: it announces the schema
//! once, then wraps the data in structural framing,
//! `RESULT_DATA(` chunks `)`, `CHUNK_DATA(` rows `)`, `ROW_DATA(` cells `)`,
//! comma-joined at each level, so the receiver can resynchronize on
//! boundaries without length prefixes.
//!
//! There is no cancellation primitive: a caller that abandons a stream just
//! stops fetching and drops the writer. Text already flushed is not
//! retracted. Timeouts and retries belong to the transport, not here.
//!
//! ## Examples
//!
//! ```rust
//! use rowtext::{
//!     Chunk, CompoundType, MemorySource, ResultStreamer, Schema, StructuralWriter, Value,
//! };
//!
//! let schema = Schema::new().with_column("n", CompoundType::primitive("INTEGER"));
//! let mut source = MemorySource::new(vec![Chunk::new(vec![vec![Value::from(7)]])]);
//!
//! let mut out = Vec::new();
//! let mut writer = StructuralWriter::new(&mut out);
//! ResultStreamer::new(&mut writer)
//!     .stream(&schema, &mut source)
//!     .unwrap();
//!
//! let text = String::from_utf8(out).unwrap();
//! assert_eq!(text, "ROW<INTEGER>RESULT_DATA(CHUNK_DATA(ROW_DATA(7)))");
//! ```

use std::collections::VecDeque;
use std::io::Write;

use crate::ser::{TypeEncoder, ValueEncoder};
use crate::{Error, Result, Schema, StructuralWriter, Value};

/// One result row: an ordered cell per declared output column.
pub type Row = Vec<Value>;

/// A batch of rows produced by the upstream engine.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Chunk {
    pub rows: Vec<Row>,
}

impl Chunk {
    pub fn new(rows: Vec<Row>) -> Self {
        Chunk { rows }
    }
}

/// Forward-only, pull-on-demand supply of result chunks.
///
/// `fetch` returns `Ok(None)` once the result is exhausted; it may block
/// while the upstream engine computes the next batch.
pub trait ChunkSource {
    fn fetch(&mut self) -> Result<Option<Chunk>>;
}

/// A [`ChunkSource`] over chunks already in memory.
///
/// Useful for tests and for embedders whose engine materializes results
/// before sending.
#[derive(Debug, Default)]
pub struct MemorySource {
    chunks: VecDeque<Chunk>,
}

impl MemorySource {
    pub fn new(chunks: Vec<Chunk>) -> Self {
        MemorySource {
            chunks: chunks.into(),
        }
    }
}

impl ChunkSource for MemorySource {
    fn fetch(&mut self) -> Result<Option<Chunk>> {
        Ok(self.chunks.pop_front())
    }
}

/// Streams one result to a writer: schema announcement, then framed data.
///
/// Single-threaded and synchronous; one streamer per outbound stream.
pub struct ResultStreamer<'a, W: Write> {
    writer: &'a mut StructuralWriter<W>,
}

impl<'a, W: Write> ResultStreamer<'a, W> {
    pub fn new(writer: &'a mut StructuralWriter<W>) -> Self {
        ResultStreamer { writer }
    }

    /// Drives `source` to exhaustion.
    ///
    /// The `ROW<...>` announcement goes out before the first fetch, so the
    /// receiver holds the schema before any value arrives, and an
    /// unsupported column type fails the stream before any row is pulled.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedType`] from the announcement,
    /// [`Error::StructuralMismatch`] when a row's cell count differs from
    /// the announced column count, [`Error::Sink`] from the writer, or any
    /// error the source returns from `fetch`. The stream aborts on the
    /// first error; partial output is not retracted.
    pub fn stream(&mut self, schema: &Schema, source: &mut dyn ChunkSource) -> Result<()> {
        TypeEncoder::new(self.writer).encode_schema(schema)?;

        self.writer.write("RESULT_DATA(")?;
        let mut chunk_separator = "";
        while let Some(chunk) = source.fetch()? {
            self.writer.write(chunk_separator)?;
            chunk_separator = ",";
            self.write_chunk(schema, &chunk)?;
        }
        self.writer.write(")")?;
        self.writer.finish()
    }

    fn write_chunk(&mut self, schema: &Schema, chunk: &Chunk) -> Result<()> {
        self.writer.write("CHUNK_DATA(")?;
        let mut row_separator = "";
        for row in &chunk.rows {
            self.writer.write(row_separator)?;
            row_separator = ",";
            self.write_row(schema, row)?;
        }
        self.writer.write(")")
    }

    fn write_row(&mut self, schema: &Schema, row: &Row) -> Result<()> {
        if row.len() != schema.len() {
            return Err(Error::structural(format!(
                "row has {} cells, schema declares {} columns",
                row.len(),
                schema.len()
            )));
        }
        self.writer.write("ROW_DATA(")?;
        let mut cell_separator = "";
        for cell in row {
            self.writer.write(cell_separator)?;
            cell_separator = ",";
            ValueEncoder::new(self.writer).encode(cell)?;
        }
        self.writer.write(")")
    }
}
