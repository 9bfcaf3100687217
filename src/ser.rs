//! Recursive text encoding of type descriptors and values.
//!
//! Two encoders share one recursive shape:
//!
//! - [`TypeEncoder`] renders a [`CompoundType`] tree, independent of any
//!   value. Its top-level entry, [`TypeEncoder::encode_schema`], emits the
//!   one-time `ROW<...>` announcement that must precede the data stream.
//! - [`ValueEncoder`] renders a [`Value`] tree, dispatched purely on each
//!   node's own variant tag. No type is threaded alongside: values are
//!   self-describing, and the receiver recovers names and tags from the
//!   schema it already holds.
//!
//! Both stream token-by-token through a [`StructuralWriter`] rather than
//! building one string, so memory stays bounded for deep or wide trees.
//!
//! Encoding conventions fixed by [`PROTOCOL_VERSION`](crate::PROTOCOL_VERSION):
//! struct children are positional (`(a,b,c)`, no names), maps unzip into two
//! parallel sequences (`((k1,k2),(v1,v2))`), enum values are the bare decimal
//! ordinal, union values are `(ordinal:child)`, and array types carry their
//! fixed length (`ARRAY<elem,len>`).
//!
//! ## Examples
//!
//! ```rust
//! use rowtext::{type_to_string, CompoundType};
//!
//! let ty = CompoundType::map(
//!     CompoundType::primitive("VARCHAR"),
//!     CompoundType::primitive("INTEGER"),
//! );
//! assert_eq!(type_to_string(&ty).unwrap(), "MAP<VARCHAR,INTEGER>");
//! ```

use std::io::Write;

use crate::schema::known_primitive;
use crate::{CompoundType, Error, Field, Result, Schema, StructuralWriter, Value};

/// Renders compound type descriptors to text.
pub struct TypeEncoder<'a, W: Write> {
    writer: &'a mut StructuralWriter<W>,
}

impl<'a, W: Write> TypeEncoder<'a, W> {
    pub fn new(writer: &'a mut StructuralWriter<W>) -> Self {
        TypeEncoder { writer }
    }

    /// Emits the one-time schema announcement: `ROW<` column types `>`.
    ///
    /// This must reach the peer before the first data row; the receiver
    /// builds its decoder from it.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedType`] for an unknown primitive keyword anywhere
    /// in the schema, [`Error::Sink`] if the writer fails.
    pub fn encode_schema(&mut self, schema: &Schema) -> Result<()> {
        self.writer.write("ROW<")?;
        let mut separator = "";
        for ty in schema.types() {
            self.writer.write(separator)?;
            separator = ",";
            self.encode(ty)?;
        }
        self.writer.write(">")
    }

    /// Recursively encodes one type descriptor.
    pub fn encode(&mut self, ty: &CompoundType) -> Result<()> {
        match ty {
            CompoundType::Primitive(name) => self.encode_primitive(name),
            CompoundType::Decimal { width, scale } => self.encode_decimal(*width, *scale),
            CompoundType::Struct(fields) => self.encode_members("STRUCT<", fields),
            CompoundType::Map(key, value) => self.encode_map(key, value),
            CompoundType::List(elem) => self.encode_list(elem),
            CompoundType::Array(elem, len) => self.encode_array(elem, *len),
            CompoundType::Enum(tags) => self.encode_enum(tags),
            CompoundType::Union(members) => self.encode_members("UNION<", members),
        }
    }

    fn encode_primitive(&mut self, name: &str) -> Result<()> {
        if !known_primitive(name) {
            return Err(Error::unsupported(name));
        }
        self.writer.write(name)
    }

    fn encode_decimal(&mut self, width: u8, scale: u8) -> Result<()> {
        self.writer.write("DECIMAL(")?;
        self.writer.write(&width.to_string())?;
        self.writer.write(",")?;
        self.writer.write(&scale.to_string())?;
        self.writer.write(")")
    }

    // STRUCT and UNION render identically: name, ":" unless the name is
    // empty, then the member type.
    fn encode_members(&mut self, prefix: &str, members: &[Field]) -> Result<()> {
        self.writer.write(prefix)?;
        let mut separator = "";
        for member in members {
            self.writer.write(separator)?;
            separator = ",";
            if !member.name.is_empty() {
                self.writer.write(&member.name)?;
                self.writer.write(":")?;
            }
            self.encode(&member.ty)?;
        }
        self.writer.write(">")
    }

    fn encode_map(&mut self, key: &CompoundType, value: &CompoundType) -> Result<()> {
        self.writer.write("MAP<")?;
        self.encode(key)?;
        self.writer.write(",")?;
        self.encode(value)?;
        self.writer.write(">")
    }

    fn encode_list(&mut self, elem: &CompoundType) -> Result<()> {
        self.writer.write("LIST<")?;
        self.encode(elem)?;
        self.writer.write(">")
    }

    // The fixed length travels in the type text so the receiver can reject
    // short or long value rows instead of guessing.
    fn encode_array(&mut self, elem: &CompoundType, len: usize) -> Result<()> {
        self.writer.write("ARRAY<")?;
        self.encode(elem)?;
        self.writer.write(",")?;
        self.writer.write(&len.to_string())?;
        self.writer.write(">")
    }

    fn encode_enum(&mut self, tags: &[String]) -> Result<()> {
        self.writer.write("ENUM<")?;
        let mut separator = "";
        for tag in tags {
            self.writer.write(separator)?;
            separator = ",";
            self.writer.write(tag)?;
        }
        self.writer.write(">")
    }
}

/// Renders compound values to text, dispatching on each node's own variant.
///
/// Adding a new compound kind means adding one `Value` variant and one arm
/// here; the exhaustive match keeps the two in lockstep at compile time.
pub struct ValueEncoder<'a, W: Write> {
    writer: &'a mut StructuralWriter<W>,
}

impl<'a, W: Write> ValueEncoder<'a, W> {
    pub fn new(writer: &'a mut StructuralWriter<W>) -> Self {
        ValueEncoder { writer }
    }

    /// Recursively encodes one value tree.
    ///
    /// # Errors
    ///
    /// [`Error::Sink`](crate::Error::Sink) if the writer fails. Encoding is
    /// total over well-formed values.
    pub fn encode(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Null => self.writer.write("NULL"),
            Value::Scalar(s) => self.writer.write(&s.to_string()),
            Value::Struct(children) | Value::List(children) | Value::Array(children) => {
                self.encode_children(children)
            }
            Value::Map(pairs) => self.encode_map(pairs),
            Value::Enum(ordinal) => self.writer.write(&ordinal.to_string()),
            Value::Union { tag, value } => self.encode_union(*tag, value),
        }
    }

    // Structs, lists, and arrays all encode positionally; only the type side
    // distinguishes them.
    fn encode_children(&mut self, children: &[Value]) -> Result<()> {
        self.writer.write("(")?;
        let mut separator = "";
        for child in children {
            self.writer.write(separator)?;
            separator = ",";
            self.encode(child)?;
        }
        self.writer.write(")")
    }

    // Maps unzip into all keys then all values, `((k1,k2),(v1,v2))`. The
    // receiver zips them back by index, so the two sequences must stay in
    // the same order and of equal length.
    fn encode_map(&mut self, pairs: &[(Value, Value)]) -> Result<()> {
        self.writer.write("(")?;
        self.writer.write("(")?;
        let mut separator = "";
        for (key, _) in pairs {
            self.writer.write(separator)?;
            separator = ",";
            self.encode(key)?;
        }
        self.writer.write(")")?;
        self.writer.write(",")?;
        self.writer.write("(")?;
        separator = "";
        for (_, value) in pairs {
            self.writer.write(separator)?;
            separator = ",";
            self.encode(value)?;
        }
        self.writer.write(")")?;
        self.writer.write(")")
    }

    fn encode_union(&mut self, tag: u32, value: &Value) -> Result<()> {
        self.writer.write("(")?;
        self.writer.write(&tag.to_string())?;
        self.writer.write(":")?;
        self.encode(value)?;
        self.writer.write(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_text(ty: &CompoundType) -> String {
        let mut out = Vec::new();
        let mut w = StructuralWriter::new(&mut out);
        TypeEncoder::new(&mut w).encode(ty).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn value_text(v: &Value) -> String {
        let mut out = Vec::new();
        let mut w = StructuralWriter::new(&mut out);
        ValueEncoder::new(&mut w).encode(v).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn struct_type_with_anonymous_field() {
        let ty = CompoundType::struct_of(vec![
            Field::new("a", CompoundType::primitive("INTEGER")),
            Field::anonymous(CompoundType::primitive("VARCHAR")),
        ]);
        assert_eq!(type_text(&ty), "STRUCT<a:INTEGER,VARCHAR>");
    }

    #[test]
    fn decimal_type_text() {
        assert_eq!(type_text(&CompoundType::decimal(18, 3)), "DECIMAL(18,3)");
    }

    #[test]
    fn array_type_announces_length() {
        let ty = CompoundType::array(CompoundType::primitive("DOUBLE"), 4);
        assert_eq!(type_text(&ty), "ARRAY<DOUBLE,4>");
    }

    #[test]
    fn unknown_primitive_fails_at_type_time() {
        let ty = CompoundType::list(CompoundType::primitive("GEOMETRY"));
        let mut out = Vec::new();
        let mut w = StructuralWriter::new(&mut out);
        assert!(matches!(
            TypeEncoder::new(&mut w).encode(&ty),
            Err(Error::UnsupportedType(_))
        ));
    }

    #[test]
    fn map_value_unzips() {
        let v = Value::Map(vec![
            (Value::from("x"), Value::from(1)),
            (Value::from("y"), Value::from(2)),
        ]);
        assert_eq!(value_text(&v), "(('x','y'),(1,2))");
    }

    #[test]
    fn union_value_uses_ordinal_tag() {
        let v = Value::Union {
            tag: 1,
            value: Box::new(Value::from("howdy")),
        };
        assert_eq!(value_text(&v), "(1:'howdy')");
    }

    #[test]
    fn empty_containers() {
        assert_eq!(value_text(&Value::List(vec![])), "()");
        assert_eq!(value_text(&Value::Map(vec![])), "((),())");
    }
}
