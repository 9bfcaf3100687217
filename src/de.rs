//! Decoding the textual protocol back into types and values.
//!
//! This is the receiving half of the encoder pair. Two entry points:
//!
//! - [`parse_type`] / [`parse_schema`] rebuild [`CompoundType`] trees from
//!   the type channel (`ROW<...>` and everything nested inside it).
//! - [`parse_value`] rebuilds a [`Value`] from the value channel, *driven by
//!   the declared type*: value text is positional and carries no names or
//!   tags of its own, so the caller must hand in the schema it received from
//!   the announcement. No catalog lookup happens here.
//!
//! Parsing is single-pass with one character of lookahead. Failures are
//! [`Error::Syntax`] carrying the byte offset of the offending input.
//!
//! ## Examples
//!
//! ```rust
//! use rowtext::{parse_type, parse_value, CompoundType, Value};
//!
//! let ty = parse_type("LIST<INTEGER>").unwrap();
//! let v = parse_value("(1,2,3)", &ty).unwrap();
//! assert_eq!(v.len(), Some(3));
//! ```

use crate::schema::known_primitive;
use crate::{CompoundType, Error, Field, Result, Scalar, Value};

struct Cursor<'de> {
    input: &'de str,
    position: usize,
}

impl<'de> Cursor<'de> {
    fn new(input: &'de str) -> Self {
        Cursor { input, position: 0 }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.position += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek_char(), Some(c) if c.is_whitespace()) {
            self.next_char();
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        self.skip_whitespace();
        match self.next_char() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(Error::syntax(
                self.position,
                format!("expected '{expected}', found '{c}'"),
            )),
            None => Err(Error::syntax(
                self.position,
                format!("expected '{expected}', found end of input"),
            )),
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.peek_char() == Some(expected) {
            self.next_char();
            true
        } else {
            false
        }
    }

    /// Consumes `[A-Za-z_][A-Za-z0-9_]*`, possibly empty.
    fn identifier(&mut self) -> &'de str {
        self.skip_whitespace();
        let start = self.position;
        while matches!(self.peek_char(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.next_char();
        }
        &self.input[start..self.position]
    }

    fn integer<T: std::str::FromStr>(&mut self, what: &str) -> Result<T> {
        self.skip_whitespace();
        let start = self.position;
        while matches!(self.peek_char(), Some(c) if c.is_ascii_digit()) {
            self.next_char();
        }
        self.input[start..self.position]
            .parse()
            .map_err(|_| Error::syntax(start, format!("expected {what}")))
    }

    fn at_end(&mut self) -> bool {
        self.skip_whitespace();
        self.position >= self.input.len()
    }
}

// ---------------------------------------------------------------------------
// Type channel
// ---------------------------------------------------------------------------

struct TypeParser<'de> {
    cursor: Cursor<'de>,
}

impl<'de> TypeParser<'de> {
    fn new(input: &'de str) -> Self {
        TypeParser {
            cursor: Cursor::new(input),
        }
    }

    fn parse(&mut self) -> Result<CompoundType> {
        let start = self.cursor.position;
        let keyword = self.cursor.identifier();
        match keyword {
            "STRUCT" => Ok(CompoundType::Struct(self.members()?)),
            "UNION" => Ok(CompoundType::Union(self.members()?)),
            "MAP" => {
                self.cursor.expect('<')?;
                let key = self.parse()?;
                self.cursor.expect(',')?;
                let value = self.parse()?;
                self.cursor.expect('>')?;
                Ok(CompoundType::map(key, value))
            }
            "LIST" => {
                self.cursor.expect('<')?;
                let elem = self.parse()?;
                self.cursor.expect('>')?;
                Ok(CompoundType::list(elem))
            }
            "ARRAY" => {
                self.cursor.expect('<')?;
                let elem = self.parse()?;
                self.cursor.expect(',')?;
                let len = self.cursor.integer("array length")?;
                self.cursor.expect('>')?;
                Ok(CompoundType::array(elem, len))
            }
            "ENUM" => {
                self.cursor.expect('<')?;
                let mut tags = Vec::new();
                if !self.cursor.eat('>') {
                    loop {
                        tags.push(self.tag_text()?);
                        if !self.cursor.eat(',') {
                            break;
                        }
                    }
                    self.cursor.expect('>')?;
                }
                Ok(CompoundType::Enum(tags))
            }
            "DECIMAL" => {
                self.cursor.expect('(')?;
                let width = self.cursor.integer("decimal width")?;
                self.cursor.expect(',')?;
                let scale = self.cursor.integer("decimal scale")?;
                self.cursor.expect(')')?;
                Ok(CompoundType::Decimal { width, scale })
            }
            "" => Err(Error::syntax(start, "expected a type keyword")),
            name if known_primitive(name) => Ok(CompoundType::primitive(name)),
            name => Err(Error::unsupported(name)),
        }
    }

    // STRUCT<...> / UNION<...> member list. A member is `name:type` or a
    // bare type for anonymous fields; both the name and the ':' are omitted
    // together, so one identifier of lookahead decides which.
    fn members(&mut self) -> Result<Vec<Field>> {
        self.cursor.expect('<')?;
        let mut members = Vec::new();
        if self.cursor.eat('>') {
            return Ok(members);
        }
        loop {
            let mark = self.cursor.position;
            let word = self.cursor.identifier();
            let field = if self.cursor.eat(':') {
                Field::new(word, self.parse()?)
            } else {
                self.cursor.position = mark;
                Field::anonymous(self.parse()?)
            };
            members.push(field);
            if !self.cursor.eat(',') {
                break;
            }
        }
        self.cursor.expect('>')?;
        Ok(members)
    }

    // Enum tags are raw text up to the next ',' or '>'.
    fn tag_text(&mut self) -> Result<String> {
        self.cursor.skip_whitespace();
        let start = self.cursor.position;
        while !matches!(self.cursor.peek_char(), Some(',') | Some('>') | None) {
            self.cursor.next_char();
        }
        if self.cursor.position == start {
            return Err(Error::syntax(start, "expected an enum tag"));
        }
        Ok(self.cursor.input[start..self.cursor.position]
            .trim_end()
            .to_string())
    }
}

/// Parses one type descriptor, requiring the whole input to be consumed.
///
/// # Errors
///
/// [`Error::Syntax`] on malformed input, [`Error::UnsupportedType`] for an
/// unknown keyword.
pub fn parse_type(input: &str) -> Result<CompoundType> {
    let mut parser = TypeParser::new(input);
    let ty = parser.parse()?;
    if parser.cursor.at_end() {
        Ok(ty)
    } else {
        Err(Error::syntax(
            parser.cursor.position,
            "trailing input after type",
        ))
    }
}

/// Parses a `ROW<...>` schema announcement into its column types, in order.
pub fn parse_schema(input: &str) -> Result<Vec<CompoundType>> {
    let mut parser = TypeParser::new(input);
    let keyword = parser.cursor.identifier();
    if keyword != "ROW" {
        return Err(Error::syntax(0, "expected ROW<...> announcement"));
    }
    parser.cursor.expect('<')?;
    let mut columns = Vec::new();
    if !parser.cursor.eat('>') {
        loop {
            columns.push(parser.parse()?);
            if !parser.cursor.eat(',') {
                break;
            }
        }
        parser.cursor.expect('>')?;
    }
    if parser.cursor.at_end() {
        Ok(columns)
    } else {
        Err(Error::syntax(
            parser.cursor.position,
            "trailing input after schema",
        ))
    }
}

// ---------------------------------------------------------------------------
// Value channel
// ---------------------------------------------------------------------------

struct ValueParser<'de> {
    cursor: Cursor<'de>,
}

impl<'de> ValueParser<'de> {
    fn new(input: &'de str) -> Self {
        ValueParser {
            cursor: Cursor::new(input),
        }
    }

    fn parse(&mut self, ty: &CompoundType) -> Result<Value> {
        self.cursor.skip_whitespace();
        if self.eat_null() {
            return Ok(Value::Null);
        }
        match ty {
            CompoundType::Primitive(keyword) => self.scalar(keyword),
            CompoundType::Decimal { .. } => self.scalar("DECIMAL"),
            CompoundType::Struct(fields) => {
                self.cursor.expect('(')?;
                let mut children = Vec::with_capacity(fields.len());
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        self.cursor.expect(',')?;
                    }
                    children.push(self.parse(&field.ty)?);
                }
                self.cursor.expect(')')?;
                Ok(Value::Struct(children))
            }
            CompoundType::Map(key_ty, value_ty) => self.map(key_ty, value_ty),
            CompoundType::List(elem) => Ok(Value::List(self.sequence(elem)?)),
            CompoundType::Array(elem, len) => {
                let items = self.sequence(elem)?;
                if items.len() != *len {
                    return Err(Error::structural(format!(
                        "array has {} elements, type declares length {len}",
                        items.len()
                    )));
                }
                Ok(Value::Array(items))
            }
            CompoundType::Enum(tags) => {
                let ordinal: u32 = self.cursor.integer("enum ordinal")?;
                if (ordinal as usize) < tags.len() {
                    Ok(Value::Enum(ordinal))
                } else {
                    Err(Error::structural(format!(
                        "enum ordinal {ordinal} out of range for {} tags",
                        tags.len()
                    )))
                }
            }
            CompoundType::Union(members) => {
                self.cursor.expect('(')?;
                let tag: u32 = self.cursor.integer("union tag")?;
                let member = members.get(tag as usize).ok_or_else(|| {
                    Error::structural(format!(
                        "union tag {tag} out of range for {} members",
                        members.len()
                    ))
                })?;
                self.cursor.expect(':')?;
                let value = self.parse(&member.ty)?;
                self.cursor.expect(')')?;
                Ok(Value::Union {
                    tag,
                    value: Box::new(value),
                })
            }
        }
    }

    fn eat_null(&mut self) -> bool {
        let rest = &self.cursor.input[self.cursor.position..];
        if let Some(tail) = rest.strip_prefix("NULL") {
            let boundary = match tail.chars().next() {
                None | Some(',') | Some(')') => true,
                Some(c) => c.is_whitespace(),
            };
            if boundary {
                self.cursor.position += "NULL".len();
                return true;
            }
        }
        false
    }

    // A comma-separated sequence between parentheses, any length.
    fn sequence(&mut self, elem: &CompoundType) -> Result<Vec<Value>> {
        self.cursor.expect('(')?;
        let mut items = Vec::new();
        if self.cursor.eat(')') {
            return Ok(items);
        }
        loop {
            items.push(self.parse(elem)?);
            if !self.cursor.eat(',') {
                break;
            }
        }
        self.cursor.expect(')')?;
        Ok(items)
    }

    // Re-zip the two parallel sequences the encoder unzipped. Index i's key
    // pairs with index i's value; a length disagreement is a producer
    // defect, not a syntax problem.
    fn map(&mut self, key_ty: &CompoundType, value_ty: &CompoundType) -> Result<Value> {
        self.cursor.expect('(')?;
        let keys = self.sequence(key_ty)?;
        self.cursor.expect(',')?;
        let values = self.sequence(value_ty)?;
        self.cursor.expect(')')?;
        if keys.len() != values.len() {
            return Err(Error::structural(format!(
                "map has {} keys but {} values",
                keys.len(),
                values.len()
            )));
        }
        Ok(Value::Map(keys.into_iter().zip(values).collect()))
    }

    fn scalar(&mut self, keyword: &str) -> Result<Value> {
        let start = self.cursor.position;
        let raw = if self.cursor.peek_char() == Some('\'') {
            self.quoted_raw()?
        } else {
            self.unquoted_raw()
        };
        Scalar::parse_literal(keyword, raw, start).map(Value::Scalar)
    }

    // The raw literal including its quotes; doubled quotes stay doubled
    // here and collapse inside the scalar parser.
    fn quoted_raw(&mut self) -> Result<&'de str> {
        let start = self.cursor.position;
        self.cursor.next_char(); // opening quote
        loop {
            match self.cursor.next_char() {
                Some('\'') => {
                    if self.cursor.peek_char() == Some('\'') {
                        self.cursor.next_char();
                    } else {
                        return Ok(&self.cursor.input[start..self.cursor.position]);
                    }
                }
                Some(_) => {}
                None => return Err(Error::syntax(start, "unterminated string literal")),
            }
        }
    }

    fn unquoted_raw(&mut self) -> &'de str {
        let start = self.cursor.position;
        while !matches!(
            self.cursor.peek_char(),
            Some(',') | Some(')') | None
        ) && !self.cursor.peek_char().is_some_and(char::is_whitespace)
        {
            self.cursor.next_char();
        }
        &self.cursor.input[start..self.cursor.position]
    }
}

/// Parses one value of the given declared type, requiring the whole input to
/// be consumed.
///
/// # Errors
///
/// [`Error::Syntax`] on malformed text, [`Error::StructuralMismatch`] when
/// the text disagrees with the declared type's arity or ranges.
pub fn parse_value(input: &str, ty: &CompoundType) -> Result<Value> {
    let mut parser = ValueParser::new(input);
    let value = parser.parse(ty)?;
    if parser.cursor.at_end() {
        Ok(value)
    } else {
        Err(Error::syntax(
            parser.cursor.position,
            "trailing input after value",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_type_round_trip() {
        assert_eq!(
            parse_type("VARCHAR").unwrap(),
            CompoundType::primitive("VARCHAR")
        );
    }

    #[test]
    fn nested_type_parses() {
        let ty = parse_type("STRUCT<a:MAP<VARCHAR,INTEGER>,LIST<DOUBLE>>").unwrap();
        let expected = CompoundType::struct_of(vec![
            Field::new(
                "a",
                CompoundType::map(
                    CompoundType::primitive("VARCHAR"),
                    CompoundType::primitive("INTEGER"),
                ),
            ),
            Field::anonymous(CompoundType::list(CompoundType::primitive("DOUBLE"))),
        ]);
        assert_eq!(ty, expected);
    }

    #[test]
    fn array_type_requires_length() {
        assert_eq!(
            parse_type("ARRAY<INTEGER,3>").unwrap(),
            CompoundType::array(CompoundType::primitive("INTEGER"), 3)
        );
        assert!(parse_type("ARRAY<INTEGER>").is_err());
    }

    #[test]
    fn schema_announcement_parses_in_order() {
        let columns = parse_schema("ROW<INTEGER,VARCHAR>").unwrap();
        assert_eq!(
            columns,
            vec![
                CompoundType::primitive("INTEGER"),
                CompoundType::primitive("VARCHAR"),
            ]
        );
        assert_eq!(parse_schema("ROW<>").unwrap(), vec![]);
    }

    #[test]
    fn unknown_keyword_is_unsupported() {
        assert!(matches!(
            parse_type("LIST<GEOMETRY>"),
            Err(Error::UnsupportedType(_))
        ));
    }

    #[test]
    fn value_null_at_any_level() {
        let ty = parse_type("STRUCT<a:INTEGER,b:VARCHAR>").unwrap();
        assert_eq!(parse_value("NULL", &ty).unwrap(), Value::Null);
        assert_eq!(
            parse_value("(NULL,'x')", &ty).unwrap(),
            Value::Struct(vec![Value::Null, Value::from("x")])
        );
    }

    #[test]
    fn map_rezips_by_index() {
        let ty = parse_type("MAP<VARCHAR,INTEGER>").unwrap();
        let v = parse_value("(('x','y'),(1,2))", &ty).unwrap();
        assert_eq!(
            v,
            Value::Map(vec![
                (Value::from("x"), Value::from(1)),
                (Value::from("y"), Value::from(2)),
            ])
        );
    }

    #[test]
    fn map_key_value_count_mismatch_is_structural() {
        let ty = parse_type("MAP<VARCHAR,INTEGER>").unwrap();
        assert!(matches!(
            parse_value("(('x','y'),(1))", &ty),
            Err(Error::StructuralMismatch(_))
        ));
    }

    #[test]
    fn union_tag_selects_member_type() {
        let ty = parse_type("UNION<num:INTEGER,str:VARCHAR>").unwrap();
        assert_eq!(
            parse_value("(1:'howdy')", &ty).unwrap(),
            Value::Union {
                tag: 1,
                value: Box::new(Value::from("howdy")),
            }
        );
        assert!(parse_value("(2:'howdy')", &ty).is_err());
    }

    #[test]
    fn quoted_literal_keeps_doubled_quote() {
        let ty = parse_type("VARCHAR").unwrap();
        assert_eq!(
            parse_value("'it''s'", &ty).unwrap(),
            Value::from("it's")
        );
    }

    #[test]
    fn trailing_garbage_rejected() {
        let ty = parse_type("INTEGER").unwrap();
        assert!(matches!(
            parse_value("1 x", &ty),
            Err(Error::Syntax { .. })
        ));
    }
}
