//! Compound type descriptors and result schemas.
//!
//! [`CompoundType`] is a closed, recursive sum type describing the shape of a
//! column: a primitive keyword, a parameterized decimal, or one of the
//! nesting kinds (struct, map, list, array, enum, union). Type trees are
//! finite and acyclic; struct and union member order is significant and is
//! preserved verbatim, because position is the only way the receiver
//! associates children with names after the schema announcement.
//!
//! A [`Schema`] is the ordered set of output columns for one result. It is
//! announced once, as `ROW<...>`, before any data rows stream.
//!
//! ## Examples
//!
//! ```rust
//! use rowtext::{CompoundType, Schema};
//!
//! let schema = Schema::new()
//!     .with_column("id", CompoundType::primitive("INTEGER"))
//!     .with_column("name", CompoundType::primitive("VARCHAR"));
//! assert_eq!(schema.len(), 2);
//! ```

use serde::{Deserialize, Serialize};

use crate::{Error, Result, Scalar, Value};

/// Canonical uppercase keywords with an encoding rule.
///
/// Anything outside this table is an [`Error::UnsupportedType`], raised while
/// the schema is announced so the failure surfaces before any row streams.
const PRIMITIVE_KEYWORDS: &[&str] = &[
    "BOOLEAN", "TINYINT", "SMALLINT", "INTEGER", "BIGINT", "UTINYINT", "USMALLINT", "UINTEGER",
    "UBIGINT", "HUGEINT", "UHUGEINT", "FLOAT", "DOUBLE", "VARCHAR", "UUID", "DATE", "TIMESTAMP",
    "BLOB",
];

pub(crate) fn known_primitive(name: &str) -> bool {
    PRIMITIVE_KEYWORDS.contains(&name)
}

/// A named member of a struct or union type.
///
/// The name may be empty; anonymous fields are legal and keep their position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub ty: CompoundType,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: CompoundType) -> Self {
        Field {
            name: name.into(),
            ty,
        }
    }

    /// An anonymous field: no name, position only.
    pub fn anonymous(ty: CompoundType) -> Self {
        Field {
            name: String::new(),
            ty,
        }
    }
}

/// A recursive type descriptor for one column or nested member.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CompoundType {
    /// Canonical uppercase keyword, e.g. `VARCHAR`, `INTEGER`.
    Primitive(String),
    Decimal { width: u8, scale: u8 },
    /// Ordered fields; names may be empty.
    Struct(Vec<Field>),
    Map(Box<CompoundType>, Box<CompoundType>),
    List(Box<CompoundType>),
    /// Element type plus fixed length.
    Array(Box<CompoundType>, usize),
    /// Ordered tag strings; values carry the ordinal.
    Enum(Vec<String>),
    /// Ordered members; values carry the active member's ordinal.
    Union(Vec<Field>),
}

impl CompoundType {
    pub fn primitive(name: impl Into<String>) -> Self {
        CompoundType::Primitive(name.into())
    }

    pub fn decimal(width: u8, scale: u8) -> Self {
        CompoundType::Decimal { width, scale }
    }

    pub fn struct_of(fields: Vec<Field>) -> Self {
        CompoundType::Struct(fields)
    }

    pub fn map(key: CompoundType, value: CompoundType) -> Self {
        CompoundType::Map(Box::new(key), Box::new(value))
    }

    pub fn list(elem: CompoundType) -> Self {
        CompoundType::List(Box::new(elem))
    }

    pub fn array(elem: CompoundType, len: usize) -> Self {
        CompoundType::Array(Box::new(elem), len)
    }

    pub fn enum_of<S: Into<String>>(tags: impl IntoIterator<Item = S>) -> Self {
        CompoundType::Enum(tags.into_iter().map(Into::into).collect())
    }

    pub fn union_of(members: Vec<Field>) -> Self {
        CompoundType::Union(members)
    }

    /// Short lowercase name of the variant, for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            CompoundType::Primitive(_) => "primitive",
            CompoundType::Decimal { .. } => "decimal",
            CompoundType::Struct(_) => "struct",
            CompoundType::Map(..) => "map",
            CompoundType::List(_) => "list",
            CompoundType::Array(..) => "array",
            CompoundType::Enum(_) => "enum",
            CompoundType::Union(_) => "union",
        }
    }

    /// Checks that `value` is structurally consistent with this type:
    /// matching variant, matching arity at every level, enum ordinals in
    /// range, union tags in range.
    ///
    /// `Null` conforms to every type, at any nesting level.
    ///
    /// A failure indicates a producer defect upstream; the encoders
    /// themselves do not re-run this check.
    ///
    /// # Errors
    ///
    /// [`Error::StructuralMismatch`] on the first disagreement found, or
    /// [`Error::UnsupportedType`] for an unknown primitive keyword.
    pub fn check(&self, value: &Value) -> Result<()> {
        if value.is_null() {
            return Ok(());
        }
        match (self, value) {
            (CompoundType::Primitive(keyword), Value::Scalar(s)) => {
                check_scalar_class(keyword, s)
            }
            (CompoundType::Decimal { .. }, Value::Scalar(Scalar::Numeric(_))) => Ok(()),
            (CompoundType::Struct(fields), Value::Struct(children)) => {
                if fields.len() != children.len() {
                    return Err(Error::structural(format!(
                        "struct has {} children, type declares {} fields",
                        children.len(),
                        fields.len()
                    )));
                }
                for (field, child) in fields.iter().zip(children) {
                    field.ty.check(child)?;
                }
                Ok(())
            }
            (CompoundType::Map(key_ty, value_ty), Value::Map(pairs)) => {
                for (k, v) in pairs {
                    key_ty.check(k)?;
                    value_ty.check(v)?;
                }
                Ok(())
            }
            (CompoundType::List(elem), Value::List(items)) => {
                for item in items {
                    elem.check(item)?;
                }
                Ok(())
            }
            (CompoundType::Array(elem, len), Value::Array(items)) => {
                if items.len() != *len {
                    return Err(Error::structural(format!(
                        "array has {} elements, type declares length {len}",
                        items.len()
                    )));
                }
                for item in items {
                    elem.check(item)?;
                }
                Ok(())
            }
            (CompoundType::Enum(tags), Value::Enum(ordinal)) => {
                if (*ordinal as usize) < tags.len() {
                    Ok(())
                } else {
                    Err(Error::structural(format!(
                        "enum ordinal {ordinal} out of range for {} tags",
                        tags.len()
                    )))
                }
            }
            (CompoundType::Union(members), Value::Union { tag, value }) => {
                let member = members.get(*tag as usize).ok_or_else(|| {
                    Error::structural(format!(
                        "union tag {tag} out of range for {} members",
                        members.len()
                    ))
                })?;
                member.ty.check(value)
            }
            (ty, v) => Err(Error::structural(format!(
                "{} value does not match {} type",
                v.kind(),
                ty.kind()
            ))),
        }
    }
}

fn check_scalar_class(keyword: &str, scalar: &Scalar) -> Result<()> {
    let ok = match keyword {
        "BOOLEAN" => matches!(scalar, Scalar::Bool(_)),
        "TINYINT" | "SMALLINT" | "INTEGER" | "BIGINT" => matches!(scalar, Scalar::Int(_)),
        "UTINYINT" | "USMALLINT" | "UINTEGER" | "UBIGINT" => matches!(scalar, Scalar::UInt(_)),
        "HUGEINT" | "UHUGEINT" => matches!(scalar, Scalar::HugeInt(_)),
        "FLOAT" | "DOUBLE" => matches!(scalar, Scalar::Float(_)),
        "VARCHAR" | "UUID" => matches!(scalar, Scalar::Text(_)),
        "DATE" => matches!(scalar, Scalar::Date(_)),
        "TIMESTAMP" => matches!(scalar, Scalar::Timestamp(_)),
        "BLOB" => matches!(scalar, Scalar::Blob(_)),
        other => return Err(Error::unsupported(other)),
    };
    if ok {
        Ok(())
    } else {
        Err(Error::structural(format!(
            "scalar does not fit primitive {keyword}"
        )))
    }
}

/// The ordered output columns of one result.
///
/// Column order here is the column order on the wire; the receiver binds
/// positions to types from the one-time `ROW<...>` announcement. Position is
/// a column's identity: duplicate names are legal (`SELECT 1 AS a, 'x' AS a`
/// is a two-column result) and each declaration keeps its own slot.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<(String, CompoundType)>,
}

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a column at the end of the declaration order.
    ///
    /// A name already in use adds a second column; nothing is replaced.
    #[must_use]
    pub fn with_column(mut self, name: impl Into<String>, ty: CompoundType) -> Self {
        self.columns.push((name.into(), ty));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column types in declaration order.
    pub fn types(&self) -> impl Iterator<Item = &CompoundType> {
        self.columns.iter().map(|(_, t)| t)
    }

    /// `(name, type)` pairs in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &CompoundType)> {
        self.columns.iter().map(|(n, t)| (n.as_str(), t))
    }

    /// Type of the first column with this name, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CompoundType> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t)
    }

    /// Checks one row of cells against the declared columns.
    ///
    /// # Errors
    ///
    /// [`Error::StructuralMismatch`] on a column-count or per-cell
    /// disagreement.
    pub fn check_row(&self, row: &[Value]) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::structural(format!(
                "row has {} cells, schema declares {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        for (ty, cell) in self.types().zip(row) {
            ty.check(cell)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point_type() -> CompoundType {
        CompoundType::struct_of(vec![
            Field::new("x", CompoundType::primitive("INTEGER")),
            Field::new("y", CompoundType::primitive("INTEGER")),
        ])
    }

    #[test]
    fn conforming_struct_passes() {
        let v = Value::Struct(vec![Value::from(1), Value::from(2)]);
        assert!(point_type().check(&v).is_ok());
    }

    #[test]
    fn null_conforms_anywhere() {
        assert!(point_type().check(&Value::Null).is_ok());
        let v = Value::Struct(vec![Value::Null, Value::from(2)]);
        assert!(point_type().check(&v).is_ok());
    }

    #[test]
    fn arity_mismatch_fails() {
        let v = Value::Struct(vec![Value::from(1)]);
        assert!(matches!(
            point_type().check(&v),
            Err(Error::StructuralMismatch(_))
        ));
    }

    #[test]
    fn array_length_is_checked() {
        let ty = CompoundType::array(CompoundType::primitive("INTEGER"), 3);
        let short = Value::Array(vec![Value::from(1), Value::from(2)]);
        assert!(ty.check(&short).is_err());
        let exact = Value::Array(vec![Value::from(1), Value::from(2), Value::from(3)]);
        assert!(ty.check(&exact).is_ok());
    }

    #[test]
    fn enum_ordinal_range() {
        let ty = CompoundType::enum_of(["red", "green"]);
        assert!(ty.check(&Value::Enum(1)).is_ok());
        assert!(matches!(
            ty.check(&Value::Enum(2)),
            Err(Error::StructuralMismatch(_))
        ));
    }

    #[test]
    fn unknown_keyword_is_unsupported() {
        let ty = CompoundType::primitive("GEOMETRY");
        assert!(matches!(
            ty.check(&Value::from(1)),
            Err(Error::UnsupportedType(_))
        ));
    }

    #[test]
    fn duplicate_column_names_keep_both_columns() {
        // SELECT 1 AS a, 'x' AS a is a legal two-column result.
        let schema = Schema::new()
            .with_column("a", CompoundType::primitive("INTEGER"))
            .with_column("a", CompoundType::primitive("VARCHAR"));
        assert_eq!(schema.len(), 2);
        let types: Vec<_> = schema.types().collect();
        assert_eq!(types[0], &CompoundType::primitive("INTEGER"));
        assert_eq!(types[1], &CompoundType::primitive("VARCHAR"));
        assert_eq!(schema.get("a"), Some(&CompoundType::primitive("INTEGER")));
        assert!(schema
            .check_row(&[Value::from(1), Value::from("x")])
            .is_ok());
    }

    #[test]
    fn schema_row_check() {
        let schema = Schema::new()
            .with_column("id", CompoundType::primitive("INTEGER"))
            .with_column("name", CompoundType::primitive("VARCHAR"));
        assert!(schema
            .check_row(&[Value::from(1), Value::from("duck")])
            .is_ok());
        assert!(schema.check_row(&[Value::from(1)]).is_err());
    }
}
