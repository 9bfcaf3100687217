//! Canonical literal rendering for scalar values.
//!
//! Every leaf of a value tree is a [`Scalar`]. This module owns the single
//! contract the encoders rely on: render a scalar to an unambiguous,
//! round-trippable textual literal, and parse that literal back.
//!
//! Literal forms:
//!
//! - booleans: `true` / `false`
//! - integers and huge integers: plain decimal digits
//! - floats: shortest round-trippable decimal, `nan` / `inf` / `-inf`
//! - decimals: the canonical digit string, verbatim
//! - strings: single-quoted, embedded quotes doubled (`'it''s'`)
//! - dates: `'2024-07-01'`; timestamps: `'2024-07-01 12:30:00.000000'`
//! - blobs: single-quoted `\x`-escaped hex pairs (`'\x00\xFF'`)
//!
//! ## Examples
//!
//! ```rust
//! use rowtext::Scalar;
//!
//! assert_eq!(Scalar::from("it's").to_string(), "'it''s'");
//! assert_eq!(Scalar::Int(-7).to_string(), "-7");
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};

use crate::{Error, Result};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A scalar cell value with a canonical textual literal form.
///
/// # Examples
///
/// ```rust
/// use rowtext::Scalar;
///
/// let s = Scalar::from(42);
/// assert_eq!(s.to_string(), "42");
/// assert!(s.is_integer());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    /// Canonical digit string for DECIMAL columns, kept exact.
    Numeric(String),
    Text(String),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    HugeInt(BigInt),
    Blob(Vec<u8>),
}

impl Scalar {
    /// Returns `true` for `Int`, `UInt`, or `HugeInt`.
    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Scalar::Int(_) | Scalar::UInt(_) | Scalar::HugeInt(_))
    }

    /// Returns `true` for string-like scalars that render quoted.
    #[inline]
    #[must_use]
    pub const fn is_quoted(&self) -> bool {
        matches!(
            self,
            Scalar::Text(_) | Scalar::Date(_) | Scalar::Timestamp(_) | Scalar::Blob(_)
        )
    }

    /// Borrows the text of a `Text` scalar.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Parses the canonical literal of a scalar declared with the given
    /// primitive keyword (or `DECIMAL`).
    ///
    /// `offset` locates the literal in the surrounding input for error
    /// reporting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Syntax`] when `raw` is not a valid literal for the
    /// keyword's scalar class.
    pub fn parse_literal(keyword: &str, raw: &str, offset: usize) -> Result<Scalar> {
        match keyword {
            "BOOLEAN" => match raw {
                "true" => Ok(Scalar::Bool(true)),
                "false" => Ok(Scalar::Bool(false)),
                _ => Err(Error::syntax(offset, format!("invalid boolean `{raw}`"))),
            },
            "TINYINT" | "SMALLINT" | "INTEGER" | "BIGINT" => raw
                .parse::<i64>()
                .map(Scalar::Int)
                .map_err(|e| Error::syntax(offset, format!("invalid integer `{raw}`: {e}"))),
            "UTINYINT" | "USMALLINT" | "UINTEGER" | "UBIGINT" => raw
                .parse::<u64>()
                .map(Scalar::UInt)
                .map_err(|e| Error::syntax(offset, format!("invalid unsigned `{raw}`: {e}"))),
            "HUGEINT" | "UHUGEINT" => raw
                .parse::<BigInt>()
                .map(Scalar::HugeInt)
                .map_err(|e| Error::syntax(offset, format!("invalid hugeint `{raw}`: {e}"))),
            "FLOAT" | "DOUBLE" => match raw {
                "nan" => Ok(Scalar::Float(f64::NAN)),
                "inf" => Ok(Scalar::Float(f64::INFINITY)),
                "-inf" => Ok(Scalar::Float(f64::NEG_INFINITY)),
                _ => raw
                    .parse::<f64>()
                    .map(Scalar::Float)
                    .map_err(|e| Error::syntax(offset, format!("invalid float `{raw}`: {e}"))),
            },
            "DECIMAL" => {
                let body = raw.strip_prefix('-').unwrap_or(raw);
                let numeric = !body.is_empty()
                    && body.chars().all(|c| c.is_ascii_digit() || c == '.')
                    && body.chars().filter(|&c| c == '.').count() <= 1;
                if numeric {
                    Ok(Scalar::Numeric(raw.to_string()))
                } else {
                    Err(Error::syntax(offset, format!("invalid decimal `{raw}`")))
                }
            }
            "VARCHAR" | "UUID" => Ok(Scalar::Text(unquote(raw, offset)?)),
            "DATE" => {
                let inner = unquote(raw, offset)?;
                NaiveDate::parse_from_str(&inner, DATE_FORMAT)
                    .map(Scalar::Date)
                    .map_err(|e| Error::syntax(offset, format!("invalid date `{inner}`: {e}")))
            }
            "TIMESTAMP" => {
                let inner = unquote(raw, offset)?;
                NaiveDateTime::parse_from_str(&inner, TIMESTAMP_FORMAT)
                    .map(|dt| Scalar::Timestamp(dt.and_utc()))
                    .map_err(|e| Error::syntax(offset, format!("invalid timestamp `{inner}`: {e}")))
            }
            "BLOB" => {
                let inner = unquote(raw, offset)?;
                parse_blob(&inner, offset)
            }
            other => Err(Error::unsupported(other)),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => f.write_str(if *b { "true" } else { "false" }),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::UInt(u) => write!(f, "{u}"),
            Scalar::Float(x) => {
                if x.is_nan() {
                    f.write_str("nan")
                } else if x.is_infinite() {
                    f.write_str(if *x > 0.0 { "inf" } else { "-inf" })
                } else {
                    write!(f, "{x}")
                }
            }
            Scalar::Numeric(digits) => f.write_str(digits),
            Scalar::Text(s) => {
                f.write_str("'")?;
                for ch in s.chars() {
                    if ch == '\'' {
                        f.write_str("''")?;
                    } else {
                        f.write_char(ch)?;
                    }
                }
                f.write_str("'")
            }
            Scalar::Date(d) => write!(f, "'{}'", d.format(DATE_FORMAT)),
            Scalar::Timestamp(ts) => write!(f, "'{}'", ts.format(TIMESTAMP_FORMAT)),
            Scalar::HugeInt(i) => write!(f, "{i}"),
            Scalar::Blob(bytes) => {
                f.write_str("'")?;
                for b in bytes {
                    write!(f, "\\x{b:02X}")?;
                }
                f.write_str("'")
            }
        }
    }
}

fn unquote(raw: &str, offset: usize) -> Result<String> {
    let inner = raw
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .ok_or_else(|| Error::syntax(offset, format!("expected quoted literal, got `{raw}`")))?;
    // Doubled quotes inside the body collapse back to one.
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\'' {
            match chars.next() {
                Some('\'') => out.push('\''),
                _ => return Err(Error::syntax(offset, "stray quote inside literal")),
            }
        } else {
            out.push(ch);
        }
    }
    Ok(out)
}

fn parse_blob(inner: &str, offset: usize) -> Result<Scalar> {
    let mut bytes = Vec::with_capacity(inner.len() / 4);
    let mut rest = inner;
    while !rest.is_empty() {
        let tail = rest
            .strip_prefix("\\x")
            .ok_or_else(|| Error::syntax(offset, "malformed blob literal"))?;
        let pair = tail
            .get(..2)
            .ok_or_else(|| Error::syntax(offset, "malformed blob literal"))?;
        let byte = u8::from_str_radix(pair, 16)
            .map_err(|e| Error::syntax(offset, format!("malformed blob byte: {e}")))?;
        bytes.push(byte);
        rest = &tail[2..];
    }
    Ok(Scalar::Blob(bytes))
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Int(v as i64)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<u64> for Scalar {
    fn from(v: u64) -> Self {
        Scalar::UInt(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Text(v)
    }
}
