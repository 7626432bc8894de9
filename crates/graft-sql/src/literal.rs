//! SQL literal rendering.
//!
//! Values that get rendered directly into query text instead of being
//! bound as parameters. Used by [`Fragment::restrict_values`] to
//! pre-render a parameterized predicate.
//!
//! [`Fragment::restrict_values`]: crate::Fragment::restrict_values

use crate::{Error, Result};

/// A value rendered as a SQL literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// NULL
    Null,
    /// TRUE / FALSE
    Bool(bool),
    /// Integer literal
    Int(i64),
    /// Double-precision literal
    Float(f64),
    /// Single-quoted text literal
    Text(String),
    /// BYTEA literal in hex form: '\x...'
    Bytes(Vec<u8>),
}

impl Literal {
    /// Render this value as SQL literal text.
    ///
    /// Text containing a NUL byte is rejected: Postgres cannot store it
    /// and there is no escape for it in a string literal.
    pub fn render(&self) -> Result<String> {
        match self {
            Literal::Null => Ok("NULL".to_string()),
            Literal::Bool(b) => Ok(if *b { "TRUE" } else { "FALSE" }.to_string()),
            Literal::Int(n) => Ok(n.to_string()),
            Literal::Float(f) => {
                if f.is_finite() {
                    Ok(format!("{:?}", f))
                } else if f.is_nan() {
                    Ok("'NaN'::float8".to_string())
                } else if *f > 0.0 {
                    Ok("'Infinity'::float8".to_string())
                } else {
                    Ok("'-Infinity'::float8".to_string())
                }
            }
            Literal::Text(s) => escape_text(s),
            Literal::Bytes(b) => {
                let mut out = String::with_capacity(4 + b.len() * 2);
                out.push_str("'\\x");
                for byte in b {
                    out.push_str(&format!("{:02x}", byte));
                }
                out.push('\'');
                Ok(out)
            }
        }
    }
}

/// Escape a string as a single-quoted SQL literal, doubling embedded
/// quotes. Rejects NUL bytes.
pub fn escape_text(s: &str) -> Result<String> {
    if s.contains('\0') {
        return Err(Error::NulInLiteral);
    }
    Ok(format!("'{}'", s.replace('\'', "''")))
}

impl From<bool> for Literal {
    fn from(v: bool) -> Self {
        Literal::Bool(v)
    }
}

impl From<i32> for Literal {
    fn from(v: i32) -> Self {
        Literal::Int(v as i64)
    }
}

impl From<i64> for Literal {
    fn from(v: i64) -> Self {
        Literal::Int(v)
    }
}

impl From<f64> for Literal {
    fn from(v: f64) -> Self {
        Literal::Float(v)
    }
}

impl From<&str> for Literal {
    fn from(v: &str) -> Self {
        Literal::Text(v.to_owned())
    }
}

impl From<String> for Literal {
    fn from(v: String) -> Self {
        Literal::Text(v)
    }
}

impl From<Vec<u8>> for Literal {
    fn from(v: Vec<u8>) -> Self {
        Literal::Bytes(v)
    }
}

impl<T: Into<Literal>> From<Option<T>> for Literal {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Literal::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_escaping() {
        assert_eq!(Literal::from("it's").render().unwrap(), "'it''s'");
        assert_eq!(Literal::from("plain").render().unwrap(), "'plain'");
    }

    #[test]
    fn test_text_rejects_nul() {
        assert_eq!(
            Literal::Text("a\0b".into()).render(),
            Err(Error::NulInLiteral)
        );
    }

    #[test]
    fn test_scalars() {
        assert_eq!(Literal::Null.render().unwrap(), "NULL");
        assert_eq!(Literal::Bool(true).render().unwrap(), "TRUE");
        assert_eq!(Literal::Int(-7).render().unwrap(), "-7");
        assert_eq!(Literal::Float(1.5).render().unwrap(), "1.5");
        assert_eq!(Literal::Float(f64::NAN).render().unwrap(), "'NaN'::float8");
    }

    #[test]
    fn test_bytes_hex() {
        assert_eq!(
            Literal::Bytes(vec![0xde, 0xad, 0x01]).render().unwrap(),
            "'\\xdead01'"
        );
    }
}
