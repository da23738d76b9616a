//! Wire-level values exchanged with the data source.
//!
//! Every codec ultimately reads and writes `SqlValue`s: one per physical
//! column or statement parameter.

use std::fmt::{self, Write as _};

/// A single column/parameter value as the backend sees it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SqlValue {
    #[default]
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Storage class name, used in decode errors.
    pub fn kind(&self) -> &'static str {
        match self {
            SqlValue::Null => "NULL",
            SqlValue::Integer(_) => "INTEGER",
            SqlValue::Real(_) => "REAL",
            SqlValue::Text(_) => "TEXT",
            SqlValue::Blob(_) => "BLOB",
        }
    }

    /// Render as an inline SQL literal.
    pub fn to_literal(&self) -> String {
        match self {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Integer(n) => n.to_string(),
            SqlValue::Real(f) => real_literal(*f),
            SqlValue::Text(s) => quote_text(s),
            SqlValue::Blob(bytes) => hex_literal(bytes),
        }
    }
}

fn hex_literal(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2 + 3);
    out.push_str("X'");
    for b in bytes {
        let _ = write!(out, "{:02x}", b);
    }
    out.push('\'');
    out
}

/// Single-quote a string, doubling embedded quotes.
///
/// Text containing a NUL byte cannot appear in SQL source, so it is
/// rendered as `CAST(X'..' AS TEXT)` instead.
pub fn quote_text(s: &str) -> String {
    if s.contains('\0') {
        return format!("CAST({} AS TEXT)", hex_literal(s.as_bytes()));
    }
    format!("'{}'", s.replace('\'', "''"))
}

fn real_literal(f: f64) -> String {
    if f.is_nan() {
        "NULL".to_string()
    } else if f == f64::INFINITY {
        "9e999".to_string()
    } else if f == f64::NEG_INFINITY {
        "-9e999".to_string()
    } else if f != 0.0 && !(DECIMAL_MIN..DECIMAL_MAX).contains(&f.abs()) {
        exact_real(f)
    } else {
        // Shortest round-trip text. Debug keeps a fractional part or exponent,
        // so the literal stays REAL.
        format!("{:?}", f)
    }
}

/// Magnitudes outside this range are not reliably parsed back to the same
/// bits from decimal text, so they are rendered by `exact_real`.
const DECIMAL_MIN: f64 = 1e-290;
const DECIMAL_MAX: f64 = 1e290;

/// Largest power-of-two step: `2^62` still parses exactly as an integer.
const STEP_BITS: i32 = 62;

/// `f` as `CAST(m AS REAL)` scaled by integer powers of two, where
/// `f == m * 2^e`. Every step is exact, so the result has the same bits.
fn exact_real(f: f64) -> String {
    let bits = f.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i32;
    let fraction = (bits & ((1u64 << 52) - 1)) as i64;
    let (mut m, mut e) = if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1i64 << 52), biased - 1075)
    };
    let zeros = m.trailing_zeros() as i32;
    m >>= zeros;
    e += zeros;
    if f.is_sign_negative() {
        m = -m;
    }

    let op = if e < 0 { " / " } else { " * " };
    let mut out = format!("(CAST({} AS REAL)", m);
    let mut rest = e.abs();
    while rest > 0 {
        let step = rest.min(STEP_BITS);
        out.push_str(op);
        let _ = write!(out, "{}", 1i64 << step);
        rest -= step;
    }
    out.push(')');
    out
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_literal())
    }
}

impl From<i64> for SqlValue {
    fn from(n: i64) -> Self {
        SqlValue::Integer(n)
    }
}

impl From<f64> for SqlValue {
    fn from(f: f64) -> Self {
        SqlValue::Real(f)
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(s)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(b: Vec<u8>) -> Self {
        SqlValue::Blob(b)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals() {
        assert_eq!(SqlValue::Null.to_literal(), "NULL");
        assert_eq!(SqlValue::Integer(-42).to_literal(), "-42");
        assert_eq!(SqlValue::Real(1.0).to_literal(), "1.0");
        assert_eq!(SqlValue::Real(0.25).to_literal(), "0.25");
        assert_eq!(SqlValue::Real(f64::NAN).to_literal(), "NULL");
        assert_eq!(SqlValue::Real(f64::NEG_INFINITY).to_literal(), "-9e999");
        assert_eq!(SqlValue::from("O'Brien").to_literal(), "'O''Brien'");
        assert_eq!(SqlValue::Blob(vec![0xde, 0xad, 0x01]).to_literal(), "X'dead01'");
    }

    #[test]
    fn test_extreme_reals_rendered_exactly() {
        assert!(SqlValue::Real(1e300).to_literal().starts_with("(CAST("));
        assert_eq!(
            exact_real(f64::MIN_POSITIVE),
            format!("(CAST(1 AS REAL){})", " / 4611686018427387904".repeat(16) + " / 1073741824")
        );
        assert_eq!(exact_real(-3.0 * 2f64.powi(1000)), {
            let mut s = "(CAST(-3 AS REAL)".to_string();
            s.push_str(&" * 4611686018427387904".repeat(16));
            s.push_str(" * 256)");
            s
        });
        assert_eq!(SqlValue::Real(1e200).to_literal(), "1e200");
    }

    #[test]
    fn test_nul_text_rendered_as_hex() {
        assert_eq!(quote_text("a\0b"), "CAST(X'610062' AS TEXT)");
        assert_eq!(quote_text("a'b"), "'a''b'");
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(SqlValue::from(None::<i64>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some(7i64)), SqlValue::Integer(7));
    }
}
