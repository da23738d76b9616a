//! Built-in scalar codecs: integers, floats, bool, text, blobs and NULL.
//!
//! Non-nullable reads of NULL fail with `UnexpectedNull`, except the float
//! codecs which read NULL as NaN (and write NaN as NULL). Wrap in
//! `Option<T>` for nullable columns.

use super::{
    BoundReadCodec, BoundWriteCodec, mismatch, put, self_bound, take, take_text, unexpected_null,
};
use crate::cursor::{ParamSink, Position, Row};
use crate::error::{Error, Result};
use crate::value::{SqlValue, quote_text};

macro_rules! integer_codec {
    ($(#[$doc:meta])* $name:ident, $t:ty) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl BoundReadCodec<$t> for $name {
            fn arity(&self) -> usize {
                1
            }

            fn get(&self, row: &dyn Row, pos: &mut Position) -> Result<$t> {
                match take(row, pos)? {
                    (_, SqlValue::Integer(n)) => <$t>::try_from(*n).map_err(|_| Error::OutOfRange {
                        type_name: stringify!($t),
                        value: n.to_string(),
                    }),
                    (column, SqlValue::Null) => Err(unexpected_null::<$t>(column)),
                    (column, other) => Err(mismatch::<$t>(column, other)),
                }
            }
        }

        impl BoundWriteCodec<$t> for $name {
            fn arity(&self) -> usize {
                1
            }

            fn bind(&self, sink: &mut dyn ParamSink, pos: &mut Position, value: &$t) -> Result<()> {
                put(sink, pos, SqlValue::Integer(i64::from(*value)))
            }

            fn render_literal(&self, value: &$t) -> Result<Vec<String>> {
                Ok(vec![value.to_string()])
            }
        }

        self_bound!($name => $t);
    };
}

integer_codec!(
    /// `i16` as INTEGER.
    I16Codec, i16
);
integer_codec!(
    /// `i32` as INTEGER.
    I32Codec, i32
);
integer_codec!(
    /// `i64` as INTEGER.
    I64Codec, i64
);
integer_codec!(
    /// `u32` as INTEGER.
    U32Codec, u32
);

/// `bool` as INTEGER 0/1. Any non-zero value reads as `true`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolCodec;

impl BoundReadCodec<bool> for BoolCodec {
    fn arity(&self) -> usize {
        1
    }

    fn get(&self, row: &dyn Row, pos: &mut Position) -> Result<bool> {
        match take(row, pos)? {
            (_, SqlValue::Integer(n)) => Ok(*n != 0),
            (column, SqlValue::Null) => Err(unexpected_null::<bool>(column)),
            (column, other) => Err(mismatch::<bool>(column, other)),
        }
    }
}

impl BoundWriteCodec<bool> for BoolCodec {
    fn arity(&self) -> usize {
        1
    }

    fn bind(&self, sink: &mut dyn ParamSink, pos: &mut Position, value: &bool) -> Result<()> {
        put(sink, pos, SqlValue::Integer(i64::from(*value)))
    }

    fn render_literal(&self, value: &bool) -> Result<Vec<String>> {
        Ok(vec![if *value { "TRUE" } else { "FALSE" }.to_string()])
    }
}

self_bound!(BoolCodec => bool);

/// `f64` as REAL. NULL reads as NaN; NaN writes as NULL.
#[derive(Debug, Clone, Copy, Default)]
pub struct F64Codec;

fn read_real<T>(row: &dyn Row, pos: &mut Position) -> Result<f64> {
    match take(row, pos)? {
        (_, SqlValue::Real(f)) => Ok(*f),
        (_, SqlValue::Integer(n)) => Ok(*n as f64),
        (_, SqlValue::Null) => Ok(f64::NAN),
        (column, other) => Err(mismatch::<T>(column, other)),
    }
}

fn real_param(f: f64) -> SqlValue {
    if f.is_nan() {
        SqlValue::Null
    } else {
        SqlValue::Real(f)
    }
}

impl BoundReadCodec<f64> for F64Codec {
    fn arity(&self) -> usize {
        1
    }

    fn get(&self, row: &dyn Row, pos: &mut Position) -> Result<f64> {
        read_real::<f64>(row, pos)
    }
}

impl BoundWriteCodec<f64> for F64Codec {
    fn arity(&self) -> usize {
        1
    }

    fn bind(&self, sink: &mut dyn ParamSink, pos: &mut Position, value: &f64) -> Result<()> {
        put(sink, pos, real_param(*value))
    }

    fn render_literal(&self, value: &f64) -> Result<Vec<String>> {
        Ok(vec![real_param(*value).to_literal()])
    }
}

self_bound!(F64Codec => f64);

/// `f32` as REAL. NULL reads as NaN; NaN writes as NULL.
#[derive(Debug, Clone, Copy, Default)]
pub struct F32Codec;

impl BoundReadCodec<f32> for F32Codec {
    fn arity(&self) -> usize {
        1
    }

    fn get(&self, row: &dyn Row, pos: &mut Position) -> Result<f32> {
        read_real::<f32>(row, pos).map(|f| f as f32)
    }
}

impl BoundWriteCodec<f32> for F32Codec {
    fn arity(&self) -> usize {
        1
    }

    fn bind(&self, sink: &mut dyn ParamSink, pos: &mut Position, value: &f32) -> Result<()> {
        put(sink, pos, real_param(f64::from(*value)))
    }

    fn render_literal(&self, value: &f32) -> Result<Vec<String>> {
        Ok(vec![real_param(f64::from(*value)).to_literal()])
    }
}

self_bound!(F32Codec => f32);

/// `String` as TEXT.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec;

impl BoundReadCodec<String> for TextCodec {
    fn arity(&self) -> usize {
        1
    }

    fn get(&self, row: &dyn Row, pos: &mut Position) -> Result<String> {
        take_text::<String>(row, pos).map(|(_, s)| s.to_string())
    }
}

impl BoundWriteCodec<String> for TextCodec {
    fn arity(&self) -> usize {
        1
    }

    fn bind(&self, sink: &mut dyn ParamSink, pos: &mut Position, value: &String) -> Result<()> {
        put(sink, pos, SqlValue::Text(value.clone()))
    }

    fn render_literal(&self, value: &String) -> Result<Vec<String>> {
        Ok(vec![quote_text(value)])
    }
}

self_bound!(TextCodec => String);

/// Write-only codec for string literals passed as `&'static str` holes.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticStrCodec;

impl BoundWriteCodec<&'static str> for StaticStrCodec {
    fn arity(&self) -> usize {
        1
    }

    fn bind(
        &self,
        sink: &mut dyn ParamSink,
        pos: &mut Position,
        value: &&'static str,
    ) -> Result<()> {
        put(sink, pos, SqlValue::from(*value))
    }

    fn render_literal(&self, value: &&'static str) -> Result<Vec<String>> {
        Ok(vec![quote_text(value)])
    }
}

impl super::WriteCodec<&'static str> for StaticStrCodec {
    fn resolve(
        &self,
        _registry: &super::CodecRegistry,
    ) -> Result<super::BoundWrite<&'static str>> {
        Ok(std::sync::Arc::new(*self))
    }
}

/// `Vec<u8>` as BLOB.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlobCodec;

impl BoundReadCodec<Vec<u8>> for BlobCodec {
    fn arity(&self) -> usize {
        1
    }

    fn get(&self, row: &dyn Row, pos: &mut Position) -> Result<Vec<u8>> {
        match take(row, pos)? {
            (_, SqlValue::Blob(bytes)) => Ok(bytes.clone()),
            (column, SqlValue::Null) => Err(unexpected_null::<Vec<u8>>(column)),
            (column, other) => Err(mismatch::<Vec<u8>>(column, other)),
        }
    }
}

impl BoundWriteCodec<Vec<u8>> for BlobCodec {
    fn arity(&self) -> usize {
        1
    }

    fn bind(&self, sink: &mut dyn ParamSink, pos: &mut Position, value: &Vec<u8>) -> Result<()> {
        put(sink, pos, SqlValue::Blob(value.clone()))
    }

    fn render_literal(&self, value: &Vec<u8>) -> Result<Vec<String>> {
        Ok(vec![SqlValue::Blob(value.clone()).to_literal()])
    }
}

self_bound!(BlobCodec => Vec<u8>);

/// Binds SQL NULL regardless of the value. Substituted for absent hole values.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCodec;

impl<T> BoundWriteCodec<T> for NullCodec {
    fn arity(&self) -> usize {
        1
    }

    fn bind(&self, sink: &mut dyn ParamSink, pos: &mut Position, _value: &T) -> Result<()> {
        put(sink, pos, SqlValue::Null)
    }

    fn render_literal(&self, _value: &T) -> Result<Vec<String>> {
        Ok(vec!["NULL".to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::{Cursor, MemoryCursor, Params};

    fn one(value: SqlValue) -> MemoryCursor {
        let mut cursor = MemoryCursor::new(["v"], vec![vec![value]]);
        cursor.advance().unwrap();
        cursor
    }

    fn read<T, C: BoundReadCodec<T>>(codec: C, value: SqlValue) -> Result<T> {
        let cursor = one(value);
        let mut pos = Position::start();
        let out = codec.get(&cursor, &mut pos)?;
        assert_eq!(pos.get(), 2);
        Ok(out)
    }

    #[test]
    fn test_integer_null_is_error() {
        let err = read(I64Codec, SqlValue::Null).unwrap_err();
        assert!(matches!(err, Error::UnexpectedNull { column: 1, .. }));
    }

    #[test]
    fn test_integer_narrowing_checked() {
        assert_eq!(read(I16Codec, SqlValue::Integer(-3)).unwrap(), -3);
        let err = read(I16Codec, SqlValue::Integer(70_000)).unwrap_err();
        assert!(matches!(err, Error::OutOfRange { type_name: "i16", .. }));
        assert!(read(U32Codec, SqlValue::Integer(-1)).is_err());
    }

    #[test]
    fn test_float_null_is_nan() {
        assert!(read(F64Codec, SqlValue::Null).unwrap().is_nan());
        assert!(read(F32Codec, SqlValue::Null).unwrap().is_nan());
        assert_eq!(read(F64Codec, SqlValue::Integer(3)).unwrap(), 3.0);
    }

    #[test]
    fn test_float_nan_binds_null() {
        let mut params = Params::new();
        let mut pos = Position::start();
        BoundWriteCodec::bind(&F64Codec, &mut params, &mut pos, &f64::NAN).unwrap();
        assert_eq!(params.as_slice(), &[SqlValue::Null]);
        assert_eq!(F64Codec.render_literal(&f64::NAN).unwrap(), vec!["NULL"]);
    }

    #[test]
    fn test_text_type_mismatch() {
        let err = read(TextCodec, SqlValue::Integer(1)).unwrap_err();
        assert!(matches!(
            err,
            Error::TypeMismatch {
                found: "INTEGER",
                ..
            }
        ));
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            TextCodec.render_literal(&"it's".to_string()).unwrap(),
            vec!["'it''s'"]
        );
        assert_eq!(BoolCodec.render_literal(&true).unwrap(), vec!["TRUE"]);
        assert_eq!(I32Codec.render_literal(&-5).unwrap(), vec!["-5"]);
        assert_eq!(StaticStrCodec.render_literal(&"x").unwrap(), vec!["'x'"]);
        assert_eq!(
            BoundWriteCodec::<i64>::render_literal(&NullCodec, &1).unwrap(),
            vec!["NULL"]
        );
    }

    #[test]
    fn test_bool_reads_nonzero() {
        assert!(read(BoolCodec, SqlValue::Integer(2)).unwrap());
        assert!(!read(BoolCodec, SqlValue::Integer(0)).unwrap());
    }
}
