//! UUID and JSON codecs.

use uuid::Uuid;

use super::{
    BoundReadCodec, BoundWriteCodec, mismatch, put, self_bound, take, take_text, unexpected_null,
};
use crate::cursor::{ParamSink, Position, Row};
use crate::error::{Error, Result};
use crate::value::{SqlValue, quote_text};

/// `Uuid` stored as hyphenated text. 16-byte blobs are accepted on read.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidCodec;

impl BoundReadCodec<Uuid> for UuidCodec {
    fn arity(&self) -> usize {
        1
    }

    fn get(&self, row: &dyn Row, pos: &mut Position) -> Result<Uuid> {
        match take(row, pos)? {
            (column, SqlValue::Text(s)) => Uuid::parse_str(s)
                .map_err(|e| Error::InvalidValue(format!("column {column}: {e}"))),
            (column, SqlValue::Blob(bytes)) => Uuid::from_slice(bytes)
                .map_err(|e| Error::InvalidValue(format!("column {column}: {e}"))),
            (column, SqlValue::Null) => Err(unexpected_null::<Uuid>(column)),
            (column, other) => Err(mismatch::<Uuid>(column, other)),
        }
    }
}

impl BoundWriteCodec<Uuid> for UuidCodec {
    fn arity(&self) -> usize {
        1
    }

    fn bind(&self, sink: &mut dyn ParamSink, pos: &mut Position, value: &Uuid) -> Result<()> {
        put(sink, pos, SqlValue::Text(value.hyphenated().to_string()))
    }

    fn render_literal(&self, value: &Uuid) -> Result<Vec<String>> {
        Ok(vec![quote_text(&value.hyphenated().to_string())])
    }
}

self_bound!(UuidCodec => Uuid);

/// `serde_json::Value` stored as JSON text.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl BoundReadCodec<serde_json::Value> for JsonCodec {
    fn arity(&self) -> usize {
        1
    }

    fn get(&self, row: &dyn Row, pos: &mut Position) -> Result<serde_json::Value> {
        let (column, text) = take_text::<serde_json::Value>(row, pos)?;
        serde_json::from_str(text)
            .map_err(|e| Error::InvalidValue(format!("column {column}: bad JSON: {e}")))
    }
}

impl BoundWriteCodec<serde_json::Value> for JsonCodec {
    fn arity(&self) -> usize {
        1
    }

    fn bind(
        &self,
        sink: &mut dyn ParamSink,
        pos: &mut Position,
        value: &serde_json::Value,
    ) -> Result<()> {
        put(sink, pos, SqlValue::Text(value.to_string()))
    }

    fn render_literal(&self, value: &serde_json::Value) -> Result<Vec<String>> {
        Ok(vec![quote_text(&value.to_string())])
    }
}

self_bound!(JsonCodec => serde_json::Value);
