//! Type-indexed codecs.
//!
//! A codec comes in two forms:
//! - unbound ([`ReadCodec`] / [`WriteCodec`]): a recipe that may need the
//!   registry to resolve member codecs (tuples, `Option<T>`, lists)
//! - bound ([`BoundReadCodec`] / [`BoundWriteCodec`]): resolved against one
//!   registry, with a fixed arity and row-level `get` / `bind` operations
//!
//! Every bound call advances the [`Position`] by exactly `arity()`.

mod composite;
mod extra;
mod primitives;
mod registry;
mod temporal;

pub use composite::{
    ByType, Contramapped, EnumOrdinalCodec, EnumTextCodec, FixedListCodec, FixedListRead,
    FixedListWrite, Mapped, NullableCodec, NullableRead, NullableWrite, ReadCodecExt, SqlEnum,
    Tuple1Read, Tuple1Write, Tuple2Read, Tuple2Write, Tuple3Read, Tuple3Write, Tuple4Read,
    Tuple4Write, Tuple5Read, Tuple5Write, Tuple6Read, Tuple6Write, TupleCodec, WriteCodecExt,
    by_type,
};
pub use extra::{JsonCodec, UuidCodec};
pub use primitives::{
    BlobCodec, BoolCodec, F32Codec, F64Codec, I16Codec, I32Codec, I64Codec, NullCodec,
    StaticStrCodec, TextCodec, U32Codec,
};
pub use registry::{CodecRegistry, CodecRegistryBuilder};
pub use temporal::{DateCodec, DateTimeCodec, FixedOffsetCodec, TimeCodec, UtcCodec};

use std::sync::Arc;

use crate::cursor::{ParamSink, Position, Row};
use crate::error::{Error, Result};
use crate::value::SqlValue;

/// Registry-resolved read side of a codec.
pub trait BoundReadCodec<T>: Send + Sync {
    /// Physical columns consumed per value.
    fn arity(&self) -> usize;

    /// Decode one value starting at `pos`, advancing it by `arity()`.
    fn get(&self, row: &dyn Row, pos: &mut Position) -> Result<T>;
}

/// Registry-resolved write side of a codec.
pub trait BoundWriteCodec<T>: Send + Sync {
    /// Physical parameters occupied per value.
    fn arity(&self) -> usize;

    /// Bind `value` starting at `pos`, advancing it by `arity()`.
    fn bind(&self, sink: &mut dyn ParamSink, pos: &mut Position, value: &T) -> Result<()>;

    /// Render `value` as exactly `arity()` SQL literal fragments.
    fn render_literal(&self, value: &T) -> Result<Vec<String>>;
}

pub type BoundRead<T> = Arc<dyn BoundReadCodec<T>>;
pub type BoundWrite<T> = Arc<dyn BoundWriteCodec<T>>;

/// Unbound read codec: resolves into a [`BoundReadCodec`] against a registry.
pub trait ReadCodec<T>: Send + Sync {
    fn resolve(&self, registry: &CodecRegistry) -> Result<BoundRead<T>>;
}

/// Unbound write codec: resolves into a [`BoundWriteCodec`] against a registry.
pub trait WriteCodec<T>: Send + Sync {
    fn resolve(&self, registry: &CodecRegistry) -> Result<BoundWrite<T>>;
}

impl<T: 'static> ReadCodec<T> for BoundRead<T> {
    fn resolve(&self, _registry: &CodecRegistry) -> Result<BoundRead<T>> {
        Ok(Arc::clone(self))
    }
}

impl<T: 'static> WriteCodec<T> for BoundWrite<T> {
    fn resolve(&self, _registry: &CodecRegistry) -> Result<BoundWrite<T>> {
        Ok(Arc::clone(self))
    }
}

impl<T: 'static> ReadCodec<T> for Arc<dyn ReadCodec<T>> {
    fn resolve(&self, registry: &CodecRegistry) -> Result<BoundRead<T>> {
        (**self).resolve(registry)
    }
}

impl<T: 'static> WriteCodec<T> for Arc<dyn WriteCodec<T>> {
    fn resolve(&self, registry: &CodecRegistry) -> Result<BoundWrite<T>> {
        (**self).resolve(registry)
    }
}

/// Implement the unbound traits for a codec that needs no registry.
macro_rules! self_bound {
    ($codec:ty => $t:ty) => {
        impl $crate::codec::ReadCodec<$t> for $codec {
            fn resolve(
                &self,
                _registry: &$crate::codec::CodecRegistry,
            ) -> $crate::error::Result<$crate::codec::BoundRead<$t>> {
                Ok(std::sync::Arc::new(self.clone()))
            }
        }

        impl $crate::codec::WriteCodec<$t> for $codec {
            fn resolve(
                &self,
                _registry: &$crate::codec::CodecRegistry,
            ) -> $crate::error::Result<$crate::codec::BoundWrite<$t>> {
                Ok(std::sync::Arc::new(self.clone()))
            }
        }
    };
}
pub(crate) use self_bound;

// ==================== Shared column helpers ====================

/// Read the value at `pos` and step past it.
pub(crate) fn take<'r>(row: &'r dyn Row, pos: &mut Position) -> Result<(usize, &'r SqlValue)> {
    let column = pos.next();
    Ok((column, row.value(column)?))
}

/// Bind one parameter at `pos` and step past it.
pub(crate) fn put(sink: &mut dyn ParamSink, pos: &mut Position, value: SqlValue) -> Result<()> {
    sink.set(pos.next(), value)
}

pub(crate) fn unexpected_null<T>(column: usize) -> Error {
    Error::UnexpectedNull {
        column,
        type_name: std::any::type_name::<T>(),
    }
}

pub(crate) fn mismatch<T>(column: usize, found: &SqlValue) -> Error {
    Error::TypeMismatch {
        column,
        expected: std::any::type_name::<T>(),
        found: found.kind(),
    }
}

/// Read a TEXT column for a non-nullable codec.
pub(crate) fn take_text<'r, T>(row: &'r dyn Row, pos: &mut Position) -> Result<(usize, &'r str)> {
    match take(row, pos)? {
        (column, SqlValue::Text(s)) => Ok((column, s.as_str())),
        (column, SqlValue::Null) => Err(unexpected_null::<T>(column)),
        (column, other) => Err(mismatch::<T>(column, other)),
    }
}
