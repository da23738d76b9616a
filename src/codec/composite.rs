//! Codecs assembled from other codecs.
//!
//! Composite arity is the sum of member arities and is fixed once the codec
//! is resolved, before any value is seen.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use super::{
    BoundRead, BoundReadCodec, BoundWrite, BoundWriteCodec, CodecRegistry, ReadCodec, WriteCodec,
    mismatch, put, take, take_text, unexpected_null,
};
use crate::cursor::{ParamSink, Position, Row};
use crate::error::{Error, Result};
use crate::value::{SqlValue, quote_text};

// ==================== By type ====================

/// Unbound codec that resolves `T` from the registry.
pub struct ByType<T>(PhantomData<fn() -> T>);

/// Codec for `T` as registered in whichever registry it is resolved against.
pub fn by_type<T: 'static>() -> ByType<T> {
    ByType(PhantomData)
}

impl<T> Clone for ByType<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ByType<T> {}

impl<T> fmt::Debug for ByType<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByType<{}>", std::any::type_name::<T>())
    }
}

impl<T: 'static> ReadCodec<T> for ByType<T> {
    fn resolve(&self, registry: &CodecRegistry) -> Result<BoundRead<T>> {
        registry.get_read::<T>()
    }
}

impl<T: 'static> WriteCodec<T> for ByType<T> {
    fn resolve(&self, registry: &CodecRegistry) -> Result<BoundWrite<T>> {
        registry.get_write::<T>()
    }
}

// ==================== Nullable ====================

/// `Option<T>` over the registered codec for `T`.
///
/// A value whose columns are all NULL reads as `None`; `None` writes NULL
/// into every column of `T`'s arity.
pub struct NullableCodec<T>(PhantomData<fn() -> T>);

impl<T> NullableCodec<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for NullableCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> ReadCodec<Option<T>> for NullableCodec<T> {
    fn resolve(&self, registry: &CodecRegistry) -> Result<BoundRead<Option<T>>> {
        Ok(Arc::new(NullableRead::new(registry.get_read::<T>()?)))
    }
}

impl<T: 'static> WriteCodec<Option<T>> for NullableCodec<T> {
    fn resolve(&self, registry: &CodecRegistry) -> Result<BoundWrite<Option<T>>> {
        Ok(Arc::new(NullableWrite::new(registry.get_write::<T>()?)))
    }
}

/// Bound read side of `Option<T>`.
pub struct NullableRead<T> {
    inner: BoundRead<T>,
}

impl<T> NullableRead<T> {
    pub fn new(inner: BoundRead<T>) -> Self {
        Self { inner }
    }
}

impl<T> Clone for NullableRead<T> {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.inner))
    }
}

impl<T: 'static> BoundReadCodec<Option<T>> for NullableRead<T> {
    fn arity(&self) -> usize {
        self.inner.arity()
    }

    fn get(&self, row: &dyn Row, pos: &mut Position) -> Result<Option<T>> {
        let arity = self.inner.arity();
        let start = pos.get();
        let mut all_null = arity > 0;
        for column in start..start + arity {
            if !row.value(column)?.is_null() {
                all_null = false;
                break;
            }
        }
        if all_null {
            pos.advance(arity);
            return Ok(None);
        }
        self.inner.get(row, pos).map(Some)
    }
}

impl<T: 'static> ReadCodec<Option<T>> for NullableRead<T> {
    fn resolve(&self, _registry: &CodecRegistry) -> Result<BoundRead<Option<T>>> {
        Ok(Arc::new(self.clone()))
    }
}

/// Bound write side of `Option<T>`.
pub struct NullableWrite<T> {
    inner: BoundWrite<T>,
}

impl<T> NullableWrite<T> {
    pub fn new(inner: BoundWrite<T>) -> Self {
        Self { inner }
    }
}

impl<T> Clone for NullableWrite<T> {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.inner))
    }
}

impl<T: 'static> BoundWriteCodec<Option<T>> for NullableWrite<T> {
    fn arity(&self) -> usize {
        self.inner.arity()
    }

    fn bind(&self, sink: &mut dyn ParamSink, pos: &mut Position, value: &Option<T>) -> Result<()> {
        match value {
            Some(v) => self.inner.bind(sink, pos, v),
            None => {
                for _ in 0..self.inner.arity() {
                    put(sink, pos, SqlValue::Null)?;
                }
                Ok(())
            }
        }
    }

    fn render_literal(&self, value: &Option<T>) -> Result<Vec<String>> {
        match value {
            Some(v) => self.inner.render_literal(v),
            None => Ok(vec!["NULL".to_string(); self.inner.arity()]),
        }
    }
}

impl<T: 'static> WriteCodec<Option<T>> for NullableWrite<T> {
    fn resolve(&self, _registry: &CodecRegistry) -> Result<BoundWrite<Option<T>>> {
        Ok(Arc::new(self.clone()))
    }
}

// ==================== Tuples ====================

/// Tuple of registered member codecs, e.g. `TupleCodec::<(i64, String)>::new()`.
///
/// Members occupy consecutive columns in declaration order.
pub struct TupleCodec<T>(PhantomData<fn() -> T>);

impl<T> TupleCodec<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for TupleCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! tuple_codec {
    ($read:ident, $write:ident; $($t:ident : $idx:tt),+) => {
        /// Tuple read codec over explicit bound member codecs.
        pub struct $read<$($t),+>($(pub BoundRead<$t>),+);

        impl<$($t),+> Clone for $read<$($t),+> {
            fn clone(&self) -> Self {
                Self($(Arc::clone(&self.$idx)),+)
            }
        }

        impl<$($t: 'static),+> BoundReadCodec<($($t,)+)> for $read<$($t),+> {
            fn arity(&self) -> usize {
                0 $(+ self.$idx.arity())+
            }

            fn get(&self, row: &dyn Row, pos: &mut Position) -> Result<($($t,)+)> {
                Ok(($(self.$idx.get(row, pos)?,)+))
            }
        }

        impl<$($t: 'static),+> ReadCodec<($($t,)+)> for $read<$($t),+> {
            fn resolve(&self, _registry: &CodecRegistry) -> Result<BoundRead<($($t,)+)>> {
                Ok(Arc::new(self.clone()))
            }
        }

        /// Tuple write codec over explicit bound member codecs.
        pub struct $write<$($t),+>($(pub BoundWrite<$t>),+);

        impl<$($t),+> Clone for $write<$($t),+> {
            fn clone(&self) -> Self {
                Self($(Arc::clone(&self.$idx)),+)
            }
        }

        impl<$($t: 'static),+> BoundWriteCodec<($($t,)+)> for $write<$($t),+> {
            fn arity(&self) -> usize {
                0 $(+ self.$idx.arity())+
            }

            fn bind(
                &self,
                sink: &mut dyn ParamSink,
                pos: &mut Position,
                value: &($($t,)+),
            ) -> Result<()> {
                $(self.$idx.bind(sink, pos, &value.$idx)?;)+
                Ok(())
            }

            fn render_literal(&self, value: &($($t,)+)) -> Result<Vec<String>> {
                let mut out = Vec::with_capacity(BoundWriteCodec::arity(self));
                $(out.extend(self.$idx.render_literal(&value.$idx)?);)+
                Ok(out)
            }
        }

        impl<$($t: 'static),+> WriteCodec<($($t,)+)> for $write<$($t),+> {
            fn resolve(&self, _registry: &CodecRegistry) -> Result<BoundWrite<($($t,)+)>> {
                Ok(Arc::new(self.clone()))
            }
        }

        impl<$($t: 'static),+> ReadCodec<($($t,)+)> for TupleCodec<($($t,)+)> {
            fn resolve(&self, registry: &CodecRegistry) -> Result<BoundRead<($($t,)+)>> {
                Ok(Arc::new($read($(registry.get_read::<$t>()?),+)))
            }
        }

        impl<$($t: 'static),+> WriteCodec<($($t,)+)> for TupleCodec<($($t,)+)> {
            fn resolve(&self, registry: &CodecRegistry) -> Result<BoundWrite<($($t,)+)>> {
                Ok(Arc::new($write($(registry.get_write::<$t>()?),+)))
            }
        }
    };
}

tuple_codec!(Tuple1Read, Tuple1Write; A: 0);
tuple_codec!(Tuple2Read, Tuple2Write; A: 0, B: 1);
tuple_codec!(Tuple3Read, Tuple3Write; A: 0, B: 1, C: 2);
tuple_codec!(Tuple4Read, Tuple4Write; A: 0, B: 1, C: 2, D: 3);
tuple_codec!(Tuple5Read, Tuple5Write; A: 0, B: 1, C: 2, D: 3, E: 4);
tuple_codec!(Tuple6Read, Tuple6Write; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);

// ==================== Mapping ====================

type MapFn<S, T> = Arc<dyn Fn(S) -> Result<T> + Send + Sync>;
type ContramapFn<S, T> = Arc<dyn Fn(&T) -> S + Send + Sync>;

/// Read codec for `T` derived from a read codec for `S`.
pub struct Mapped<S, T> {
    inner: Arc<dyn ReadCodec<S>>,
    f: MapFn<S, T>,
}

impl<S: 'static, T: 'static> Mapped<S, T> {
    pub fn new<C, F>(inner: C, f: F) -> Self
    where
        C: ReadCodec<S> + 'static,
        F: Fn(S) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(inner),
            f: Arc::new(f),
        }
    }
}

impl<S, T> Clone for Mapped<S, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            f: Arc::clone(&self.f),
        }
    }
}

struct MappedRead<S, T> {
    inner: BoundRead<S>,
    f: MapFn<S, T>,
}

impl<S: 'static, T: 'static> BoundReadCodec<T> for MappedRead<S, T> {
    fn arity(&self) -> usize {
        self.inner.arity()
    }

    fn get(&self, row: &dyn Row, pos: &mut Position) -> Result<T> {
        let source = self.inner.get(row, pos)?;
        (self.f)(source)
    }
}

impl<S: 'static, T: 'static> ReadCodec<T> for Mapped<S, T> {
    fn resolve(&self, registry: &CodecRegistry) -> Result<BoundRead<T>> {
        Ok(Arc::new(MappedRead {
            inner: self.inner.resolve(registry)?,
            f: Arc::clone(&self.f),
        }))
    }
}

/// Write codec for `T` derived from a write codec for `S`.
pub struct Contramapped<S, T> {
    inner: Arc<dyn WriteCodec<S>>,
    f: ContramapFn<S, T>,
}

impl<S: 'static, T: 'static> Contramapped<S, T> {
    pub fn new<C, F>(inner: C, f: F) -> Self
    where
        C: WriteCodec<S> + 'static,
        F: Fn(&T) -> S + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(inner),
            f: Arc::new(f),
        }
    }
}

impl<S, T> Clone for Contramapped<S, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            f: Arc::clone(&self.f),
        }
    }
}

struct ContramappedWrite<S, T> {
    inner: BoundWrite<S>,
    f: ContramapFn<S, T>,
}

impl<S: 'static, T: 'static> BoundWriteCodec<T> for ContramappedWrite<S, T> {
    fn arity(&self) -> usize {
        self.inner.arity()
    }

    fn bind(&self, sink: &mut dyn ParamSink, pos: &mut Position, value: &T) -> Result<()> {
        self.inner.bind(sink, pos, &(self.f)(value))
    }

    fn render_literal(&self, value: &T) -> Result<Vec<String>> {
        self.inner.render_literal(&(self.f)(value))
    }
}

impl<S: 'static, T: 'static> WriteCodec<T> for Contramapped<S, T> {
    fn resolve(&self, registry: &CodecRegistry) -> Result<BoundWrite<T>> {
        Ok(Arc::new(ContramappedWrite {
            inner: self.inner.resolve(registry)?,
            f: Arc::clone(&self.f),
        }))
    }
}

/// `map` / `try_map` on any read codec.
pub trait ReadCodecExt<S: 'static>: ReadCodec<S> + Sized + 'static {
    fn map<T, F>(self, f: F) -> Mapped<S, T>
    where
        T: 'static,
        F: Fn(S) -> T + Send + Sync + 'static,
    {
        Mapped::new(self, move |s| Ok(f(s)))
    }

    fn try_map<T, F>(self, f: F) -> Mapped<S, T>
    where
        T: 'static,
        F: Fn(S) -> Result<T> + Send + Sync + 'static,
    {
        Mapped::new(self, f)
    }
}

impl<S: 'static, C: ReadCodec<S> + 'static> ReadCodecExt<S> for C {}

/// `contramap` on any write codec.
pub trait WriteCodecExt<S: 'static>: WriteCodec<S> + Sized + 'static {
    fn contramap<T, F>(self, f: F) -> Contramapped<S, T>
    where
        T: 'static,
        F: Fn(&T) -> S + Send + Sync + 'static,
    {
        Contramapped::new(self, f)
    }
}

impl<S: 'static, C: WriteCodec<S> + 'static> WriteCodecExt<S> for C {}

// ==================== Fixed-length lists ====================

/// `Vec<T>` of exactly `len` elements laid out in consecutive columns.
pub struct FixedListCodec<T> {
    len: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> FixedListCodec<T> {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            _marker: PhantomData,
        }
    }
}

impl<T: 'static> ReadCodec<Vec<T>> for FixedListCodec<T> {
    fn resolve(&self, registry: &CodecRegistry) -> Result<BoundRead<Vec<T>>> {
        Ok(Arc::new(FixedListRead::new(
            registry.get_read::<T>()?,
            self.len,
        )))
    }
}

impl<T: 'static> WriteCodec<Vec<T>> for FixedListCodec<T> {
    fn resolve(&self, registry: &CodecRegistry) -> Result<BoundWrite<Vec<T>>> {
        Ok(Arc::new(FixedListWrite::new(
            registry.get_write::<T>()?,
            self.len,
        )))
    }
}

pub struct FixedListRead<T> {
    element: BoundRead<T>,
    len: usize,
}

impl<T> FixedListRead<T> {
    pub fn new(element: BoundRead<T>, len: usize) -> Self {
        Self { element, len }
    }
}

impl<T: 'static> BoundReadCodec<Vec<T>> for FixedListRead<T> {
    fn arity(&self) -> usize {
        self.len * self.element.arity()
    }

    fn get(&self, row: &dyn Row, pos: &mut Position) -> Result<Vec<T>> {
        (0..self.len).map(|_| self.element.get(row, pos)).collect()
    }
}

pub struct FixedListWrite<T> {
    element: BoundWrite<T>,
    len: usize,
}

impl<T> FixedListWrite<T> {
    pub fn new(element: BoundWrite<T>, len: usize) -> Self {
        Self { element, len }
    }

    fn check_len(&self, value: &[T]) -> Result<()> {
        if value.len() != self.len {
            return Err(Error::ArityMismatch {
                expected: self.len,
                actual: value.len(),
            });
        }
        Ok(())
    }
}

impl<T: 'static> BoundWriteCodec<Vec<T>> for FixedListWrite<T> {
    fn arity(&self) -> usize {
        self.len * self.element.arity()
    }

    fn bind(&self, sink: &mut dyn ParamSink, pos: &mut Position, value: &Vec<T>) -> Result<()> {
        self.check_len(value)?;
        for v in value {
            self.element.bind(sink, pos, v)?;
        }
        Ok(())
    }

    fn render_literal(&self, value: &Vec<T>) -> Result<Vec<String>> {
        self.check_len(value)?;
        let mut out = Vec::with_capacity(BoundWriteCodec::arity(self));
        for v in value {
            out.extend(self.element.render_literal(v)?);
        }
        Ok(out)
    }
}

// ==================== Enums ====================

/// A fieldless enum with a stable list of variants.
pub trait SqlEnum: Copy + Send + Sync + 'static {
    /// Every variant, in ordinal order.
    const VARIANTS: &'static [Self];

    /// Stored name of this variant.
    fn name(&self) -> &'static str;

    /// 0-based position in `VARIANTS`, `None` if this variant's name is
    /// missing from the list.
    fn ordinal(&self) -> Option<usize> {
        let name = self.name();
        Self::VARIANTS.iter().position(|v| v.name() == name)
    }
}

/// Enum stored as its variant name.
pub struct EnumTextCodec<E>(PhantomData<fn() -> E>);

impl<E> EnumTextCodec<E> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<E> Default for EnumTextCodec<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: SqlEnum> BoundReadCodec<E> for EnumTextCodec<E> {
    fn arity(&self) -> usize {
        1
    }

    fn get(&self, row: &dyn Row, pos: &mut Position) -> Result<E> {
        let (column, text) = take_text::<E>(row, pos)?;
        E::VARIANTS
            .iter()
            .find(|v| v.name() == text)
            .copied()
            .ok_or_else(|| {
                Error::InvalidValue(format!(
                    "column {column}: `{text}` is not a variant of {}",
                    std::any::type_name::<E>()
                ))
            })
    }
}

impl<E: SqlEnum> BoundWriteCodec<E> for EnumTextCodec<E> {
    fn arity(&self) -> usize {
        1
    }

    fn bind(&self, sink: &mut dyn ParamSink, pos: &mut Position, value: &E) -> Result<()> {
        put(sink, pos, SqlValue::from(value.name()))
    }

    fn render_literal(&self, value: &E) -> Result<Vec<String>> {
        Ok(vec![quote_text(value.name())])
    }
}

impl<E: SqlEnum> ReadCodec<E> for EnumTextCodec<E> {
    fn resolve(&self, _registry: &CodecRegistry) -> Result<BoundRead<E>> {
        Ok(Arc::new(Self::new()))
    }
}

impl<E: SqlEnum> WriteCodec<E> for EnumTextCodec<E> {
    fn resolve(&self, _registry: &CodecRegistry) -> Result<BoundWrite<E>> {
        Ok(Arc::new(Self::new()))
    }
}

/// Enum stored as its 0-based ordinal.
pub struct EnumOrdinalCodec<E>(PhantomData<fn() -> E>);

impl<E> EnumOrdinalCodec<E> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<E> Default for EnumOrdinalCodec<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: SqlEnum> BoundReadCodec<E> for EnumOrdinalCodec<E> {
    fn arity(&self) -> usize {
        1
    }

    fn get(&self, row: &dyn Row, pos: &mut Position) -> Result<E> {
        match take(row, pos)? {
            (_, SqlValue::Integer(n)) => usize::try_from(*n)
                .ok()
                .and_then(|i| E::VARIANTS.get(i))
                .copied()
                .ok_or_else(|| Error::OutOfRange {
                    type_name: std::any::type_name::<E>(),
                    value: n.to_string(),
                }),
            (column, SqlValue::Null) => Err(unexpected_null::<E>(column)),
            (column, other) => Err(mismatch::<E>(column, other)),
        }
    }
}

fn stored_ordinal<E: SqlEnum>(value: &E) -> Result<i64> {
    value
        .ordinal()
        .and_then(|i| i64::try_from(i).ok())
        .ok_or_else(|| {
            Error::InvalidValue(format!(
                "`{}` is not listed in {}::VARIANTS",
                value.name(),
                std::any::type_name::<E>()
            ))
        })
}

impl<E: SqlEnum> BoundWriteCodec<E> for EnumOrdinalCodec<E> {
    fn arity(&self) -> usize {
        1
    }

    fn bind(&self, sink: &mut dyn ParamSink, pos: &mut Position, value: &E) -> Result<()> {
        put(sink, pos, SqlValue::Integer(stored_ordinal(value)?))
    }

    fn render_literal(&self, value: &E) -> Result<Vec<String>> {
        Ok(vec![stored_ordinal(value)?.to_string()])
    }
}

impl<E: SqlEnum> ReadCodec<E> for EnumOrdinalCodec<E> {
    fn resolve(&self, _registry: &CodecRegistry) -> Result<BoundRead<E>> {
        Ok(Arc::new(Self::new()))
    }
}

impl<E: SqlEnum> WriteCodec<E> for EnumOrdinalCodec<E> {
    fn resolve(&self, _registry: &CodecRegistry) -> Result<BoundWrite<E>> {
        Ok(Arc::new(Self::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::TextCodec;
    use crate::cursor::{Cursor, MemoryCursor, Params};
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Color {
        Red,
        Green,
    }

    impl SqlEnum for Color {
        const VARIANTS: &'static [Self] = &[Color::Red, Color::Green];

        fn name(&self) -> &'static str {
            match self {
                Color::Red => "red",
                Color::Green => "green",
            }
        }
    }

    /// `Blue` is missing from `VARIANTS`.
    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Partial {
        Red,
        Blue,
    }

    impl SqlEnum for Partial {
        const VARIANTS: &'static [Self] = &[Partial::Red];

        fn name(&self) -> &'static str {
            match self {
                Partial::Red => "red",
                Partial::Blue => "blue",
            }
        }
    }

    #[derive(Debug, PartialEq)]
    struct Person {
        id: i64,
        name: String,
    }

    fn row(values: Vec<SqlValue>) -> MemoryCursor {
        let columns: Vec<String> = (1..=values.len()).map(|i| format!("c{i}")).collect();
        let mut cursor = MemoryCursor::new(columns, vec![values]);
        cursor.advance().unwrap();
        cursor
    }

    fn registry() -> CodecRegistry {
        CodecRegistry::builder()
            .with_defaults()
            .register::<(i64, String), _>(TupleCodec::new())
            .build()
    }

    fn read<T: 'static>(codec: impl ReadCodec<T>, values: Vec<SqlValue>) -> Result<T> {
        let registry = registry();
        let bound = codec.resolve(&registry)?;
        let cursor = row(values);
        let mut pos = Position::start();
        let out = bound.get(&cursor, &mut pos)?;
        assert_eq!(pos.consumed(), bound.arity());
        Ok(out)
    }

    fn write<T: 'static>(codec: impl WriteCodec<T>, value: &T) -> Result<Params> {
        let registry = registry();
        let bound = codec.resolve(&registry)?;
        let mut params = Params::new();
        bound.bind(&mut params, &mut Position::start(), value)?;
        params.finish(bound.arity())
    }

    #[test]
    fn test_nullable_all_null_is_none() {
        let codec = NullableCodec::<(i64, String)>::new();
        assert_eq!(
            read(codec, vec![SqlValue::Null, SqlValue::Null]).unwrap(),
            None
        );
        let codec = NullableCodec::<(i64, String)>::new();
        assert_eq!(
            read(codec, vec![SqlValue::Integer(1), SqlValue::from("a")]).unwrap(),
            Some((1, "a".to_string()))
        );
    }

    #[test]
    fn test_nullable_partial_null_reaches_member() {
        let codec = NullableCodec::<(i64, String)>::new();
        let err = read(codec, vec![SqlValue::Integer(1), SqlValue::Null]).unwrap_err();
        assert!(matches!(err, Error::UnexpectedNull { column: 2, .. }));
    }

    #[test]
    fn test_nullable_float_is_none_not_nan() {
        assert_eq!(
            read(NullableCodec::<f64>::new(), vec![SqlValue::Null]).unwrap(),
            None
        );
    }

    #[test]
    fn test_nullable_none_writes_arity_nulls() {
        let params = write(NullableCodec::<(i64, String)>::new(), &None).unwrap();
        assert_eq!(params.as_slice(), &[SqlValue::Null, SqlValue::Null]);
    }

    #[test]
    fn test_tuple_arity_is_sum() {
        let registry = CodecRegistry::default();
        let bound = ReadCodec::<(i64, Option<String>, f64)>::resolve(
            &TupleCodec::<(i64, Option<String>, f64)>::new(),
            &registry,
        )
        .unwrap();
        assert_eq!(bound.arity(), 3);
    }

    #[test]
    fn test_tuple_literal_fragments() {
        let registry = CodecRegistry::default();
        let bound = WriteCodec::<(i64, String)>::resolve(
            &TupleCodec::<(i64, String)>::new(),
            &registry,
        )
        .unwrap();
        assert_eq!(
            bound.render_literal(&(7, "x".to_string())).unwrap(),
            vec!["7", "'x'"]
        );
    }

    #[test]
    fn test_record_as_mapped_tuple() {
        let codec = TupleCodec::<(i64, String)>::new()
            .map(|(id, name): (i64, String)| Person { id, name });
        let person = read(codec, vec![SqlValue::Integer(3), SqlValue::from("Ann")]).unwrap();
        assert_eq!(
            person,
            Person {
                id: 3,
                name: "Ann".to_string()
            }
        );

        let codec = TupleCodec::<(i64, String)>::new()
            .contramap(|p: &Person| (p.id, p.name.clone()));
        let params = write(
            codec,
            &Person {
                id: 4,
                name: "Bo".to_string(),
            },
        )
        .unwrap();
        assert_eq!(
            params.as_slice(),
            &[SqlValue::Integer(4), SqlValue::from("Bo")]
        );
    }

    #[test]
    fn test_try_map_propagates() {
        let codec = ReadCodecExt::<String>::try_map(TextCodec, |s: String| {
            s.parse::<u8>()
                .map_err(|e| Error::InvalidValue(e.to_string()))
        });
        assert_eq!(read(codec.clone(), vec![SqlValue::from("12")]).unwrap(), 12);
        assert!(read(codec, vec![SqlValue::from("x")]).is_err());
    }

    #[test]
    fn test_fixed_list_length_checked() {
        let codec = FixedListCodec::<i64>::new(2);
        let err = write(codec, &vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, Error::ArityMismatch { expected: 2, actual: 3 }));

        let values = read(
            FixedListCodec::<i64>::new(2),
            vec![SqlValue::Integer(1), SqlValue::Integer(2)],
        )
        .unwrap();
        assert_eq!(values, vec![1, 2]);
    }

    #[test]
    fn test_enum_text_and_ordinal() {
        assert_eq!(
            read(EnumTextCodec::<Color>::new(), vec![SqlValue::from("green")]).unwrap(),
            Color::Green
        );
        assert!(matches!(
            read(EnumTextCodec::<Color>::new(), vec![SqlValue::from("blue")]),
            Err(Error::InvalidValue(_))
        ));
        assert_eq!(
            write(EnumOrdinalCodec::<Color>::new(), &Color::Green)
                .unwrap()
                .as_slice(),
            &[SqlValue::Integer(1)]
        );
        assert!(matches!(
            read(EnumOrdinalCodec::<Color>::new(), vec![SqlValue::Integer(2)]),
            Err(Error::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_ordinal_of_unlisted_variant_fails() {
        assert_eq!(Partial::Red.ordinal(), Some(0));
        assert_eq!(Partial::Blue.ordinal(), None);
        assert!(matches!(
            write(EnumOrdinalCodec::<Partial>::new(), &Partial::Blue),
            Err(Error::InvalidValue(_))
        ));

        let registry = CodecRegistry::default();
        let bound = WriteCodec::<Partial>::resolve(&EnumOrdinalCodec::<Partial>::new(), &registry)
            .unwrap();
        assert!(bound.render_literal(&Partial::Blue).is_err());
        assert_eq!(bound.render_literal(&Partial::Red).unwrap(), vec!["0"]);
    }
}
