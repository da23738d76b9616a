//! Column-oriented strategies: `matrix`, `labelled_matrix`, `labelled_map`.
//!
//! Each column is a type-erased `Vec<T>` whose element type comes from the
//! column's codec.

use std::any::{Any, type_name};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::Consume;
use crate::codec::{BoundRead, CodecRegistry, ReadCodec, by_type};
use crate::cursor::{Cursor, Position, Row};
use crate::error::{Error, Result};

/// A homogeneous column of decoded values.
pub struct TypedColumn {
    element_type: &'static str,
    len: usize,
    values: Box<dyn Any + Send>,
}

impl TypedColumn {
    fn new<T: Send + 'static>(values: Vec<T>) -> Self {
        Self {
            element_type: type_name::<T>(),
            len: values.len(),
            values: Box::new(values),
        }
    }

    /// Type name of the elements, as produced by the column's codec.
    pub fn element_type(&self) -> &'static str {
        self.element_type
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The values, if the column holds `T`.
    pub fn get<T: 'static>(&self) -> Option<&[T]> {
        self.values.downcast_ref::<Vec<T>>().map(Vec::as_slice)
    }

    pub fn into_vec<T: 'static>(self) -> Result<Vec<T>> {
        let element_type = self.element_type;
        self.values
            .downcast::<Vec<T>>()
            .map(|values| *values)
            .map_err(|_| wrong_type::<T>(element_type))
    }
}

impl fmt::Debug for TypedColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedColumn")
            .field("element_type", &self.element_type)
            .field("len", &self.len)
            .finish()
    }
}

/// One decoded value of a codec-determined type.
pub struct TypedValue {
    element_type: &'static str,
    value: Box<dyn Any + Send>,
}

impl TypedValue {
    fn new<T: Send + 'static>(value: T) -> Self {
        Self {
            element_type: type_name::<T>(),
            value: Box::new(value),
        }
    }

    pub fn element_type(&self) -> &'static str {
        self.element_type
    }

    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub fn into_inner<T: 'static>(self) -> Result<T> {
        let element_type = self.element_type;
        self.value
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| wrong_type::<T>(element_type))
    }
}

impl fmt::Debug for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedValue")
            .field("element_type", &self.element_type)
            .finish_non_exhaustive()
    }
}

fn wrong_type<T>(held: &'static str) -> Error {
    Error::InvalidValue(format!("holds {}, not {}", held, type_name::<T>()))
}

// ==================== Column plumbing ====================

trait ColumnSpec: Send + Sync {
    fn start(&self, registry: &CodecRegistry) -> Result<Box<dyn ColumnReader>>;
}

trait ColumnReader {
    fn arity(&self) -> usize;

    /// Decode one value and keep it.
    fn push(&mut self, row: &dyn Row, pos: &mut Position) -> Result<()>;

    /// Decode one value without keeping it.
    fn read_one(&self, row: &dyn Row, pos: &mut Position) -> Result<TypedValue>;

    fn finish(self: Box<Self>) -> TypedColumn;
}

struct ColumnOf<T> {
    codec: Arc<dyn ReadCodec<T>>,
}

impl<T: Send + 'static> ColumnSpec for ColumnOf<T> {
    fn start(&self, registry: &CodecRegistry) -> Result<Box<dyn ColumnReader>> {
        Ok(Box::new(Accumulator {
            codec: self.codec.resolve(registry)?,
            values: Vec::new(),
        }))
    }
}

struct Accumulator<T> {
    codec: BoundRead<T>,
    values: Vec<T>,
}

impl<T: Send + 'static> ColumnReader for Accumulator<T> {
    fn arity(&self) -> usize {
        self.codec.arity()
    }

    fn push(&mut self, row: &dyn Row, pos: &mut Position) -> Result<()> {
        self.values.push(self.codec.get(row, pos)?);
        Ok(())
    }

    fn read_one(&self, row: &dyn Row, pos: &mut Position) -> Result<TypedValue> {
        self.codec.get(row, pos).map(TypedValue::new)
    }

    fn finish(self: Box<Self>) -> TypedColumn {
        TypedColumn::new(self.values)
    }
}

/// Ordered column codecs shared by the three strategies.
#[derive(Clone, Default)]
struct Columns(Vec<Arc<dyn ColumnSpec>>);

impl Columns {
    fn push<T, C>(&mut self, codec: C)
    where
        T: Send + 'static,
        C: ReadCodec<T> + 'static,
    {
        self.0.push(Arc::new(ColumnOf::<T> {
            codec: Arc::new(codec),
        }));
    }

    fn start(&self, registry: &CodecRegistry) -> Result<Vec<Box<dyn ColumnReader>>> {
        self.0.iter().map(|spec| spec.start(registry)).collect()
    }
}

fn fill(readers: &mut [Box<dyn ColumnReader>], cursor: &mut dyn Cursor) -> Result<()> {
    while cursor.advance()? {
        let mut pos = Position::start();
        for reader in readers.iter_mut() {
            reader.push(&*cursor, &mut pos)?;
        }
    }
    Ok(())
}

/// Column names at each reader's first column; fails on a repeat.
fn labels(readers: &[Box<dyn ColumnReader>], row: &dyn Row) -> Result<Vec<String>> {
    let mut labels: Vec<String> = Vec::with_capacity(readers.len());
    let mut pos = Position::start();
    for reader in readers {
        let name = row.column_name(pos.get())?;
        if labels.iter().any(|l| l == name) {
            return Err(Error::DuplicateLabel(name.to_string()));
        }
        labels.push(name.to_string());
        pos.advance(reader.arity());
    }
    Ok(labels)
}

// ==================== Strategies ====================

/// Every row decoded into N positional, independently typed columns.
#[derive(Clone, Default)]
pub struct Matrix {
    columns: Columns,
}

pub fn matrix() -> Matrix {
    Matrix::default()
}

impl Matrix {
    pub fn column<T, C>(mut self, codec: C) -> Self
    where
        T: Send + 'static,
        C: ReadCodec<T> + 'static,
    {
        self.columns.push(codec);
        self
    }

    pub fn column_of<T: Send + 'static>(self) -> Self {
        self.column(by_type::<T>())
    }
}

impl Consume for Matrix {
    type Output = Vec<TypedColumn>;

    fn consume(&self, registry: &CodecRegistry, cursor: &mut dyn Cursor) -> Result<Vec<TypedColumn>> {
        let mut readers = self.columns.start(registry)?;
        fill(&mut readers, cursor)?;
        Ok(readers.into_iter().map(|r| r.finish()).collect())
    }
}

/// Like [`Matrix`], keyed by column name.
#[derive(Clone, Default)]
pub struct LabelledMatrix {
    columns: Columns,
}

pub fn labelled_matrix() -> LabelledMatrix {
    LabelledMatrix::default()
}

impl LabelledMatrix {
    pub fn column<T, C>(mut self, codec: C) -> Self
    where
        T: Send + 'static,
        C: ReadCodec<T> + 'static,
    {
        self.columns.push(codec);
        self
    }

    pub fn column_of<T: Send + 'static>(self) -> Self {
        self.column(by_type::<T>())
    }
}

impl Consume for LabelledMatrix {
    type Output = BTreeMap<String, TypedColumn>;

    fn consume(
        &self,
        registry: &CodecRegistry,
        cursor: &mut dyn Cursor,
    ) -> Result<BTreeMap<String, TypedColumn>> {
        let mut readers = self.columns.start(registry)?;
        // Names come from metadata, so an empty result still has labels.
        let labels = labels(&readers, &*cursor)?;
        fill(&mut readers, cursor)?;
        Ok(labels
            .into_iter()
            .zip(readers.into_iter().map(|r| r.finish()))
            .collect())
    }
}

/// The first row decoded column by column, keyed by column name.
#[derive(Clone, Default)]
pub struct LabelledMap {
    columns: Columns,
}

pub fn labelled_map() -> LabelledMap {
    LabelledMap::default()
}

impl LabelledMap {
    pub fn column<T, C>(mut self, codec: C) -> Self
    where
        T: Send + 'static,
        C: ReadCodec<T> + 'static,
    {
        self.columns.push(codec);
        self
    }

    pub fn column_of<T: Send + 'static>(self) -> Self {
        self.column(by_type::<T>())
    }
}

impl Consume for LabelledMap {
    type Output = BTreeMap<String, TypedValue>;

    fn consume(
        &self,
        registry: &CodecRegistry,
        cursor: &mut dyn Cursor,
    ) -> Result<BTreeMap<String, TypedValue>> {
        let readers = self.columns.start(registry)?;
        let labels = labels(&readers, &*cursor)?;
        if !cursor.advance()? {
            return Err(Error::NotFound);
        }
        let mut pos = Position::start();
        let mut out = BTreeMap::new();
        for (label, reader) in labels.into_iter().zip(&readers) {
            out.insert(label, reader.read_one(&*cursor, &mut pos)?);
        }
        Ok(out)
    }
}
