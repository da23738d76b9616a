//! Forward-only result cursors and the parameter-binding protocol.
//!
//! All indexes are 1-based. A [`Position`] is threaded through every codec
//! call for one row (reading) or one statement row (binding); each codec
//! advances it by exactly its arity.
//!
//! Cursor wrappers:
//! - [`PeekingCursor`]: one-row lookahead over a cursor already on a row
//! - [`ContiguousCursor`]: admits only the run of rows matching a predicate
//! - [`OffsetCursor`]: hides leading columns

mod contiguous;
mod memory;
mod offset;
mod peeking;

pub use contiguous::ContiguousCursor;
pub use memory::MemoryCursor;
pub use offset::OffsetCursor;
pub use peeking::PeekingCursor;

use crate::error::{Error, Result};
use crate::value::SqlValue;

/// Read access to the row a cursor is positioned on.
pub trait Row {
    /// Number of columns in the result.
    fn column_count(&self) -> usize;

    /// Label of the column at `index` (1-based).
    fn column_name(&self, index: usize) -> Result<&str>;

    /// Value of the column at `index` (1-based) in the current row.
    fn value(&self, index: usize) -> Result<&SqlValue>;
}

/// A forward-only result cursor. Starts before the first row.
pub trait Cursor: Row {
    /// Move to the next row. Returns `false` once the result is exhausted.
    fn advance(&mut self) -> Result<bool>;
}

impl<R: Row + ?Sized> Row for &R {
    fn column_count(&self) -> usize {
        (**self).column_count()
    }

    fn column_name(&self, index: usize) -> Result<&str> {
        (**self).column_name(index)
    }

    fn value(&self, index: usize) -> Result<&SqlValue> {
        (**self).value(index)
    }
}

impl<R: Row + ?Sized> Row for &mut R {
    fn column_count(&self) -> usize {
        (**self).column_count()
    }

    fn column_name(&self, index: usize) -> Result<&str> {
        (**self).column_name(index)
    }

    fn value(&self, index: usize) -> Result<&SqlValue> {
        (**self).value(index)
    }
}

impl<C: Cursor + ?Sized> Cursor for &mut C {
    fn advance(&mut self) -> Result<bool> {
        (**self).advance()
    }
}

/// Fail with `ColumnOutOfRange` unless `1 <= index <= count`.
pub(crate) fn check_column(index: usize, count: usize) -> Result<()> {
    if index == 0 || index > count {
        return Err(Error::ColumnOutOfRange { index, count });
    }
    Ok(())
}

/// Mutable 1-based column/parameter marker for one row or statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position(usize);

impl Position {
    /// Positioned on column/parameter 1.
    pub fn start() -> Self {
        Self(1)
    }

    pub fn at(index: usize) -> Self {
        Self(index)
    }

    pub fn get(self) -> usize {
        self.0
    }

    /// Return the current index and step past it.
    pub fn next(&mut self) -> usize {
        let index = self.0;
        self.0 += 1;
        index
    }

    pub fn advance(&mut self, n: usize) {
        self.0 += n;
    }

    /// Columns consumed since `start()`.
    pub fn consumed(self) -> usize {
        self.0 - 1
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

/// Receiver of bound statement parameters.
pub trait ParamSink {
    /// Set parameter `index` (1-based).
    fn set(&mut self, index: usize, value: SqlValue) -> Result<()>;
}

/// In-memory, ordered parameter list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    values: Vec<SqlValue>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[SqlValue] {
        &self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SqlValue> {
        self.values.iter()
    }

    pub fn into_vec(self) -> Vec<SqlValue> {
        self.values
    }

    /// Check that exactly `expected` parameters were bound.
    pub fn finish(self, expected: usize) -> Result<Self> {
        if self.values.len() != expected {
            return Err(Error::ArityMismatch {
                expected,
                actual: self.values.len(),
            });
        }
        Ok(self)
    }
}

impl ParamSink for Params {
    fn set(&mut self, index: usize, value: SqlValue) -> Result<()> {
        let len = self.values.len();
        if index == 0 {
            return Err(Error::ColumnOutOfRange { index, count: len });
        }
        if index <= len {
            self.values[index - 1] = value;
        } else if index == len + 1 {
            self.values.push(value);
        } else {
            // A codec skipped a parameter slot.
            return Err(Error::ArityMismatch {
                expected: len + 1,
                actual: index,
            });
        }
        Ok(())
    }
}

impl From<Vec<SqlValue>> for Params {
    fn from(values: Vec<SqlValue>) -> Self {
        Self { values }
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = &'a SqlValue;
    type IntoIter = std::slice::Iter<'a, SqlValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
