//! Column-dropping cursor view.

use super::{Cursor, Row, check_column};
use crate::error::Result;
use crate::value::SqlValue;

/// Hides the first `skip` columns of `inner` and renumbers the rest from 1.
#[derive(Debug)]
pub struct OffsetCursor<C> {
    inner: C,
    skip: usize,
}

impl<C: Row> OffsetCursor<C> {
    pub fn new(inner: C, skip: usize) -> Self {
        Self { inner, skip }
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: Row> Row for OffsetCursor<C> {
    fn column_count(&self) -> usize {
        self.inner.column_count().saturating_sub(self.skip)
    }

    fn column_name(&self, index: usize) -> Result<&str> {
        check_column(index, self.column_count())?;
        self.inner.column_name(index + self.skip)
    }

    fn value(&self, index: usize) -> Result<&SqlValue> {
        check_column(index, self.column_count())?;
        self.inner.value(index + self.skip)
    }
}

impl<C: Cursor> Cursor for OffsetCursor<C> {
    fn advance(&mut self) -> Result<bool> {
        self.inner.advance()
    }
}
