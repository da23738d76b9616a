//! Cursor restricted to one contiguous run of rows.

use super::{Cursor, Row};
use crate::error::{Error, Result};
use crate::value::SqlValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Open,
    /// Inner cursor sits on the first row after the run.
    Boundary,
    /// Inner cursor ran out of rows.
    Exhausted,
}

/// Admits rows from `inner` while `admit` holds, starting at the first row
/// the inner cursor advances to.
///
/// The first row is admitted unconditionally; `admit` is only consulted from
/// the second row on. Once a row is rejected (or the inner cursor ends) the
/// run is closed and every later `advance` returns `false` without touching
/// the inner cursor.
pub struct ContiguousCursor<C, P> {
    inner: C,
    admit: P,
    /// Inner rows visited, including a rejected boundary row.
    visited: usize,
    admitted: usize,
    state: RunState,
}

impl<C, P> ContiguousCursor<C, P>
where
    C: Cursor,
    P: FnMut(&dyn Row) -> Result<bool>,
{
    pub fn new(inner: C, admit: P) -> Self {
        Self {
            inner,
            admit,
            visited: 0,
            admitted: 0,
            state: RunState::Open,
        }
    }

    /// Rows handed out so far.
    pub fn admitted(&self) -> usize {
        self.admitted
    }

    /// The run has ended, either at a boundary row or at end of data.
    pub fn is_closed(&self) -> bool {
        self.state != RunState::Open
    }

    /// The run ended because the inner cursor has no more rows.
    pub fn is_exhausted(&self) -> bool {
        self.state == RunState::Exhausted
    }

    /// Advance until the run closes.
    pub fn drain(&mut self) -> Result<()> {
        while self.advance()? {}
        Ok(())
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C, P> Row for ContiguousCursor<C, P>
where
    C: Cursor,
    P: FnMut(&dyn Row) -> Result<bool>,
{
    fn column_count(&self) -> usize {
        self.inner.column_count()
    }

    fn column_name(&self, index: usize) -> Result<&str> {
        self.inner.column_name(index)
    }

    fn value(&self, index: usize) -> Result<&SqlValue> {
        if self.state != RunState::Open || self.admitted == 0 {
            return Err(Error::NoCurrentRow);
        }
        self.inner.value(index)
    }
}

impl<C, P> Cursor for ContiguousCursor<C, P>
where
    C: Cursor,
    P: FnMut(&dyn Row) -> Result<bool>,
{
    fn advance(&mut self) -> Result<bool> {
        if self.state != RunState::Open {
            return Ok(false);
        }
        if !self.inner.advance()? {
            self.state = RunState::Exhausted;
            return Ok(false);
        }
        self.visited += 1;
        if self.visited == 1 || (self.admit)(&self.inner)? {
            self.admitted += 1;
            Ok(true)
        } else {
            self.state = RunState::Boundary;
            Ok(false)
        }
    }
}
