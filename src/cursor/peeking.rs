//! One-row lookahead cursor.

use super::{Cursor, Row};
use crate::error::{Error, Result};
use crate::value::SqlValue;

/// Wraps a cursor that already sits on a row and reports itself one row
/// behind it: the first `advance` lands on that row without moving the inner
/// cursor, later calls delegate.
#[derive(Debug)]
pub struct PeekingCursor<C> {
    inner: C,
    /// Peeked row not yet handed out.
    pending: bool,
}

impl<C: Cursor> PeekingCursor<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            pending: true,
        }
    }

    /// True until the peeked row has been consumed by an `advance`.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: Cursor> Row for PeekingCursor<C> {
    fn column_count(&self) -> usize {
        self.inner.column_count()
    }

    fn column_name(&self, index: usize) -> Result<&str> {
        self.inner.column_name(index)
    }

    fn value(&self, index: usize) -> Result<&SqlValue> {
        if self.pending {
            return Err(Error::NoCurrentRow);
        }
        self.inner.value(index)
    }
}

impl<C: Cursor> Cursor for PeekingCursor<C> {
    fn advance(&mut self) -> Result<bool> {
        if self.pending {
            self.pending = false;
            return Ok(true);
        }
        self.inner.advance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::MemoryCursor;

    fn cursor() -> MemoryCursor {
        MemoryCursor::new(
            ["n"],
            vec![vec![SqlValue::Integer(1)], vec![SqlValue::Integer(2)]],
        )
    }

    #[test]
    fn test_first_advance_does_not_move_inner() {
        let mut inner = cursor();
        inner.advance().unwrap();

        let mut peek = PeekingCursor::new(&mut inner);
        assert!(peek.is_pending());
        assert!(matches!(peek.value(1), Err(Error::NoCurrentRow)));

        assert!(peek.advance().unwrap());
        assert!(!peek.is_pending());
        assert_eq!(peek.value(1).unwrap(), &SqlValue::Integer(1));

        assert!(peek.advance().unwrap());
        assert_eq!(peek.value(1).unwrap(), &SqlValue::Integer(2));
        assert!(!peek.advance().unwrap());
    }

    #[test]
    fn test_untouched_peek_leaves_inner_in_place() {
        let mut inner = cursor();
        inner.advance().unwrap();
        drop(PeekingCursor::new(&mut inner));
        assert_eq!(inner.value(1).unwrap(), &SqlValue::Integer(1));
    }
}
