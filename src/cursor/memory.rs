//! Cursor over rows already held in memory.

use super::{Cursor, Row, check_column};
use crate::error::{Error, Result};
use crate::value::SqlValue;

/// A forward cursor over owned rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryCursor {
    columns: Vec<String>,
    rows: Vec<Vec<SqlValue>>,
    /// 0 = before the first row, `rows.len() + 1` = exhausted.
    current: usize,
}

impl MemoryCursor {
    pub fn new<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        rows: Vec<Vec<SqlValue>>,
    ) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows,
            current: 0,
        }
    }

    /// Number of `advance` calls that landed on a row.
    pub fn rows_visited(&self) -> usize {
        self.current.min(self.rows.len())
    }

    fn current_row(&self) -> Result<&[SqlValue]> {
        self.current
            .checked_sub(1)
            .and_then(|i| self.rows.get(i))
            .map(Vec::as_slice)
            .ok_or(Error::NoCurrentRow)
    }
}

impl Row for MemoryCursor {
    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn column_name(&self, index: usize) -> Result<&str> {
        check_column(index, self.columns.len())?;
        Ok(&self.columns[index - 1])
    }

    fn value(&self, index: usize) -> Result<&SqlValue> {
        let row = self.current_row()?;
        check_column(index, row.len())?;
        Ok(&row[index - 1])
    }
}

impl Cursor for MemoryCursor {
    fn advance(&mut self) -> Result<bool> {
        if self.current <= self.rows.len() {
            self.current += 1;
        }
        Ok(self.current <= self.rows.len())
    }
}
