//! SQLite backend over rusqlite.
//!
//! Query cursors stream from the prepared statement one row at a time; only
//! the current row is held, converted to [`SqlValue`]s.

use std::path::Path;

use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{ErrorCode, ToSql, params_from_iter};
use tracing::debug;

use crate::cursor::{Cursor, Params, Row, check_column};
use crate::error::{Error, Result};
use crate::exec::{Capabilities, Connection};
use crate::render::BatchStatement;
use crate::value::SqlValue;

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::Borrowed(match self {
            SqlValue::Null => ValueRef::Null,
            SqlValue::Integer(i) => ValueRef::Integer(*i),
            SqlValue::Real(f) => ValueRef::Real(*f),
            SqlValue::Text(s) => ValueRef::Text(s.as_bytes()),
            SqlValue::Blob(b) => ValueRef::Blob(b),
        }))
    }
}

fn from_value_ref(value: ValueRef<'_>, column: usize) -> Result<SqlValue> {
    Ok(match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(i) => SqlValue::Integer(i),
        ValueRef::Real(f) => SqlValue::Real(f),
        ValueRef::Text(bytes) => SqlValue::Text(
            String::from_utf8(bytes.to_vec())
                .map_err(|e| Error::InvalidValue(format!("column {}: {}", column, e)))?,
        ),
        ValueRef::Blob(bytes) => SqlValue::Blob(bytes.to_vec()),
    })
}

/// `SQLITE_BUSY` and `SQLITE_LOCKED` are transient; everything else is not.
impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        let transient = matches!(
            &err,
            rusqlite::Error::SqliteFailure(e, _)
                if matches!(e.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
        );
        Error::Backend {
            message: err.to_string(),
            transient,
            source: Some(Box::new(err)),
        }
    }
}

/// A [`Connection`] over one rusqlite connection.
#[derive(Debug)]
pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl SqliteConnection {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_connection(rusqlite::Connection::open(path)?))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::from_connection(rusqlite::Connection::open_in_memory()?))
    }

    pub fn from_connection(conn: rusqlite::Connection) -> Self {
        Self { conn }
    }

    /// Run one or more `;`-separated statements without parameters.
    pub fn execute_batch(&mut self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    pub fn raw(&self) -> &rusqlite::Connection {
        &self.conn
    }

    pub fn into_inner(self) -> rusqlite::Connection {
        self.conn
    }

    fn run(&mut self, sql: &str, params: &Params) -> Result<usize> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        Ok(stmt.execute(params_from_iter(params.iter()))?)
    }
}

fn widen(count: usize) -> Result<i64> {
    i64::try_from(count).map_err(|_| Error::OutOfRange {
        type_name: "i64",
        value: count.to_string(),
    })
}

impl Connection for SqliteConnection {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            batch: true,
            large_counts: true,
        }
    }

    fn update(&mut self, sql: &str, params: &Params) -> Result<i32> {
        let count = self.run(sql, params)?;
        i32::try_from(count).map_err(|_| Error::OutOfRange {
            type_name: "i32",
            value: count.to_string(),
        })
    }

    fn update_large(&mut self, sql: &str, params: &Params) -> Result<i64> {
        widen(self.run(sql, params)?)
    }

    fn update_batch(&mut self, batch: &BatchStatement) -> Result<Vec<i64>> {
        let mut stmt = self.conn.prepare_cached(&batch.sql)?;
        let counts = batch
            .rows
            .iter()
            .map(|row| widen(stmt.execute(params_from_iter(row.iter()))?))
            .collect::<Result<Vec<_>>>()?;
        debug!(sql = %batch.sql, rows = counts.len(), "executed sqlite batch");
        Ok(counts)
    }

    fn update_batch_literal(&mut self, statements: &[String]) -> Result<Vec<i64>> {
        let empty = Params::new();
        statements
            .iter()
            .map(|sql| widen(self.run(sql, &empty)?))
            .collect()
    }

    fn query(
        &mut self,
        sql: &str,
        params: &Params,
        consume: &mut dyn FnMut(&mut dyn Cursor) -> Result<()>,
    ) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let rows = stmt.query(params_from_iter(params.iter()))?;
        let mut cursor = SqliteCursor {
            rows,
            columns,
            current: None,
        };
        consume(&mut cursor)
    }

    fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }

    fn begin(&mut self) -> Result<()> {
        self.execute_batch("BEGIN")
    }

    fn commit(&mut self) -> Result<()> {
        self.execute_batch("COMMIT")
    }

    fn rollback(&mut self) -> Result<()> {
        self.execute_batch("ROLLBACK")
    }
}

/// Forward cursor over a running rusqlite query.
struct SqliteCursor<'s> {
    rows: rusqlite::Rows<'s>,
    columns: Vec<String>,
    current: Option<Vec<SqlValue>>,
}

impl Row for SqliteCursor<'_> {
    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn column_name(&self, index: usize) -> Result<&str> {
        check_column(index, self.columns.len())?;
        Ok(&self.columns[index - 1])
    }

    fn value(&self, index: usize) -> Result<&SqlValue> {
        let row = self.current.as_ref().ok_or(Error::NoCurrentRow)?;
        check_column(index, row.len())?;
        Ok(&row[index - 1])
    }
}

impl Cursor for SqliteCursor<'_> {
    fn advance(&mut self) -> Result<bool> {
        let count = self.columns.len();
        self.current = match self.rows.next()? {
            Some(row) => Some(
                (0..count)
                    .map(|i| from_value_ref(row.get_ref(i)?, i + 1))
                    .collect::<Result<Vec<_>>>()?,
            ),
            None => None,
        };
        Ok(self.current.is_some())
    }
}
