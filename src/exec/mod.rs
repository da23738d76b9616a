//! Execution surface: run rendered templates against a backend connection.
//!
//! - [`Connection`]: the backend collaborator (statements, cursors,
//!   transaction control, capability probe)
//! - [`Session`]: one borrowed connection plus registry and config
//! - [`Executor`]: provider-backed units of work with retry
//! - [`run_in_transaction`]: join-or-begin transaction helper

mod executor;
mod provider;
mod retry;
mod session;
mod transaction;

pub use executor::Executor;
pub use provider::{ConnectionProvider, SingleConnection};
pub use retry::{NoRetry, RetryPolicy, TransientRetry};
pub use session::Session;
pub use transaction::run_in_transaction;

use crate::cursor::{Cursor, Params};
use crate::error::{Error, Result};
use crate::render::BatchStatement;

/// Optional backend features, probed once per connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// `update_batch` and `update_batch_literal` are implemented.
    pub batch: bool,
    /// `update_large` is implemented.
    pub large_counts: bool,
}

/// A backend connection.
///
/// Optional methods default to `Unsupported`; [`Session`] only calls them
/// when [`Connection::capabilities`] advertises them.
pub trait Connection {
    /// Implementations should probe once and cache the answer.
    fn capabilities(&self) -> Capabilities;

    /// Run a statement, returning the affected row count.
    fn update(&mut self, sql: &str, params: &Params) -> Result<i32>;

    /// `update` with a 64-bit row count.
    fn update_large(&mut self, _sql: &str, _params: &Params) -> Result<i64> {
        Err(Error::Unsupported("large update counts"))
    }

    /// One SQL text executed once per parameter row.
    fn update_batch(&mut self, _batch: &BatchStatement) -> Result<Vec<i64>> {
        Err(Error::Unsupported("batch updates"))
    }

    /// Fully rendered statements executed as one batch.
    fn update_batch_literal(&mut self, _statements: &[String]) -> Result<Vec<i64>> {
        Err(Error::Unsupported("literal batch updates"))
    }

    /// Run a query and hand its cursor to `consume`.
    ///
    /// The cursor is only valid for the duration of the call.
    fn query(
        &mut self,
        sql: &str,
        params: &Params,
        consume: &mut dyn FnMut(&mut dyn Cursor) -> Result<()>,
    ) -> Result<()>;

    /// A transaction is open on this connection.
    fn in_transaction(&self) -> bool;

    fn begin(&mut self) -> Result<()>;

    fn commit(&mut self) -> Result<()>;

    fn rollback(&mut self) -> Result<()>;
}

impl<C: Connection + ?Sized> Connection for &mut C {
    fn capabilities(&self) -> Capabilities {
        (**self).capabilities()
    }

    fn update(&mut self, sql: &str, params: &Params) -> Result<i32> {
        (**self).update(sql, params)
    }

    fn update_large(&mut self, sql: &str, params: &Params) -> Result<i64> {
        (**self).update_large(sql, params)
    }

    fn update_batch(&mut self, batch: &BatchStatement) -> Result<Vec<i64>> {
        (**self).update_batch(batch)
    }

    fn update_batch_literal(&mut self, statements: &[String]) -> Result<Vec<i64>> {
        (**self).update_batch_literal(statements)
    }

    fn query(
        &mut self,
        sql: &str,
        params: &Params,
        consume: &mut dyn FnMut(&mut dyn Cursor) -> Result<()>,
    ) -> Result<()> {
        (**self).query(sql, params, consume)
    }

    fn in_transaction(&self) -> bool {
        (**self).in_transaction()
    }

    fn begin(&mut self) -> Result<()> {
        (**self).begin()
    }

    fn commit(&mut self) -> Result<()> {
        (**self).commit()
    }

    fn rollback(&mut self) -> Result<()> {
        (**self).rollback()
    }
}
