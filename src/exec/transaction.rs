//! Join-or-begin transaction helper.

use tracing::warn;

use super::Connection;
use crate::error::Result;

/// Run `f` inside a transaction.
///
/// If `conn` already has one open, `f` joins it and nothing is committed or
/// rolled back here. Otherwise a transaction is begun, committed when `f`
/// returns `Ok`, and rolled back when `f` (or the commit) fails. A failed
/// rollback is logged; the original error is returned.
pub fn run_in_transaction<C, R, F>(conn: &mut C, f: F) -> Result<R>
where
    C: Connection + ?Sized,
    F: FnOnce(&mut C) -> Result<R>,
{
    if conn.in_transaction() {
        return f(&mut *conn);
    }

    conn.begin()?;
    let result = f(&mut *conn).and_then(|value| conn.commit().map(|()| value));
    if result.is_err() && conn.in_transaction() {
        if let Err(err) = conn.rollback() {
            warn!(error = %err, "rollback failed");
        }
    }
    result
}
