//! Connection lending.

use std::sync::Mutex;

use super::Connection;
use crate::error::{Error, Result};

/// Lends one connection for one logical call.
pub trait ConnectionProvider: Send + Sync {
    type Conn: Connection;

    fn with_connection<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Self::Conn) -> Result<R>;
}

/// A single connection shared behind a mutex. Calls are serialized.
#[derive(Debug)]
pub struct SingleConnection<C> {
    conn: Mutex<C>,
}

impl<C: Connection> SingleConnection<C> {
    pub fn new(conn: C) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn into_inner(self) -> Result<C> {
        self.conn.into_inner().map_err(|_| poisoned())
    }
}

fn poisoned() -> Error {
    Error::backend("connection mutex poisoned", false)
}

impl<C: Connection + Send> ConnectionProvider for SingleConnection<C> {
    type Conn = C;

    fn with_connection<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut C) -> Result<R>,
    {
        let mut conn = self.conn.lock().map_err(|_| poisoned())?;
        f(&mut *conn)
    }
}
