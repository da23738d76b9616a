//! One borrowed connection with a registry and rendering config.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use super::{Capabilities, Connection};
use crate::codec::CodecRegistry;
use crate::config::{ExecutorConfig, Rendering};
use crate::consume::{Consume, as_map_of, first_of, first_or_none_of, list_of};
use crate::cursor::{Cursor, Params};
use crate::error::{Error, Result};
use crate::render::{literal, literal_batch, parameterized, parameterized_batch};
use crate::template::Template;

/// Executes templates on one connection.
///
/// Capabilities are read once when the session is created.
pub struct Session<'c, C: Connection + ?Sized> {
    conn: &'c mut C,
    registry: &'c CodecRegistry,
    config: &'c ExecutorConfig,
    capabilities: Capabilities,
}

impl<'c, C: Connection + ?Sized> Session<'c, C> {
    pub fn new(conn: &'c mut C, registry: &'c CodecRegistry, config: &'c ExecutorConfig) -> Self {
        let capabilities = conn.capabilities();
        Self {
            conn,
            registry,
            config,
            capabilities,
        }
    }

    pub fn registry(&self) -> &CodecRegistry {
        self.registry
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// The underlying connection, for transaction control and raw SQL.
    pub fn connection(&mut self) -> &mut C {
        &mut *self.conn
    }

    fn render(&self, template: &Template) -> Result<(String, Params)> {
        match self.config.rendering {
            Rendering::Parameterized => {
                let stmt = parameterized(template, self.registry, self.config.placeholders)?;
                Ok((stmt.sql, stmt.params))
            }
            Rendering::Literal => Ok((literal(template, self.registry)?, Params::new())),
        }
    }

    /// Row count of one statement, widened to `i64` when the backend only
    /// reports narrow counts.
    fn run_update(&mut self, sql: &str, params: &Params) -> Result<i64> {
        if self.capabilities.large_counts {
            self.conn.update_large(sql, params)
        } else {
            self.conn.update(sql, params).map(i64::from)
        }
    }

    // ==================== Statements ====================

    /// Run a statement, ignoring its row count.
    pub fn execute(&mut self, template: &Template) -> Result<()> {
        self.update(template).map(|_| ())
    }

    /// Run a statement and return its row count.
    pub fn update(&mut self, template: &Template) -> Result<i64> {
        let (sql, params) = self.render(template)?;
        self.run_update(&sql, &params)
    }

    /// Run a batch template, one row count per batch row.
    ///
    /// Uses the backend's batch call when it has one, and one `update` per
    /// row otherwise. A zero-row batch runs nothing.
    pub fn update_batch(&mut self, template: &Template) -> Result<Vec<i64>> {
        match self.config.rendering {
            Rendering::Parameterized => {
                let batch = parameterized_batch(template, self.registry, self.config.placeholders)?;
                if batch.is_empty() {
                    return Ok(Vec::new());
                }
                if self.capabilities.batch {
                    return self.conn.update_batch(&batch);
                }
                debug!(rows = batch.len(), "backend has no batch support; running per row");
                batch
                    .rows
                    .iter()
                    .map(|params| self.run_update(&batch.sql, params))
                    .collect()
            }
            Rendering::Literal => {
                let statements = literal_batch(template, self.registry)?;
                if statements.is_empty() {
                    return Ok(Vec::new());
                }
                if self.capabilities.batch {
                    return self.conn.update_batch_literal(&statements);
                }
                debug!(
                    rows = statements.len(),
                    "backend has no batch support; running per row"
                );
                let empty = Params::new();
                statements
                    .iter()
                    .map(|sql| self.run_update(sql, &empty))
                    .collect()
            }
        }
    }

    // ==================== Queries ====================

    /// Run a query and consume its cursor with `strategy`.
    pub fn query<S: Consume>(&mut self, template: &Template, strategy: S) -> Result<S::Output> {
        let (sql, params) = self.render(template)?;
        let registry = self.registry;
        let mut output = None;
        self.conn.query(&sql, &params, &mut |cursor: &mut dyn Cursor| {
            output = Some(strategy.consume(registry, cursor)?);
            Ok(())
        })?;
        output.ok_or_else(|| Error::backend("backend returned no cursor", false))
    }

    pub fn query_first<T: 'static>(&mut self, template: &Template) -> Result<T> {
        self.query(template, first_of::<T>())
    }

    pub fn query_first_or_none<T: 'static>(&mut self, template: &Template) -> Result<Option<T>> {
        self.query(template, first_or_none_of::<T>())
    }

    pub fn query_list<T: 'static>(&mut self, template: &Template) -> Result<Vec<T>> {
        self.query(template, list_of::<T>())
    }

    pub fn query_map<K, V>(&mut self, template: &Template) -> Result<BTreeMap<K, V>>
    where
        K: Ord + fmt::Debug + 'static,
        V: 'static,
    {
        self.query(template, as_map_of::<K, V>())
    }
}
