//! Provider-backed executor: every call is one unit of work.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::thread;

use tracing::warn;

use super::{
    Connection, ConnectionProvider, NoRetry, RetryPolicy, Session, TransientRetry,
    run_in_transaction,
};
use crate::codec::CodecRegistry;
use crate::config::ExecutorConfig;
use crate::consume::Consume;
use crate::error::Result;
use crate::template::Template;

/// Runs templates on connections lent by a [`ConnectionProvider`].
///
/// A failed unit of work is re-run according to the retry policy, but only
/// when the connection had no ambient transaction when it started.
pub struct Executor<P> {
    provider: P,
    registry: Arc<CodecRegistry>,
    config: ExecutorConfig,
    retry: Arc<dyn RetryPolicy>,
}

impl<P: ConnectionProvider> Executor<P> {
    pub fn new(provider: P, registry: Arc<CodecRegistry>) -> Self {
        Self::with_config(provider, registry, ExecutorConfig::default())
    }

    /// Retry policy comes from `config.retry`: `TransientRetry` when more
    /// than one attempt is allowed, `NoRetry` otherwise.
    pub fn with_config(provider: P, registry: Arc<CodecRegistry>, config: ExecutorConfig) -> Self {
        let retry: Arc<dyn RetryPolicy> = if config.retry.max_attempts > 1 {
            Arc::new(TransientRetry::from(&config.retry))
        } else {
            Arc::new(NoRetry)
        };
        Self {
            provider,
            registry,
            config,
            retry,
        }
    }

    pub fn with_retry_policy(mut self, policy: impl RetryPolicy + 'static) -> Self {
        self.retry = Arc::new(policy);
        self
    }

    pub fn registry(&self) -> &Arc<CodecRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn run<R, F>(&self, transactional: bool, mut f: F) -> Result<R>
    where
        F: FnMut(&mut Session<'_, P::Conn>) -> Result<R>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut ambient = false;
            let result = self.provider.with_connection(|conn| {
                ambient = conn.in_transaction();
                if transactional {
                    run_in_transaction(conn, |conn| {
                        f(&mut Session::new(conn, &self.registry, &self.config))
                    })
                } else {
                    f(&mut Session::new(conn, &self.registry, &self.config))
                }
            });
            let err = match result {
                Ok(value) => return Ok(value),
                Err(err) if ambient => return Err(err),
                Err(err) => err,
            };
            let Some(delay) = self.retry.next_delay(attempt, &err) else {
                return Err(err);
            };
            warn!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "unit of work failed, retrying"
            );
            thread::sleep(delay);
        }
    }

    /// Run `f` with a session, outside of any transaction this executor
    /// would start.
    pub fn with_session<R, F>(&self, f: F) -> Result<R>
    where
        F: FnMut(&mut Session<'_, P::Conn>) -> Result<R>,
    {
        self.run(false, f)
    }

    /// Run `f` inside a transaction (joining an ambient one if present).
    pub fn transaction<R, F>(&self, f: F) -> Result<R>
    where
        F: FnMut(&mut Session<'_, P::Conn>) -> Result<R>,
    {
        self.run(true, f)
    }

    pub fn execute(&self, template: &Template) -> Result<()> {
        self.run(false, |s| s.execute(template))
    }

    pub fn update(&self, template: &Template) -> Result<i64> {
        self.run(false, |s| s.update(template))
    }

    pub fn update_batch(&self, template: &Template) -> Result<Vec<i64>> {
        self.run(false, |s| s.update_batch(template))
    }

    pub fn query<S: Consume>(&self, template: &Template, strategy: S) -> Result<S::Output> {
        self.run(false, |s| s.query(template, &strategy))
    }

    pub fn query_first<T: 'static>(&self, template: &Template) -> Result<T> {
        self.run(false, |s| s.query_first(template))
    }

    pub fn query_first_or_none<T: 'static>(&self, template: &Template) -> Result<Option<T>> {
        self.run(false, |s| s.query_first_or_none(template))
    }

    pub fn query_list<T: 'static>(&self, template: &Template) -> Result<Vec<T>> {
        self.run(false, |s| s.query_list(template))
    }

    pub fn query_map<K, V>(&self, template: &Template) -> Result<BTreeMap<K, V>>
    where
        K: Ord + fmt::Debug + 'static,
        V: 'static,
    {
        self.run(false, |s| s.query_map(template))
    }
}

impl<P: fmt::Debug> fmt::Debug for Executor<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("provider", &self.provider)
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::Error;
    use crate::exec::SingleConnection;
    use crate::exec::testing::{Call, FakeConnection};

    fn busy() -> Error {
        Error::backend("database is locked", true)
    }

    fn executor(conn: FakeConnection) -> Executor<SingleConnection<FakeConnection>> {
        Executor::new(SingleConnection::new(conn), Arc::new(CodecRegistry::default()))
            .with_retry_policy(TransientRetry::new(
                3,
                Duration::from_millis(1),
                Duration::from_millis(1),
            ))
    }

    fn calls(executor: Executor<SingleConnection<FakeConnection>>) -> Vec<Call> {
        executor.provider.into_inner().unwrap().calls
    }

    #[test]
    fn test_transient_failure_retried() {
        let mut conn = FakeConnection::default();
        conn.update_errors.push_back(busy());
        let executor = executor(conn);
        assert_eq!(executor.update(&Template::sql("delete from t")).unwrap(), 1);
        assert_eq!(calls(executor).len(), 2);
    }

    #[test]
    fn test_gives_up_after_policy_limit() {
        let mut conn = FakeConnection::default();
        conn.update_errors.extend([busy(), busy(), busy(), busy()]);
        let executor = executor(conn);
        assert!(executor.update(&Template::sql("delete from t")).is_err());
        assert_eq!(calls(executor).len(), 3);
    }

    #[test]
    fn test_no_retry_inside_ambient_transaction() {
        let mut conn = FakeConnection {
            transaction: true,
            ..FakeConnection::default()
        };
        conn.update_errors.push_back(busy());
        let executor = executor(conn);
        assert!(executor.update(&Template::sql("delete from t")).is_err());
        assert_eq!(calls(executor).len(), 1);
    }

    #[test]
    fn test_transaction_retries_whole_unit() {
        let mut conn = FakeConnection::default();
        conn.update_errors.push_back(busy());
        let executor = executor(conn);
        executor
            .transaction(|s| {
                s.update(&Template::sql("a"))?;
                s.update(&Template::sql("b"))
            })
            .unwrap();
        assert_eq!(
            calls(executor),
            vec![
                Call::Begin,
                Call::Update("a".into(), Default::default()),
                Call::Rollback,
                Call::Begin,
                Call::Update("a".into(), Default::default()),
                Call::Update("b".into(), Default::default()),
                Call::Commit,
            ]
        );
    }

    #[test]
    fn test_retry_from_config() {
        let config = ExecutorConfig::from_toml_str("[retry]\nmax_attempts = 2\ninitial_backoff_ms = 1").unwrap();
        let mut conn = FakeConnection::default();
        conn.update_errors.extend([busy(), busy()]);
        let executor = Executor::with_config(
            SingleConnection::new(conn),
            Arc::new(CodecRegistry::default()),
            config,
        );
        assert!(executor.update(&Template::sql("x")).is_err());
        assert_eq!(calls(executor).len(), 2);
    }
}
