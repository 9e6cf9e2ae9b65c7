//! SQL execution transport.
//!
//! The orchestrator only ever needs three things from the database driver:
//! open a connection to a URI, execute a statement on it, close it. That
//! contract lives behind [`SqlTransport`] / [`SqlConnection`] so the template
//! manager and readiness poller can be exercised against fakes; production
//! uses sqlx's `PgConnection`.

use std::path::PathBuf;

use async_trait::async_trait;
use sqlx::{Connection, Executor, PgConnection};
use tracing::debug;

use dbdock_core::error::{DbdockError, Result};

/// SQLSTATE for `invalid_catalog_name`, raised when the target of a
/// `CREATE DATABASE ... WITH TEMPLATE` or a `DROP DATABASE` does not exist.
const NOT_FOUND_CODE: &str = "3D000";

/// A failed transport operation, classified just enough to drive the
/// clone-from-template fallback without matching on message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlFailure {
    /// The named database (or clone template) does not exist.
    DatabaseNotFound(String),
    /// Any other driver or engine failure.
    Other(String),
}

impl SqlFailure {
    /// Promote to a [`DbdockError`], attaching caller context (file name,
    /// database name) to the non-classified case.
    pub fn into_error(self, context: impl Into<String>) -> DbdockError {
        match self {
            SqlFailure::DatabaseNotFound(msg) => DbdockError::DatabaseNotFound(msg),
            SqlFailure::Other(message) => DbdockError::Sql {
                context: context.into(),
                message,
            },
        }
    }
}

impl From<sqlx::Error> for SqlFailure {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.code().as_deref() == Some(NOT_FOUND_CODE) {
                return SqlFailure::DatabaseNotFound(db.message().to_string());
            }
        }
        SqlFailure::Other(err.to_string())
    }
}

pub type SqlResult<T> = std::result::Result<T, SqlFailure>;

/// Connection factory: opens a handle for a connection URI.
#[async_trait]
pub trait SqlTransport: Send + Sync {
    async fn connect(&self, uri: &str) -> SqlResult<Box<dyn SqlConnection>>;
}

/// One open database handle.
#[async_trait]
pub trait SqlConnection: Send {
    /// Execute raw SQL; may contain multiple statements.
    async fn execute(&mut self, sql: &str) -> SqlResult<()>;

    /// Execute a statement with a single text parameter bound to `$1`.
    async fn execute_with_param(&mut self, sql: &str, param: &str) -> SqlResult<()>;

    /// Close gracefully.
    async fn close(self: Box<Self>) -> SqlResult<()>;
}

/// Production transport over sqlx.
#[derive(Debug, Clone, Default)]
pub struct PgTransport;

#[async_trait]
impl SqlTransport for PgTransport {
    async fn connect(&self, uri: &str) -> SqlResult<Box<dyn SqlConnection>> {
        let conn = PgConnection::connect(uri).await?;
        Ok(Box::new(PgSqlConnection { conn }))
    }
}

struct PgSqlConnection {
    conn: PgConnection,
}

#[async_trait]
impl SqlConnection for PgSqlConnection {
    async fn execute(&mut self, sql: &str) -> SqlResult<()> {
        // `raw_sql(sql).execute(&mut self.conn)` trips a rustc "implementation
        // of `Executor` is not general enough" limitation inside async_trait;
        // calling through the `Executor` method is equivalent and compiles.
        self.conn.execute(sqlx::raw_sql(sql)).await?;
        Ok(())
    }

    async fn execute_with_param(&mut self, sql: &str, param: &str) -> SqlResult<()> {
        sqlx::query(sql).bind(param).execute(&mut self.conn).await?;
        Ok(())
    }

    async fn close(self: Box<Self>) -> SqlResult<()> {
        self.conn.close().await?;
        Ok(())
    }
}

/// Apply SQL files in order on a single connection to `uri`, aborting on the
/// first failure with the offending file as context.
pub async fn apply_files(
    transport: &dyn SqlTransport,
    uri: &str,
    files: &[PathBuf],
) -> Result<()> {
    if files.is_empty() {
        return Ok(());
    }

    let mut conn = transport
        .connect(uri)
        .await
        .map_err(|e| e.into_error("connecting for script application"))?;

    for file in files {
        debug!(file = %file.display(), "applying script");
        let sql = tokio::fs::read_to_string(file).await.map_err(|e| {
            DbdockError::Sql {
                context: file.display().to_string(),
                message: format!("read failed: {}", e),
            }
        })?;

        if let Err(failure) = conn.execute(&sql).await {
            return Err(failure.into_error(file.display().to_string()));
        }
    }

    conn.close()
        .await
        .map_err(|e| e.into_error("closing script connection"))?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod fake {
    //! Scripted in-memory transport for unit tests.

    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct FakeState {
        executed: Vec<(String, String)>,
        connect_failures_remaining: usize,
        connect_always_fails: bool,
        rules: Vec<(String, SqlFailure)>,
    }

    /// Transport whose connections record every statement and fail according
    /// to substring rules installed by the test.
    #[derive(Clone, Default)]
    pub(crate) struct FakeTransport {
        state: Arc<Mutex<FakeState>>,
    }

    impl FakeTransport {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        /// Fail the next `n` connection attempts.
        pub(crate) fn fail_connects(&self, n: usize) {
            self.state.lock().expect("fake state").connect_failures_remaining = n;
        }

        /// Fail every connection attempt.
        pub(crate) fn always_fail_connects(&self) {
            self.state.lock().expect("fake state").connect_always_fails = true;
        }

        /// Any executed statement containing `fragment` yields `failure`.
        pub(crate) fn fail_statement(&self, fragment: &str, failure: SqlFailure) {
            self.state
                .lock()
                .expect("fake state")
                .rules
                .push((fragment.to_string(), failure));
        }

        /// Every `(uri, sql)` pair executed so far, in order.
        pub(crate) fn executed(&self) -> Vec<(String, String)> {
            self.state.lock().expect("fake state").executed.clone()
        }

        /// Count of executed statements containing `fragment`.
        pub(crate) fn count_containing(&self, fragment: &str) -> usize {
            self.executed()
                .iter()
                .filter(|(_, sql)| sql.contains(fragment))
                .count()
        }
    }

    #[async_trait]
    impl SqlTransport for FakeTransport {
        async fn connect(&self, uri: &str) -> SqlResult<Box<dyn SqlConnection>> {
            {
                let mut state = self.state.lock().expect("fake state");
                if state.connect_always_fails {
                    return Err(SqlFailure::Other("connection refused".to_string()));
                }
                if state.connect_failures_remaining > 0 {
                    state.connect_failures_remaining -= 1;
                    return Err(SqlFailure::Other("connection refused".to_string()));
                }
            }
            Ok(Box::new(FakeConnection {
                uri: uri.to_string(),
                state: self.state.clone(),
            }))
        }
    }

    struct FakeConnection {
        uri: String,
        state: Arc<Mutex<FakeState>>,
    }

    #[async_trait]
    impl SqlConnection for FakeConnection {
        async fn execute(&mut self, sql: &str) -> SqlResult<()> {
            let mut state = self.state.lock().expect("fake state");
            if let Some((_, failure)) =
                state.rules.iter().find(|(fragment, _)| sql.contains(fragment))
            {
                return Err(failure.clone());
            }
            state.executed.push((self.uri.clone(), sql.to_string()));
            Ok(())
        }

        async fn execute_with_param(&mut self, sql: &str, param: &str) -> SqlResult<()> {
            let rendered = sql.replace("$1", param);
            self.execute(&rendered).await
        }

        async fn close(self: Box<Self>) -> SqlResult<()> {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeTransport;
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn apply_files_runs_scripts_in_order_on_one_connection() {
        let dir = tempfile::tempdir().expect("tempdir");
        let first = dir.path().join("001_schema.sql");
        let second = dir.path().join("002_data.sql");
        fs::write(&first, "create table t (id int);").expect("write");
        fs::write(&second, "insert into t values (1);").expect("write");

        let transport = FakeTransport::new();
        apply_files(&transport, "postgres://u:p@localhost:1/db", &[first, second])
            .await
            .expect("apply");

        let executed = transport.executed();
        assert_eq!(executed.len(), 2);
        assert!(executed[0].1.contains("create table"));
        assert!(executed[1].1.contains("insert into"));
        assert!(executed.iter().all(|(uri, _)| uri.ends_with("/db")));
    }

    #[tokio::test]
    async fn apply_files_wraps_failures_with_the_offending_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bad = dir.path().join("001_bad.sql");
        fs::write(&bad, "create broken;").expect("write");

        let transport = FakeTransport::new();
        transport.fail_statement("broken", SqlFailure::Other("syntax error".to_string()));

        let err = apply_files(&transport, "postgres://u:p@localhost:1/db", &[bad.clone()])
            .await
            .expect_err("must fail");
        let rendered = err.to_string();
        assert!(rendered.contains("001_bad.sql"));
        assert!(rendered.contains("syntax error"));
    }

    #[tokio::test]
    async fn apply_files_is_a_no_op_without_files() {
        let transport = FakeTransport::new();
        transport.always_fail_connects();
        // No files means no connection is even opened.
        apply_files(&transport, "postgres://u:p@localhost:1/db", &[])
            .await
            .expect("no-op");
    }

    #[test]
    fn missing_database_failures_are_classified() {
        let failure = SqlFailure::DatabaseNotFound("template gone".to_string());
        assert!(failure.into_error("ctx").is_database_not_found());

        let other = SqlFailure::Other("boom".to_string());
        let err = other.into_error("002_data.sql");
        assert!(!err.is_database_not_found());
        assert!(err.to_string().contains("002_data.sql"));
    }
}
