//! `DuckDB` connection pool management.

use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use ::duckdb::Connection;

/// Access mode for database connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    ReadOnly,
    ReadWrite,
}

#[derive(Default)]
struct PoolState {
    read_only: Vec<Connection>,
    read_write: Vec<Connection>,
}

impl PoolState {
    fn idle(&mut self, mode: AccessMode) -> &mut Vec<Connection> {
        match mode {
            AccessMode::ReadOnly => &mut self.read_only,
            AccessMode::ReadWrite => &mut self.read_write,
        }
    }
}

struct PoolInner {
    db_path: PathBuf,
    max_idle: usize,
    /// Every pooled handle is cloned from this one, so all of them share a
    /// single database instance.
    root: Mutex<Connection>,
    state: Mutex<PoolState>,
}

/// Keeps a bounded number of idle connections per access mode.
#[derive(Clone)]
pub struct DuckDbConnectionManager {
    inner: Arc<PoolInner>,
}

impl DuckDbConnectionManager {
    /// Opens the database file and prepares an empty pool.
    ///
    /// # Errors
    /// Returns an error if the database file cannot be opened.
    pub fn new(path: impl Into<PathBuf>, max_idle: usize) -> Result<Self, ::duckdb::Error> {
        let db_path = path.into();
        let root = Connection::open(db_path.as_path())?;

        Ok(Self {
            inner: Arc::new(PoolInner {
                db_path,
                max_idle: max_idle.max(1),
                root: Mutex::new(root),
                state: Mutex::new(PoolState::default()),
            }),
        })
    }

    /// Acquire a connection, reusing an idle one when available.
    ///
    /// # Errors
    /// Returns an error if a new handle cannot be cloned or configured.
    pub fn acquire(&self, mode: AccessMode) -> Result<PooledConnection, ::duckdb::Error> {
        // A poisoned lock only means another thread panicked while pushing or
        // popping a connection; the vectors themselves stay consistent.
        let idle = self
            .inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .idle(mode)
            .pop();

        let connection = match idle {
            Some(connection) => connection,
            None => {
                let cloned = self
                    .inner
                    .root
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .try_clone()?;
                configure(cloned, mode)?
            }
        };

        Ok(PooledConnection {
            mode,
            pool: Arc::clone(&self.inner),
            connection: Some(connection),
        })
    }

    #[must_use]
    pub fn db_path(&self) -> &Path {
        self.inner.db_path.as_path()
    }
}

/// A pooled connection that returns to the pool when dropped.
pub struct PooledConnection {
    mode: AccessMode,
    pool: Arc<PoolInner>,
    connection: Option<Connection>,
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        match self.connection.as_ref() {
            Some(connection) => connection,
            None => unreachable!("connection is only taken in Drop"),
        }
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        let Some(connection) = self.connection.take() else {
            return;
        };

        let mut state = self
            .pool
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let idle = state.idle(self.mode);
        if idle.len() < self.pool.max_idle {
            idle.push(connection);
        }
    }
}

fn configure(connection: Connection, mode: AccessMode) -> Result<Connection, ::duckdb::Error> {
    connection.execute_batch("PRAGMA disable_progress_bar;")?;
    tracing::trace!(?mode, "opened pooled duckdb connection");
    Ok(connection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn reuses_released_connections_up_to_limit() {
        let temp = tempdir().expect("tempdir");
        let manager =
            DuckDbConnectionManager::new(temp.path().join("pool.duckdb"), 1).expect("manager");

        let first = manager.acquire(AccessMode::ReadWrite).expect("first");
        let second = manager.acquire(AccessMode::ReadWrite).expect("second");
        drop(first);
        drop(second);

        let state = manager.inner.state.lock().expect("lock");
        assert_eq!(state.read_write.len(), 1);
        assert!(state.read_only.is_empty());
    }

    #[test]
    fn zero_idle_limit_is_raised_to_one() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("limit.duckdb");
        let manager = DuckDbConnectionManager::new(path.as_path(), 0).expect("manager");
        assert_eq!(manager.inner.max_idle, 1);
        assert_eq!(manager.db_path(), path.as_path());
    }

    #[test]
    fn acquiring_leaves_both_locks_free() {
        let temp = tempdir().expect("tempdir");
        let manager =
            DuckDbConnectionManager::new(temp.path().join("locks.duckdb"), 2).expect("manager");

        let held = manager.acquire(AccessMode::ReadOnly).expect("acquire");

        assert!(manager.inner.state.try_lock().is_ok());
        assert!(manager.inner.root.try_lock().is_ok());
        drop(held);
    }

    #[test]
    fn read_handles_see_committed_writes() {
        let temp = tempdir().expect("tempdir");
        let manager =
            DuckDbConnectionManager::new(temp.path().join("shared.duckdb"), 2).expect("manager");

        let reader = manager.acquire(AccessMode::ReadOnly).expect("reader");
        {
            let writer = manager.acquire(AccessMode::ReadWrite).expect("writer");
            writer
                .execute_batch("CREATE TABLE t (v INTEGER); INSERT INTO t VALUES (1), (2);")
                .expect("write");
        }

        let count: i64 = reader
            .query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0))
            .expect("count");
        assert_eq!(count, 2);
    }
}
