//! # campusdb
//!
//! Embedded record store for the admissions portal. Four fixed tables
//! (`users`, `applications`, `documents`, `payments`) live in memory and are
//! mirrored, table by table, into durable key-value slots as JSON arrays.
//!
//! ## Quick Start
//!
//! ```rust
//! use campusdb::{Database, Record, Value};
//!
//! let db = Database::in_memory()?;
//!
//! // Typed helpers
//! let payment = db.record_payment(
//!     Record::new()
//!         .with("user_id", "student-1")
//!         .with("amount", 5000)
//!         .with("payment_type", "admission"),
//! )?;
//! assert!(payment.get_str("id").unwrap().starts_with("pay-"));
//!
//! // Raw statements with positional parameters
//! let rows = db
//!     .query("SELECT * FROM payments WHERE user_id = ?", &[Value::from("student-1")])?
//!     .into_rows()
//!     .unwrap_or_default();
//! assert_eq!(rows.len(), 1);
//! # Ok::<(), campusdb::Error>(())
//! ```
//!
//! ## Statements
//!
//! ```text
//! SELECT * FROM table [WHERE field = value]
//! INSERT INTO table (field, ...) VALUES (?, ...)
//! UPDATE table SET field = value, ... WHERE field = value
//! DELETE FROM table WHERE field = value
//! ```
//!
//! A value is `?`, a quoted string, a number, `TRUE`/`FALSE`/`NULL` or a bare
//! word. WHERE compares text forms case-insensitively.

use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::{debug, info};

pub mod logging;

mod config;
mod executor;
mod portal;
mod seed;

pub use config::DatabaseConfig;
pub use executor::{Executor, QueryResult};
pub use seed::{demo_users, APPLICATIONS, DOCUMENTS, PAYMENTS, USERS};

// Re-export core types
pub use campusdb_core::query::{self, Statement, StatementKind};
pub use campusdb_core::{Error, Record, Result, Value};

// Storage components
pub use campusdb_storage::{FileStore, KvStore, MemoryStore, Table, TablePersistence, TableStore};

use campusdb_core::security::validate_query;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

struct DatabaseInner {
    config: DatabaseConfig,
    connection_id: String,
    tables: RwLock<TableStore>,
}

/// The main database handle.
///
/// Cheap to clone; clones share the same tables. Statements are serialized
/// by a read/write lock, so a statement never observes another one half done.
///
/// # Examples
///
/// ```rust
/// use campusdb::{Database, DatabaseConfig, MemoryStore};
/// use std::sync::Arc;
///
/// let store = Arc::new(MemoryStore::new());
/// let db = Database::open(DatabaseConfig::default(), store.clone())?;
/// assert_eq!(db.get_all_users()?.len(), 3);
///
/// // A second handle over the same slots sees the same data.
/// let reopened = Database::open(DatabaseConfig::default(), store)?;
/// assert_eq!(reopened.get_all_users()?, db.get_all_users()?);
/// # Ok::<(), campusdb::Error>(())
/// ```
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl Database {
    /// Opens the database over a durable slot store.
    ///
    /// Each fixed table is loaded from its slot when one exists and decodes,
    /// otherwise from the seed; either way it is written back immediately.
    pub fn open(config: DatabaseConfig, store: Arc<dyn KvStore>) -> Result<Self> {
        config.validate()?;

        info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            "Connecting to database"
        );
        let now = Utc::now();
        let connection_id = format!("mysql-{:x}", now.timestamp_micros());

        let mut tables = TableStore::new(TablePersistence::new(store, config.database.clone()));
        seed::create_tables(&mut tables, &portal::timestamp(now))?;

        info!(connection_id = %connection_id, "Connected");

        Ok(Database {
            inner: Arc::new(DatabaseInner {
                config,
                connection_id,
                tables: RwLock::new(tables),
            }),
        })
    }

    /// Opens a database whose slots are files under `path`.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use campusdb::Database;
    ///
    /// let db = Database::open_dir("./portal_data")?;
    /// assert!(db.find_user_by_email("admin@example.com")?.is_some());
    /// # Ok::<(), campusdb::Error>(())
    /// ```
    pub fn open_dir<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(DatabaseConfig::default(), Arc::new(FileStore::open(path)?))
    }

    /// Opens a database over a fresh in-memory slot store.
    pub fn in_memory() -> Result<Self> {
        Self::open(DatabaseConfig::default(), Arc::new(MemoryStore::new()))
    }

    /// Parses and executes one statement with positional parameters.
    ///
    /// # Errors
    ///
    /// Parse and validation errors are returned before anything changes.
    /// `Error::Storage` means the in-memory change was applied but could not
    /// be written to the slot store.
    pub fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        let statement = prepare(sql, params)?;

        let executor = Executor::new(params);
        match &statement {
            Statement::Select(select) => {
                let tables = self.read_tables()?;
                executor.select(&tables, select)
            }
            _ => {
                let mut tables = self.write_tables()?;
                executor.execute_mutation(&mut tables, &statement)
            }
        }
    }

    /// Names of the registered tables in creation order.
    pub fn table_names(&self) -> Result<Vec<String>> {
        Ok(self.read_tables()?.table_names())
    }

    /// Identifier assigned when the database opened.
    pub fn connection_id(&self) -> &str {
        &self.inner.connection_id
    }

    /// Configuration the database was opened with.
    pub fn config(&self) -> &DatabaseConfig {
        &self.inner.config
    }

    fn read_tables(&self) -> Result<RwLockReadGuard<'_, TableStore>> {
        self.inner.tables.read().map_err(|_| Error::LockPoisoned)
    }

    /// Exclusive access for statement sequences that must not interleave.
    pub(crate) fn write_tables(&self) -> Result<RwLockWriteGuard<'_, TableStore>> {
        self.inner.tables.write().map_err(|_| Error::LockPoisoned)
    }
}

/// Validates and parses one statement, logging it at debug level.
fn prepare(sql: &str, params: &[Value]) -> Result<Statement> {
    validate_query(sql)?;
    let statement = query::parse(sql)?;

    debug!(
        kind = %statement.kind(),
        table = statement.table(),
        params = params.len(),
        slots = statement.placeholder_count(),
        "Executing query: {}",
        statement
    );
    Ok(statement)
}

/// Runs one statement against tables the caller already holds locked.
pub(crate) fn execute(
    tables: &mut TableStore,
    sql: &str,
    params: &[Value],
) -> Result<QueryResult> {
    let statement = prepare(sql, params)?;
    Executor::new(params).execute_mutation(tables, &statement)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(VERSION, "0.3.0");
    }

    #[test]
    fn test_fixed_tables() {
        let db = Database::in_memory().unwrap();
        assert_eq!(
            db.table_names().unwrap(),
            vec!["users", "applications", "documents", "payments"]
        );
        assert!(db.connection_id().starts_with("mysql-"));
        assert_eq!(db.config().database, "erp_system");
    }

    #[test]
    fn test_unknown_table() {
        let db = Database::in_memory().unwrap();
        let err = db.query("SELECT * FROM courses", &[]).unwrap_err();
        assert!(matches!(err, Error::UnknownTable(ref t) if t == "courses"));
    }

    #[test]
    fn test_unsupported_operation() {
        let db = Database::in_memory().unwrap();
        assert!(matches!(
            db.query("DROP TABLE users", &[]),
            Err(Error::UnsupportedOperation(_))
        ));
        assert!(matches!(db.query("", &[]), Err(Error::UnsupportedOperation(_))));
    }

    #[test]
    fn test_clones_share_tables() {
        let db = Database::in_memory().unwrap();
        let other = db.clone();
        db.query(
            "DELETE FROM users WHERE id = ?",
            &[Value::from("admin-1")],
        )
        .unwrap();
        assert_eq!(other.get_all_users().unwrap().len(), 2);
    }

    #[test]
    fn test_open_rejects_bad_database_name() {
        let config = DatabaseConfig::default().with_database("a/b");
        assert!(Database::open(config, Arc::new(MemoryStore::new())).is_err());
    }
}
