//! Persistence bridge between tables and the durable slot store.
//!
//! Each table lives in one slot keyed `mysql_<database>_<table>` holding a
//! JSON array of records. Loading never fails: a missing slot means "no
//! prior data", and a slot that cannot be read or decoded is logged and
//! treated the same way so bad cache contents never block startup.

use crate::kv::KvStore;
use campusdb_core::{Error, Record, Result};
use std::sync::Arc;
use tracing::{debug, warn};

/// Prefix shared by every durable key.
pub const KEY_PREFIX: &str = "mysql";

/// Encodes and decodes tables under database-scoped keys.
#[derive(Clone)]
pub struct TablePersistence {
    store: Arc<dyn KvStore>,
    database: String,
}

impl TablePersistence {
    /// Creates a bridge writing into `store` under the logical `database`.
    pub fn new(store: Arc<dyn KvStore>, database: impl Into<String>) -> Self {
        Self {
            store,
            database: database.into(),
        }
    }

    /// Logical database name.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Durable key of a table.
    pub fn key(&self, table: &str) -> String {
        format!("{}_{}_{}", KEY_PREFIX, self.database, table)
    }

    /// Writes `records` as the table's durable content.
    ///
    /// # Errors
    ///
    /// Returns `Error::Storage` when the slot store rejects the write.
    pub fn save(&self, table: &str, records: &[Record]) -> Result<()> {
        let key = self.key(table);
        let json =
            serde_json::to_string(records).map_err(|e| Error::Serialization(e.to_string()))?;

        self.store.set(&key, &json).map_err(|e| match e {
            Error::Storage(_) => e,
            other => Error::Storage(format!("Failed to write '{}': {}", key, other)),
        })?;

        debug!(table, records = records.len(), bytes = json.len(), "Saved table");
        Ok(())
    }

    /// Reads a table's durable content, or `None` when there is no usable
    /// prior data.
    pub fn load(&self, table: &str) -> Option<Vec<Record>> {
        let key = self.key(table);

        let text = match self.store.get(&key) {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(e) => {
                warn!(table, error = %e, "Error reading table data, starting from seed");
                return None;
            }
        };

        match serde_json::from_str::<Vec<Record>>(&text) {
            Ok(records) => {
                debug!(table, records = records.len(), "Loaded table");
                Some(records)
            }
            Err(e) => {
                let warning = Error::StorageDecode {
                    key,
                    reason: e.to_string(),
                };
                warn!(table, error = %warning, "Error parsing table data, starting from seed");
                None
            }
        }
    }
}
