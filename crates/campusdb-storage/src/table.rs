//! Table store - the canonical in-memory tables.
//!
//! Reads hand out copies. Writes replace the table's content in memory and
//! then flush it through the persistence bridge. A failed flush is reported
//! as `Error::Storage` but the in-memory change stays: there is no rollback.

use crate::persistence::TablePersistence;
use campusdb_core::{Error, Record, Result};
use indexmap::IndexMap;
use tracing::{error, info};

/// A named, ordered collection of records with a primary-key field.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Table name
    pub name: String,
    /// Field holding each record's identifier
    pub primary_key: String,
    records: Vec<Record>,
}

impl Table {
    /// Records in insertion order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }
}

/// In-memory tables backed by durable slots.
pub struct TableStore {
    tables: IndexMap<String, Table>,
    persistence: TablePersistence,
}

impl TableStore {
    /// Creates an empty store flushing through `persistence`.
    pub fn new(persistence: TablePersistence) -> Self {
        Self {
            tables: IndexMap::new(),
            persistence,
        }
    }

    /// Registers a table. Prior durable data wins over `seed`; whichever is
    /// used is written back immediately.
    pub fn create_table(
        &mut self,
        name: &str,
        primary_key: &str,
        seed: Vec<Record>,
    ) -> Result<()> {
        let (records, source) = match self.persistence.load(name) {
            Some(records) => (records, "storage"),
            None => (seed, "seed"),
        };

        info!(
            database = self.persistence.database(),
            table = name,
            records = records.len(),
            source,
            "Created table"
        );

        self.tables.insert(
            name.to_string(),
            Table {
                name: name.to_string(),
                primary_key: primary_key.to_string(),
                records,
            },
        );
        self.flush(name)
    }

    /// Registered table names in creation order.
    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    /// Borrow a table.
    pub fn table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::UnknownTable(name.to_string()))
    }

    /// The table's primary-key field.
    pub fn primary_key(&self, name: &str) -> Result<&str> {
        Ok(&self.table(name)?.primary_key)
    }

    /// Copy of the table's records.
    pub fn scan(&self, name: &str) -> Result<Vec<Record>> {
        Ok(self.table(name)?.records().to_vec())
    }

    /// Appends one record and flushes.
    pub fn append(&mut self, name: &str, record: Record) -> Result<()> {
        self.table_mut(name)?.records.push(record);
        self.flush(name)
    }

    /// Applies `update` to every record and flushes if any reported a change.
    /// Returns the number of changed records.
    pub fn update_where<F>(&mut self, name: &str, mut update: F) -> Result<usize>
    where
        F: FnMut(&mut Record) -> bool,
    {
        let table = self.table_mut(name)?;
        let mut changed = 0;
        for record in table.records.iter_mut() {
            if update(record) {
                changed += 1;
            }
        }

        if changed > 0 {
            self.flush(name)?;
        }
        Ok(changed)
    }

    /// Removes every record matching `predicate` and flushes if any went.
    /// Returns the number removed.
    pub fn remove_where<F>(&mut self, name: &str, mut predicate: F) -> Result<usize>
    where
        F: FnMut(&Record) -> bool,
    {
        let table = self.table_mut(name)?;
        let before = table.records.len();
        table.records.retain(|record| !predicate(record));
        let removed = before - table.records.len();

        if removed > 0 {
            self.flush(name)?;
        }
        Ok(removed)
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| Error::UnknownTable(name.to_string()))
    }

    fn flush(&self, name: &str) -> Result<()> {
        let table = self.table(name)?;
        self.persistence
            .save(name, &table.records)
            .inspect_err(|e| error!(table = name, error = %e, "Failed to persist table"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::{KvStore, MemoryStore};
    use campusdb_core::Value;
    use std::sync::Arc;

    fn store_over(kv: Arc<MemoryStore>) -> TableStore {
        TableStore::new(TablePersistence::new(kv, "erp_system"))
    }

    fn seed() -> Vec<Record> {
        vec![
            Record::new().with("id", "a").with("status", "pending"),
            Record::new().with("id", "b").with("status", "verified"),
        ]
    }

    #[test]
    fn test_create_table_persists_seed() {
        let kv = Arc::new(MemoryStore::new());
        let mut store = store_over(kv.clone());
        store.create_table("documents", "id", seed()).unwrap();

        assert_eq!(store.scan("documents").unwrap(), seed());
        assert!(kv.get("mysql_erp_system_documents").unwrap().is_some());
        assert_eq!(store.primary_key("documents").unwrap(), "id");

        let table = store.table("documents").unwrap();
        assert_eq!(table.name, "documents");
        assert_eq!(table.records(), seed().as_slice());
    }

    #[test]
    fn test_prior_data_wins_over_seed() {
        let kv = Arc::new(MemoryStore::new());
        kv.set("mysql_erp_system_documents", r#"[{"id":"z"}]"#)
            .unwrap();

        let mut store = store_over(kv);
        store.create_table("documents", "id", seed()).unwrap();

        assert_eq!(
            store.scan("documents").unwrap(),
            vec![Record::new().with("id", "z")]
        );
    }

    #[test]
    fn test_scan_returns_a_copy() {
        let mut store = store_over(Arc::new(MemoryStore::new()));
        store.create_table("documents", "id", seed()).unwrap();

        let mut copy = store.scan("documents").unwrap();
        copy.clear();
        assert_eq!(store.scan("documents").unwrap().len(), 2);
    }

    #[test]
    fn test_unknown_table() {
        let store = store_over(Arc::new(MemoryStore::new()));
        assert!(matches!(store.scan("courses"), Err(Error::UnknownTable(_))));
    }

    #[test]
    fn test_update_and_remove_counts() {
        let kv = Arc::new(MemoryStore::new());
        let mut store = store_over(kv.clone());
        store.create_table("documents", "id", seed()).unwrap();

        let changed = store
            .update_where("documents", |r| {
                if r.get_str("id") == Some("a") {
                    r.insert("status", "verified");
                    true
                } else {
                    false
                }
            })
            .unwrap();
        assert_eq!(changed, 1);

        let removed = store
            .remove_where("documents", |r| r.get("status") == Some(&Value::from("verified")))
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(
            kv.get("mysql_erp_system_documents").unwrap(),
            Some("[]".to_string())
        );
    }

    #[test]
    fn test_failed_flush_keeps_memory_change() {
        let kv = Arc::new(MemoryStore::with_quota(120));
        let mut store = store_over(kv.clone());
        store.create_table("documents", "id", Vec::new()).unwrap();

        let big = Record::new().with("id", "c").with("blob", "x".repeat(200));
        let err = store.append("documents", big).unwrap_err();
        assert!(matches!(err, Error::Storage(_)));

        assert_eq!(store.scan("documents").unwrap().len(), 1);
        assert_eq!(
            kv.get("mysql_erp_system_documents").unwrap(),
            Some("[]".to_string())
        );
    }
}
