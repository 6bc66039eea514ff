// Common test utilities for campusdb integration tests

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use campusdb::{Database, DatabaseConfig, KvStore, MemoryStore};
use tempfile::TempDir;

/// Test fixture that creates a temporary slot directory
pub struct PortalTestFixture {
    #[allow(dead_code)]
    pub temp_dir: TempDir,
    pub data_path: PathBuf,
}

impl PortalTestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_path = temp_dir.path().join("portal_data");

        Self {
            temp_dir,
            data_path,
        }
    }

    pub fn open(&self) -> Database {
        Database::open_dir(&self.data_path).expect("Failed to open database")
    }

    /// Path of the slot file holding `table` in the default database.
    #[allow(dead_code)]
    pub fn slot_file(&self, table: &str) -> PathBuf {
        self.data_path.join(format!("mysql_erp_system_{}.slot", table))
    }

    #[allow(dead_code)]
    pub fn list_slots(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(&self.data_path)
            .expect("Failed to read data directory")
            .filter_map(|entry| {
                entry
                    .ok()
                    .and_then(|e| e.file_name().to_str().map(String::from))
            })
            .collect();
        names.sort();
        names
    }
}

impl Default for PortalTestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Opens a database over a shared in-memory slot store.
#[allow(dead_code)]
pub fn open_shared(store: &Arc<MemoryStore>) -> Database {
    let store: Arc<dyn KvStore> = store.clone();
    Database::open(DatabaseConfig::default(), store).expect("Failed to open database")
}
