//! # campusdb storage
//!
//! ## ⚠️ Internal Implementation Detail
//!
//! **This crate is an internal implementation detail of campusdb.**
//! Depend on the main `campusdb` crate instead; this crate's API may change
//! without notice between minor versions.
//!
//! ---
//!
//! Three layers, leaves first:
//!
//! - **Slot stores** ([`KvStore`]): durable string slots addressed by key,
//!   either in memory ([`MemoryStore`]) or one file per slot ([`FileStore`])
//! - **Persistence bridge** ([`TablePersistence`]): JSON encode/decode of a
//!   table under `mysql_<database>_<table>`
//! - **Table store** ([`TableStore`]): the canonical in-memory tables,
//!   flushed through the bridge after every mutation
//!
//! ```text
//! TableStore ── save/load ──▶ TablePersistence ── get/set ──▶ KvStore
//! ```

pub mod file;
pub mod kv;
pub mod persistence;
pub mod table;

pub use file::FileStore;
pub use kv::{KvStore, MemoryStore};
pub use persistence::TablePersistence;
pub use table::{Table, TableStore};
