//! # campusdb core
//!
//! Core types for the campusdb embedded record store: the error taxonomy,
//! the `Value`/`Record` data model and the statement parser.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod format_version;
pub mod query;
pub mod security;
pub mod value;

pub use error::{Error, Result};
pub use value::{Record, Value};
