//! SQLite-backed versioned cache stores.
//!
//! This module provides the persistent request/response store used by the
//! gateway, with async access via tokio-rusqlite. It supports:
//!
//! - One named store per deployed version, created on demand
//! - Entries keyed by a SHA-256 of method and URL
//! - Whole-store deletion when a version is superseded
//! - Automatic schema migrations and WAL mode

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod stores;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::{CacheStore, PendingEntry};
pub use stores::StoreSummary;
