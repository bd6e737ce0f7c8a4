//! Core types and shared functionality for waystation.
//!
//! This crate provides:
//! - Versioned cache stores with SQLite backend
//! - Unified error types
//! - Configuration structures
//! - The `HttpResponse` value shared by the network and the stores

pub mod cache;
pub mod config;
pub mod error;
pub mod response;

pub use cache::{CacheDb, CacheStore, StoreSummary};
pub use config::AppConfig;
pub use error::Error;
pub use response::HttpResponse;
