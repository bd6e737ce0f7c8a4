//! Cache-related MCP tools.
//!
//! Read-only views of the versioned stores.

pub mod get;
pub mod stores;

pub use get::{CacheGetParams, get_impl};
pub use stores::stores_impl;
