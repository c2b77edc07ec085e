//! Vocabulary sources
//!
//! This module provides:
//! - Word entry and source models with a single validation path
//! - The `.data` file format (optional `#link:` header + JSON array)
//! - The `SourceStore` trait with file-backed and HTTP-backed stores

pub mod data_file;
pub mod models;
pub mod remote;
pub mod store;

pub use models::*;
pub use remote::HttpSourceStore;
pub use store::{FileSourceStore, Result as StoreResult, SourceStore, SourceStoreError};
