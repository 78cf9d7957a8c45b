//! Infrastructure Adapters
//!
//! Implementations of the ports for the real catalog service and storage.

pub mod http;
pub mod storage;

// Re-exports
pub use http::{ClientConfig, RemoteCatalogClient, TOKEN_HEADER};
pub use storage::{FileTokenStorage, MemoryTokenStorage};
