//! Document store abstraction.
//!
//! The [`DocumentStore`] trait is the only way the rest of the service
//! touches persisted records. Handlers receive it as an injected
//! `Arc<dyn DocumentStore>`, so tests can swap the graph database for
//! [`InMemoryStore`].
//!
//! | Backend | Module | Used for |
//! |---------|--------|----------|
//! | Neo4j | [`graph`] | Production (`store.backend = "neo4j"`) |
//! | In-memory | [`memory`] | Tests and `store.backend = "memory"` |

pub mod graph;
pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::config::StoreConfig;
use crate::models::DocumentRecord;

pub use graph::GraphStore;
pub use memory::InMemoryStore;

/// Storage backend for document records.
///
/// Implementations must be `Send + Sync` so one instance can be shared by
/// every request handler.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert one record. Duplicate names are allowed.
    async fn create_document(&self, name: &str, path: &str) -> Result<()>;

    /// Return every stored record, in whatever order the backend yields.
    /// An empty store is `Ok(vec![])`.
    async fn list_documents(&self) -> Result<Vec<DocumentRecord>>;
}

/// Build the store selected by `store.backend`.
///
/// For Neo4j this opens the connection and verifies it, so a database that
/// is down fails here rather than on the first request.
pub async fn connect(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>> {
    match config.backend.as_str() {
        "neo4j" => Ok(Arc::new(GraphStore::connect(config).await?)),
        "memory" => Ok(Arc::new(InMemoryStore::new())),
        other => anyhow::bail!("Unknown store backend: {}", other),
    }
}
