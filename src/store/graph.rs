//! Neo4j-backed [`DocumentStore`].
//!
//! Each record is a standalone node:
//!
//! ```cypher
//! (:Document { name: "report.txt", path: "uploads/report.txt" })
//! ```
//!
//! No relationships are created and no uniqueness constraint is declared.
//! `neo4rs` keeps its own connection pool, so one [`GraphStore`] is shared by
//! all handlers without extra locking.
//!
//! Every query runs once inside an explicit transaction. `Graph::run` and
//! `Graph::execute` retry with backoff for up to a minute, so they are not
//! used: a database failure must reach the caller on the first attempt.

use anyhow::{Context, Result};
use async_trait::async_trait;
use neo4rs::{query, Graph, Query};

use crate::config::StoreConfig;
use crate::models::DocumentRecord;

use super::DocumentStore;

/// Node label used for document records.
pub const DOCUMENT_LABEL: &str = "Document";

/// `CREATE` statement for one record, with `$name` and `$path` parameters.
pub fn create_document_cypher() -> String {
    format!("CREATE (:{} {{name: $name, path: $path}})", DOCUMENT_LABEL)
}

/// `MATCH` statement returning every record as `name`, `path` columns.
pub fn list_documents_cypher() -> String {
    format!(
        "MATCH (d:{}) RETURN d.name AS name, d.path AS path",
        DOCUMENT_LABEL
    )
}

pub struct GraphStore {
    graph: Graph,
}

impl GraphStore {
    /// Open a connection pool and run a trivial query against it.
    ///
    /// # Errors
    ///
    /// Fails if the URI is malformed, authentication is refused, or the
    /// server does not answer.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let graph = Graph::new(&config.uri, &config.user, config.resolved_password())
            .await
            .with_context(|| format!("Failed to connect to Neo4j at {}", config.uri))?;

        let store = Self { graph };
        store
            .run_once(query("RETURN 1"))
            .await
            .with_context(|| format!("Neo4j at {} is not answering queries", config.uri))?;

        tracing::info!(uri = %config.uri, "connected to Neo4j");
        Ok(store)
    }

    /// Run one statement in its own transaction, with no retry.
    async fn run_once(&self, q: Query) -> Result<()> {
        let mut txn = self.graph.start_txn().await?;
        txn.run(q).await?;
        txn.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for GraphStore {
    async fn create_document(&self, name: &str, path: &str) -> Result<()> {
        let cypher = create_document_cypher();
        self.run_once(query(&cypher).param("name", name).param("path", path))
            .await
            .with_context(|| format!("Failed to store document node for {}", name))?;
        Ok(())
    }

    async fn list_documents(&self) -> Result<Vec<DocumentRecord>> {
        let cypher = list_documents_cypher();
        let mut txn = self
            .graph
            .start_txn()
            .await
            .context("Failed to list document nodes")?;
        let mut rows = txn
            .execute(query(&cypher))
            .await
            .context("Failed to list document nodes")?;

        let mut records = Vec::new();
        while let Some(row) = rows.next(txn.handle()).await? {
            let name: String = row.get("name")?;
            let path: String = row.get("path")?;
            records.push(DocumentRecord { name, path });
        }
        txn.commit().await?;
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_create_statement_uses_document_label_and_properties() {
        assert_eq!(
            create_document_cypher(),
            "CREATE (:Document {name: $name, path: $path})"
        );
    }

    #[test]
    fn test_list_statement_returns_name_and_path() {
        assert_eq!(
            list_documents_cypher(),
            "MATCH (d:Document) RETURN d.name AS name, d.path AS path"
        );
    }

    #[tokio::test]
    async fn test_refused_connection_fails_without_retrying() {
        let config = StoreConfig {
            backend: "neo4j".to_string(),
            uri: "bolt://127.0.0.1:1".to_string(),
            user: "neo4j".to_string(),
            password: String::new(),
        };

        let started = Instant::now();
        let result = tokio::time::timeout(Duration::from_secs(10), GraphStore::connect(&config))
            .await
            .expect("connect should give up on the first refused attempt");
        assert!(result.is_err());
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
