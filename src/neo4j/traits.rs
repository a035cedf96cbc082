//! GraphStore trait definition
//!
//! Abstract interface over "a graph store with merge-by-key". Implemented by
//! `Neo4jClient` and, in tests, by the in-memory `MockGraphStore`.

use crate::neo4j::models::MergeBatch;
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Create the uniqueness constraints backing merge-by-key (idempotent)
    async fn ensure_constraints(&self) -> Result<()>;

    /// Apply every operation of the batch inside a single write transaction.
    ///
    /// Either the whole batch is committed or none of it is.
    async fn apply_batch(&self, batch: &MergeBatch) -> Result<()>;
}
