//! `GraphStore` implementation for `Neo4jClient`.
//!
//! Every method simply delegates to the corresponding inherent method on `Neo4jClient`.

use async_trait::async_trait;

use super::client::Neo4jClient;
use super::models::MergeBatch;
use super::traits::GraphStore;

#[async_trait]
impl GraphStore for Neo4jClient {
    async fn ensure_constraints(&self) -> anyhow::Result<()> {
        self.ensure_constraints().await
    }

    async fn apply_batch(&self, batch: &MergeBatch) -> anyhow::Result<()> {
        self.apply_batch(batch).await
    }
}
