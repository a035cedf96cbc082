//! Neo4j client for writing the community graph

use super::models::*;
use anyhow::{Context, Result};
use neo4rs::{query, BoltNull, BoltType, Graph, Query};
use std::sync::Arc;

/// Client for Neo4j operations
pub struct Neo4jClient {
    graph: Arc<Graph>,
}

impl Neo4jClient {
    /// Create a new Neo4j client
    pub async fn new(uri: &str, user: &str, password: &str) -> Result<Self> {
        let graph = Graph::new(uri, user, password)
            .await
            .context("Failed to connect to Neo4j")?;

        Ok(Self {
            graph: Arc::new(graph),
        })
    }

    /// Create the uniqueness constraints every MERGE relies on
    pub async fn ensure_constraints(&self) -> Result<()> {
        let constraints = [
            "CREATE CONSTRAINT question_id IF NOT EXISTS FOR (q:Question) REQUIRE q.id IS UNIQUE",
            "CREATE CONSTRAINT answer_id IF NOT EXISTS FOR (a:Answer) REQUIRE a.id IS UNIQUE",
            "CREATE CONSTRAINT account_id IF NOT EXISTS FOR (u:Account) REQUIRE u.id IS UNIQUE",
            "CREATE CONSTRAINT tag_name IF NOT EXISTS FOR (t:Tag) REQUIRE t.name IS UNIQUE",
        ];

        for constraint in constraints {
            if let Err(e) = self.graph.run(query(constraint)).await {
                tracing::warn!(constraint, "Failed to create constraint: {}", e);
            }
        }

        Ok(())
    }

    /// Apply a merge batch in one write transaction.
    ///
    /// The transaction is rolled back if any statement fails.
    pub async fn apply_batch(&self, batch: &MergeBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut txn = self
            .graph
            .start_txn()
            .await
            .context("Failed to open write transaction")?;

        for (index, op) in batch.ops.iter().enumerate() {
            if let Err(e) = txn.run(merge_query(&batch.site, op)).await {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::warn!("Rollback after failed merge also failed: {}", rollback_err);
                }
                return Err(anyhow::Error::new(e)
                    .context(format!("{} failed (operation {} of batch)", op.kind(), index)));
            }
        }

        txn.commit()
            .await
            .context("Failed to commit merge batch")?;

        tracing::debug!(operations = batch.len(), "Committed merge batch");
        Ok(())
    }

    /// Execute a parameterized Cypher query and collect the rows
    pub async fn execute_with_params(&self, q: Query) -> Result<Vec<neo4rs::Row>> {
        let mut result = self.graph.execute(q).await?;
        let mut rows = Vec::new();
        while let Some(row) = result.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }
}

// ============================================================================
// Merge statements
// ============================================================================

/// Cypher text for a merge operation. Only the site label is interpolated.
pub(crate) fn merge_cypher(site: &SiteLabel, op: &MergeOp) -> String {
    match op {
        MergeOp::UpsertQuestion(_) => format!(
            r#"
            MERGE (q:Question {{id: $id}})
            ON CREATE SET q.title = $title, q.url = $url, q.createdAt = $created_at
            SET q.favorites = $favorites, q.updatedAt = $updated_at, q.views = $views,
                q.upVotes = $up_votes, q.downVotes = $down_votes
            SET q:Content:{site}
            "#
        ),
        MergeOp::UpsertAnswer(_) => format!(
            r#"
            MERGE (a:Answer {{id: $id}})
            SET a.accepted = $accepted, a.upVotes = $up_votes, a.downVotes = $down_votes
            SET a:Content:{site}
            "#
        ),
        MergeOp::UpsertAccount(_) => format!(
            r#"
            MERGE (u:Account {{id: $id}})
            ON CREATE SET u.name = $name
            SET u.reputation = coalesce($reputation, u.reputation),
                u.profileImage = coalesce($profile_image, u.profileImage)
            SET u:User:{site}
            "#
        ),
        MergeOp::UpsertTag { .. } => format!(
            r#"
            MERGE (t:Tag {{name: $name}})
            SET t:{site}
            "#
        ),
        MergeOp::LinkPosted { content, .. } => {
            let label = match content {
                ContentRef::Question(_) => "Question",
                ContentRef::Answer(_) => "Answer",
            };
            format!(
                r#"
            MATCH (u:Account {{id: $account_id}})
            MATCH (c:{label} {{id: $content_id}})
            MERGE (u)-[:POSTED]->(c)
            "#
            )
        }
        MergeOp::LinkTagged { .. } => r#"
            MATCH (q:Question {id: $question_id})
            MATCH (t:Tag {name: $tag})
            MERGE (q)-[:TAGGED]->(t)
            "#
        .to_string(),
        MergeOp::LinkAnswered { .. } => r#"
            MATCH (a:Answer {id: $answer_id})
            MATCH (q:Question {id: $question_id})
            MERGE (a)-[:ANSWERED]->(q)
            "#
        .to_string(),
    }
}

/// Absent payload fields are written as Cypher `null`
fn nullable<T: Into<BoltType>>(value: Option<T>) -> BoltType {
    value.map(Into::into).unwrap_or(BoltType::Null(BoltNull))
}

/// Parameterized query for a merge operation
fn merge_query(site: &SiteLabel, op: &MergeOp) -> Query {
    let q = query(&merge_cypher(site, op));
    match op {
        MergeOp::UpsertQuestion(props) => q
            .param("id", props.id)
            .param("title", nullable(props.title.clone()))
            .param("url", nullable(props.url.clone()))
            .param("created_at", nullable(props.created_at))
            .param("favorites", nullable(props.favorites))
            .param("updated_at", nullable(props.updated_at))
            .param("views", nullable(props.views))
            .param("up_votes", nullable(props.up_votes))
            .param("down_votes", nullable(props.down_votes)),
        MergeOp::UpsertAnswer(props) => q
            .param("id", props.id)
            .param("accepted", nullable(props.accepted))
            .param("up_votes", nullable(props.up_votes))
            .param("down_votes", nullable(props.down_votes)),
        MergeOp::UpsertAccount(props) => q
            .param("id", props.id)
            .param("name", nullable(props.name.clone()))
            .param("reputation", nullable(props.reputation))
            .param("profile_image", nullable(props.profile_image.clone())),
        MergeOp::UpsertTag { name } => q.param("name", name.clone()),
        MergeOp::LinkPosted {
            account_id,
            content,
        } => {
            let content_id = match content {
                ContentRef::Question(id) | ContentRef::Answer(id) => *id,
            };
            q.param("account_id", *account_id)
                .param("content_id", content_id)
        }
        MergeOp::LinkTagged { question_id, tag } => q
            .param("question_id", *question_id)
            .param("tag", tag.clone()),
        MergeOp::LinkAnswered {
            answer_id,
            question_id,
        } => q
            .param("answer_id", *answer_id)
            .param("question_id", *question_id),
    }
}
