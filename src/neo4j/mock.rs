//! In-memory mock implementation of GraphStore for testing.
//!
//! Mirrors the merge semantics of the Cypher statements in `client.rs`:
//! provenance fields on create only, `null` removes a property, `coalesce`
//! keeps the old value. Batches are applied to a copy of the graph and swapped
//! in only when every operation succeeds, like a committed transaction.
//! Conditionally compiled with `#[cfg(test)]`.

use crate::neo4j::models::*;
use crate::neo4j::traits::GraphStore;
use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Identity of a node: label plus merge key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKey {
    Question(i64),
    Answer(i64),
    Account(i64),
    Tag(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MockNode {
    pub labels: BTreeSet<String>,
    pub props: BTreeMap<String, Value>,
}

impl MockNode {
    fn set(&mut self, key: &str, value: Option<Value>) {
        match value {
            Some(v) => {
                self.props.insert(key.to_string(), v);
            }
            None => {
                self.props.remove(key);
            }
        }
    }

    fn set_if_present(&mut self, key: &str, value: Option<Value>) {
        if let Some(v) = value {
            self.props.insert(key.to_string(), v);
        }
    }

    fn add_labels(&mut self, labels: &[&str]) {
        self.labels.extend(labels.iter().map(|l| l.to_string()));
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MockGraph {
    pub nodes: BTreeMap<NodeKey, MockNode>,
    pub edges: BTreeSet<(NodeKey, &'static str, NodeKey)>,
}

impl MockGraph {
    /// MERGE on the key; returns the node and whether it was just created
    fn merge_node(&mut self, key: NodeKey) -> (&mut MockNode, bool) {
        let created = !self.nodes.contains_key(&key);
        (self.nodes.entry(key).or_default(), created)
    }

    /// MATCH both ends, then MERGE the edge. Dangling edges are rejected so
    /// that an out-of-order batch fails loudly in tests.
    fn merge_edge(&mut self, from: NodeKey, rel: &'static str, to: NodeKey) -> Result<()> {
        for key in [&from, &to] {
            if !self.nodes.contains_key(key) {
                bail!("mock: {} edge references missing node {:?}", rel, key);
            }
        }
        self.edges.insert((from, rel, to));
        Ok(())
    }

    fn apply(&mut self, site: &SiteLabel, op: &MergeOp) -> Result<()> {
        let site = site.as_str();
        match op {
            MergeOp::UpsertQuestion(p) => {
                let (node, created) = self.merge_node(NodeKey::Question(p.id));
                node.props.insert("id".into(), json!(p.id));
                if created {
                    node.set("title", p.title.as_ref().map(|v| json!(v)));
                    node.set("url", p.url.as_ref().map(|v| json!(v)));
                    node.set("createdAt", p.created_at.map(|v| json!(v)));
                }
                node.set("favorites", p.favorites.map(|v| json!(v)));
                node.set("updatedAt", p.updated_at.map(|v| json!(v)));
                node.set("views", p.views.map(|v| json!(v)));
                node.set("upVotes", p.up_votes.map(|v| json!(v)));
                node.set("downVotes", p.down_votes.map(|v| json!(v)));
                node.add_labels(&["Question", "Content", site]);
            }
            MergeOp::UpsertAnswer(p) => {
                let (node, _) = self.merge_node(NodeKey::Answer(p.id));
                node.props.insert("id".into(), json!(p.id));
                node.set("accepted", p.accepted.map(|v| json!(v)));
                node.set("upVotes", p.up_votes.map(|v| json!(v)));
                node.set("downVotes", p.down_votes.map(|v| json!(v)));
                node.add_labels(&["Answer", "Content", site]);
            }
            MergeOp::UpsertAccount(p) => {
                let (node, created) = self.merge_node(NodeKey::Account(p.id));
                node.props.insert("id".into(), json!(p.id));
                if created {
                    node.set("name", p.name.as_ref().map(|v| json!(v)));
                }
                node.set_if_present("reputation", p.reputation.map(|v| json!(v)));
                node.set_if_present(
                    "profileImage",
                    p.profile_image.as_ref().map(|v| json!(v)),
                );
                node.add_labels(&["Account", "User", site]);
            }
            MergeOp::UpsertTag { name } => {
                let (node, _) = self.merge_node(NodeKey::Tag(name.clone()));
                node.props.insert("name".into(), json!(name));
                node.add_labels(&["Tag", site]);
            }
            MergeOp::LinkPosted {
                account_id,
                content,
            } => {
                let target = match content {
                    ContentRef::Question(id) => NodeKey::Question(*id),
                    ContentRef::Answer(id) => NodeKey::Answer(*id),
                };
                self.merge_edge(NodeKey::Account(*account_id), "POSTED", target)?;
            }
            MergeOp::LinkTagged { question_id, tag } => {
                self.merge_edge(
                    NodeKey::Question(*question_id),
                    "TAGGED",
                    NodeKey::Tag(tag.clone()),
                )?;
            }
            MergeOp::LinkAnswered {
                answer_id,
                question_id,
            } => {
                self.merge_edge(
                    NodeKey::Answer(*answer_id),
                    "ANSWERED",
                    NodeKey::Question(*question_id),
                )?;
            }
        }
        Ok(())
    }
}

/// In-memory mock implementation of GraphStore for testing.
pub struct MockGraphStore {
    pub graph: RwLock<MockGraph>,
    /// Every committed batch, in order
    pub committed: RwLock<Vec<MergeBatch>>,
    /// When set, every `apply_batch` call fails without touching the graph
    pub fail_writes: AtomicBool,
    pub constraints_ensured: AtomicBool,
}

impl MockGraphStore {
    /// Create a new empty MockGraphStore.
    pub fn new() -> Self {
        Self {
            graph: RwLock::new(MockGraph::default()),
            committed: RwLock::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
            constraints_ensured: AtomicBool::new(false),
        }
    }

    /// Make every subsequent write fail.
    pub fn failing(self) -> Self {
        self.fail_writes.store(true, Ordering::SeqCst);
        self
    }

    pub async fn snapshot(&self) -> MockGraph {
        self.graph.read().await.clone()
    }

    pub async fn node(&self, key: &NodeKey) -> Option<MockNode> {
        self.graph.read().await.nodes.get(key).cloned()
    }

    pub async fn has_edge(&self, from: &NodeKey, rel: &str, to: &NodeKey) -> bool {
        self.graph
            .read()
            .await
            .edges
            .iter()
            .any(|(f, r, t)| f == from && *r == rel && t == to)
    }

    pub async fn node_count(&self) -> usize {
        self.graph.read().await.nodes.len()
    }

    pub async fn edge_count(&self) -> usize {
        self.graph.read().await.edges.len()
    }

    pub async fn committed_batches(&self) -> usize {
        self.committed.read().await.len()
    }
}

impl Default for MockGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphStore for MockGraphStore {
    async fn ensure_constraints(&self) -> Result<()> {
        self.constraints_ensured.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn apply_batch(&self, batch: &MergeBatch) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("mock: write transaction rejected");
        }

        let mut graph = self.graph.write().await;
        let mut staged = graph.clone();
        for op in &batch.ops {
            staged.apply(&batch.site, op)?;
        }
        *graph = staged;
        drop(graph);

        self.committed.write().await.push(batch.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::site_label;

    #[tokio::test]
    async fn test_failed_batch_leaves_graph_untouched() {
        let store = MockGraphStore::new();
        let mut batch = MergeBatch::new(site_label());
        batch
            .upsert_question(QuestionProps {
                id: 1,
                ..Default::default()
            })
            .link_answered(99, 1);

        assert!(store.apply_batch(&batch).await.is_err());
        assert_eq!(store.node_count().await, 0);
        assert_eq!(store.committed_batches().await, 0);
    }

    #[tokio::test]
    async fn test_null_counter_removes_property() {
        let store = MockGraphStore::new();
        let mut batch = MergeBatch::new(site_label());
        batch.upsert_question(QuestionProps {
            id: 1,
            views: Some(5),
            ..Default::default()
        });
        store.apply_batch(&batch).await.unwrap();

        let mut batch = MergeBatch::new(site_label());
        batch.upsert_question(QuestionProps {
            id: 1,
            ..Default::default()
        });
        store.apply_batch(&batch).await.unwrap();

        let node = store.node(&NodeKey::Question(1)).await.unwrap();
        assert!(!node.props.contains_key("views"));
    }
}
