//! Neo4j graph models for the community graph
//!
//! The importer never writes Cypher directly. It describes each page as a
//! [`MergeBatch`] of merge-by-key operations, and a [`GraphStore`](super::GraphStore)
//! applies the batch atomically.

use std::fmt;

// ============================================================================
// Labels
// ============================================================================

/// A node label that is interpolated into Cypher text.
///
/// Cypher cannot parameterize labels, so only plain identifiers are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SiteLabel(String);

impl SiteLabel {
    pub fn new(label: impl Into<String>) -> Result<Self, InvalidLabel> {
        let label = label.into();
        let mut chars = label.chars();
        let valid_start = chars
            .next()
            .map(|c| c.is_ascii_alphabetic())
            .unwrap_or(false);
        if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            Ok(Self(label))
        } else {
            Err(InvalidLabel(label))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SiteLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rejected label text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid graph label {0:?}: expected an ASCII identifier")]
pub struct InvalidLabel(pub String);

// ============================================================================
// Node properties
// ============================================================================

/// Properties of a `:Question:Content` node.
///
/// `title`, `url` and `created_at` are provenance fields written only when the
/// node is created. Everything else is overwritten on every import.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QuestionProps {
    pub id: i64,
    pub title: Option<String>,
    pub url: Option<String>,
    pub created_at: Option<i64>,
    pub favorites: Option<i64>,
    pub updated_at: Option<i64>,
    pub views: Option<i64>,
    pub up_votes: Option<i64>,
    pub down_votes: Option<i64>,
}

/// Properties of an `:Answer:Content` node. All of them are mutable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnswerProps {
    pub id: i64,
    pub accepted: Option<bool>,
    pub up_votes: Option<i64>,
    pub down_votes: Option<i64>,
}

/// Properties of an `:Account:User` node.
///
/// `name` is set on creation only. `reputation` and `profile_image` are
/// refreshed whenever the payload carries them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AccountProps {
    pub id: i64,
    pub name: Option<String>,
    pub reputation: Option<i64>,
    pub profile_image: Option<String>,
}

/// Target of a `POSTED` edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentRef {
    Question(i64),
    Answer(i64),
}

// ============================================================================
// Merge operations
// ============================================================================

/// A single idempotent write against the community graph
#[derive(Debug, Clone, PartialEq)]
pub enum MergeOp {
    UpsertQuestion(QuestionProps),
    UpsertAnswer(AnswerProps),
    UpsertAccount(AccountProps),
    UpsertTag { name: String },
    /// `(account)-[:POSTED]->(content)`
    LinkPosted { account_id: i64, content: ContentRef },
    /// `(question)-[:TAGGED]->(tag)`
    LinkTagged { question_id: i64, tag: String },
    /// `(answer)-[:ANSWERED]->(question)`
    LinkAnswered { answer_id: i64, question_id: i64 },
}

/// Discriminant of a [`MergeOp`], for logs and batch statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    UpsertQuestion,
    UpsertAnswer,
    UpsertAccount,
    UpsertTag,
    LinkPosted,
    LinkTagged,
    LinkAnswered,
}

impl OpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::UpsertQuestion => "upsert_question",
            OpKind::UpsertAnswer => "upsert_answer",
            OpKind::UpsertAccount => "upsert_account",
            OpKind::UpsertTag => "upsert_tag",
            OpKind::LinkPosted => "link_posted",
            OpKind::LinkTagged => "link_tagged",
            OpKind::LinkAnswered => "link_answered",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl MergeOp {
    pub fn kind(&self) -> OpKind {
        match self {
            MergeOp::UpsertQuestion(_) => OpKind::UpsertQuestion,
            MergeOp::UpsertAnswer(_) => OpKind::UpsertAnswer,
            MergeOp::UpsertAccount(_) => OpKind::UpsertAccount,
            MergeOp::UpsertTag { .. } => OpKind::UpsertTag,
            MergeOp::LinkPosted { .. } => OpKind::LinkPosted,
            MergeOp::LinkTagged { .. } => OpKind::LinkTagged,
            MergeOp::LinkAnswered { .. } => OpKind::LinkAnswered,
        }
    }
}

/// Ordered list of merge operations applied in one write transaction.
///
/// Nodes are always pushed before the edges that reference them.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeBatch {
    pub site: SiteLabel,
    pub ops: Vec<MergeOp>,
}

impl MergeBatch {
    pub fn new(site: SiteLabel) -> Self {
        Self {
            site,
            ops: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn upsert_question(&mut self, props: QuestionProps) -> &mut Self {
        self.ops.push(MergeOp::UpsertQuestion(props));
        self
    }

    pub fn upsert_answer(&mut self, props: AnswerProps) -> &mut Self {
        self.ops.push(MergeOp::UpsertAnswer(props));
        self
    }

    pub fn upsert_account(&mut self, props: AccountProps) -> &mut Self {
        self.ops.push(MergeOp::UpsertAccount(props));
        self
    }

    pub fn upsert_tag(&mut self, name: impl Into<String>) -> &mut Self {
        self.ops.push(MergeOp::UpsertTag { name: name.into() });
        self
    }

    pub fn link_posted(&mut self, account_id: i64, content: ContentRef) -> &mut Self {
        self.ops.push(MergeOp::LinkPosted {
            account_id,
            content,
        });
        self
    }

    pub fn link_tagged(&mut self, question_id: i64, tag: impl Into<String>) -> &mut Self {
        self.ops.push(MergeOp::LinkTagged {
            question_id,
            tag: tag.into(),
        });
        self
    }

    pub fn link_answered(&mut self, answer_id: i64, question_id: i64) -> &mut Self {
        self.ops.push(MergeOp::LinkAnswered {
            answer_id,
            question_id,
        });
        self
    }

    /// Number of operations of the given kind
    pub fn count(&self, kind: OpKind) -> usize {
        self.ops.iter().filter(|op| op.kind() == kind).count()
    }
}
