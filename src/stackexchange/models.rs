//! StackExchange `/search` request and response types

use serde::Deserialize;

/// One page of `/search` results.
///
/// Every field is optional on the wire: error responses carry only the error
/// envelope plus whatever quota information the API chose to include.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub items: Option<Vec<QuestionItem>>,
    #[serde(default)]
    pub has_more: Option<bool>,
    #[serde(default)]
    pub quota_remaining: Option<i64>,
    /// Seconds the API asks the caller to wait before the next request
    #[serde(default)]
    pub backoff: Option<u64>,
    #[serde(default)]
    pub error_id: Option<i64>,
    #[serde(default)]
    pub error_name: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl SearchPage {
    /// Absent or null means this was the last page
    pub fn has_more(&self) -> bool {
        self.has_more.unwrap_or(false)
    }

    /// Absent or null counts as an exhausted quota
    pub fn quota_remaining(&self) -> i64 {
        self.quota_remaining.unwrap_or(0)
    }

    pub fn is_error(&self) -> bool {
        self.error_id.is_some()
    }

    pub fn item_count(&self) -> usize {
        self.items.as_ref().map(Vec::len).unwrap_or(0)
    }
}

/// A question record as shaped by the import filter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionItem {
    pub question_id: Option<i64>,
    pub title: Option<String>,
    pub share_link: Option<String>,
    pub creation_date: Option<i64>,
    pub last_activity_date: Option<i64>,
    pub favorite_count: Option<i64>,
    pub view_count: Option<i64>,
    pub up_vote_count: Option<i64>,
    pub down_vote_count: Option<i64>,
    pub owner: Option<ShallowUser>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub answers: Vec<AnswerItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnswerItem {
    pub answer_id: Option<i64>,
    pub is_accepted: Option<bool>,
    pub up_vote_count: Option<i64>,
    pub down_vote_count: Option<i64>,
    pub owner: Option<ShallowUser>,
}

/// Post owner. Deleted accounts come back without a `user_id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShallowUser {
    pub user_id: Option<i64>,
    pub display_name: Option<String>,
    pub reputation: Option<i64>,
    pub profile_image: Option<String>,
}

/// Parameters of one `/search` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub page: u32,
    pub page_size: u32,
    pub tags: Vec<String>,
    /// Inclusive lower bound on creation date, epoch seconds
    pub from_date: Option<i64>,
    /// Upper bound on creation date, epoch seconds
    pub to_date: Option<i64>,
}

impl SearchQuery {
    /// Tags joined the way `/search` expects them (AND semantics)
    pub fn tagged(&self) -> String {
        self.tags.join(";")
    }
}
