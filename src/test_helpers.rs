//! Test helper factories and mock builders
//!
//! Provides canned search payloads, a manual clock for pacing tests, and a
//! helper that wires an `Importer` to a wiremock server and a mock graph.
#![allow(dead_code)]

use crate::importer::pacing::{Clock, PacingPolicy};
use crate::importer::{Importer, ImporterSettings};
use crate::neo4j::mock::MockGraphStore;
use crate::neo4j::SiteLabel;
use crate::stackexchange::{ApiSettings, StackExchangeClient};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

// ============================================================================
// Clock
// ============================================================================

/// Clock that only moves when told to. `sleep` records the duration and
/// advances time instantly.
pub struct ManualClock {
    start: Instant,
    elapsed: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.elapsed.lock().unwrap() += by;
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + *self.elapsed.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        self.advance(duration);
    }
}

// ============================================================================
// Payloads
// ============================================================================

pub fn site_label() -> SiteLabel {
    SiteLabel::new("StackOverflow").unwrap()
}

/// One question (id 10, title "T", tags x and y, owner 1) with one accepted
/// answer (id 20, owner 2).
pub fn merge_scenario_page(has_more: bool) -> Value {
    json!({
        "items": [{
            "question_id": 10,
            "title": "T",
            "share_link": "https://stackoverflow.com/q/10",
            "creation_date": 1_500_000_000,
            "last_activity_date": 1_500_000_500,
            "favorite_count": 1,
            "view_count": 42,
            "up_vote_count": 3,
            "down_vote_count": 0,
            "owner": {
                "user_id": 1,
                "display_name": "asker",
                "reputation": 101,
                "profile_image": "https://example.com/1.png"
            },
            "tags": ["x", "y"],
            "answers": [{
                "answer_id": 20,
                "is_accepted": true,
                "up_vote_count": 7,
                "down_vote_count": 1,
                "owner": {
                    "user_id": 2,
                    "display_name": "answerer",
                    "reputation": 2500,
                    "profile_image": "https://example.com/2.png"
                }
            }]
        }],
        "has_more": has_more,
        "quota_remaining": 9_999
    })
}

/// A page holding a single bare question
pub fn question_page(question_id: i64, has_more: bool, quota_remaining: i64) -> Value {
    json!({
        "items": [{
            "question_id": question_id,
            "title": format!("question {question_id}"),
            "tags": ["rust"],
            "answers": []
        }],
        "has_more": has_more,
        "quota_remaining": quota_remaining
    })
}

// ============================================================================
// Importer wiring
// ============================================================================

pub fn api_settings(api_url: &str) -> ApiSettings {
    ApiSettings {
        api_url: api_url.to_string(),
        site: "stackoverflow".to_string(),
        key: "test-key".to_string(),
        filter: "!test-filter".to_string(),
    }
}

pub fn importer_settings() -> ImporterSettings {
    ImporterSettings {
        page_size: 100,
        site_label: site_label(),
        pacing: PacingPolicy::default(),
        ensure_constraints: true,
    }
}

/// Importer pointed at `api_url`, writing into `graph`, sleeping on `clock`
pub fn test_importer(
    api_url: &str,
    graph: Arc<MockGraphStore>,
    clock: Arc<ManualClock>,
) -> Importer {
    Importer::new(
        graph,
        StackExchangeClient::new(api_settings(api_url)),
        importer_settings(),
    )
    .with_clock(clock)
}
