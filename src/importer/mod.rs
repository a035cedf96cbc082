//! StackExchange → Neo4j importer
//!
//! Pages through `/search` for a tag set, oldest questions first, and merges
//! every page into the graph in its own write transaction. Strictly
//! sequential: one request, then one write, then an optional pause.

pub mod error;
pub mod merge;
pub mod pacing;

pub use error::ImportError;
pub use pacing::{Clock, PacingPolicy, RateLimiter, TokioClock, MAX_PAUSE};

use crate::neo4j::{GraphStore, Neo4jClient, OpKind, SiteLabel};
use crate::stackexchange::{SearchQuery, StackExchangeClient};
use crate::Config;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Knobs passed to the importer at construction
#[derive(Debug, Clone)]
pub struct ImporterSettings {
    pub page_size: u32,
    /// Extra label applied to every node (e.g. `StackOverflow`)
    pub site_label: SiteLabel,
    pub pacing: PacingPolicy,
    /// Create uniqueness constraints before the first page
    pub ensure_constraints: bool,
}

/// What a completed run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub requests: u32,
    pub pages_merged: u32,
    pub questions: usize,
    pub answers: usize,
    pub paused: Duration,
}

pub struct Importer {
    graph: Arc<dyn GraphStore>,
    api: StackExchangeClient,
    settings: ImporterSettings,
    clock: Arc<dyn Clock>,
}

impl Importer {
    pub fn new(
        graph: Arc<dyn GraphStore>,
        api: StackExchangeClient,
        settings: ImporterSettings,
    ) -> Self {
        Self {
            graph,
            api,
            settings,
            clock: Arc::new(TokioClock),
        }
    }

    /// Replace the clock used for pacing
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Import every question carrying all of `tags`, optionally bounded by
    /// creation date.
    ///
    /// Always starts at page 1; re-running is safe because every write is a
    /// merge. Network, parse and graph errors abort the run.
    pub async fn run(
        &self,
        tags: &[String],
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> Result<ImportReport, ImportError> {
        let tags = dedup_tags(tags);
        if tags.is_empty() {
            return Err(ImportError::NoTags);
        }

        tracing::info!(
            tags = %tags.join(";"),
            from = ?start_date,
            to = ?end_date,
            "Importing questions"
        );

        if self.settings.ensure_constraints {
            self.graph
                .ensure_constraints()
                .await
                .map_err(|e| ImportError::graph(0, e))?;
        }

        let mut limiter = RateLimiter::new(self.settings.pacing, self.clock.clone());
        let mut report = ImportReport::default();
        let mut page = 1u32;
        let mut has_more = true;

        while has_more {
            report.paused += limiter.wait_turn().await;

            let query = SearchQuery {
                page,
                page_size: self.settings.page_size,
                tags: tags.clone(),
                from_date: start_date.map(|d| d.timestamp()),
                to_date: end_date.map(|d| d.timestamp()),
            };
            let response = self.api.search(&query).await?;
            report.requests += 1;

            let result = response.page;
            tracing::info!(
                status = response.status,
                page,
                items = result.item_count(),
                has_more = result.has_more(),
                quota_remaining = result.quota_remaining(),
                "Fetched search page"
            );

            if let Some(items) = result.items.as_deref() {
                let batch = merge::plan_page(&self.settings.site_label, items);
                tracing::debug!(page, operations = batch.len(), "Merging page");

                self.graph
                    .apply_batch(&batch)
                    .await
                    .map_err(|e| ImportError::graph(page, e))?;

                report.pages_merged += 1;
                report.questions += batch.count(OpKind::UpsertQuestion);
                report.answers += batch.count(OpKind::UpsertAnswer);
                page += 1;
            }

            has_more = result.has_more();
            if let Some(backoff) = result.backoff {
                tracing::info!(backoff, "API requested backoff");
            }
            limiter.observe(result.quota_remaining(), result.backoff);
        }

        tracing::info!(
            requests = report.requests,
            pages = report.pages_merged,
            questions = report.questions,
            answers = report.answers,
            paused_secs = report.paused.as_secs(),
            "Import complete"
        );

        Ok(report)
    }
}

/// Drop blank and repeated tags, keeping first-seen order
fn dedup_tags(tags: &[String]) -> Vec<String> {
    let mut seen = Vec::with_capacity(tags.len());
    for tag in tags.iter().map(|t| t.trim()) {
        if !tag.is_empty() && !seen.iter().any(|s: &String| s == tag) {
            seen.push(tag.to_string());
        }
    }
    seen
}

/// Connect to Neo4j, run one import, and release the connection.
///
/// The client lives only for the duration of this call, so the connection is
/// closed on success and on every error path.
pub async fn import_tags(
    config: &Config,
    tags: &[String],
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
) -> anyhow::Result<ImportReport> {
    let settings = config.importer_settings()?;

    let graph = Arc::new(
        Neo4jClient::new(
            &config.neo4j_uri,
            &config.neo4j_user,
            &config.neo4j_password,
        )
        .await?,
    );
    tracing::info!("Connected to Neo4j at {}", config.neo4j_uri);

    let importer = Importer::new(
        graph,
        StackExchangeClient::new(config.api_settings()),
        settings,
    );

    Ok(importer.run(tags, start_date, end_date).await?)
}
