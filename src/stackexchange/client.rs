//! HTTP client for the StackExchange `/search` endpoint

use super::error::{Result, StackExchangeError};
use super::models::{SearchPage, SearchQuery};
use reqwest::header::ACCEPT;

/// Connection settings for the StackExchange API
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Base URL, e.g. `https://api.stackexchange.com/2.2`
    pub api_url: String,
    /// Site parameter, e.g. `stackoverflow`
    pub site: String,
    /// Application key. Empty means anonymous access (lower quota).
    pub key: String,
    /// Response-shape filter token
    pub filter: String,
}

/// A parsed page together with the HTTP status it arrived with
#[derive(Debug, Clone)]
pub struct SearchResponse {
    pub status: u16,
    pub page: SearchPage,
}

pub struct StackExchangeClient {
    client: reqwest::Client,
    settings: ApiSettings,
}

impl StackExchangeClient {
    pub fn new(settings: ApiSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            settings,
        }
    }

    /// Full request URL for one search page, oldest questions first
    pub fn search_url(&self, query: &SearchQuery) -> String {
        let mut url = format!(
            "{}/search?page={}&pagesize={}&order=asc&sort=creation&tagged={}&site={}",
            self.settings.api_url.trim_end_matches('/'),
            query.page,
            query.page_size,
            urlencoding::encode(&query.tagged()),
            urlencoding::encode(&self.settings.site),
        );

        if !self.settings.key.is_empty() {
            url.push_str(&format!("&key={}", urlencoding::encode(&self.settings.key)));
        }
        if !self.settings.filter.is_empty() {
            url.push_str(&format!(
                "&filter={}",
                urlencoding::encode(&self.settings.filter)
            ));
        }
        if let Some(from_date) = query.from_date {
            url.push_str(&format!("&fromdate={}", from_date));
        }
        if let Some(to_date) = query.to_date {
            url.push_str(&format!("&todate={}", to_date));
        }

        url
    }

    /// Fetch one page.
    ///
    /// Non-2xx responses are not errors: the API reports failures as a JSON
    /// envelope, which is returned as a `SearchPage` without items. Only bodies
    /// that are not JSON fail.
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResponse> {
        let resp = self
            .client
            .get(self.search_url(query))
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status();
        let body = resp.bytes().await?;

        if !status.is_success() {
            tracing::warn!(
                status = status.as_u16(),
                body = %String::from_utf8_lossy(&body),
                "Search request returned an error status"
            );
        }

        let page: SearchPage =
            serde_json::from_slice(&body).map_err(|source| StackExchangeError::MalformedResponse {
                status: status.as_u16(),
                source,
            })?;

        if let Some(error_id) = page.error_id {
            tracing::warn!(
                error_id,
                error_name = page.error_name.as_deref().unwrap_or_default(),
                error_message = page.error_message.as_deref().unwrap_or_default(),
                "API reported an error"
            );
        }

        Ok(SearchResponse {
            status: status.as_u16(),
            page,
        })
    }
}
