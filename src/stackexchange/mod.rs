//! StackExchange API client (the `/search` endpoint only)

pub mod client;
pub mod error;
pub mod models;

pub use client::{ApiSettings, SearchResponse, StackExchangeClient};
pub use error::StackExchangeError;
pub use models::{AnswerItem, QuestionItem, SearchPage, SearchQuery, ShallowUser};
