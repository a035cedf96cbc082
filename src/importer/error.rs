use crate::stackexchange::StackExchangeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("at least one tag is required")]
    NoTags,

    #[error(transparent)]
    Api(#[from] StackExchangeError),

    /// The page's transaction was rolled back; earlier pages stay committed.
    #[error("graph write failed on page {page}")]
    Graph {
        page: u32,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ImportError {
    pub(crate) fn graph(page: u32, err: anyhow::Error) -> Self {
        ImportError::Graph {
            page,
            source: err.into(),
        }
    }
}
