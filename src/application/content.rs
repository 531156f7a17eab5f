//! Content Loader: fetches and parses the two JSON documents.
//!
//! One call to [`ContentService::load`] backs one page render; the returned
//! bundle is shared by every fragment of that render and then discarded.
//! Failures propagate — no retry, no cross-request cache.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use metrics::counter;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::domain::content::{Catalog, ContentBundle, PagesDoc};

/// Which of the two content documents is being fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentDoc {
    Pages,
    Products,
}

impl ContentDoc {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pages => "pages",
            Self::Products => "products",
        }
    }
}

impl std::fmt::Display for ContentDoc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to fetch {doc} document: {message}")]
    Fetch { doc: ContentDoc, message: String },
    #[error("{doc} document request returned status {status}")]
    Status { doc: ContentDoc, status: u16 },
    #[error("failed to read {doc} document")]
    Read {
        doc: ContentDoc,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {doc} document")]
    Parse {
        doc: ContentDoc,
        #[source]
        source: serde_json::Error,
    },
}

/// Where the raw document bytes come from; adapters live in `infra`.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch(&self, doc: ContentDoc) -> Result<Bytes, ContentError>;
}

pub struct ContentService {
    source: Arc<dyn ContentSource>,
}

impl ContentService {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self { source }
    }

    /// Fetch and parse both documents, pages first.
    pub async fn load(&self) -> Result<ContentBundle, ContentError> {
        let pages: PagesDoc = self.fetch_doc(ContentDoc::Pages).await?;
        let products: Catalog = self.fetch_doc(ContentDoc::Products).await?;

        debug!(
            target = "vetrina::content",
            pages = pages.len(),
            products = products.len(),
            "content documents loaded"
        );

        Ok(ContentBundle { pages, products })
    }

    async fn fetch_doc<T: DeserializeOwned>(&self, doc: ContentDoc) -> Result<T, ContentError> {
        let bytes = match self.source.fetch(doc).await {
            Ok(bytes) => bytes,
            Err(err) => {
                counter!("vetrina_content_fetch_error_total").increment(1);
                return Err(err);
            }
        };
        counter!("vetrina_content_fetch_total").increment(1);

        serde_json::from_slice(&bytes).map_err(|source| {
            counter!("vetrina_content_fetch_error_total").increment(1);
            ContentError::Parse { doc, source }
        })
    }
}
