//! Content source adapter: raw document bytes from an HTTP URL or a local file.

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::application::content::{ContentDoc, ContentError, ContentSource};
use crate::config::{ContentLocation, ContentSettings};

use super::error::InfraError;

/// Fetches the two documents from their configured locations.
pub struct ConfiguredContentSource {
    client: reqwest::Client,
    pages: ContentLocation,
    products: ContentLocation,
}

impl ConfiguredContentSource {
    pub fn new(content: &ContentSettings) -> Result<Self, InfraError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent())
            .build()
            .map_err(|err| InfraError::http(err.to_string()))?;

        Ok(Self {
            client,
            pages: content.pages.clone(),
            products: content.products.clone(),
        })
    }

    async fn fetch_url(&self, doc: ContentDoc, url: &Url) -> Result<Bytes, ContentError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| ContentError::Fetch {
                doc,
                message: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::Status {
                doc,
                status: status.as_u16(),
            });
        }

        response.bytes().await.map_err(|err| ContentError::Fetch {
            doc,
            message: err.to_string(),
        })
    }

    async fn fetch_path(
        &self,
        doc: ContentDoc,
        path: &std::path::Path,
    ) -> Result<Bytes, ContentError> {
        tokio::fs::read(path)
            .await
            .map(Bytes::from)
            .map_err(|source| ContentError::Read { doc, source })
    }
}

#[async_trait]
impl ContentSource for ConfiguredContentSource {
    async fn fetch(&self, doc: ContentDoc) -> Result<Bytes, ContentError> {
        let location = match doc {
            ContentDoc::Pages => &self.pages,
            ContentDoc::Products => &self.products,
        };

        match location {
            ContentLocation::Url(url) => self.fetch_url(doc, url).await,
            ContentLocation::Path(path) => self.fetch_path(doc, path).await,
        }
    }
}

fn user_agent() -> &'static str {
    concat!("vetrina/", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_maps_to_read_error() {
        let source = ConfiguredContentSource::new(&ContentSettings {
            pages: ContentLocation::Path("does/not/exist.json".into()),
            products: ContentLocation::Path("does/not/exist.json".into()),
            default_page: "home".to_string(),
        })
        .expect("client builds");

        let err = source
            .fetch(ContentDoc::Pages)
            .await
            .expect_err("read fails");
        assert!(matches!(
            err,
            ContentError::Read {
                doc: ContentDoc::Pages,
                ..
            }
        ));
    }
}
