//! HTTP implementation of the catalog read contract.
//!
//! # Responsibility
//! - Build item URLs from configuration and issue one `GET` per fetch.
//! - Map transport, status and decode failures onto `FetchFailure`.
//!
//! # Invariants
//! - Request URLs and the API key are never logged.
//! - A decoded record is validated before it is returned.

use crate::config::CatalogConfig;
use crate::model::item::ItemRecord;
use crate::remote::{CatalogClient, FetchFailure};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, StatusCode, Url};
use std::time::Instant;

/// `reqwest`-backed catalog client.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    client: Client,
    base_url: Url,
    resource: String,
    api_key: Option<String>,
    language: Option<String>,
}

impl HttpCatalogClient {
    /// Builds a client with the configured timeout.
    ///
    /// # Errors
    /// Returns the `reqwest` builder error when TLS/backend setup fails.
    pub fn new(config: &CatalogConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self::with_client(client, config))
    }

    /// Uses a caller-provided `reqwest::Client`.
    pub fn with_client(client: Client, config: &CatalogConfig) -> Self {
        Self {
            client,
            base_url: config.api_base_url.clone(),
            resource: config.resource.clone(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
        }
    }

    /// Resolves `{base}/{resource}/{item_key}` plus query parameters.
    pub fn item_url(&self, item_key: &str) -> Result<Url, FetchFailure> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchFailure::Malformed("catalog base URL cannot hold a path".to_string()))?
            .pop_if_empty()
            .push(self.resource.as_str())
            .push(item_key);

        let pairs = [("api_key", &self.api_key), ("language", &self.language)]
            .into_iter()
            .filter_map(|(name, value)| value.as_deref().map(|value| (name, value)))
            .collect::<Vec<_>>();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn fetch_item(&self, item_key: &str) -> Result<ItemRecord, FetchFailure> {
        let url = self.item_url(item_key)?;
        let started_at = Instant::now();

        let response = self.client.get(url).send().await.map_err(|err| {
            warn!(
                "event=catalog_fetch module=remote status=error item_key={} error_code=unreachable timeout={}",
                item_key,
                err.is_timeout()
            );
            FetchFailure::Unreachable(err.without_url().to_string())
        })?;

        let status = response.status();
        debug!(
            "event=catalog_fetch module=remote status=response item_key={} http_status={} duration_ms={}",
            item_key,
            status.as_u16(),
            started_at.elapsed().as_millis()
        );
        if status == StatusCode::NOT_FOUND {
            return Err(FetchFailure::NotFound(item_key.to_string()));
        }
        if !status.is_success() {
            return Err(FetchFailure::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| FetchFailure::Unreachable(err.without_url().to_string()))?;
        let item: ItemRecord = serde_json::from_slice(&body)
            .map_err(|err| FetchFailure::Malformed(err.to_string()))?;
        item.validate()
            .map_err(|err| FetchFailure::Malformed(err.to_string()))?;

        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::HttpCatalogClient;
    use crate::config::CatalogConfig;
    use reqwest::{Client, Url};

    fn client_with(base: &str, api_key: Option<&str>, language: Option<&str>) -> HttpCatalogClient {
        let config = CatalogConfig {
            api_base_url: Url::parse(base).unwrap(),
            api_key: api_key.map(str::to_string),
            language: language.map(str::to_string),
            ..CatalogConfig::default()
        };
        HttpCatalogClient::with_client(Client::new(), &config)
    }

    #[test]
    fn item_url_appends_resource_and_id_to_base_path() {
        let client = client_with("https://catalog.example/3/", None, None);
        assert_eq!(
            client.item_url("42").unwrap().as_str(),
            "https://catalog.example/3/movie/42"
        );

        let client = client_with("https://catalog.example/3", None, None);
        assert_eq!(
            client.item_url("42").unwrap().as_str(),
            "https://catalog.example/3/movie/42"
        );
    }

    #[test]
    fn item_url_carries_optional_query_parameters() {
        let client = client_with("https://catalog.example/", Some("k"), Some("pt-BR"));
        assert_eq!(
            client.item_url("7").unwrap().as_str(),
            "https://catalog.example/movie/7?api_key=k&language=pt-BR"
        );
    }
}
