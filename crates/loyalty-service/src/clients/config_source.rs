//! Presence config source over HTTP GET

use async_trait::async_trait;
use loyalty_core::{DomainError, PresenceConfigSource, RepoResult};
use reqwest::Client;
use serde_json::Value;

use super::transport_error;

#[derive(Debug, Clone)]
pub struct HttpConfigSource {
    url: String,
    http: Client,
}

impl HttpConfigSource {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), url)
    }

    #[must_use]
    pub fn with_client(http: Client, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http,
        }
    }
}

#[async_trait]
impl PresenceConfigSource for HttpConfigSource {
    async fn fetch(&self) -> RepoResult<Value> {
        let response = self.http.get(&self.url).send().await.map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(DomainError::UnexpectedStatus {
                collaborator: "presence-config",
                status: response.status().as_u16(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| DomainError::MalformedResponse {
                collaborator: "presence-config",
                message: e.to_string(),
            })
    }
}
