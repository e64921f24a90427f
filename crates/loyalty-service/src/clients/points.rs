//! Points award collaborator client

use async_trait::async_trait;
use loyalty_core::{DomainError, PointsApi, PointsAward, RepoResult};
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};

use super::transport_error;

/// POSTs `{userId, points, reason}` to the points endpoint
#[derive(Debug, Clone)]
pub struct HttpPointsClient {
    url: String,
    api_key: Option<String>,
    http: Client,
}

impl HttpPointsClient {
    #[must_use]
    pub fn new(url: impl Into<String>, api_key: Option<String>) -> Self {
        Self::with_client(Client::new(), url, api_key)
    }

    /// Share an existing connection pool
    #[must_use]
    pub fn with_client(http: Client, url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            url: url.into(),
            api_key,
            http,
        }
    }
}

#[async_trait]
impl PointsApi for HttpPointsClient {
    #[instrument(skip(self, award), fields(user_id = %award.user_id, points = award.points))]
    async fn award(&self, award: &PointsAward) -> RepoResult<()> {
        let mut request = self.http.post(&self.url).json(award);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(transport_error)?;

        // Only 200 counts as a credited award
        if response.status() == StatusCode::OK {
            debug!("Points awarded");
            Ok(())
        } else {
            Err(DomainError::UnexpectedStatus {
                collaborator: "points",
                status: response.status().as_u16(),
            })
        }
    }
}
