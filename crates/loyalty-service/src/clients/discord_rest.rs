//! Discord REST client for channel messages and direct messages

use async_trait::async_trait;
use loyalty_core::{DmApi, DomainError, Embed, MessageApi, RepoResult, Snowflake};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use super::transport_error;

const COLLABORATOR: &str = "discord";

/// Minimal shape of message and channel objects returned by the API
#[derive(Debug, Deserialize)]
struct IdOnly {
    id: Snowflake,
}

/// Authenticated client for the Discord REST API
#[derive(Clone)]
pub struct DiscordRestClient {
    base_url: String,
    token: String,
    http: Client,
}

impl std::fmt::Debug for DiscordRestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordRestClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl DiscordRestClient {
    /// Example: `DiscordRestClient::new("https://discord.com/api/v10", token)`
    #[must_use]
    pub fn new(base_url: &str, token: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, token)
    }

    #[must_use]
    pub fn with_client(http: Client, base_url: &str, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            http,
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("Authorization", format!("Bot {}", self.token))
    }

    async fn send(&self, request: RequestBuilder) -> RepoResult<Response> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(transport_error)?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(DomainError::UnexpectedStatus {
                collaborator: COLLABORATOR,
                status: response.status().as_u16(),
            })
        }
    }

    async fn id_from(response: Response) -> RepoResult<Snowflake> {
        let body: IdOnly = response
            .json()
            .await
            .map_err(|e| DomainError::MalformedResponse {
                collaborator: COLLABORATOR,
                message: e.to_string(),
            })?;
        Ok(body.id)
    }
}

#[async_trait]
impl MessageApi for DiscordRestClient {
    #[instrument(skip(self, content))]
    async fn create_message(&self, channel_id: Snowflake, content: &str) -> RepoResult<Snowflake> {
        let url = format!("{}/channels/{}/messages", self.base_url, channel_id);
        let response = self
            .send(self.http.post(&url).json(&json!({ "content": content })))
            .await?;
        let id = Self::id_from(response).await?;
        debug!(message_id = %id, "Message created");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn delete_message(&self, channel_id: Snowflake, message_id: Snowflake) -> RepoResult<()> {
        let url = format!(
            "{}/channels/{}/messages/{}",
            self.base_url, channel_id, message_id
        );
        self.send(self.http.delete(&url)).await?;
        debug!("Message deleted");
        Ok(())
    }
}

#[async_trait]
impl DmApi for DiscordRestClient {
    #[instrument(skip(self))]
    async fn open_dm(&self, user_id: Snowflake) -> RepoResult<Snowflake> {
        let url = format!("{}/users/@me/channels", self.base_url);
        let response = self
            .send(self.http.post(&url).json(&json!({ "recipient_id": user_id })))
            .await?;
        Self::id_from(response).await
    }

    #[instrument(skip(self, embed))]
    async fn send_embed(&self, channel_id: Snowflake, embed: &Embed) -> RepoResult<()> {
        let url = format!("{}/channels/{}/messages", self.base_url, channel_id);
        self.send(self.http.post(&url).json(&json!({ "embeds": [embed] })))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_create_message_returns_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/100/messages"))
            .and(header("authorization", "Bot token-1"))
            .and(body_json(json!({ "content": "hello" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "555" })))
            .expect(1)
            .mount(&server)
            .await;

        let client = DiscordRestClient::new(&server.uri(), "token-1");
        let id = client.create_message(Snowflake::new(100), "hello").await.unwrap();
        assert_eq!(id, Snowflake::new(555));
    }

    #[tokio::test]
    async fn test_delete_message() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/channels/100/messages/555"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = DiscordRestClient::new(&server.uri(), "token-1");
        client
            .delete_message(Snowflake::new(100), Snowflake::new(555))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_dm_embed_is_two_requests() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/@me/channels"))
            .and(body_json(json!({ "recipient_id": "42" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "900", "type": 1 })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/channels/900/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "901" })))
            .expect(1)
            .mount(&server)
            .await;

        let client = DiscordRestClient::new(&server.uri(), "token-1");
        client
            .send_dm_embed(Snowflake::new(42), &Embed::new("Points", "You earned 5 points"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = DiscordRestClient::new(&server.uri(), "token-1");
        let err = client.create_message(Snowflake::new(1), "x").await.unwrap_err();
        assert!(matches!(err, DomainError::MalformedResponse { .. }));
    }

    #[test]
    fn test_debug_hides_token() {
        let client = DiscordRestClient::new("https://discord.com/api/v10/", "secret");
        let debug = format!("{client:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("https://discord.com/api/v10"));
    }
}
