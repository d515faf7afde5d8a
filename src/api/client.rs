use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client as HttpClient;
use url::Url;

use crate::api::error::ApiError;
use crate::api::models::{
    decode_list, Conversation, LegacyMessage, LoginRequest, Message, NewConversation, Participants,
};
use crate::api::MessagingApi;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

pub struct ApiClient {
    pub http: HttpClient,
    pub base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_http(HttpClient::new(), base_url)
    }

    pub fn with_http(http: HttpClient, base_url: &str) -> Result<Self, ApiError> {
        let base_url = Url::parse(&crate::utils::normalize_url(base_url))?;
        Ok(Self { http, base_url })
    }

    /// Joins percent-encoded path segments onto the base url.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Like `endpoint`, under `/api` unless the base url already points there.
    fn api_endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let trimmed = self.base_url.path().trim_end_matches('/');
        if trimmed.ends_with("/api") {
            self.endpoint(segments)
        } else {
            let mut all = Vec::with_capacity(segments.len() + 1);
            all.push("api");
            all.extend_from_slice(segments);
            self.endpoint(&all)
        }
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ApiError::Status { status: status.as_u16(), body })
    }

    /// Fetch messages from the flat `/messages` endpoint, which predates conversations.
    pub async fn legacy_messages(&self, from: &str, to: &str) -> Result<Vec<LegacyMessage>, ApiError> {
        let endpoint = self.endpoint(&["messages"])?;
        let resp = self
            .http
            .get(endpoint)
            .query(&[("from", from), ("to", to)])
            .send()
            .await?;
        let bytes = Self::check(resp).await?.bytes().await?;
        Ok(decode_list(&bytes)?)
    }

    /// Post to the flat `/message` endpoint. Incomplete messages are skipped.
    pub async fn legacy_send(&self, message: &LegacyMessage) -> Result<bool, ApiError> {
        if !message.is_complete() {
            debug!("Skipping incomplete legacy message");
            return Ok(false);
        }
        let endpoint = self.endpoint(&["message"])?;
        let resp = self.http.post(endpoint).json(message).send().await?;
        Self::check(resp).await?;
        Ok(true)
    }
}

#[async_trait]
impl MessagingApi for ApiClient {
    async fn login(&self, name: &str) -> Result<(), ApiError> {
        let endpoint = self.api_endpoint(&["login"])?;
        let resp = self.http.post(endpoint).json(&LoginRequest { name }).send().await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn conversations(&self, user_name: &str) -> Result<Vec<Conversation>, ApiError> {
        let endpoint = self.api_endpoint(&["conversations"])?;
        let resp = self
            .http
            .get(endpoint)
            .query(&[("name", user_name)])
            .send()
            .await?;
        let bytes = Self::check(resp).await?.bytes().await?;
        Ok(decode_list(&bytes)?)
    }

    async fn create_conversation(
        &self,
        participants: &Participants,
    ) -> Result<Option<Conversation>, ApiError> {
        let endpoint = self.api_endpoint(&["conversations"])?;
        let body = NewConversation { participants: participants.to_vec() };
        let resp = self.http.post(endpoint).json(&body).send().await?;
        let bytes = Self::check(resp).await?.bytes().await?;
        match serde_json::from_slice::<Conversation>(&bytes) {
            Ok(conv) => Ok(Some(conv)),
            Err(e) => {
                debug!("Create conversation response is not a conversation: {e}");
                Ok(None)
            }
        }
    }

    async fn messages(&self, conversation_id: &str) -> Result<Vec<Message>, ApiError> {
        let endpoint = self.api_endpoint(&["conversations", conversation_id, "messages"])?;
        let resp = self.http.get(endpoint).send().await?;
        let bytes = Self::check(resp).await?.bytes().await?;
        Ok(decode_list(&bytes)?)
    }

    async fn send_message(&self, conversation_id: &str, message: &Message) -> Result<(), ApiError> {
        let endpoint = self.api_endpoint(&["conversations", conversation_id, "messages"])?;
        let resp = self.http.post(endpoint).json(message).send().await?;
        if let Err(e) = Self::check(resp).await {
            warn!("Server refused message {}: {e}", message.id);
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_joined_and_encoded() {
        let client = ApiClient::new("localhost:8080").unwrap();
        assert_eq!(
            client.api_endpoint(&["conversations", "al ice-bob", "messages"]).unwrap().as_str(),
            "http://localhost:8080/api/conversations/al%20ice-bob/messages"
        );
        assert_eq!(client.endpoint(&["message"]).unwrap().as_str(), "http://localhost:8080/message");
    }

    #[test]
    fn api_prefix_is_not_doubled() {
        let client = ApiClient::new("http://chat.example/api/").unwrap();
        assert_eq!(
            client.api_endpoint(&["login"]).unwrap().as_str(),
            "http://chat.example/api/login"
        );
        let client = ApiClient::new("http://chat.example/v2").unwrap();
        assert_eq!(
            client.api_endpoint(&["login"]).unwrap().as_str(),
            "http://chat.example/v2/api/login"
        );
    }
}
