use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::Backend;
use crate::core::config::AppConfig;
use crate::core::error::BackendError;
use crate::core::message::Message;
use crate::core::session::SessionSummary;

/// HTTP client for the chatbot backend
pub struct HttpBackend {
    client: Client,
    base_url: String,
    user_id: i64,
    timeout: Duration,
}

#[derive(Deserialize)]
struct ListEnvelope<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    user_id: i64,
    session_id: &'a str,
    user_message: &'a str,
}

#[derive(Deserialize)]
struct SendEnvelope {
    data: SendData,
}

#[derive(Deserialize)]
struct SendData {
    ai_response: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, user_id: i64) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_id,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.base_url.clone(), config.user_id).with_timeout(config.request_timeout())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, BackendError> {
        let resp = self
            .client
            .get(self.url("get-sessions"))
            .query(&[("user_id", self.user_id)])
            .timeout(self.timeout)
            .send()
            .await?;

        let envelope: ListEnvelope<SessionSummary> = decode(resp).await?;
        tracing::debug!(count = envelope.data.len(), "listed sessions");
        Ok(envelope.data)
    }

    async fn fetch_messages(&self, db_id: i64) -> Result<Vec<Message>, BackendError> {
        let resp = self
            .client
            .get(self.url("get-messages"))
            .query(&[("chat_session_id", db_id)])
            .timeout(self.timeout)
            .send()
            .await?;

        let envelope: ListEnvelope<Message> = decode(resp).await?;
        tracing::debug!(db_id, count = envelope.data.len(), "fetched messages");
        Ok(envelope.data)
    }

    async fn send_message(&self, session_token: &str, text: &str) -> Result<String, BackendError> {
        let body = SendRequest {
            user_id: self.user_id,
            session_id: session_token,
            user_message: text,
        };

        let resp = self
            .client
            .post(self.url("ai-agent"))
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        let envelope: SendEnvelope = decode(resp).await?;
        Ok(envelope.data.ai_response)
    }
}

/// Rejects non-2xx statuses, then parses the body as `T`.
async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, BackendError> {
    let status = resp.status();
    if !status.is_success() {
        let message = resp.text().await.unwrap_or_default();
        return Err(BackendError::Status {
            status: status.as_u16(),
            message,
        });
    }

    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| BackendError::Decode(e.to_string()))
}
