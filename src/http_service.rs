//! HTTP client for the landing-widget conversation endpoints.

use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::service::{
    ConversationService, MessageRequest, RegistrationReply, StartReply, TranscriptRequest,
    TurnReply,
};
use crate::types::RegistrationDraft;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

const START_PATH: &str = "/api/v1/chat/start";
const MESSAGE_PATH: &str = "/api/v1/chat/message";
const REGISTER_PATH: &str = "/api/v1/registration/register";
const TRANSCRIPT_PATH: &str = "/api/v1/chat/transcript/email";

#[derive(Clone)]
pub struct HttpConversationService {
    client: Client,
    base_url: String,
}

impl HttpConversationService {
    pub fn new(cfg: &ServiceConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .user_agent(concat!("carechat/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self::with_client(client, &cfg.base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ConversationService for HttpConversationService {
    async fn start(&self, locale: &str) -> Result<StartReply, ServiceError> {
        debug!(locale, "chat: starting session");
        let req = self
            .client
            .post(self.url(START_PATH))
            .query(&[("language", locale)]);
        let body = execute(req).await?;
        decode("chat start", &body)
    }

    async fn send(
        &self,
        session_id: &str,
        message: &str,
        locale: &str,
    ) -> Result<TurnReply, ServiceError> {
        debug!(session_id, len = message.len(), "chat: sending message");
        let req = self.client.post(self.url(MESSAGE_PATH)).json(&MessageRequest {
            session_id,
            message,
            language: locale,
        });
        let body = execute(req).await?;
        decode("chat message", &body)
    }

    async fn register(
        &self,
        draft: &RegistrationDraft,
    ) -> Result<RegistrationReply, ServiceError> {
        debug!("chat: submitting registration draft");
        let req = self.client.post(self.url(REGISTER_PATH)).json(draft);
        let body = execute(req).await?;
        decode("registration", &body)
    }

    async fn email_transcript(
        &self,
        session_id: &str,
        email: &str,
        name: &str,
    ) -> Result<(), ServiceError> {
        debug!(session_id, "chat: requesting transcript email");
        let req = self
            .client
            .post(self.url(TRANSCRIPT_PATH))
            .json(&TranscriptRequest {
                session_id,
                email,
                name,
            });
        execute(req).await?;
        Ok(())
    }
}

/// Sends the request and returns the body of a 2xx response.
pub(crate) async fn execute(req: RequestBuilder) -> Result<Vec<u8>, ServiceError> {
    let resp = req.send().await?;
    let status = resp.status();
    let body = resp.bytes().await?;
    if !status.is_success() {
        return Err(ServiceError::status(
            status,
            String::from_utf8_lossy(&body).into_owned(),
        ));
    }
    Ok(body.to_vec())
}

pub(crate) fn decode<T: DeserializeOwned>(
    endpoint: &'static str,
    body: &[u8],
) -> Result<T, ServiceError> {
    serde_json::from_slice(body).map_err(|source| ServiceError::Malformed { endpoint, source })
}
