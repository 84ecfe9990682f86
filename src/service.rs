//! Seam between the chat controller and whatever answers the conversation.

use crate::error::ServiceError;
use crate::types::{ChatSession, RegistrationDraft, Suggestion};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

#[async_trait]
pub trait ConversationService: Send + Sync {
    /// Opens a conversation and returns the greeting turn.
    async fn start(&self, locale: &str) -> Result<StartReply, ServiceError>;

    /// Sends one user message and returns the assistant turn.
    async fn send(
        &self,
        session_id: &str,
        message: &str,
        locale: &str,
    ) -> Result<TurnReply, ServiceError>;

    /// Submits a confirmed registration draft verbatim.
    async fn register(&self, draft: &RegistrationDraft)
    -> Result<RegistrationReply, ServiceError>;

    /// Asks the service to mail the transcript of `session_id`.
    async fn email_transcript(
        &self,
        session_id: &str,
        email: &str,
        name: &str,
    ) -> Result<(), ServiceError>;
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StartReply {
    pub session_id: String,
    pub agent_name: String,
    #[serde(default)]
    pub agent_avatar: Option<String>,
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub suggestions: Vec<Suggestion>,
}

impl StartReply {
    pub fn session(&self) -> ChatSession {
        ChatSession {
            id: self.session_id.clone(),
            agent_name: self.agent_name.clone(),
            agent_avatar: self.agent_avatar.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TurnReply {
    pub session_id: String,
    pub agent_name: String,
    #[serde(default)]
    pub agent_avatar: Option<String>,
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub suggestions: Vec<Suggestion>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub requires_registration: bool,
    #[serde(default)]
    pub registration_data: Option<RegistrationDraft>,
}

impl TurnReply {
    pub fn session(&self) -> ChatSession {
        ChatSession {
            id: self.session_id.clone(),
            agent_name: self.agent_name.clone(),
            agent_avatar: self.agent_avatar.clone(),
        }
    }

    /// The draft, if the service flagged the registration as ready for confirmation.
    pub fn registration(&self) -> Option<RegistrationDraft> {
        if self.requires_registration {
            self.registration_data.clone()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegistrationReply {
    #[serde(default, deserialize_with = "null_as_default")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct MessageRequest<'a> {
    pub session_id: &'a str,
    pub message: &'a str,
    pub language: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct TranscriptRequest<'a> {
    pub session_id: &'a str,
    pub email: &'a str,
    pub name: &'a str,
}

/// Reads an explicit `null` the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
