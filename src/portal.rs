//! Customer-portal assistant: authenticated, no start handshake, no registration.

use crate::auth::AuthContext;
use crate::config::{PortalConfig, ServiceConfig};
use crate::error::ServiceError;
use crate::http_service::{decode, execute};
use crate::service::{ConversationService, RegistrationReply, StartReply, TurnReply};
use crate::types::{RegistrationDraft, Suggestion};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const CHAT_PATH: &str = "/api/v1/chat";
const AGENT_NAME: &str = "AgentCare Assistant";
const GREETING: &str = "Hello! I'm your AgentCare assistant. How can I help you today? \
You can ask me about:\n\n- Creating a new service request\n- Checking the status of your \
requests\n- Getting information about our services\n- General maintenance questions";
const UNPROCESSED_REPLY: &str = "I apologize, but I encountered an issue processing your \
request. Please try again.";

#[derive(Debug, Serialize)]
struct PortalRequest<'a> {
    message: &'a str,
    conversation_id: &'a str,
    tenant_id: &'a str,
    customer_id: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct PortalResponse {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl PortalResponse {
    fn text(self) -> String {
        self.response
            .filter(|t| !t.is_empty())
            .or(self.message.filter(|t| !t.is_empty()))
            .unwrap_or_else(|| UNPROCESSED_REPLY.to_string())
    }
}

pub fn quick_actions() -> Vec<Suggestion> {
    vec![
        Suggestion::new("Create a request", "I want to create a new service request"),
        Suggestion::new(
            "Check my requests",
            "What is the status of my service requests?",
        ),
        Suggestion::new("AC not working", "My AC is not cooling properly"),
        Suggestion::new("Plumbing issue", "I have a plumbing problem - leaking pipe"),
    ]
}

pub struct PortalService {
    client: Client,
    base_url: String,
    auth: AuthContext,
}

impl PortalService {
    pub fn new(
        portal: &PortalConfig,
        service: &ServiceConfig,
        auth: AuthContext,
    ) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .user_agent(concat!("carechat/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(service.timeout_secs))
            .build()?;
        Ok(Self::with_client(client, &portal.base_url, auth))
    }

    pub fn with_client(client: Client, base_url: &str, auth: AuthContext) -> Self {
        Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            auth,
        }
    }

    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    fn conversation_id(&self) -> String {
        format!("portal-{}", self.auth.customer_id())
    }
}

#[async_trait]
impl ConversationService for PortalService {
    async fn start(&self, _locale: &str) -> Result<StartReply, ServiceError> {
        Ok(StartReply {
            session_id: self.conversation_id(),
            agent_name: AGENT_NAME.to_string(),
            agent_avatar: None,
            message: GREETING.to_string(),
            suggestions: quick_actions(),
        })
    }

    async fn send(
        &self,
        session_id: &str,
        message: &str,
        _locale: &str,
    ) -> Result<TurnReply, ServiceError> {
        debug!(
            session_id,
            authenticated = self.auth.is_authenticated(),
            "portal: sending message"
        );
        let req = self
            .client
            .post(format!("{}{}", self.base_url, CHAT_PATH))
            .json(&PortalRequest {
                message,
                conversation_id: session_id,
                tenant_id: self.auth.tenant_id(),
                customer_id: self.auth.customer_id(),
            });
        let body = execute(self.auth.authorize(req)).await?;
        let reply: PortalResponse = decode("portal chat", &body)?;
        Ok(TurnReply {
            session_id: session_id.to_string(),
            agent_name: AGENT_NAME.to_string(),
            agent_avatar: None,
            message: reply.text(),
            suggestions: Vec::new(),
            requires_registration: false,
            registration_data: None,
        })
    }

    async fn register(
        &self,
        _draft: &RegistrationDraft,
    ) -> Result<RegistrationReply, ServiceError> {
        Err(ServiceError::Unsupported {
            operation: "registration",
        })
    }

    async fn email_transcript(
        &self,
        _session_id: &str,
        _email: &str,
        _name: &str,
    ) -> Result<(), ServiceError> {
        Err(ServiceError::Unsupported {
            operation: "transcript email",
        })
    }
}
