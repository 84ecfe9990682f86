//! Client-side session protocol for the AgentCare support chat.
//!
//! [`controller::ChatController`] owns one conversation and talks to a
//! [`service::ConversationService`]: either the landing-widget endpoints
//! ([`http_service::HttpConversationService`]) or the authenticated portal
//! assistant ([`portal::PortalService`]).

pub mod auth;
pub mod cli_adapter;
pub mod config;
pub mod controller;
pub mod error;
pub mod http_service;
pub mod portal;
pub mod service;
pub mod state;
pub mod status;
pub mod transcript;
pub mod types;

pub use controller::{ChatController, ChatSettings, ChatSnapshot, SendOutcome, SendRejection};
pub use error::{ServiceError, TranscriptError};
pub use service::ConversationService;
pub use state::{ChatState, Phase};
pub use types::{ChatSession, Message, RegistrationDraft, Role, Suggestion};
