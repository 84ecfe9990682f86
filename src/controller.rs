use crate::config::ChatConfig;
use crate::error::TranscriptError;
use crate::service::ConversationService;
use crate::state::{ChatEvent, ChatState, Phase};
use crate::transcript;
use crate::types::{ChatSession, Message, RegistrationDraft, Suggestion};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Canned texts and defaults the controller needs when the service cannot answer.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub locale: String,
    pub fallback_agent_name: String,
    pub fallback_greeting: String,
    pub fallback_suggestions: Vec<Suggestion>,
    pub apology: String,
    pub registration_confirmed: String,
    pub registration_failed: String,
    pub transcript_default_name: String,
}

impl From<&ChatConfig> for ChatSettings {
    fn from(cfg: &ChatConfig) -> Self {
        Self {
            locale: cfg.locale.clone(),
            fallback_agent_name: cfg.fallback_agent_name.clone(),
            fallback_greeting: cfg.fallback_greeting.clone(),
            fallback_suggestions: cfg.fallback_suggestions.clone(),
            apology: cfg.apology.clone(),
            registration_confirmed: cfg.registration_confirmed.clone(),
            registration_failed: cfg.registration_failed.clone(),
            transcript_default_name: cfg.transcript_default_name.clone(),
        }
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self::from(&ChatConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionStart {
    pub session: ChatSession,
    pub greeting: Message,
    pub suggestions: Vec<Suggestion>,
}

/// Assistant turn produced by a successful send.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub reply: Message,
    pub suggestions: Vec<Suggestion>,
    pub registration: Option<RegistrationDraft>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendRejection {
    /// Nothing left after trimming.
    Empty,
    /// A reply or registration submission is still outstanding.
    Busy,
    NotStarted,
    /// A registration draft is waiting for confirm or dismiss.
    RegistrationPending,
    UnknownSuggestion,
    /// The session was closed while the request was in flight.
    Discarded,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    Replied(Turn),
    /// The service failed; the returned apology was appended in its place.
    Failed(Message),
    Rejected(SendRejection),
}

/// Read model handed to views.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSnapshot {
    pub phase: Phase,
    pub session: Option<ChatSession>,
    pub messages: Vec<Message>,
    pub suggestions: Vec<Suggestion>,
    pub pending_registration: Option<RegistrationDraft>,
}

struct Inner {
    state: ChatState,
    epoch: u64,
}

pub struct ChatController<S> {
    service: S,
    settings: ChatSettings,
    inner: Mutex<Inner>,
}

impl<S: ConversationService> ChatController<S> {
    pub fn new(service: S, settings: ChatSettings) -> Self {
        Self {
            service,
            settings,
            inner: Mutex::new(Inner {
                state: ChatState::Uninitialized,
                epoch: 0,
            }),
        }
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    pub async fn phase(&self) -> Phase {
        self.inner.lock().await.state.phase()
    }

    pub async fn snapshot(&self) -> ChatSnapshot {
        let inner = self.inner.lock().await;
        let conversation = inner.state.conversation();
        ChatSnapshot {
            phase: inner.state.phase(),
            session: conversation.map(|c| c.session.clone()),
            messages: conversation.map(|c| c.messages.clone()).unwrap_or_default(),
            suggestions: conversation
                .map(|c| c.suggestions.clone())
                .unwrap_or_default(),
            pending_registration: inner.state.pending_registration().cloned(),
        }
    }

    /// First-interaction hook: starts a session with the configured locale if none exists.
    pub async fn open(&self) -> ChatSnapshot {
        let locale = self.settings.locale.clone();
        self.start_session(&locale).await;
        self.snapshot().await
    }

    /// Runs the start handshake. Returns `None` if a session already exists or is
    /// being started, or if the controller was closed before the handshake finished.
    ///
    /// Never fails: when the service cannot be reached a local session is
    /// fabricated from the fallback settings.
    pub async fn start_session(&self, locale: &str) -> Option<SessionStart> {
        let epoch = {
            let mut inner = self.inner.lock().await;
            if !inner.state.apply(ChatEvent::StartRequested) {
                debug!(phase = ?inner.state.phase(), "chat: start ignored");
                return None;
            }
            inner.epoch
        };

        let start = match self.service.start(locale).await {
            Ok(reply) => {
                info!(session_id = %reply.session_id, agent = %reply.agent_name, "chat: session started");
                SessionStart {
                    session: reply.session(),
                    greeting: Message::assistant(reply.message),
                    suggestions: reply.suggestions,
                }
            }
            Err(err) => {
                warn!(error = %err, "chat: start failed, using offline session");
                self.fallback_start()
            }
        };

        let mut inner = self.inner.lock().await;
        if inner.epoch != epoch {
            debug!("chat: start completed after close, discarding");
            return None;
        }
        inner.state.apply(ChatEvent::SessionStarted {
            session: start.session.clone(),
            locale: locale.to_string(),
            greeting: start.greeting.clone(),
            suggestions: start.suggestions.clone(),
        });
        Some(start)
    }

    fn fallback_start(&self) -> SessionStart {
        SessionStart {
            session: ChatSession::offline(self.settings.fallback_agent_name.clone()),
            greeting: Message::assistant(self.settings.fallback_greeting.clone()),
            suggestions: self.settings.fallback_suggestions.clone(),
        }
    }

    /// Sends one user message. The user message is appended before the request goes
    /// out; failures are turned into the configured apology and never raised.
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Rejected(SendRejection::Empty);
        }

        let (session_id, locale, epoch) = {
            let mut inner = self.inner.lock().await;
            let rejection = match inner.state.phase() {
                Phase::Active => None,
                Phase::Uninitialized | Phase::Starting => Some(SendRejection::NotStarted),
                Phase::AwaitingReply | Phase::SubmittingRegistration => {
                    Some(SendRejection::Busy)
                }
                Phase::RegistrationPending => Some(SendRejection::RegistrationPending),
            };
            if let Some(rejection) = rejection {
                debug!(?rejection, "chat: send rejected");
                return SendOutcome::Rejected(rejection);
            }
            let Some(conversation) = inner.state.conversation() else {
                return SendOutcome::Rejected(SendRejection::NotStarted);
            };
            let session_id = conversation.session.id.clone();
            let locale = conversation.locale.clone();
            inner.state.apply(ChatEvent::UserSubmitted(Message::user(text)));
            (session_id, locale, inner.epoch)
        };

        let result = self.service.send(&session_id, text, &locale).await;

        let mut inner = self.inner.lock().await;
        if inner.epoch != epoch {
            debug!(session_id = %session_id, "chat: reply arrived after close, discarding");
            return SendOutcome::Rejected(SendRejection::Discarded);
        }

        match result {
            Ok(reply) => {
                let turn = Turn {
                    reply: Message::assistant(reply.message.clone()),
                    suggestions: reply.suggestions.clone(),
                    registration: reply.registration(),
                };
                if turn.registration.is_some() {
                    info!(session_id = %reply.session_id, "chat: registration draft ready");
                }
                inner.state.apply(ChatEvent::ReplyReceived {
                    session: reply.session(),
                    reply: turn.reply.clone(),
                    suggestions: turn.suggestions.clone(),
                    registration: turn.registration.clone(),
                });
                SendOutcome::Replied(turn)
            }
            Err(err) => {
                warn!(session_id = %session_id, error = %err, "chat: send failed");
                let apology = Message::assistant(self.settings.apology.clone());
                inner.state.apply(ChatEvent::ReplyFailed(apology.clone()));
                SendOutcome::Failed(apology)
            }
        }
    }

    /// Sends the value of the suggestion at `index` verbatim.
    pub async fn choose_suggestion(&self, index: usize) -> SendOutcome {
        let value = {
            let inner = self.inner.lock().await;
            inner
                .state
                .conversation()
                .and_then(|c| c.suggestions.get(index))
                .map(|s| s.value.clone())
        };
        match value {
            Some(value) => self.send_message(&value).await,
            None => SendOutcome::Rejected(SendRejection::UnknownSuggestion),
        }
    }

    /// Submits the pending draft. Always appends exactly one assistant message and
    /// drops the draft, whatever the outcome. `None` when no draft is pending.
    pub async fn confirm_registration(&self) -> Option<Message> {
        let (draft, epoch) = {
            let mut inner = self.inner.lock().await;
            let draft = inner.state.pending_registration().cloned()?;
            inner.state.apply(ChatEvent::RegistrationSubmitted);
            (draft, inner.epoch)
        };

        let content = match self.service.register(&draft).await {
            Ok(reply) if reply.success => {
                info!("chat: registration completed");
                reply
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| self.settings.registration_confirmed.clone())
            }
            Ok(reply) => {
                warn!(
                    reason = reply.message.as_deref().unwrap_or("-"),
                    "chat: registration rejected"
                );
                self.settings.registration_failed.clone()
            }
            Err(err) => {
                warn!(error = %err, "chat: registration failed");
                self.settings.registration_failed.clone()
            }
        };

        let message = Message::assistant(content);
        let mut inner = self.inner.lock().await;
        if inner.epoch != epoch {
            debug!("chat: registration result arrived after close, discarding");
            return None;
        }
        inner
            .state
            .apply(ChatEvent::RegistrationResolved(message.clone()));
        Some(message)
    }

    /// Drops the pending draft without submitting it.
    pub async fn dismiss_registration(&self) -> bool {
        self.inner
            .lock()
            .await
            .state
            .apply(ChatEvent::RegistrationDismissed)
    }

    /// Asks the service to mail the transcript. Independent of the conversation
    /// state: history is never touched and errors go back to the caller.
    pub async fn email_transcript(
        &self,
        email: &str,
        name: Option<&str>,
    ) -> Result<(), TranscriptError> {
        let session_id = {
            let inner = self.inner.lock().await;
            inner
                .state
                .conversation()
                .map(|c| c.session.id.clone())
                .ok_or(TranscriptError::NoSession)?
        };

        transcript::send_transcript(
            &self.service,
            &session_id,
            email,
            name,
            &self.settings.transcript_default_name,
        )
        .await
        .inspect_err(|err| {
            warn!(session_id = %session_id, error = %err, "chat: transcript email failed")
        })?;
        info!(session_id = %session_id, "chat: transcript email requested");
        Ok(())
    }

    /// Ends the session. Responses still in flight are discarded when they land.
    pub async fn close(&self) {
        let mut inner = self.inner.lock().await;
        inner.state.apply(ChatEvent::Reset);
        inner.epoch += 1;
    }
}
