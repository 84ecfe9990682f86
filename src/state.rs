//! Conversation state as a single tagged union, advanced only by [`reduce`].
//!
//! Every variant that holds a conversation owns it outright, so an operation that
//! is illegal in the current phase (sending while a reply is outstanding, confirming
//! a registration that was never offered) has no state to act on and is ignored.

use crate::types::{ChatSession, Message, RegistrationDraft, Suggestion};

#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    pub session: ChatSession,
    pub locale: String,
    pub messages: Vec<Message>,
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ChatState {
    #[default]
    Uninitialized,
    /// Start handshake in flight.
    Starting,
    Active(Conversation),
    AwaitingReply(Conversation),
    RegistrationPending {
        conversation: Conversation,
        draft: RegistrationDraft,
    },
    SubmittingRegistration(Conversation),
}

/// Coarse view of [`ChatState`] without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Starting,
    Active,
    AwaitingReply,
    RegistrationPending,
    SubmittingRegistration,
}

impl Phase {
    /// Whether the input box should accept text.
    pub fn accepts_input(self) -> bool {
        matches!(self, Phase::Active)
    }

    /// Whether a typing indicator should be shown.
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            Phase::Starting | Phase::AwaitingReply | Phase::SubmittingRegistration
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    StartRequested,
    SessionStarted {
        session: ChatSession,
        locale: String,
        greeting: Message,
        suggestions: Vec<Suggestion>,
    },
    UserSubmitted(Message),
    ReplyReceived {
        session: ChatSession,
        reply: Message,
        suggestions: Vec<Suggestion>,
        registration: Option<RegistrationDraft>,
    },
    ReplyFailed(Message),
    RegistrationSubmitted,
    RegistrationDismissed,
    RegistrationResolved(Message),
    Reset,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Applied(ChatState),
    Ignored(ChatState),
}

impl Step {
    pub fn into_state(self) -> ChatState {
        match self {
            Step::Applied(state) | Step::Ignored(state) => state,
        }
    }
}

pub fn reduce(state: ChatState, event: ChatEvent) -> Step {
    use ChatEvent as E;
    use ChatState as S;

    match (state, event) {
        (_, E::Reset) => Step::Applied(S::Uninitialized),
        (S::Uninitialized, E::StartRequested) => Step::Applied(S::Starting),
        (
            S::Starting,
            E::SessionStarted {
                session,
                locale,
                greeting,
                suggestions,
            },
        ) => Step::Applied(S::Active(Conversation {
            session,
            locale,
            messages: vec![greeting],
            suggestions,
        })),
        (S::Active(mut conversation), E::UserSubmitted(message)) => {
            conversation.messages.push(message);
            conversation.suggestions.clear();
            Step::Applied(S::AwaitingReply(conversation))
        }
        (
            S::AwaitingReply(mut conversation),
            E::ReplyReceived {
                session,
                reply,
                suggestions,
                registration,
            },
        ) => {
            if session.id != conversation.session.id {
                conversation.session = session;
            }
            conversation.messages.push(reply);
            conversation.suggestions = suggestions;
            match registration {
                Some(draft) => Step::Applied(S::RegistrationPending {
                    conversation,
                    draft,
                }),
                None => Step::Applied(S::Active(conversation)),
            }
        }
        (S::AwaitingReply(mut conversation), E::ReplyFailed(apology)) => {
            conversation.messages.push(apology);
            conversation.suggestions.clear();
            Step::Applied(S::Active(conversation))
        }
        (S::RegistrationPending { conversation, .. }, E::RegistrationSubmitted) => {
            Step::Applied(S::SubmittingRegistration(conversation))
        }
        (S::RegistrationPending { conversation, .. }, E::RegistrationDismissed) => {
            Step::Applied(S::Active(conversation))
        }
        (S::SubmittingRegistration(mut conversation), E::RegistrationResolved(message)) => {
            conversation.messages.push(message);
            Step::Applied(S::Active(conversation))
        }
        (state, _) => Step::Ignored(state),
    }
}

impl ChatState {
    /// Feeds `event` through [`reduce`]; returns whether the transition was legal.
    pub fn apply(&mut self, event: ChatEvent) -> bool {
        match reduce(std::mem::take(self), event) {
            Step::Applied(next) => {
                *self = next;
                true
            }
            Step::Ignored(unchanged) => {
                *self = unchanged;
                false
            }
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            ChatState::Uninitialized => Phase::Uninitialized,
            ChatState::Starting => Phase::Starting,
            ChatState::Active(_) => Phase::Active,
            ChatState::AwaitingReply(_) => Phase::AwaitingReply,
            ChatState::RegistrationPending { .. } => Phase::RegistrationPending,
            ChatState::SubmittingRegistration(_) => Phase::SubmittingRegistration,
        }
    }

    pub fn conversation(&self) -> Option<&Conversation> {
        match self {
            ChatState::Uninitialized | ChatState::Starting => None,
            ChatState::Active(conversation)
            | ChatState::AwaitingReply(conversation)
            | ChatState::SubmittingRegistration(conversation)
            | ChatState::RegistrationPending { conversation, .. } => Some(conversation),
        }
    }

    pub fn pending_registration(&self) -> Option<&RegistrationDraft> {
        match self {
            ChatState::RegistrationPending { draft, .. } => Some(draft),
            _ => None,
        }
    }
}
