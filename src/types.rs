use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Prefix of session ids fabricated locally when the service is unreachable.
pub const OFFLINE_SESSION_PREFIX: &str = "offline-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of the conversation. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Quick reply offered after an assistant turn. `value` is sent verbatim when chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub label: String,
    pub value: String,
}

impl Suggestion {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSession {
    pub id: String,
    pub agent_name: String,
    pub agent_avatar: Option<String>,
}

impl ChatSession {
    pub fn new(id: impl Into<String>, agent_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            agent_name: agent_name.into(),
            agent_avatar: None,
        }
    }

    /// Session fabricated on the client after a failed start handshake.
    pub fn offline(agent_name: impl Into<String>) -> Self {
        Self::new(
            format!("{OFFLINE_SESSION_PREFIX}{}", Uuid::new_v4()),
            agent_name,
        )
    }

    pub fn is_offline(&self) -> bool {
        self.id.starts_with(OFFLINE_SESSION_PREFIX)
    }
}

/// Account-creation payload assembled by the service mid-conversation.
///
/// The client never interprets the fields; it shows them for confirmation and
/// submits the object back exactly as received.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationDraft(Map<String, Value>);

impl RegistrationDraft {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Fields rendered as `key: value` pairs for display. Strings are shown unquoted.
    pub fn display_fields(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(key, value)| {
                let shown = match value {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                (key.clone(), shown)
            })
            .collect()
    }
}

impl From<Map<String, Value>> for RegistrationDraft {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn offline_sessions_are_recognisable() {
        let session = ChatSession::offline("AgentCare Assistant");
        assert!(session.is_offline());
        assert!(session.id.len() > OFFLINE_SESSION_PREFIX.len());
        assert!(!ChatSession::new("s1", "Ava").is_offline());
    }

    #[test]
    fn message_ids_are_unique() {
        let first = Message::user("hi");
        let second = Message::user("hi");
        assert_ne!(first.id, second.id);
        assert_eq!(first.role, Role::User);
    }

    #[test]
    fn draft_serializes_verbatim() {
        let raw = json!({"company": "Acme", "seats": 4, "plan": {"tier": "pro"}});
        let draft: RegistrationDraft = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&draft).unwrap(), raw);

        let fields = draft.display_fields();
        assert!(fields.contains(&("company".to_string(), "Acme".to_string())));
        assert!(fields.contains(&("seats".to_string(), "4".to_string())));
    }
}
