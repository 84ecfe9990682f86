use crate::error::TranscriptError;
use crate::service::ConversationService;
use crate::types::{ChatSession, Message, Role};

/// Renders the local conversation as plain text. `None` when there is nothing to show.
pub fn format_transcript(session: Option<&ChatSession>, messages: &[Message]) -> Option<String> {
    if messages.is_empty() {
        return None;
    }

    let agent = session.map(|s| s.agent_name.as_str()).unwrap_or("Assistant");
    let mut out = String::new();
    out.push_str("# Chat Transcript\n\n");
    if let Some(session) = session {
        out.push_str(&format!("Session: {}\n", session.id));
        out.push_str(&format!("Agent: {}\n\n", session.agent_name));
    }
    for msg in messages {
        let speaker = match msg.role {
            Role::User => "You",
            Role::Assistant => agent,
        };
        out.push_str(&format!(
            "[{}] {}: {}\n",
            msg.timestamp.format("%H:%M"),
            speaker,
            msg.content
        ));
    }
    Some(out)
}

/// Validates the recipient and asks `service` to mail the transcript of `session_id`.
/// A blank `name` falls back to `default_name`. Returns the trimmed address.
pub async fn send_transcript<'a, S: ConversationService + ?Sized>(
    service: &S,
    session_id: &str,
    email: &'a str,
    name: Option<&str>,
    default_name: &str,
) -> Result<&'a str, TranscriptError> {
    let email = checked_address(email)?;
    let name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(default_name);
    service.email_transcript(session_id, email, name).await?;
    Ok(email)
}

/// Trims a transcript recipient and refuses blank or malformed addresses.
pub fn checked_address(raw: &str) -> Result<&str, TranscriptError> {
    let email = raw.trim();
    if email.is_empty() {
        return Err(TranscriptError::MissingEmail);
    }
    if !looks_like_email(email) {
        return Err(TranscriptError::InvalidEmail(email.to_string()));
    }
    Ok(email)
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}
