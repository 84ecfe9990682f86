use crate::auth::Identity;
use crate::types::{Message, RegistrationDraft, Role, Suggestion};
use anyhow::{Result, anyhow, bail};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Say(String),
    /// Zero-based index into the current suggestions.
    Choose(usize),
    Confirm,
    Dismiss,
    Email {
        address: String,
        name: Option<String>,
    },
    History,
    Quit,
}

pub fn parse_input(line: &str) -> Result<CliCommand> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        bail!("empty input");
    }

    let Some(rest) = trimmed.strip_prefix('/') else {
        return Ok(CliCommand::Say(trimmed.to_string()));
    };

    let mut parts = rest.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or_default();
    let args = parts.next().map(str::trim).unwrap_or_default();

    if let Ok(number) = command.parse::<usize>() {
        if number == 0 {
            bail!("suggestions are numbered from 1");
        }
        return Ok(CliCommand::Choose(number - 1));
    }

    match command {
        "confirm" => Ok(CliCommand::Confirm),
        "dismiss" => Ok(CliCommand::Dismiss),
        "history" => Ok(CliCommand::History),
        "quit" | "exit" => Ok(CliCommand::Quit),
        "email" => {
            let mut args = args.splitn(2, char::is_whitespace);
            let address = args
                .next()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .ok_or_else(|| anyhow!("an email address is required after /email"))?;
            let name = args
                .next()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
            Ok(CliCommand::Email { address, name })
        }
        other => bail!("unknown command: /{other}"),
    }
}

/// Greeting line for a signed-in customer; `None` without a non-blank display name.
pub fn render_welcome(identity: Option<&Identity>) -> Option<String> {
    let name = identity?.display_name.as_deref()?.trim();
    if name.is_empty() {
        return None;
    }
    Some(format!("Welcome back, {name}!"))
}

pub fn render_message(message: &Message, agent_name: &str) -> String {
    let speaker = match message.role {
        Role::User => "you",
        Role::Assistant => agent_name,
    };
    format!(
        "[{}] {speaker}: {}",
        message.timestamp.format("%H:%M"),
        message.content
    )
}

pub fn render_suggestions(suggestions: &[Suggestion]) -> Option<String> {
    if suggestions.is_empty() {
        return None;
    }
    let items: Vec<String> = suggestions
        .iter()
        .enumerate()
        .map(|(i, s)| format!("/{} {}", i + 1, s.label))
        .collect();
    Some(format!("suggestions: {}", items.join("  ")))
}

pub fn render_registration(draft: &RegistrationDraft) -> String {
    let mut out = String::from("Confirm your registration:\n");
    for (key, value) in draft.display_fields() {
        out.push_str(&format!("  {key}: {value}\n"));
    }
    out.push_str("type /confirm to complete registration or /dismiss to cancel");
    out
}
