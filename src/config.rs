use crate::types::Suggestion;
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

pub const BASE_URL_ENV: &str = "CARECHAT_BASE_URL";
pub const PORTAL_URL_ENV: &str = "CARECHAT_PORTAL_URL";
pub const ACCESS_TOKEN_ENV: &str = "CARECHAT_ACCESS_TOKEN";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub portal: PortalConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Locale and the canned texts the controller falls back to.
#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_agent_name")]
    pub fallback_agent_name: String,
    #[serde(default = "default_greeting")]
    pub fallback_greeting: String,
    #[serde(default = "default_fallback_suggestions")]
    pub fallback_suggestions: Vec<Suggestion>,
    #[serde(default = "default_apology")]
    pub apology: String,
    #[serde(default = "default_registration_confirmed")]
    pub registration_confirmed: String,
    #[serde(default = "default_registration_failed")]
    pub registration_failed: String,
    #[serde(default = "default_transcript_name")]
    pub transcript_default_name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PortalConfig {
    #[serde(default = "default_portal_url")]
    pub base_url: String,
    #[serde(default = "default_tenant_id")]
    pub tenant_id: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default = "default_portal_apology")]
    pub apology: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            fallback_agent_name: default_agent_name(),
            fallback_greeting: default_greeting(),
            fallback_suggestions: default_fallback_suggestions(),
            apology: default_apology(),
            registration_confirmed: default_registration_confirmed(),
            registration_failed: default_registration_failed(),
            transcript_default_name: default_transcript_name(),
        }
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: default_portal_url(),
            tenant_id: default_tenant_id(),
            access_token: None,
            user_id: None,
            display_name: None,
            apology: default_portal_apology(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&content).context("failed to parse config toml")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Loads `path` when given, otherwise starts from defaults, then applies env overrides.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        cfg.apply_env(|key| env::var(key).ok());
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.service.base_url = url;
        }
        if let Some(url) = lookup(PORTAL_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.portal.base_url = url;
        }
        if let Some(token) = lookup(ACCESS_TOKEN_ENV).filter(|v| !v.trim().is_empty()) {
            self.portal.access_token = Some(token);
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_url("service.base_url", &self.service.base_url)?;
        check_url("portal.base_url", &self.portal.base_url)?;
        if self.service.timeout_secs == 0 {
            bail!("service.timeout_secs must be greater than zero");
        }
        if self.chat.locale.trim().is_empty() {
            bail!("chat.locale is required");
        }
        if self.chat.fallback_greeting.trim().is_empty() {
            bail!("chat.fallback_greeting must not be empty");
        }
        if self.chat.fallback_suggestions.is_empty() {
            bail!("chat.fallback_suggestions must contain at least one entry");
        }
        Ok(())
    }
}

fn check_url(field: &str, value: &str) -> Result<()> {
    let url = reqwest::Url::parse(value.trim())
        .with_context(|| format!("{field} is not a valid URL: {value:?}"))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        bail!("{field} must use http or https, got {}", url.scheme());
    }
    Ok(())
}

fn default_base_url() -> String {
    "http://localhost:8001".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_agent_name() -> String {
    "AgentCare Assistant".to_string()
}

fn default_greeting() -> String {
    "Hello! Welcome to AgentCare. I'm here to help you learn about our AI-powered \
     maintenance management platform. How can I assist you today?"
        .to_string()
}

fn default_fallback_suggestions() -> Vec<Suggestion> {
    vec![
        Suggestion::new("Tell me about AgentCare", "What is AgentCare?"),
        Suggestion::new("See pricing plans", "What are your pricing plans?"),
        Suggestion::new("Start free trial", "I want to start a free trial"),
    ]
}

fn default_apology() -> String {
    "I'm sorry, I'm having trouble connecting right now. Please try again in a moment."
        .to_string()
}

fn default_registration_confirmed() -> String {
    "Your registration is complete. Welcome to AgentCare!".to_string()
}

fn default_registration_failed() -> String {
    "I'm sorry, there was an issue completing your registration. Please try again or \
     contact support."
        .to_string()
}

fn default_transcript_name() -> String {
    "Valued Customer".to_string()
}

fn default_portal_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_tenant_id() -> String {
    "default".to_string()
}

fn default_portal_apology() -> String {
    "I apologize, but I'm currently unable to connect to the AI service. Please try again \
     later or contact support if the issue persists."
        .to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}
