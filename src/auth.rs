//! Explicit identity handed to services that call authenticated endpoints.

use crate::config::PortalConfig;
use reqwest::RequestBuilder;
use std::fmt;

pub const ANONYMOUS_CUSTOMER: &str = "anonymous";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub display_name: Option<String>,
}

/// Single source of truth for "who is talking". Built once and injected.
#[derive(Clone, Default)]
pub struct AuthContext {
    access_token: Option<String>,
    identity: Option<Identity>,
    tenant_id: String,
}

impl AuthContext {
    pub fn anonymous(tenant_id: impl Into<String>) -> Self {
        Self {
            access_token: None,
            identity: None,
            tenant_id: tenant_id.into(),
        }
    }

    pub fn authenticated(
        tenant_id: impl Into<String>,
        access_token: impl Into<String>,
        identity: Identity,
    ) -> Self {
        Self {
            access_token: Some(access_token.into()),
            identity: Some(identity),
            tenant_id: tenant_id.into(),
        }
    }

    pub fn from_config(cfg: &PortalConfig) -> Self {
        let identity = cfg
            .user_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|user_id| Identity {
                user_id: user_id.to_string(),
                display_name: cfg.display_name.clone(),
            });
        Self {
            access_token: cfg
                .access_token
                .clone()
                .filter(|token| !token.trim().is_empty()),
            identity,
            tenant_id: cfg.tenant_id.clone(),
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Customer id sent to the service; `anonymous` without an identity.
    pub fn customer_id(&self) -> &str {
        self.identity
            .as_ref()
            .map(|identity| identity.user_id.as_str())
            .unwrap_or(ANONYMOUS_CUSTOMER)
    }

    /// Adds the bearer header when a token is present.
    pub fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("identity", &self.identity)
            .field("tenant_id", &self.tenant_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_context_has_fallback_customer() {
        let auth = AuthContext::anonymous("default");
        assert_eq!(auth.customer_id(), ANONYMOUS_CUSTOMER);
        assert!(!auth.is_authenticated());
    }

    #[test]
    fn from_config_ignores_blank_values() {
        let cfg = PortalConfig {
            access_token: Some("  ".to_string()),
            user_id: Some("".to_string()),
            ..PortalConfig::default()
        };
        let auth = AuthContext::from_config(&cfg);
        assert!(!auth.is_authenticated());
        assert!(auth.identity().is_none());
        assert_eq!(auth.tenant_id(), "default");
    }

    #[test]
    fn from_config_carries_display_name() {
        let cfg = PortalConfig {
            access_token: Some("tok".to_string()),
            user_id: Some(" cust-7 ".to_string()),
            display_name: Some("Dana".to_string()),
            ..PortalConfig::default()
        };
        let auth = AuthContext::from_config(&cfg);
        assert!(auth.is_authenticated());
        assert_eq!(auth.customer_id(), "cust-7");
        assert_eq!(
            auth.identity().and_then(|i| i.display_name.as_deref()),
            Some("Dana")
        );
    }

    #[test]
    fn debug_output_redacts_token() {
        let auth = AuthContext::authenticated(
            "default",
            "secret-token",
            Identity {
                user_id: "cust-7".to_string(),
                display_name: None,
            },
        );
        let shown = format!("{auth:?}");
        assert!(!shown.contains("secret-token"));
        assert!(shown.contains("<redacted>"));
    }
}
