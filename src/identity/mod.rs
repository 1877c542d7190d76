//! Identity client: login gate and caller principal
//!
//! Authentication is delegated to an external identity provider. This
//! module only models the client-visible contract: whether a session is
//! active, which principal it belongs to, and how to start or end one.
//!
//! # Module Layout
//!
//! - [`client`]        -- [`SessionIdentityClient`] and the local
//!   development [`LocalAuthorizer`]
//! - [`flow`]          -- browser redirect login ([`BrowserAuthorizer`])
//! - [`session_store`] -- session persistence via OS keyring or memory

pub mod client;
pub mod flow;
pub mod session_store;

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::config::IdentityConfig;
use crate::error::{BlogError, Result};
use crate::post::Principal;

pub use client::{LocalAuthorizer, SessionIdentityClient};
pub use flow::BrowserAuthorizer;
pub use session_store::{KeyringSessionStore, MemorySessionStore, SessionStore, StoredSession};

/// Authentication state as seen by the view.
///
/// Derived from the identity client on mount and after every login or
/// logout; never persisted by the view itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSession {
    /// Whether a non-expired session is active
    pub authenticated: bool,
    /// Principal of the active session
    pub principal: Option<Principal>,
}

impl AuthSession {
    /// The unauthenticated session.
    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// Parameters for a login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOptions {
    /// Authorization page of the identity provider
    pub identity_provider: Url,
    /// Requested session lifetime
    pub max_time_to_live: Duration,
    /// Loopback port for the callback; 0 picks a free port
    pub redirect_port: u16,
    /// Try to open the authorization page in a browser
    pub open_browser: bool,
}

impl LoginOptions {
    /// Build login options from the identity configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BlogError::Config`] if the provider URL does not parse.
    pub fn from_config(config: &IdentityConfig) -> Result<Self> {
        let identity_provider = Url::parse(&config.provider_url).map_err(|e| {
            BlogError::Config(format!("invalid identity provider URL: {}", e))
        })?;
        Ok(Self {
            identity_provider,
            max_time_to_live: Duration::from_secs(config.max_time_to_live_hours * 3600),
            redirect_port: config.redirect_port,
            open_browser: config.open_browser,
        })
    }
}

/// Client-side view of the identity provider.
///
/// The view uses this to gate post creation and to show who is logged in;
/// the HTTP post service uses [`access_token`](Self::access_token) to
/// present the session to the remote service.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait IdentityClient: Send + Sync {
    /// Returns `true` when a non-expired session is active.
    async fn is_authenticated(&self) -> Result<bool>;

    /// Principal of the active session, if any.
    async fn identity(&self) -> Result<Option<Principal>>;

    /// Run the provider's login flow and store the resulting session.
    ///
    /// Returns once the flow has completed successfully.
    async fn login(&self, options: &LoginOptions) -> Result<()>;

    /// Forget the active session.
    async fn logout(&self) -> Result<()>;

    /// Bearer credential for the post service, if the session carries one.
    async fn access_token(&self) -> Result<Option<String>> {
        Ok(None)
    }

    /// Combined authentication state.
    async fn session(&self) -> Result<AuthSession> {
        if !self.is_authenticated().await? {
            return Ok(AuthSession::anonymous());
        }
        Ok(AuthSession {
            authenticated: true,
            principal: self.identity().await?,
        })
    }
}

/// Obtains a fresh session from an identity provider.
#[async_trait::async_trait]
pub trait Authorizer: Send + Sync {
    /// Run the authorization flow to completion.
    async fn authorize(&self, options: &LoginOptions) -> Result<StoredSession>;
}

/// Create the identity client matching the configured backend
///
/// The `http` backend persists sessions in the OS keyring and logs in
/// through the browser. The `memory` backend keeps the session in memory
/// and logs in as the configured local principal.
///
/// # Errors
///
/// Returns error if the backend is unknown or the local principal is
/// invalid
pub fn create_identity_client(
    backend: &str,
    config: &IdentityConfig,
) -> Result<Arc<dyn IdentityClient>> {
    match backend {
        "http" => {
            let provider = Url::parse(&config.provider_url).map_err(|e| {
                BlogError::Config(format!("invalid identity provider URL: {}", e))
            })?;
            let store = KeyringSessionStore::new(
                &config.keyring_service,
                provider.host_str().unwrap_or("identity"),
            );
            Ok(Arc::new(SessionIdentityClient::new(
                Arc::new(store),
                Arc::new(BrowserAuthorizer::new()),
            )))
        }
        "memory" => {
            let principal = match &config.local_principal {
                Some(text) => Principal::parse(text)?,
                None => Principal::parse(client::DEFAULT_LOCAL_PRINCIPAL)?,
            };
            Ok(Arc::new(SessionIdentityClient::new(
                Arc::new(MemorySessionStore::new()),
                Arc::new(LocalAuthorizer::new(principal)),
            )))
        }
        other => Err(BlogError::Config(format!("Unknown service backend: {}", other)).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_options_from_config() {
        let config = IdentityConfig::default();
        let options = LoginOptions::from_config(&config).unwrap();
        assert_eq!(options.max_time_to_live, Duration::from_secs(8 * 3600));
        assert_eq!(options.identity_provider.host_str(), Some("identity.ic0.app"));
        assert_eq!(options.redirect_port, 0);
        assert!(options.open_browser);
    }

    #[test]
    fn test_login_options_rejects_bad_url() {
        let config = IdentityConfig {
            provider_url: "::nope::".to_string(),
            ..IdentityConfig::default()
        };
        assert!(LoginOptions::from_config(&config).is_err());
    }

    #[tokio::test]
    async fn test_memory_backend_client_starts_logged_out() {
        let identity = create_identity_client("memory", &IdentityConfig::default()).unwrap();
        assert!(!identity.is_authenticated().await.unwrap());
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        assert!(create_identity_client("carrier-pigeon", &IdentityConfig::default()).is_err());
    }
}
