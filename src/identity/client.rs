//! Identity client backed by a session store

use std::sync::Arc;

use crate::error::Result;
use crate::identity::{Authorizer, IdentityClient, LoginOptions, SessionStore, StoredSession};
use crate::post::Principal;

/// Principal the local development identity logs in as when none is
/// configured.
pub const DEFAULT_LOCAL_PRINCIPAL: &str = "aaaaa-aa";

/// [`IdentityClient`] that keeps its session in a [`SessionStore`] and
/// obtains new sessions from an [`Authorizer`].
///
/// Expired sessions are treated as absent; they stay in the store until
/// the next login or logout replaces them.
pub struct SessionIdentityClient {
    store: Arc<dyn SessionStore>,
    authorizer: Arc<dyn Authorizer>,
}

impl SessionIdentityClient {
    pub fn new(store: Arc<dyn SessionStore>, authorizer: Arc<dyn Authorizer>) -> Self {
        Self { store, authorizer }
    }

    fn active_session(&self) -> Result<Option<StoredSession>> {
        Ok(self.store.load()?.filter(|session| {
            if session.is_expired() {
                tracing::debug!(principal = %session.principal, "Stored session has expired");
                false
            } else {
                true
            }
        }))
    }
}

#[async_trait::async_trait]
impl IdentityClient for SessionIdentityClient {
    async fn is_authenticated(&self) -> Result<bool> {
        Ok(self.active_session()?.is_some())
    }

    async fn identity(&self) -> Result<Option<Principal>> {
        Ok(self.active_session()?.map(|session| session.principal))
    }

    async fn login(&self, options: &LoginOptions) -> Result<()> {
        let session = self.authorizer.authorize(options).await?;
        tracing::info!(principal = %session.principal, "Logged in");
        self.store.save(&session)
    }

    async fn logout(&self) -> Result<()> {
        self.store.clear()?;
        tracing::info!("Logged out");
        Ok(())
    }

    async fn access_token(&self) -> Result<Option<String>> {
        Ok(self
            .active_session()?
            .and_then(|session| session.access_token))
    }
}

/// Development identity used with the in-memory post service.
///
/// Login succeeds immediately as the configured principal with a
/// non-expiring session and no bearer token.
#[derive(Debug, Clone)]
pub struct LocalAuthorizer {
    principal: Principal,
}

impl LocalAuthorizer {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }
}

#[async_trait::async_trait]
impl Authorizer for LocalAuthorizer {
    async fn authorize(&self, _options: &LoginOptions) -> Result<StoredSession> {
        Ok(StoredSession {
            principal: self.principal.clone(),
            access_token: None,
            expires_at: None,
        })
    }
}
