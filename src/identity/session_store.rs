//! Session persistence via OS keyring
//!
//! This module stores the identity session between runs using the
//! operating system's native credential store (Keychain on macOS, Secret
//! Service on Linux, Windows Credential Manager on Windows).
//!
//! Sessions are serialized to JSON before storage and deserialized on load.
//! [`MemorySessionStore`] provides the same contract without touching the
//! keyring, for offline mode and tests.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{BlogError, Result};
use crate::post::Principal;

// ---------------------------------------------------------------------------
// StoredSession
// ---------------------------------------------------------------------------

/// A session issued by the identity provider.
///
/// # Examples
///
/// ```
/// use cryptoblog::identity::StoredSession;
/// use cryptoblog::post::Principal;
///
/// let session = StoredSession {
///     principal: Principal::parse("aaaaa-aa").unwrap(),
///     access_token: None,
///     expires_at: None,
/// };
///
/// // A session with no expiry is never considered expired.
/// assert!(!session.is_expired());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    /// Principal the provider authenticated.
    pub principal: Principal,

    /// Delegation presented to the post service as a bearer token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// UTC timestamp at which the delegation expires.
    ///
    /// When `None`, the session is treated as non-expiring.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_seconds_option"
    )]
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredSession {
    /// Returns `true` when the session is expired or about to expire.
    ///
    /// A 60-second buffer is applied so a request started now does not
    /// reach the service with a delegation that lapsed in flight.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            None => false,
            Some(expires_at) => {
                let buffer = chrono::Duration::seconds(60);
                Utc::now() >= expires_at - buffer
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SessionStore
// ---------------------------------------------------------------------------

/// Where the identity client keeps its session.
pub trait SessionStore: Send + Sync {
    /// Persist `session`, replacing any previous one.
    fn save(&self, session: &StoredSession) -> Result<()>;

    /// Load the stored session; `Ok(None)` when there is none.
    fn load(&self) -> Result<Option<StoredSession>>;

    /// Remove the stored session. A no-op when nothing is stored.
    fn clear(&self) -> Result<()>;
}

// ---------------------------------------------------------------------------
// KeyringSessionStore
// ---------------------------------------------------------------------------

/// Session store backed by the OS native keyring.
///
/// One entry per identity provider: the keyring service name is the
/// configured `keyring_service`, the user is the provider host.
#[derive(Debug, Clone)]
pub struct KeyringSessionStore {
    service: String,
    account: String,
}

impl KeyringSessionStore {
    /// Create a store for the given keyring service and provider host.
    pub fn new(service: &str, provider_host: &str) -> Self {
        Self {
            service: service.to_string(),
            account: provider_host.to_string(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry> {
        keyring::Entry::new(&self.service, &self.account)
            .map_err(|e| BlogError::Keyring(e).into())
    }
}

impl SessionStore for KeyringSessionStore {
    fn save(&self, session: &StoredSession) -> Result<()> {
        let json_str = serde_json::to_string(session)?;
        self.entry()?
            .set_password(&json_str)
            .map_err(BlogError::Keyring)?;
        Ok(())
    }

    fn load(&self) -> Result<Option<StoredSession>> {
        match self.entry()?.get_password() {
            Ok(json_str) => {
                let session: StoredSession = serde_json::from_str(&json_str)?;
                Ok(Some(session))
            }
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(BlogError::Keyring(e).into()),
        }
    }

    fn clear(&self) -> Result<()> {
        match self.entry()?.delete_password() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(BlogError::Keyring(e).into()),
        }
    }
}

// ---------------------------------------------------------------------------
// MemorySessionStore
// ---------------------------------------------------------------------------

/// Session store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<StoredSession>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<StoredSession>>> {
        self.session
            .lock()
            .map_err(|_| BlogError::Authentication("session store lock poisoned".to_string()).into())
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&self, session: &StoredSession) -> Result<()> {
        *self.lock()? = Some(session.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<StoredSession>> {
        Ok(self.lock()?.clone())
    }

    fn clear(&self) -> Result<()> {
        *self.lock()? = None;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
