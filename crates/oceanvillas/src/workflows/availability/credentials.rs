use std::fmt;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use crate::workflows::hostaway::{AuthError, ClientCredentials, ProviderGateway};

/// Bearer token plus the window in which it may be reused.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub value: String,
    pub obtained_at: DateTime<Utc>,
    pub ttl: Duration,
}

impl Credential {
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now - self.obtained_at < self.ttl
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("value", &"<redacted>")
            .field("obtained_at", &self.obtained_at)
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Process-wide credential cache.
///
/// The lock only guards the read and the write of the cached value; it is
/// never held across the token request, so concurrent refreshes may each hit
/// the provider and the last writer wins.
pub struct CredentialManager {
    account_id: Option<String>,
    api_key: Option<String>,
    ttl: Duration,
    cached: RwLock<Option<Credential>>,
}

impl CredentialManager {
    pub fn new(account_id: Option<String>, api_key: Option<String>, ttl: Duration) -> Self {
        Self {
            account_id,
            api_key,
            ttl,
            cached: RwLock::new(None),
        }
    }

    fn client_credentials(&self) -> Result<ClientCredentials, AuthError> {
        let account_id = self
            .account_id
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .ok_or(AuthError::MissingAccountId)?;
        let api_key = self
            .api_key
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .ok_or(AuthError::MissingApiKey)?;

        Ok(ClientCredentials {
            account_id: account_id.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Returns the cached credential while fresh, otherwise requests a new one.
    pub async fn get_credential<G>(&self, gateway: &G) -> Result<Credential, AuthError>
    where
        G: ProviderGateway + ?Sized,
    {
        let now = Utc::now();
        if let Some(credential) = self.cached_at(now) {
            debug!("reusing cached provider credential");
            return Ok(credential);
        }

        let credentials = self.client_credentials()?;
        let value = gateway.issue_token(&credentials).await?;
        let credential = Credential {
            value,
            obtained_at: Utc::now(),
            ttl: self.ttl,
        };

        match self.cached.write() {
            Ok(mut guard) => *guard = Some(credential.clone()),
            Err(poisoned) => *poisoned.into_inner() = Some(credential.clone()),
        }
        info!(ttl_secs = self.ttl.num_seconds(), "provider credential refreshed");

        Ok(credential)
    }

    /// Drops the cached credential so the next call re-acquires it.
    pub fn invalidate(&self) {
        match self.cached.write() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }

    fn cached_at(&self, now: DateTime<Utc>) -> Option<Credential> {
        let guard = match self.cached.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard
            .as_ref()
            .filter(|credential| credential.is_fresh_at(now))
            .cloned()
    }
}

impl fmt::Debug for CredentialManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialManager")
            .field("account_id", &self.account_id)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
