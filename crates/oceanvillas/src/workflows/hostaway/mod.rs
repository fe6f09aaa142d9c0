//! Upstream property-management gateway.
//!
//! All provider network I/O goes through [`ProviderGateway`]; callers only ever
//! see normalized [`Unit`] and [`CalendarDay`] values.

mod calendar;
mod catalog;
mod client;
mod token;

use std::fmt;

use async_trait::async_trait;

use crate::workflows::availability::domain::{
    CalendarDay, DateRange, ReasonCode, Unit, UnitId,
};

pub use client::HostawayClient;

/// Account id and API secret exchanged for a bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub account_id: String,
    pub api_key: String,
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("account_id", &self.account_id)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// The three provider operations the service relies on.
#[async_trait]
pub trait ProviderGateway: Send + Sync {
    async fn issue_token(&self, credentials: &ClientCredentials) -> Result<String, AuthError>;

    async fn list_units(&self, token: &str) -> Result<Vec<Unit>, GatewayError>;

    async fn calendar(
        &self,
        token: &str,
        unit_id: &UnitId,
        range: &DateRange,
    ) -> Result<Vec<CalendarDay>, GatewayError>;
}

/// Credential acquisition failure. Fatal to the request that needed it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Missing HOSTAWAY_ACCOUNT_ID")]
    MissingAccountId,
    #[error("Missing HOSTAWAY_API_KEY")]
    MissingApiKey,
    #[error("Failed to get access token ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("Failed to get access token ({status}): no token field in response")]
    MissingToken { status: u16 },
    #[error("Failed to get access token: {0}")]
    Transport(String),
}

/// Catalog or calendar call failure. Local to the unit it concerns.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("provider rejected the access token")]
    Unauthorized,
    #[error("provider returned status {status}")]
    Status { status: u16 },
    #[error("provider request failed: {0}")]
    Transport(String),
    #[error("unreadable provider response: {0}")]
    Parse(String),
    #[error("invalid provider base url '{0}'")]
    BaseUrl(String),
}

impl GatewayError {
    /// True when the bearer token itself was refused and should be dropped.
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    pub const fn reason_code(&self) -> ReasonCode {
        match self {
            Self::Parse(_) => ReasonCode::ParseError,
            Self::Unauthorized | Self::Status { .. } | Self::Transport(_) | Self::BaseUrl(_) => {
                ReasonCode::UpstreamError
            }
        }
    }
}
