use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::{calendar, catalog, token, AuthError, ClientCredentials, GatewayError, ProviderGateway};
use crate::workflows::availability::domain::{CalendarDay, DateRange, Unit, UnitId};

/// Page size requested from the catalog so small accounts never paginate.
const CATALOG_PAGE_SIZE: &str = "1000";
const MAX_ERROR_BODY: usize = 256;

/// reqwest-backed gateway for the Hostaway public API.
#[derive(Debug, Clone)]
pub struct HostawayClient {
    http: reqwest::Client,
    base_url: Url,
}

impl HostawayClient {
    /// `base_url` is the API root, e.g. `https://api.hostaway.com/v1`.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, GatewayError> {
        let base_url =
            Url::parse(base_url).map_err(|_| GatewayError::BaseUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::BaseUrl(base_url.to_string()));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| GatewayError::Transport(err.to_string()))?;

        Ok(Self { http, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn read_json(response: Response) -> Result<Value, GatewayError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(GatewayError::Unauthorized);
        }
        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|err| GatewayError::Transport(err.to_string()))?;
        serde_json::from_str(&body).map_err(|err| GatewayError::Parse(err.to_string()))
    }
}

#[async_trait]
impl ProviderGateway for HostawayClient {
    async fn issue_token(&self, credentials: &ClientCredentials) -> Result<String, AuthError> {
        let response = self
            .http
            .post(self.endpoint(&["accessTokens"]))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", credentials.account_id.as_str()),
                ("client_secret", credentials.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|err| AuthError::Transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| AuthError::Transport(err.to_string()))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "token endpoint rejected credentials");
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body: truncate(&body),
            });
        }

        let payload: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
        token::extract_token(&payload).ok_or(AuthError::MissingToken {
            status: status.as_u16(),
        })
    }

    async fn list_units(&self, token: &str) -> Result<Vec<Unit>, GatewayError> {
        let response = self
            .http
            .get(self.endpoint(&["listings"]))
            .bearer_auth(token)
            .query(&[("limit", CATALOG_PAGE_SIZE), ("perPage", CATALOG_PAGE_SIZE)])
            .send()
            .await
            .map_err(transport)?;

        let payload = Self::read_json(response).await?;
        let units = catalog::parse_units(&payload)
            .ok_or_else(|| GatewayError::Parse("catalog response has no listing array".into()))?;
        debug!(count = units.len(), "catalog fetched");
        Ok(units)
    }

    async fn calendar(
        &self,
        token: &str,
        unit_id: &UnitId,
        range: &DateRange,
    ) -> Result<Vec<CalendarDay>, GatewayError> {
        let response = self
            .http
            .get(self.endpoint(&["listings", unit_id.as_str(), "calendar"]))
            .bearer_auth(token)
            .query(&[
                ("startDate", range.start().to_string()),
                ("endDate", range.end().to_string()),
            ])
            .send()
            .await
            .map_err(transport)?;

        let payload = Self::read_json(response).await?;
        let days = calendar::normalize_calendar(&payload)
            .ok_or_else(|| GatewayError::Parse("calendar response has no day array".into()))?;
        debug!(unit = %unit_id, records = days.len(), "calendar fetched");
        Ok(days)
    }
}

fn transport(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Transport("request timeout".to_string())
    } else if err.is_connect() {
        GatewayError::Transport(format!("connection failed: {err}"))
    } else {
        GatewayError::Transport(err.to_string())
    }
}

fn truncate(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
