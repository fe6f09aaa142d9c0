use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use oceanvillas::config::{ConfigError, ProviderConfig};
use oceanvillas::error::AppError;
use oceanvillas::workflows::availability::{
    AvailabilitySettings, AvailabilityService, CredentialManager, UnitId,
};
use oceanvillas::workflows::hostaway::HostawayClient;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Wires the Hostaway client, credential cache, and allow-list into a service.
pub(crate) fn build_availability_service(
    provider: &ProviderConfig,
) -> Result<Arc<AvailabilityService<HostawayClient>>, AppError> {
    let client = HostawayClient::new(&provider.base_url, provider.request_timeout)?;
    let ttl =
        chrono::Duration::from_std(provider.token_ttl).map_err(|_| ConfigError::InvalidTokenTtl)?;

    let credentials = CredentialManager::new(provider.account_id.clone(), provider.api_key.clone(), ttl);
    let settings = AvailabilitySettings {
        listing_ids: provider
            .listing_ids
            .iter()
            .map(|id| UnitId(id.clone()))
            .collect(),
        booking_engine_base_url: provider.booking_engine_base_url.clone(),
    };

    Ok(Arc::new(AvailabilityService::new(
        Arc::new(client),
        credentials,
        settings,
    )))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
