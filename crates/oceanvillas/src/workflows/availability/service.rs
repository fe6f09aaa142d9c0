use std::collections::HashMap;
use std::sync::Arc;

use futures::future::{join, join_all};
use tracing::{info, warn};

use super::credentials::CredentialManager;
use super::directory::DirectoryFetcher;
use super::domain::{AvailabilityVerdict, SearchQuery, UnitId, ValidationError};
use super::evaluation::AvailabilityEvaluator;
use super::views::{FeaturedListing, ListingDetail, ListingSummary, QueryEcho, SearchResults};
use crate::config::ConfigError;
use crate::workflows::hostaway::{AuthError, GatewayError, ProviderGateway};

/// Static inputs the service needs besides the gateway and the credential cache.
#[derive(Debug, Clone)]
pub struct AvailabilitySettings {
    pub listing_ids: Vec<UnitId>,
    pub booking_engine_base_url: String,
}

/// Fans a search out over the configured units and joins the verdicts with
/// the directory.
pub struct AvailabilityService<G: ?Sized> {
    gateway: Arc<G>,
    credentials: CredentialManager,
    directory: DirectoryFetcher<G>,
    evaluator: AvailabilityEvaluator<G>,
    settings: AvailabilitySettings,
}

impl<G> AvailabilityService<G>
where
    G: ProviderGateway + ?Sized + 'static,
{
    pub fn new(
        gateway: Arc<G>,
        credentials: CredentialManager,
        settings: AvailabilitySettings,
    ) -> Self {
        Self {
            directory: DirectoryFetcher::new(Arc::clone(&gateway)),
            evaluator: AvailabilityEvaluator::new(Arc::clone(&gateway)),
            gateway,
            credentials,
            settings,
        }
    }

    pub fn settings(&self) -> &AvailabilitySettings {
        &self.settings
    }

    /// Validates raw query values before any configuration or network work.
    pub async fn search_raw(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
        guests: Option<&str>,
    ) -> Result<SearchResults, SearchError> {
        let query = SearchQuery::parse(start_date, end_date, guests)?;
        self.search(&query).await
    }

    /// Units bookable for every night of the query, in configuration order.
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResults, SearchError> {
        let allow_list = self.allow_list()?;
        let credential = self.credentials.get_credential(self.gateway.as_ref()).await?;
        let range = query.date_range;

        let directory = async {
            match self
                .directory
                .list_configured_units(&credential, allow_list)
                .await
            {
                Ok(units) => (units, false),
                Err(err) => {
                    warn!(error = %err, "listing directory unavailable; answering with no units");
                    (Vec::new(), err.is_unauthorized())
                }
            }
        };
        let evaluations = join_all(
            allow_list
                .iter()
                .map(|unit_id| self.evaluator.evaluate(&credential, unit_id, &range)),
        );

        let ((units, directory_rejected), evaluations) = join(directory, evaluations).await;

        if directory_rejected || evaluations.iter().any(|outcome| outcome.credential_rejected) {
            self.drop_rejected_credential();
        }

        let mut by_id: HashMap<UnitId, AvailabilityVerdict> = evaluations
            .into_iter()
            .map(|outcome| (outcome.verdict.unit_id.clone(), outcome.verdict))
            .collect();

        let mut available_listings = Vec::new();
        for unit in &units {
            let Some(verdict) = by_id.remove(&unit.id) else {
                continue;
            };
            let verdict = verdict.enforce_capacity(unit.capacity, query.guests);
            if verdict.available {
                available_listings.push(ListingSummary::from_unit(
                    unit,
                    &self.settings.booking_engine_base_url,
                    query,
                ));
            }
            by_id.insert(unit.id.clone(), verdict);
        }

        let verdicts: Vec<AvailabilityVerdict> = allow_list
            .iter()
            .filter_map(|unit_id| by_id.remove(unit_id))
            .collect();

        info!(
            start = %range.start(),
            end = %range.end(),
            guests = query.guests,
            configured = allow_list.len(),
            found = units.len(),
            available = available_listings.len(),
            "availability search completed"
        );

        Ok(SearchResults {
            success: true,
            query: QueryEcho::from(query),
            total_configured: allow_list.len(),
            total_found_listings: units.len(),
            available_count: available_listings.len(),
            available_listings,
            verdicts,
        })
    }

    /// Landing-page cards for every configured unit.
    pub async fn featured(&self) -> Result<Vec<FeaturedListing>, SearchError> {
        let allow_list = self.allow_list()?;
        let credential = self.credentials.get_credential(self.gateway.as_ref()).await?;
        let units = self
            .directory
            .list_configured_units(&credential, allow_list)
            .await
            .map_err(|err| self.note_gateway_error(err))?;

        Ok(units.iter().map(FeaturedListing::from).collect())
    }

    /// Detail page for one unit, looked up in the full catalog.
    pub async fn listing(&self, unit_id: &UnitId) -> Result<Option<ListingDetail>, SearchError> {
        let credential = self.credentials.get_credential(self.gateway.as_ref()).await?;
        let unit = self
            .directory
            .find_unit(&credential, unit_id)
            .await
            .map_err(|err| self.note_gateway_error(err))?;

        Ok(unit.map(|unit| {
            ListingDetail::from_unit(&unit, &self.settings.booking_engine_base_url)
        }))
    }

    /// The provider refused the token; the next request acquires a new one.
    /// The current request is not retried.
    fn drop_rejected_credential(&self) {
        warn!("provider rejected the cached credential; it will be refreshed on the next request");
        self.credentials.invalidate();
    }

    fn note_gateway_error(&self, err: GatewayError) -> GatewayError {
        if err.is_unauthorized() {
            self.drop_rejected_credential();
        }
        err
    }

    fn allow_list(&self) -> Result<&[UnitId], ConfigError> {
        if self.settings.listing_ids.is_empty() {
            return Err(ConfigError::MissingListingIds);
        }
        Ok(&self.settings.listing_ids)
    }
}

/// Error raised by the availability service.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Upstream(#[from] GatewayError),
}
