use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::credentials::Credential;
use super::domain::{Unit, UnitId};
use crate::workflows::hostaway::{GatewayError, ProviderGateway};

/// Pulls the provider catalog and narrows it to the configured listings.
pub struct DirectoryFetcher<G: ?Sized> {
    gateway: Arc<G>,
}

impl<G> DirectoryFetcher<G>
where
    G: ProviderGateway + ?Sized,
{
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Configured units in allow-list order. Ids missing upstream are skipped.
    pub async fn list_configured_units(
        &self,
        credential: &Credential,
        allow_list: &[UnitId],
    ) -> Result<Vec<Unit>, GatewayError> {
        let catalog = self.gateway.list_units(&credential.value).await?;
        let catalog_size = catalog.len();
        let units = select_configured(catalog, allow_list);
        debug!(
            catalog = catalog_size,
            configured = allow_list.len(),
            found = units.len(),
            "directory resolved"
        );
        Ok(units)
    }

    /// Looks a single unit up in the full catalog.
    pub async fn find_unit(
        &self,
        credential: &Credential,
        unit_id: &UnitId,
    ) -> Result<Option<Unit>, GatewayError> {
        let catalog = self.gateway.list_units(&credential.value).await?;
        Ok(catalog.into_iter().find(|unit| &unit.id == unit_id))
    }
}

pub(crate) fn select_configured(catalog: Vec<Unit>, allow_list: &[UnitId]) -> Vec<Unit> {
    let mut by_id: HashMap<UnitId, Unit> = HashMap::with_capacity(catalog.len());
    for unit in catalog {
        by_id.entry(unit.id.clone()).or_insert(unit);
    }

    allow_list.iter().filter_map(|id| by_id.remove(id)).collect()
}
