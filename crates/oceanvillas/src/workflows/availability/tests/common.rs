use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::{Duration, NaiveDate};
use serde_json::Value;

use crate::workflows::availability::domain::{CalendarDay, DateRange, DayStatus, Unit, UnitId};
use crate::workflows::availability::{
    availability_router, AvailabilitySettings, AvailabilityService, CredentialManager,
};
use crate::workflows::hostaway::{AuthError, ClientCredentials, GatewayError, ProviderGateway};

pub(super) const BOOKING_BASE: &str = "https://book.oceanvillas.example";

/// In-memory provider with scripted catalog and calendars.
#[derive(Default)]
pub(super) struct FakeGateway {
    pub(super) catalog: Mutex<Option<Result<Vec<Unit>, GatewayError>>>,
    pub(super) calendars: Mutex<HashMap<UnitId, Result<Vec<CalendarDay>, GatewayError>>>,
    pub(super) token_failure: Mutex<Option<AuthError>>,
    pub(super) revoked_tokens: Mutex<Vec<String>>,
    pub(super) tokens_issued: AtomicUsize,
    pub(super) catalog_calls: AtomicUsize,
    pub(super) calendar_calls: AtomicUsize,
}

impl FakeGateway {
    pub(super) fn with_catalog(units: Vec<Unit>) -> Self {
        let gateway = Self::default();
        *gateway.catalog.lock().expect("catalog mutex") = Some(Ok(units));
        gateway
    }

    pub(super) fn set_calendar(&self, id: &str, days: Result<Vec<CalendarDay>, GatewayError>) {
        self.calendars
            .lock()
            .expect("calendar mutex")
            .insert(UnitId::from(id), days);
    }

    pub(super) fn fail_catalog(&self, error: GatewayError) {
        *self.catalog.lock().expect("catalog mutex") = Some(Err(error));
    }

    pub(super) fn fail_tokens(&self, error: AuthError) {
        *self.token_failure.lock().expect("token mutex") = Some(error);
    }

    /// Makes catalog and calendar calls carrying `token` answer 401.
    pub(super) fn revoke_token(&self, token: &str) {
        self.revoked_tokens
            .lock()
            .expect("revoked mutex")
            .push(token.to_string());
    }

    fn check_token(&self, token: &str) -> Result<(), GatewayError> {
        let revoked = self.revoked_tokens.lock().expect("revoked mutex");
        if revoked.iter().any(|value| value == token) {
            return Err(GatewayError::Unauthorized);
        }
        Ok(())
    }

    pub(super) fn network_calls(&self) -> usize {
        self.tokens_issued.load(Ordering::SeqCst)
            + self.catalog_calls.load(Ordering::SeqCst)
            + self.calendar_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderGateway for FakeGateway {
    async fn issue_token(&self, _credentials: &ClientCredentials) -> Result<String, AuthError> {
        if let Some(error) = self.token_failure.lock().expect("token mutex").clone() {
            return Err(error);
        }
        let n = self.tokens_issued.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("token-{n}"))
    }

    async fn list_units(&self, token: &str) -> Result<Vec<Unit>, GatewayError> {
        self.catalog_calls.fetch_add(1, Ordering::SeqCst);
        self.check_token(token)?;
        self.catalog
            .lock()
            .expect("catalog mutex")
            .clone()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn calendar(
        &self,
        token: &str,
        unit_id: &UnitId,
        _range: &DateRange,
    ) -> Result<Vec<CalendarDay>, GatewayError> {
        self.calendar_calls.fetch_add(1, Ordering::SeqCst);
        self.check_token(token)?;
        self.calendars
            .lock()
            .expect("calendar mutex")
            .get(unit_id)
            .cloned()
            .unwrap_or(Err(GatewayError::Status { status: 404 }))
    }
}

pub(super) fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, day).expect("valid date")
}

pub(super) fn unit(id: &str, name: &str, capacity: Option<u32>) -> Unit {
    Unit {
        id: UnitId::from(id),
        name: Some(name.to_string()),
        description: Some(format!("{name} description")),
        city: Some("Miami Beach".to_string()),
        state: Some("FL".to_string()),
        country: Some("United States".to_string()),
        capacity,
        bedroom_count: Some(3),
        bathroom_count: Some(2.5),
        nightly_price: Some(350.0),
        booking_url: None,
        images: Vec::new(),
    }
}

/// Calendar covering June 1 through June 5 with the given blocked days.
pub(super) fn june_calendar(blocked: &[u32]) -> Vec<CalendarDay> {
    (1..=5)
        .map(|day| CalendarDay {
            date: Some(date(day)),
            status: if blocked.contains(&day) {
                DayStatus::Unavailable
            } else {
                DayStatus::Available
            },
            minimum_stay: None,
        })
        .collect()
}

/// Units A (open) and B (booked June 3), both configured.
pub(super) fn two_villa_gateway() -> FakeGateway {
    let gateway = FakeGateway::with_catalog(vec![
        unit("B", "Villa B", Some(6)),
        unit("A", "Villa A", Some(6)),
        unit("Z", "Unlisted", Some(6)),
    ]);
    gateway.set_calendar("A", Ok(june_calendar(&[])));
    gateway.set_calendar("B", Ok(june_calendar(&[3])));
    gateway
}

pub(super) fn settings(ids: &[&str]) -> AvailabilitySettings {
    AvailabilitySettings {
        listing_ids: ids.iter().map(|id| UnitId::from(*id)).collect(),
        booking_engine_base_url: BOOKING_BASE.to_string(),
    }
}

pub(super) fn credentials() -> CredentialManager {
    CredentialManager::new(
        Some("12345".to_string()),
        Some("secret".to_string()),
        Duration::days(7),
    )
}

pub(super) fn build_service(
    gateway: FakeGateway,
    ids: &[&str],
) -> (Arc<AvailabilityService<FakeGateway>>, Arc<FakeGateway>) {
    let gateway = Arc::new(gateway);
    let service = Arc::new(AvailabilityService::new(
        Arc::clone(&gateway),
        credentials(),
        settings(ids),
    ));
    (service, gateway)
}

pub(super) fn router_with_service(service: Arc<AvailabilityService<FakeGateway>>) -> axum::Router {
    availability_router(service)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
