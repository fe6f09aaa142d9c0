use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::domain::UnitId;
use super::service::{AvailabilityService, SearchError};
use crate::workflows::hostaway::ProviderGateway;

/// Raw search parameters; validation happens in the service.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchParams {
    pub(crate) start_date: Option<String>,
    pub(crate) end_date: Option<String>,
    pub(crate) guests: Option<String>,
}

/// Router builder exposing the public availability endpoints.
pub fn availability_router<G>(service: Arc<AvailabilityService<G>>) -> Router
where
    G: ProviderGateway + ?Sized + 'static,
{
    Router::new()
        .route("/api/hostaway/search", get(search_handler::<G>))
        .route("/api/hostaway/featured", get(featured_handler::<G>))
        .route("/api/hostaway/listings/:id", get(listing_handler::<G>))
        .route("/book", get(booking_redirect::<G>))
        .route("/booking", get(booking_redirect::<G>))
        .with_state(service)
}

pub(crate) async fn search_handler<G>(
    State(service): State<Arc<AvailabilityService<G>>>,
    Query(params): Query<SearchParams>,
) -> Response
where
    G: ProviderGateway + ?Sized + 'static,
{
    let result = service
        .search_raw(
            params.start_date.as_deref(),
            params.end_date.as_deref(),
            params.guests.as_deref(),
        )
        .await;

    match result {
        Ok(results) => (StatusCode::OK, axum::Json(results)).into_response(),
        Err(SearchError::Validation(error)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(other) => {
            error!(error = %other, "availability search failed");
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn featured_handler<G>(
    State(service): State<Arc<AvailabilityService<G>>>,
) -> Response
where
    G: ProviderGateway + ?Sized + 'static,
{
    match service.featured().await {
        Ok(featured) => {
            let payload = json!({
                "success": true,
                "featured": featured,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(other) => failure_response(other),
    }
}

pub(crate) async fn listing_handler<G>(
    State(service): State<Arc<AvailabilityService<G>>>,
    Path(id): Path<String>,
) -> Response
where
    G: ProviderGateway + ?Sized + 'static,
{
    let unit_id = UnitId(id);
    match service.listing(&unit_id).await {
        Ok(Some(listing)) => {
            let payload = json!({
                "success": true,
                "listing": listing,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Ok(None) => {
            let payload = json!({
                "error": "Listing not found",
                "id": unit_id,
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => failure_response(other),
    }
}

pub(crate) async fn booking_redirect<G>(
    State(service): State<Arc<AvailabilityService<G>>>,
) -> Redirect
where
    G: ProviderGateway + ?Sized + 'static,
{
    Redirect::temporary(&service.settings().booking_engine_base_url)
}

fn failure_response(error: SearchError) -> Response {
    let status = match error {
        SearchError::Validation(_) => StatusCode::BAD_REQUEST,
        SearchError::Upstream(_) => StatusCode::BAD_GATEWAY,
        SearchError::Config(_) | SearchError::Auth(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error!(error = %error, status = status.as_u16(), "availability request failed");

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
