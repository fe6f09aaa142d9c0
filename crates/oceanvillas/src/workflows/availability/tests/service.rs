use super::common::*;
use crate::config::ConfigError;
use crate::workflows::availability::domain::{
    CalendarDay, DayStatus, ReasonCode, SearchQuery, UnitId, ValidationError,
};
use crate::workflows::availability::{AvailabilityService, CredentialManager, SearchError};
use crate::workflows::hostaway::{AuthError, GatewayError};
use chrono::Duration;
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn june_query(guests: u32) -> SearchQuery {
    SearchQuery::parse(Some("2024-06-01"), Some("2024-06-05"), Some(guests.to_string().as_str()))
        .expect("valid query")
}

fn reasons_for(
    results: &crate::workflows::availability::SearchResults,
    id: &str,
) -> Vec<ReasonCode> {
    results
        .verdicts
        .iter()
        .find(|verdict| verdict.unit_id == UnitId::from(id))
        .map(|verdict| verdict.reason_codes.iter().copied().collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn search_returns_only_fully_open_units() {
    let (service, gateway) = build_service(two_villa_gateway(), &["A", "B"]);

    let results = service.search(&june_query(2)).await.expect("search succeeds");

    let ids: Vec<_> = results
        .available_listings
        .iter()
        .map(|listing| listing.id.as_str())
        .collect();
    assert_eq!(ids, vec!["A"]);
    assert_eq!(results.available_count, 1);
    assert_eq!(results.total_configured, 2);
    assert_eq!(results.total_found_listings, 2);
    assert_eq!(reasons_for(&results, "B"), vec![ReasonCode::NightUnavailable]);
    assert_eq!(gateway.calendar_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn results_follow_configuration_order() {
    let gateway = two_villa_gateway();
    gateway.set_calendar("B", Ok(june_calendar(&[])));
    let (service, _) = build_service(gateway, &["B", "A"]);

    let results = service.search(&june_query(2)).await.expect("search succeeds");
    let ids: Vec<_> = results
        .available_listings
        .iter()
        .map(|listing| listing.id.as_str())
        .collect();
    assert_eq!(ids, vec!["B", "A"]);
}

#[tokio::test]
async fn failing_calendar_only_drops_that_unit() {
    let mut catalog = vec![unit("A", "Villa A", Some(6)), unit("C", "Villa C", Some(6))];
    catalog.push(unit("B", "Villa B", Some(6)));
    let gateway = FakeGateway::with_catalog(catalog);
    gateway.set_calendar("A", Ok(june_calendar(&[])));
    gateway.set_calendar("B", Ok(june_calendar(&[3])));
    gateway.set_calendar("C", Err(GatewayError::Status { status: 503 }));
    let (service, _) = build_service(gateway, &["A", "B", "C"]);

    let results = service.search(&june_query(2)).await.expect("search succeeds");

    assert_eq!(results.available_count, 1);
    assert_eq!(results.available_listings[0].id.as_str(), "A");
    assert_eq!(reasons_for(&results, "B"), vec![ReasonCode::NightUnavailable]);
    assert_eq!(reasons_for(&results, "C"), vec![ReasonCode::UpstreamError]);
}

#[tokio::test]
async fn unparseable_calendar_is_reported_as_parse_error() {
    let gateway = two_villa_gateway();
    gateway.set_calendar("A", Err(GatewayError::Parse("not json".into())));
    let (service, _) = build_service(gateway, &["A"]);

    let results = service.search(&june_query(2)).await.expect("search succeeds");
    assert_eq!(results.available_count, 0);
    assert_eq!(reasons_for(&results, "A"), vec![ReasonCode::ParseError]);
}

#[tokio::test]
async fn capacity_below_party_size_excludes_unit() {
    let gateway = FakeGateway::with_catalog(vec![
        unit("A", "Villa A", Some(2)),
        unit("B", "Villa B", None),
    ]);
    gateway.set_calendar("A", Ok(june_calendar(&[])));
    gateway.set_calendar("B", Ok(june_calendar(&[])));
    let (service, _) = build_service(gateway, &["A", "B"]);

    let results = service.search(&june_query(4)).await.expect("search succeeds");

    let ids: Vec<_> = results
        .available_listings
        .iter()
        .map(|listing| listing.id.as_str())
        .collect();
    assert_eq!(ids, vec!["B"]);
    assert_eq!(reasons_for(&results, "A"), vec![ReasonCode::CapacityExceeded]);
}

#[tokio::test]
async fn unknown_night_status_is_not_bookable() {
    let gateway = two_villa_gateway();
    let mut days = june_calendar(&[]);
    days[1] = CalendarDay {
        date: Some(date(2)),
        status: DayStatus::Unknown,
        minimum_stay: None,
    };
    gateway.set_calendar("A", Ok(days));
    let (service, _) = build_service(gateway, &["A"]);

    let results = service.search(&june_query(2)).await.expect("search succeeds");
    assert_eq!(results.available_count, 0);
    assert_eq!(reasons_for(&results, "A"), vec![ReasonCode::NightUnknown]);
}

#[tokio::test]
async fn directory_failure_yields_empty_results() {
    let gateway = two_villa_gateway();
    gateway.fail_catalog(GatewayError::Status { status: 500 });
    let (service, _) = build_service(gateway, &["A", "B"]);

    let results = service.search(&june_query(2)).await.expect("search still answers");
    assert_eq!(results.total_found_listings, 0);
    assert!(results.available_listings.is_empty());
    assert_eq!(results.verdicts.len(), 2);
}

#[tokio::test]
async fn two_searches_share_one_credential() {
    let (service, gateway) = build_service(two_villa_gateway(), &["A", "B"]);

    service.search(&june_query(2)).await.expect("first search");
    service.search(&june_query(2)).await.expect("second search");

    assert_eq!(gateway.tokens_issued.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn expired_credential_is_reacquired() {
    let gateway = Arc::new(two_villa_gateway());
    let service = AvailabilityService::new(
        Arc::clone(&gateway),
        CredentialManager::new(Some("12345".into()), Some("secret".into()), Duration::zero()),
        settings(&["A"]),
    );

    service.search(&june_query(2)).await.expect("first search");
    service.search(&june_query(2)).await.expect("second search");

    assert_eq!(gateway.tokens_issued.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn revoked_credential_is_replaced_on_the_next_search() {
    let gateway = two_villa_gateway();
    gateway.revoke_token("token-1");
    let (service, gateway) = build_service(gateway, &["A", "B"]);

    let first = service.search(&june_query(2)).await.expect("first search answers");
    assert_eq!(first.available_count, 0);
    assert_eq!(reasons_for(&first, "A"), vec![ReasonCode::UpstreamError]);
    assert_eq!(gateway.tokens_issued.load(Ordering::SeqCst), 1);

    let second = service.search(&june_query(2)).await.expect("second search answers");
    assert_eq!(gateway.tokens_issued.load(Ordering::SeqCst), 2);
    assert_eq!(second.available_count, 1);
    assert_eq!(second.available_listings[0].id.as_str(), "A");

    service.search(&june_query(2)).await.expect("third search answers");
    assert_eq!(gateway.tokens_issued.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn revoked_credential_on_listing_lookup_is_dropped() {
    let gateway = two_villa_gateway();
    gateway.revoke_token("token-1");
    let (service, gateway) = build_service(gateway, &["A"]);

    assert!(matches!(
        service.listing(&UnitId::from("A")).await,
        Err(SearchError::Upstream(GatewayError::Unauthorized))
    ));
    let detail = service
        .listing(&UnitId::from("A"))
        .await
        .expect("lookup succeeds with a new token");
    assert!(detail.is_some());
    assert_eq!(gateway.tokens_issued.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn invalid_range_fails_before_any_network_call() {
    let (service, gateway) = build_service(two_villa_gateway(), &["A", "B"]);

    let error = service
        .search_raw(Some("2024-06-05"), Some("2024-06-05"), None)
        .await
        .expect_err("range rejected");

    assert!(matches!(
        error,
        SearchError::Validation(ValidationError::InvalidDateRange)
    ));
    assert_eq!(gateway.network_calls(), 0);
}

#[tokio::test]
async fn missing_listing_ids_is_a_configuration_error() {
    let (service, gateway) = build_service(two_villa_gateway(), &[]);

    let error = service.search(&june_query(2)).await.expect_err("config rejected");
    assert!(matches!(error, SearchError::Config(ConfigError::MissingListingIds)));
    assert_eq!(gateway.network_calls(), 0);
}

#[tokio::test]
async fn credential_failure_aborts_the_search() {
    let gateway = two_villa_gateway();
    gateway.fail_tokens(AuthError::Rejected {
        status: 403,
        body: "bad client".into(),
    });
    let (service, gateway) = build_service(gateway, &["A", "B"]);

    let error = service.search(&june_query(2)).await.expect_err("auth rejected");
    assert!(matches!(error, SearchError::Auth(AuthError::Rejected { status: 403, .. })));
    assert_eq!(gateway.catalog_calls.load(Ordering::SeqCst), 0);
    assert_eq!(gateway.calendar_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn featured_projects_configured_units() {
    let (service, _) = build_service(two_villa_gateway(), &["A", "B"]);

    let featured = service.featured().await.expect("featured succeeds");
    let names: Vec<_> = featured.iter().map(|card| card.name.as_str()).collect();
    assert_eq!(names, vec!["Villa A", "Villa B"]);
    assert_eq!(featured[0].tagline, "Miami Beach, FL");
}

#[tokio::test]
async fn featured_surfaces_directory_failure() {
    let gateway = two_villa_gateway();
    gateway.fail_catalog(GatewayError::Transport("connection reset".into()));
    let (service, _) = build_service(gateway, &["A"]);

    assert!(matches!(
        service.featured().await,
        Err(SearchError::Upstream(GatewayError::Transport(_)))
    ));
}

#[tokio::test]
async fn listing_detail_looks_up_full_catalog() {
    let (service, _) = build_service(two_villa_gateway(), &["A"]);

    let detail = service
        .listing(&UnitId::from("Z"))
        .await
        .expect("lookup succeeds")
        .expect("unit exists upstream");
    assert_eq!(detail.name, "Unlisted");
    assert_eq!(detail.booking_engine_url, BOOKING_BASE);

    let missing = service.listing(&UnitId::from("nope")).await.expect("lookup succeeds");
    assert!(missing.is_none());
}
