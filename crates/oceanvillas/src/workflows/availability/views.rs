use chrono::NaiveDate;
use serde::Serialize;
use url::Url;

use super::domain::{AvailabilityVerdict, DateRange, SearchQuery, Unit, UnitId};

const FEATURED_HIGHLIGHT: &str = "Direct booking";
const FEATURED_FALLBACK_TAGLINE: &str = "Premium stay";
const SUMMARY_FALLBACK_NAME: &str = "Listing";

/// Echo of the validated query in the search response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryEcho {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub guests: u32,
}

impl From<&SearchQuery> for QueryEcho {
    fn from(query: &SearchQuery) -> Self {
        Self {
            start_date: query.date_range.start(),
            end_date: query.date_range.end(),
            guests: query.guests,
        }
    }
}

/// Compact listing projection rendered on the results page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingSummary {
    pub id: UnitId,
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub max_guests: Option<u32>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<f32>,
    pub thumbnail_url: Option<String>,
    pub price_nightly: Option<f64>,
    pub booking_url: String,
}

impl ListingSummary {
    pub fn from_unit(unit: &Unit, booking_base: &str, query: &SearchQuery) -> Self {
        let base = unit.booking_url.as_deref().unwrap_or(booking_base);
        Self {
            id: unit.id.clone(),
            name: unit
                .name
                .clone()
                .unwrap_or_else(|| SUMMARY_FALLBACK_NAME.to_string()),
            city: unit.city.clone(),
            state: unit.state.clone(),
            country: unit.country.clone(),
            max_guests: unit.capacity,
            bedrooms: unit.bedroom_count,
            bathrooms: unit.bathroom_count,
            thumbnail_url: unit.thumbnail_url().map(str::to_string),
            price_nightly: unit.nightly_price,
            booking_url: booking_deep_link(base, &query.date_range, query.guests),
        }
    }
}

/// Search response body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub success: bool,
    pub query: QueryEcho,
    pub total_configured: usize,
    pub total_found_listings: usize,
    pub available_count: usize,
    pub available_listings: Vec<ListingSummary>,
    /// Per-unit decisions, kept for logs and the CLI.
    #[serde(skip)]
    pub verdicts: Vec<AvailabilityVerdict>,
}

/// Card shown in the featured strip on the landing page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeaturedListing {
    pub id: UnitId,
    pub name: String,
    pub tagline: String,
    pub sleeps: u32,
    pub beds: u32,
    pub baths: f32,
    pub highlight: &'static str,
    pub image: Option<String>,
}

impl From<&Unit> for FeaturedListing {
    fn from(unit: &Unit) -> Self {
        let tagline = match (&unit.city, &unit.state) {
            (Some(city), Some(state)) => format!("{city}, {state}"),
            (Some(city), None) => city.clone(),
            (None, _) => FEATURED_FALLBACK_TAGLINE.to_string(),
        };

        Self {
            id: unit.id.clone(),
            name: unit.title(),
            tagline,
            sleeps: unit.capacity.unwrap_or(0),
            beds: unit.bedroom_count.unwrap_or(0),
            baths: unit.bathroom_count.unwrap_or(0.0),
            highlight: FEATURED_HIGHLIGHT,
            image: unit.thumbnail_url().map(str::to_string),
        }
    }
}

/// Full listing page payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDetail {
    pub id: UnitId,
    pub name: String,
    pub description: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub max_guests: Option<u32>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<f32>,
    pub hero_url: Option<String>,
    pub booking_engine_url: String,
}

impl ListingDetail {
    pub fn from_unit(unit: &Unit, booking_base: &str) -> Self {
        Self {
            id: unit.id.clone(),
            name: unit.title(),
            description: unit.description.clone(),
            city: unit.city.clone(),
            state: unit.state.clone(),
            country: unit.country.clone(),
            max_guests: unit.capacity,
            bedrooms: unit.bedroom_count,
            bathrooms: unit.bathroom_count,
            hero_url: unit.thumbnail_url().map(str::to_string),
            booking_engine_url: unit
                .booking_url
                .clone()
                .unwrap_or_else(|| booking_base.to_string()),
        }
    }
}

/// Booking-engine URL pre-filled with the stay. An unparseable base is
/// returned untouched.
pub fn booking_deep_link(base: &str, range: &DateRange, guests: u32) -> String {
    let Ok(mut url) = Url::parse(base) else {
        return base.to_string();
    };

    let guests = guests.to_string();
    let overrides = [
        ("startDate", range.start().to_string()),
        ("endDate", range.end().to_string()),
        ("guests", guests.clone()),
        ("adults", guests),
    ];

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !overrides.iter().any(|(name, _)| key == name))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        pairs.extend_pairs(kept);
        pairs.extend_pairs(overrides);
    }

    url.to_string()
}
