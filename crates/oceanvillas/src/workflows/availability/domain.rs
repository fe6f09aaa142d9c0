use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Guest count assumed when the query omits one.
pub const DEFAULT_GUESTS: u32 = 2;

/// Provider-assigned listing identifier, drawn from the configured allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub String);

impl UnitId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UnitId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A listing photo as exposed by the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: Option<String>,
    /// Channel-specific mirror of the photo (Airbnb CDN).
    pub alternate_url: Option<String>,
}

impl ImageRef {
    pub fn best_url(&self) -> Option<&str> {
        self.url.as_deref().or(self.alternate_url.as_deref())
    }
}

/// A bookable rental unit built from one catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    /// Catalog title; `None` when the provider has none for the listing.
    pub name: Option<String>,
    pub description: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub capacity: Option<u32>,
    pub bedroom_count: Option<u32>,
    pub bathroom_count: Option<f32>,
    pub nightly_price: Option<f64>,
    pub booking_url: Option<String>,
    pub images: Vec<ImageRef>,
}

impl Unit {
    /// Title for pages about this unit alone: the catalog name, else `Listing <id>`.
    pub fn title(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Listing {}", self.id))
    }

    /// Hero photo: first image with a direct URL, then the first with an
    /// alternate URL, then whatever image comes first.
    pub fn hero_image(&self) -> Option<&ImageRef> {
        self.images
            .iter()
            .find(|image| image.url.is_some())
            .or_else(|| self.images.iter().find(|image| image.alternate_url.is_some()))
            .or_else(|| self.images.first())
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        self.hero_image().and_then(ImageRef::best_url)
    }
}

/// Half-open stay window: `start` is check-in, `end` is checkout and is never a night.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if end <= start {
            return Err(ValidationError::InvalidDateRange);
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn nights(&self) -> u32 {
        u32::try_from((self.end - self.start).num_days()).unwrap_or(u32::MAX)
    }

    /// True when `date` is one of the occupied nights.
    pub fn contains_night(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }
}

/// Canonical per-night status derived from a provider calendar record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    Available,
    Unavailable,
    Unknown,
}

impl DayStatus {
    pub const fn is_bookable(self) -> bool {
        matches!(self, Self::Available)
    }
}

/// Normalized calendar record handed from the gateway to the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: Option<NaiveDate>,
    pub status: DayStatus,
    pub minimum_stay: Option<u32>,
}

/// Why a unit was, or was not, considered bookable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    UpstreamError,
    ParseError,
    NoNightData,
    NightUnavailable,
    NightUnknown,
    CapacityExceeded,
    MinimumStayNotMet,
}

impl ReasonCode {
    pub const fn label(self) -> &'static str {
        match self {
            Self::UpstreamError => "upstream_error",
            Self::ParseError => "parse_error",
            Self::NoNightData => "no_night_data",
            Self::NightUnavailable => "night_unavailable",
            Self::NightUnknown => "night_unknown",
            Self::CapacityExceeded => "capacity_exceeded",
            Self::MinimumStayNotMet => "minimum_stay_not_met",
        }
    }
}

/// Outcome of evaluating one unit over one date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilityVerdict {
    pub unit_id: UnitId,
    pub available: bool,
    pub relevant_night_count: u32,
    pub reason_codes: BTreeSet<ReasonCode>,
}

impl AvailabilityVerdict {
    pub(crate) fn from_reasons(
        unit_id: UnitId,
        relevant_night_count: u32,
        reason_codes: BTreeSet<ReasonCode>,
    ) -> Self {
        Self {
            unit_id,
            available: reason_codes.is_empty(),
            relevant_night_count,
            reason_codes,
        }
    }

    pub(crate) fn failed(unit_id: UnitId, reason: ReasonCode) -> Self {
        Self::from_reasons(unit_id, 0, BTreeSet::from([reason]))
    }

    /// Folds the directory's capacity into the verdict. Unknown capacity is not
    /// held against the unit.
    pub fn enforce_capacity(mut self, capacity: Option<u32>, guests: u32) -> Self {
        if matches!(capacity, Some(capacity) if capacity < guests) {
            self.reason_codes.insert(ReasonCode::CapacityExceeded);
            self.available = false;
        }
        self
    }
}

/// Validated search input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchQuery {
    pub date_range: DateRange,
    pub guests: u32,
}

impl SearchQuery {
    /// Validates raw query-string values. Empty strings count as missing.
    pub fn parse(
        start_date: Option<&str>,
        end_date: Option<&str>,
        guests: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let start_date = start_date.map(str::trim).filter(|value| !value.is_empty());
        let end_date = end_date.map(str::trim).filter(|value| !value.is_empty());
        let (Some(start_date), Some(end_date)) = (start_date, end_date) else {
            return Err(ValidationError::MissingDates);
        };

        let start = parse_iso_date(start_date).ok_or(ValidationError::InvalidDateRange)?;
        let end = parse_iso_date(end_date).ok_or(ValidationError::InvalidDateRange)?;
        let date_range = DateRange::new(start, end)?;

        let guests = match guests.map(str::trim).filter(|value| !value.is_empty()) {
            None => DEFAULT_GUESTS,
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|count| *count >= 1)
                .ok_or(ValidationError::InvalidGuests)?,
        };

        Ok(Self { date_range, guests })
    }
}

/// Rejected search input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Required: startDate, endDate")]
    MissingDates,
    #[error("Invalid date range")]
    InvalidDateRange,
    #[error("Invalid guest count")]
    InvalidGuests,
}

/// Strict `YYYY-MM-DD` parser; rejects unpadded fields and impossible dates.
pub(crate) fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    if bytes.len() != 10 {
        return None;
    }

    let shape_ok = bytes.iter().enumerate().all(|(idx, byte)| match idx {
        4 | 7 => *byte == b'-',
        _ => byte.is_ascii_digit(),
    });
    if !shape_ok {
        return None;
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}
