//! Availability resolution for the configured rental units.
//!
//! A search validates its dates, obtains one provider credential, then fetches
//! the listing directory and every unit's calendar concurrently. Per-unit
//! failures only drop that unit; credential and configuration failures abort
//! the whole request.

pub mod credentials;
pub mod directory;
pub mod domain;
pub(crate) mod evaluation;
pub mod router;
pub mod service;
pub mod views;

#[cfg(test)]
mod tests;

pub use credentials::{Credential, CredentialManager};
pub use directory::DirectoryFetcher;
pub use domain::{
    AvailabilityVerdict, CalendarDay, DateRange, DayStatus, ImageRef, ReasonCode, SearchQuery,
    Unit, UnitId, ValidationError, DEFAULT_GUESTS,
};
pub use evaluation::{AvailabilityEvaluator, UnitEvaluation};
pub use router::availability_router;
pub use service::{AvailabilitySettings, AvailabilityService, SearchError};
pub use views::{FeaturedListing, ListingDetail, ListingSummary, QueryEcho, SearchResults};
