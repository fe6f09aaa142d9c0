use std::collections::BTreeSet;

use super::super::domain::{
    AvailabilityVerdict, CalendarDay, DateRange, DayStatus, ReasonCode, UnitId,
};

/// Applies the all-or-nothing night policy to a normalized calendar.
///
/// Records without a recoverable date or outside `[start, end)` are ignored.
/// A unit with no relevant nights is never available.
pub(crate) fn decide(unit_id: UnitId, range: &DateRange, days: &[CalendarDay]) -> AvailabilityVerdict {
    let relevant: Vec<&CalendarDay> = days
        .iter()
        .filter(|day| day.date.is_some_and(|date| range.contains_night(date)))
        .collect();

    let mut reasons = BTreeSet::new();
    if relevant.is_empty() {
        reasons.insert(ReasonCode::NoNightData);
    }

    for day in &relevant {
        if !day.status.is_bookable() {
            reasons.insert(match day.status {
                DayStatus::Unknown => ReasonCode::NightUnknown,
                DayStatus::Available | DayStatus::Unavailable => ReasonCode::NightUnavailable,
            });
        }

        if day.minimum_stay.is_some_and(|minimum| minimum > range.nights()) {
            reasons.insert(ReasonCode::MinimumStayNotMet);
        }
    }

    let relevant_night_count = u32::try_from(relevant.len()).unwrap_or(u32::MAX);
    AvailabilityVerdict::from_reasons(unit_id, relevant_night_count, reasons)
}
