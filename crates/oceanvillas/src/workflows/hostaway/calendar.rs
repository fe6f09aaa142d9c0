//! Calendar normalization.
//!
//! Accounts disagree on how a calendar is wrapped, which field carries the
//! date, and how a blocked night is spelled. Each logical field is resolved
//! through an ordered table of candidate keys so the tolerated shapes stay
//! explicit; the first match wins.

use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::availability::domain::{parse_iso_date, CalendarDay, DayStatus};

const CONTAINER_KEYS: &[&str] = &["result", "data"];
const DAY_ARRAY_KEYS: &[&str] = &["days", "calendar", "data"];
const DATE_KEYS: &[&str] = &["date", "day", "calendarDate", "startDate", "localDate"];
const STATUS_KEYS: &[&str] = &["status", "state", "availability"];
const MINIMUM_STAY_KEYS: &[&str] = &["minimumStay", "minStay", "minNights", "minimumNights"];

const UNAVAILABLE_VOCABULARY: &[&str] = &[
    "booked",
    "reserved",
    "blocked",
    "unavailable",
    "occupied",
    "notavailable",
    "closed",
    "hold",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagMeaning {
    /// `true` means the night can be sold.
    OpenWhenTrue,
    /// `true` means the night is taken.
    TakenWhenTrue,
}

const FLAG_FIELDS: &[(&str, FlagMeaning)] = &[
    ("available", FlagMeaning::OpenWhenTrue),
    ("isAvailable", FlagMeaning::OpenWhenTrue),
    ("isBooked", FlagMeaning::TakenWhenTrue),
    ("booked", FlagMeaning::TakenWhenTrue),
    ("blocked", FlagMeaning::TakenWhenTrue),
    ("isBlocked", FlagMeaning::TakenWhenTrue),
];

impl FlagMeaning {
    fn status_for(self, flag: bool) -> DayStatus {
        let open = match self {
            Self::OpenWhenTrue => flag,
            Self::TakenWhenTrue => !flag,
        };
        if open {
            DayStatus::Available
        } else {
            DayStatus::Unavailable
        }
    }
}

/// Locates the per-day records. `None` means the payload has no recognizable
/// calendar shape, which is distinct from an empty calendar.
pub(crate) fn extract_days(payload: &Value) -> Option<&[Value]> {
    let container = CONTAINER_KEYS
        .iter()
        .find_map(|key| payload.get(key).filter(|value| !value.is_null()))
        .unwrap_or(payload);

    if let Value::Array(days) = container {
        return Some(days);
    }

    DAY_ARRAY_KEYS
        .iter()
        .find_map(|key| container.get(key).and_then(Value::as_array))
        .map(Vec::as_slice)
}

/// Date of the record, or `None` when it cannot be recovered. Only the first
/// ten characters are considered so timestamps are accepted.
pub(crate) fn day_date(record: &Value) -> Option<NaiveDate> {
    let raw = DATE_KEYS
        .iter()
        .find_map(|key| record.get(key).and_then(non_empty_text))?;
    parse_iso_date(raw.get(..10)?)
}

pub(crate) fn day_status(record: &Value) -> DayStatus {
    // 1. explicit booleans
    for (key, meaning) in FLAG_FIELDS {
        if let Some(flag) = record.get(key).and_then(Value::as_bool) {
            return meaning.status_for(flag);
        }
    }

    // 2. 0/1 encodings of the same flags
    for (key, meaning) in FLAG_FIELDS {
        if let Some(number) = record.get(key).filter(|value| value.is_number()) {
            return match number.as_f64() {
                Some(n) if n == 0.0 => meaning.status_for(false),
                Some(n) if n == 1.0 => meaning.status_for(true),
                _ => DayStatus::Unknown,
            };
        }
    }

    // 3. free-text status
    let status = STATUS_KEYS
        .iter()
        .find_map(|key| record.get(key).filter(|value| !value.is_null()));
    if let Some(status) = status {
        let text = match status {
            Value::String(text) => squash(text),
            other => squash(&other.to_string()),
        };
        if UNAVAILABLE_VOCABULARY.contains(&text.as_str()) {
            return DayStatus::Unavailable;
        }
    }

    // 4. open only if no flag carried something we could not read
    let unreadable_flag = FLAG_FIELDS
        .iter()
        .any(|(key, _)| record.get(key).is_some_and(|value| !value.is_null()));
    if unreadable_flag {
        DayStatus::Unknown
    } else {
        DayStatus::Available
    }
}

pub(crate) fn minimum_stay(record: &Value) -> Option<u32> {
    MINIMUM_STAY_KEYS.iter().find_map(|key| {
        let value = record.get(key)?;
        match value {
            Value::Number(number) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(text) => text.trim().parse::<u32>().ok(),
            _ => None,
        }
    })
}

pub(crate) fn normalize_day(record: &Value) -> CalendarDay {
    CalendarDay {
        date: day_date(record),
        status: day_status(record),
        minimum_stay: minimum_stay(record),
    }
}

/// Normalizes every record of a calendar payload, or `None` for an
/// unrecognized shape.
pub(crate) fn normalize_calendar(payload: &Value) -> Option<Vec<CalendarDay>> {
    extract_days(payload).map(|days| days.iter().map(normalize_day).collect())
}

fn non_empty_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn squash(text: &str) -> String {
    text.chars()
        .filter(|ch| !ch.is_whitespace() && *ch != '_' && *ch != '-')
        .flat_map(char::to_lowercase)
        .collect()
}
