use serde_json::Value;

use crate::workflows::availability::domain::{ImageRef, Unit, UnitId};

const CONTAINER_KEYS: &[&str] = &["result", "data"];
const NAME_KEYS: &[&str] = &["name", "externalListingName"];
const CAPACITY_KEYS: &[&str] = &["personCapacity", "maxGuests"];
const PRICE_KEYS: &[&str] = &["priceNightly", "baseRate"];
const BOOKING_URL_KEYS: &[&str] = &[
    "bookingEnginePublicUrl",
    "bookingEngineUrl",
    "publicUrl",
    "listingUrl",
    "url",
];

/// Parses the catalog listing array. `None` when the payload carries no array
/// at `result`, `data` or the root.
pub(crate) fn parse_units(payload: &Value) -> Option<Vec<Unit>> {
    let listings = CONTAINER_KEYS
        .iter()
        .find_map(|key| payload.get(key).filter(|value| truthy(value)))
        .unwrap_or(payload)
        .as_array()?;

    Some(listings.iter().filter_map(parse_unit).collect())
}

/// Builds a unit from one catalog entry; entries without an id are dropped.
pub(crate) fn parse_unit(entry: &Value) -> Option<Unit> {
    let id = entry.get("id").and_then(text)?;

    Some(Unit {
        id: UnitId(id),
        name: first_text(entry, NAME_KEYS),
        description: first_text(entry, &["description"]),
        city: first_text(entry, &["city"]),
        state: first_text(entry, &["state"]),
        country: first_text(entry, &["country"]),
        capacity: first_count(entry, CAPACITY_KEYS),
        bedroom_count: first_count(entry, &["bedroomsNumber"]),
        bathroom_count: entry
            .get("bathroomsNumber")
            .and_then(Value::as_f64)
            .map(|value| value as f32),
        nightly_price: PRICE_KEYS
            .iter()
            .find_map(|key| entry.get(key).and_then(Value::as_f64)),
        booking_url: first_text(entry, BOOKING_URL_KEYS),
        images: entry
            .get("listingImages")
            .and_then(Value::as_array)
            .map(|images| images.iter().map(parse_image).collect())
            .unwrap_or_default(),
    })
}

fn parse_image(image: &Value) -> ImageRef {
    ImageRef {
        url: image.get("url").and_then(text),
        alternate_url: image.get("airbnbUrl").and_then(text),
    }
}

fn first_text(entry: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| entry.get(key).and_then(text))
}

fn first_count(entry: &Value, keys: &[&str]) -> Option<u32> {
    keys.iter().find_map(|key| {
        entry
            .get(key)
            .and_then(Value::as_u64)
            .and_then(|value| u32::try_from(value).ok())
    })
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(text) => !text.is_empty(),
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}
