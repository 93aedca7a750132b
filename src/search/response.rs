//! Response shaping
//!
//! Maps deserialized store records to the listing shape search pages render.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::observability::{log_event_with_fields, Event};
use crate::store::Record;

const PHOTO_PREFIX: &str = "/main";
const UNIT_SEPARATOR: &str = " #";

/// One listing as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub photo_uri: String,
    pub latitude: f64,
    pub longitude: f64,
    pub display_price: i64,
    pub status: String,
    pub bedrooms: i64,
    pub full_bathrooms: i64,
    pub half_bathrooms: i64,
    pub square_feet: i64,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: i64,
}

impl Listing {
    /// Build a listing from a record.
    ///
    /// Returns the name of the first missing or mistyped attribute on failure.
    pub fn from_record(record: &Record) -> Result<Self, &'static str> {
        let bathrooms_total = integer(record, "bathroomsTotalInteger")?;
        let bathrooms_half = integer(record, "bathroomsHalf")?;
        let unit_address = text(record, "unitAddress")?;

        let mut parts = unit_address.split(UNIT_SEPARATOR);
        let address = parts.next().unwrap_or_default().to_string();
        let unit = parts.next().filter(|u| !u.is_empty()).map(str::to_string);

        Ok(Listing {
            id: text(record, "id")?.to_string(),
            photo_uri: record
                .get("photoUriPath")
                .and_then(Value::as_str)
                .map(|path| format!("{}{}", PHOTO_PREFIX, path))
                .unwrap_or_default(),
            latitude: number(record, "latitude")?,
            longitude: number(record, "longitude")?,
            display_price: integer(record, "listPrice")?,
            status: text(record, "status")?.to_string(),
            bedrooms: integer(record, "bedroomsTotal")?,
            full_bathrooms: bathrooms_total - bathrooms_half,
            half_bathrooms: bathrooms_half,
            square_feet: square_feet(record.get("livingArea")),
            address,
            unit,
            city: text(record, "city")?.to_string(),
            state: text(record, "stateOrProvince")?.to_string(),
            zip: integer(record, "postalCode")?,
        })
    }
}

/// Shape every record, skipping (and logging) the ones that cannot be shaped.
///
/// Returns the listings and the number of records skipped.
pub fn normalize_records(records: &[Record], request_id: &str) -> (Vec<Listing>, usize) {
    let mut listings = Vec::with_capacity(records.len());
    let mut skipped = 0;
    for record in records {
        match Listing::from_record(record) {
            Ok(listing) => listings.push(listing),
            Err(attribute) => {
                skipped += 1;
                let id = record.get("id").and_then(Value::as_str).unwrap_or("unknown");
                log_event_with_fields(
                    Event::RecordSkipped,
                    &[
                        ("request_id", request_id),
                        ("listing", id),
                        ("attribute", attribute),
                    ],
                );
            }
        }
    }
    (listings, skipped)
}

fn text<'a>(record: &'a Record, name: &'static str) -> Result<&'a str, &'static str> {
    record.get(name).and_then(Value::as_str).ok_or(name)
}

fn number(record: &Record, name: &'static str) -> Result<f64, &'static str> {
    record.get(name).and_then(Value::as_f64).ok_or(name)
}

/// Whole part of a numeric attribute
fn integer(record: &Record, name: &'static str) -> Result<i64, &'static str> {
    match record.get(name) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .ok_or(name),
        _ => Err(name),
    }
}

/// Living area arrives as a string or a number; anything else is 0
fn square_feet(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)).unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}
