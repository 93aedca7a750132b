//! Transport request normalization
//!
//! Turns the loosely shaped JSON a search page sends into a
//! [`FilterRequest`]:
//! - `availableOnly: 1 | true` becomes the boolean flag, `0 | false` drops it
//! - `keywords` holding a postal code is resolved to a window plus `postalCode`
//! - `north/south/east/west` become the window fields
//! - legacy fields and empty selections are dropped

use serde_json::{Map, Number, Value};

use crate::geo::{base_postal_code, BoundingRectangle, GeoDataset};
use crate::planner::{
    FilterRequest, AVAILABLE_ONLY, MAX_LATITUDE, MAX_LONGITUDE, MIN_LATITUDE, MIN_LONGITUDE,
};

use super::errors::{SearchError, SearchResult};

const KEYWORDS: &str = "keywords";
const POSTAL_CODE: &str = "postalCode";

/// Fields older clients send that filter nothing
const LEGACY_FIELDS: [&str; 3] = ["per_page", "locationType", "forSaleTypes"];

/// Compass fields and the window field each one becomes
const COMPASS_FIELDS: [(&str, &str); 4] = [
    ("north", MAX_LATITUDE),
    ("south", MIN_LATITUDE),
    ("east", MAX_LONGITUDE),
    ("west", MIN_LONGITUDE),
];

/// Outcome of normalizing a transport request
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedRequest {
    /// Filters ready for planning
    Filters(FilterRequest),
    /// The postal code is not in the dataset; nothing can match
    UnknownPostalCode(String),
}

/// Normalize a raw transport request
pub fn normalize_request(raw: &Value, geo: &GeoDataset) -> SearchResult<NormalizedRequest> {
    let mut fields = raw
        .as_object()
        .cloned()
        .ok_or_else(|| SearchError::InvalidRequest("request body must be a JSON object".into()))?;

    normalize_available_only(&mut fields)?;

    for legacy in LEGACY_FIELDS {
        fields.remove(legacy);
    }

    // Unselected multi-choice filters arrive as empty arrays
    fields.retain(|_, v| !matches!(v, Value::Array(items) if items.is_empty()));

    let postal_code = match fields.remove(KEYWORDS) {
        Some(keywords) => postal_code_keyword(&keywords)?,
        None => None,
    };

    // Compass fields are never filters; the postal code window replaces them
    let compass: Vec<(&str, Option<Value>)> = COMPASS_FIELDS
        .iter()
        .map(|(compass, window_field)| (*window_field, fields.remove(*compass)))
        .collect();

    match postal_code {
        Some(postal_code) => {
            let rectangle = geo.bounding_rectangle(&postal_code);
            if rectangle.is_zero() {
                return Ok(NormalizedRequest::UnknownPostalCode(postal_code));
            }
            insert_window(&mut fields, &rectangle)?;
            let code: u64 = postal_code
                .parse()
                .map_err(|_| SearchError::InvalidRequest("keywords is not a postal code".into()))?;
            fields.insert(POSTAL_CODE.to_string(), Value::from(code));
        }
        None => {
            for (window_field, value) in compass {
                if let Some(value) = value {
                    fields.insert(window_field.to_string(), value);
                }
            }
        }
    }

    let filters = FilterRequest::from_json(&Value::Object(fields))?;
    Ok(NormalizedRequest::Filters(filters))
}

fn normalize_available_only(fields: &mut Map<String, Value>) -> SearchResult<()> {
    let flag = match fields.remove(AVAILABLE_ONLY) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) if n.as_u64() == Some(1) => true,
        Some(Value::Number(n)) if n.as_u64() == Some(0) => false,
        Some(other) => {
            return Err(SearchError::InvalidRequest(format!(
                "availableOnly must be 0, 1, true or false, found {}",
                other
            )))
        }
    };
    if flag {
        fields.insert(AVAILABLE_ONLY.to_string(), Value::Bool(true));
    }
    Ok(())
}

/// The postal code a `keywords` value names, `None` when it is blank
fn postal_code_keyword(keywords: &Value) -> SearchResult<Option<String>> {
    let text = match keywords {
        Value::Null => return Ok(None),
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) if n.is_u64() => n.to_string(),
        _ => {
            return Err(SearchError::InvalidRequest(
                "keywords must be a postal code".into(),
            ))
        }
    };
    if text.is_empty() {
        return Ok(None);
    }
    base_postal_code(&text)
        .map(|code| Some(code.to_string()))
        .ok_or_else(|| SearchError::InvalidRequest("keywords must be a postal code".into()))
}

fn insert_window(fields: &mut Map<String, Value>, rectangle: &BoundingRectangle) -> SearchResult<()> {
    for (field, value) in [
        (MIN_LONGITUDE, rectangle.min_lon),
        (MAX_LONGITUDE, rectangle.max_lon),
        (MIN_LATITUDE, rectangle.min_lat),
        (MAX_LATITUDE, rectangle.max_lat),
    ] {
        let number = Number::from_f64(value).ok_or_else(|| {
            SearchError::InvalidRequest(format!("postal code bounds are not finite ({})", field))
        })?;
        fields.insert(field.to_string(), Value::Number(number));
    }
    Ok(())
}
