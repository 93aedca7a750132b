//! Normalized filter request
//!
//! A filter request maps field names to a closed set of value types. JSON
//! input is resolved into [`FilterValue`] once, at the request boundary, so
//! nothing downstream inspects dynamic types.

use std::collections::BTreeMap;

use serde_json::{Number, Value};

use super::errors::{PlannerError, PlannerResult};

/// Southern edge of the spatial window
pub const MIN_LATITUDE: &str = "minLatitude";
/// Northern edge of the spatial window
pub const MAX_LATITUDE: &str = "maxLatitude";
/// Western edge of the spatial window
pub const MIN_LONGITUDE: &str = "minLongitude";
/// Eastern edge of the spatial window
pub const MAX_LONGITUDE: &str = "maxLongitude";
/// Restricts the search to listings available on the web
pub const AVAILABLE_ONLY: &str = "availableOnly";

/// The four spatial window fields
pub const WINDOW_FIELDS: [&str; 4] = [MIN_LATITUDE, MAX_LATITUDE, MIN_LONGITUDE, MAX_LONGITUDE];

/// Returns true for fields consumed by the key condition or index choice
pub fn is_reserved_field(name: &str) -> bool {
    name == AVAILABLE_ONLY || WINDOW_FIELDS.contains(&name)
}

/// A single filter value
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Integer or floating point number; original formatting is kept
    Number(Number),
    /// Boolean flag
    Bool(bool),
    /// Text
    Text(String),
    /// Set of text values (set-membership filter)
    TextSet(Vec<String>),
}

impl FilterValue {
    /// Resolve a JSON value for the given field.
    ///
    /// Accepts numbers, booleans, strings and arrays of strings.
    pub fn from_json(field: &str, value: &Value) -> PlannerResult<Self> {
        match value {
            Value::Number(n) => Ok(FilterValue::Number(n.clone())),
            Value::Bool(b) => Ok(FilterValue::Bool(*b)),
            Value::String(s) => Ok(FilterValue::Text(s.clone())),
            Value::Array(items) => {
                let mut set = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(s) => set.push(s.clone()),
                        other => {
                            return Err(PlannerError::unsupported_value(
                                field,
                                format!("set elements must be strings, found {}", json_kind(other)),
                            ))
                        }
                    }
                }
                Ok(FilterValue::TextSet(set))
            }
            Value::Null => Err(PlannerError::unsupported_value(field, "null")),
            Value::Object(_) => Err(PlannerError::unsupported_value(field, "object")),
        }
    }

    /// Short type name for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            FilterValue::Number(_) => "number",
            FilterValue::Bool(_) => "boolean",
            FilterValue::Text(_) => "string",
            FilterValue::TextSet(_) => "set of strings",
        }
    }

    /// Returns the value as f64 if numeric
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FilterValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }
}

impl From<f64> for FilterValue {
    /// Non-finite values have no JSON representation and become `0`.
    fn from(value: f64) -> Self {
        FilterValue::Number(Number::from_f64(value).unwrap_or_else(|| Number::from(0)))
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Number(Number::from(value))
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        FilterValue::Number(Number::from(value))
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl<const N: usize> From<[&str; N]> for FilterValue {
    fn from(values: [&str; N]) -> Self {
        FilterValue::TextSet(values.iter().map(|s| s.to_string()).collect())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The spatial window a search is confined to
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialWindow {
    pub min_latitude: f64,
    pub max_latitude: f64,
    /// Kept as the caller's number so the bound value is formatted exactly
    pub min_longitude: Number,
    pub max_longitude: Number,
}

/// A normalized filter request, ordered by field name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterRequest {
    fields: BTreeMap<String, FilterValue>,
}

impl FilterRequest {
    /// Creates an empty request
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a JSON object into a filter request
    pub fn from_json(value: &Value) -> PlannerResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| PlannerError::unsupported_value("<request>", "expected an object"))?;

        let mut request = Self::new();
        for (field, value) in object {
            request.insert(field.clone(), FilterValue::from_json(field, value)?);
        }
        Ok(request)
    }

    /// Builder-style insert
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Insert or replace a field
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FilterValue>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Remove a field, returning its value
    pub fn remove(&mut self, field: &str) -> Option<FilterValue> {
        self.fields.remove(field)
    }

    /// Look up a field
    pub fn get(&self, field: &str) -> Option<&FilterValue> {
        self.fields.get(field)
    }

    /// Returns true if the field is present
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no field is set
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over all fields in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over the fields that become filter clauses
    pub fn attribute_filters(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.iter().filter(|(name, _)| !is_reserved_field(name))
    }

    /// Whether the available-only index is requested. Absent means false.
    pub fn available_only(&self) -> PlannerResult<bool> {
        match self.fields.get(AVAILABLE_ONLY) {
            None => Ok(false),
            Some(FilterValue::Bool(flag)) => Ok(*flag),
            Some(other) => Err(PlannerError::unsupported_value(
                AVAILABLE_ONLY,
                format!("expected a boolean, found {}", other.kind()),
            )),
        }
    }

    /// Extract the spatial window. All four fields must be present and numeric.
    pub fn spatial_window(&self) -> PlannerResult<SpatialWindow> {
        Ok(SpatialWindow {
            min_latitude: self.coordinate(MIN_LATITUDE)?.1,
            max_latitude: self.coordinate(MAX_LATITUDE)?.1,
            min_longitude: self.coordinate(MIN_LONGITUDE)?.0,
            max_longitude: self.coordinate(MAX_LONGITUDE)?.0,
        })
    }

    fn coordinate(&self, field: &str) -> PlannerResult<(Number, f64)> {
        match self.fields.get(field) {
            None => Err(PlannerError::window_missing(field)),
            Some(FilterValue::Number(n)) => {
                let value = n
                    .as_f64()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| PlannerError::window_invalid(field, "is not a finite number"))?;
                Ok((n.clone(), value))
            }
            Some(other) => Err(PlannerError::window_invalid(
                field,
                format!("must be a number, found {}", other.kind()),
            )),
        }
    }
}

impl<K: Into<String>, V: Into<FilterValue>> FromIterator<(K, V)> for FilterRequest {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut request = Self::new();
        for (k, v) in iter {
            request.insert(k, v);
        }
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::PlannerErrorCode;
    use serde_json::json;

    #[test]
    fn test_from_json_resolves_all_value_kinds() {
        let request = FilterRequest::from_json(&json!({
            "minBedrooms": 2,
            "maxPrice": 750000.5,
            "pool": true,
            "city": "San Diego",
            "propertyType": ["Condo", "House"]
        }))
        .unwrap();

        assert_eq!(request.get("minBedrooms"), Some(&FilterValue::from(2)));
        assert_eq!(request.get("pool"), Some(&FilterValue::Bool(true)));
        assert_eq!(request.get("city"), Some(&FilterValue::from("San Diego")));
        assert_eq!(
            request.get("propertyType"),
            Some(&FilterValue::from(["Condo", "House"]))
        );
        assert_eq!(request.get("maxPrice").unwrap().as_f64(), Some(750000.5));
    }

    #[test]
    fn test_from_json_rejects_unsupported_values() {
        for bad in [
            json!({"garage": null}),
            json!({"garage": {"spaces": 2}}),
            json!({"tags": ["a", 1]}),
            json!({"tags": [["nested"]]}),
        ] {
            let err = FilterRequest::from_json(&bad).unwrap_err();
            assert_eq!(err.code(), PlannerErrorCode::SearchFilterUnsupportedValue);
        }
    }

    #[test]
    fn test_from_json_requires_object() {
        assert!(FilterRequest::from_json(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_spatial_window_extraction() {
        let request = FilterRequest::new()
            .with(MIN_LATITUDE, 32.5)
            .with(MAX_LATITUDE, 32.8)
            .with(MIN_LONGITUDE, -117.2)
            .with(MAX_LONGITUDE, -117);

        let window = request.spatial_window().unwrap();
        assert_eq!(window.min_latitude, 32.5);
        assert_eq!(window.max_latitude, 32.8);
        assert_eq!(window.max_longitude.to_string(), "-117");
    }

    #[test]
    fn test_spatial_window_missing_field() {
        let request = FilterRequest::new()
            .with(MIN_LATITUDE, 32.5)
            .with(MAX_LATITUDE, 32.8)
            .with(MIN_LONGITUDE, -117.2);

        let err = request.spatial_window().unwrap_err();
        assert_eq!(err.code(), PlannerErrorCode::SearchWindowMissing);
        assert_eq!(err.field(), Some(MAX_LONGITUDE));
    }

    #[test]
    fn test_spatial_window_non_numeric() {
        let request = FilterRequest::new()
            .with(MIN_LATITUDE, "32.5")
            .with(MAX_LATITUDE, 32.8)
            .with(MIN_LONGITUDE, -117.2)
            .with(MAX_LONGITUDE, -117.0);

        let err = request.spatial_window().unwrap_err();
        assert_eq!(err.code(), PlannerErrorCode::SearchWindowInvalid);
    }

    #[test]
    fn test_available_only() {
        assert!(!FilterRequest::new().available_only().unwrap());
        assert!(FilterRequest::new()
            .with(AVAILABLE_ONLY, true)
            .available_only()
            .unwrap());
        assert!(FilterRequest::new()
            .with(AVAILABLE_ONLY, 1)
            .available_only()
            .is_err());
    }

    #[test]
    fn test_attribute_filters_skip_reserved() {
        let request = FilterRequest::new()
            .with(MIN_LATITUDE, 1.0)
            .with(AVAILABLE_ONLY, true)
            .with("city", "Poway");

        let names: Vec<&str> = request.attribute_filters().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["city"]);
    }
}
