//! Store attribute values and record deserialization
//!
//! Records travel in the store's tagged shape, e.g. `{"N": "42"}` or
//! `{"SS": ["Condo", "House"]}`. Numbers are carried as strings so their
//! formatting survives the round trip.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use super::errors::{StoreError, StoreResult};

/// A single typed attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    #[serde(rename = "S")]
    S(String),
    #[serde(rename = "N")]
    N(String),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null(bool),
    #[serde(rename = "SS")]
    Ss(Vec<String>),
    #[serde(rename = "NS")]
    Ns(Vec<String>),
    #[serde(rename = "L")]
    L(Vec<AttributeValue>),
    #[serde(rename = "M")]
    M(BTreeMap<String, AttributeValue>),
}

impl AttributeValue {
    /// Numeric attribute with exact formatting of `n`
    pub fn number(n: &Number) -> Self {
        AttributeValue::N(n.to_string())
    }

    /// Convert a plain JSON value into an attribute value.
    ///
    /// Arrays made only of strings become string sets, other arrays lists.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => AttributeValue::Null(true),
            Value::Bool(b) => AttributeValue::Bool(*b),
            Value::Number(n) => AttributeValue::number(n),
            Value::String(s) => AttributeValue::S(s.clone()),
            Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_string) => {
                AttributeValue::Ss(
                    items
                        .iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect(),
                )
            }
            Value::Array(items) => AttributeValue::L(items.iter().map(Self::from_json).collect()),
            Value::Object(map) => AttributeValue::M(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert into a plain JSON value.
    ///
    /// Fails on numbers the store should never have produced.
    pub fn to_json(&self) -> StoreResult<Value> {
        Ok(match self {
            AttributeValue::S(s) => Value::String(s.clone()),
            AttributeValue::N(n) => Value::Number(parse_number(n)?),
            AttributeValue::Bool(b) => Value::Bool(*b),
            AttributeValue::Null(_) => Value::Null,
            AttributeValue::Ss(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            AttributeValue::Ns(items) => Value::Array(
                items
                    .iter()
                    .map(|n| parse_number(n).map(Value::Number))
                    .collect::<StoreResult<_>>()?,
            ),
            AttributeValue::L(items) => Value::Array(
                items
                    .iter()
                    .map(AttributeValue::to_json)
                    .collect::<StoreResult<_>>()?,
            ),
            AttributeValue::M(map) => {
                let mut object = Map::new();
                for (k, v) in map {
                    object.insert(k.clone(), v.to_json()?);
                }
                Value::Object(object)
            }
        })
    }

    /// Numeric value, if this is a well-formed number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::N(n) => n.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }

    /// Text value, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::S(s) => Some(s),
            _ => None,
        }
    }
}

/// Parse a store number: integers stay integers, everything else is f64.
pub fn parse_number(raw: &str) -> StoreResult<Number> {
    let trimmed = raw.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Ok(Number::from(i));
    }
    if let Ok(u) = trimmed.parse::<u64>() {
        return Ok(Number::from(u));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .ok_or_else(|| StoreError::malformed(format!("invalid number '{}'", raw)))
}

/// A record as returned by the store
pub type RawRecord = HashMap<String, AttributeValue>;

/// A deserialized record: generic attribute name to JSON value mapping
pub type Record = Map<String, Value>;

/// Deserialize one raw store record
pub fn deserialize_record(raw: &RawRecord) -> StoreResult<Record> {
    let mut record = Map::new();
    for (name, value) in raw {
        let json = value
            .to_json()
            .map_err(|e| StoreError::malformed(format!("attribute '{}': {}", name, e.message())))?;
        record.insert(name.clone(), json);
    }
    Ok(record)
}

/// Convert a plain JSON object into a raw store record
pub fn raw_record_from_json(object: &Map<String, Value>) -> RawRecord {
    object
        .iter()
        .map(|(k, v)| (k.clone(), AttributeValue::from_json(v)))
        .collect()
}
