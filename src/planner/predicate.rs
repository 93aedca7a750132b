//! Partition-scoped query construction
//!
//! Builds one [`QuerySpec`] per partition key:
//!
//! 1. Pick the index by the `availableOnly` flag
//! 2. Seed the key condition (partition key AND longitude range)
//! 3. Turn every other field into one filter clause
//! 4. Join the clauses with `AND`

use std::collections::BTreeMap;

use crate::store::AttributeValue;

use super::errors::{PlannerError, PlannerResult};
use super::filters::{FilterRequest, FilterValue};
use super::partition::{partition_keys, PartitionKey};

/// Default table listings are stored in
pub const DEFAULT_TABLE: &str = "rets-search";

const LATITUDE_BOX_PLACEHOLDER: &str = ":latitude_box";
const MIN_LONGITUDE_PLACEHOLDER: &str = ":minLongitude";
const MAX_LONGITUDE_PLACEHOLDER: &str = ":maxLongitude";

/// Sort key attribute shared by both indexes
pub const LONGITUDE_ATTRIBUTE: &str = "longitude";

/// Secondary index a partition query runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetIndex {
    /// Every listing
    LatitudeLongitude,
    /// Listings available on the web only
    WebAvailable,
}

impl TargetIndex {
    /// Choose the index for the available-only flag
    pub fn for_available_only(available_only: bool) -> Self {
        if available_only {
            TargetIndex::WebAvailable
        } else {
            TargetIndex::LatitudeLongitude
        }
    }

    /// Index name as known to the store
    pub fn index_name(&self) -> &'static str {
        match self {
            TargetIndex::LatitudeLongitude => "latitude-longitude-index",
            TargetIndex::WebAvailable => "latitude-longitude-webavailable-index",
        }
    }

    /// Partition key attribute of the index
    pub fn partition_attribute(&self) -> &'static str {
        match self {
            TargetIndex::LatitudeLongitude => "latitude_box",
            TargetIndex::WebAvailable => "latitude_box_webavailable",
        }
    }
}

/// One conjunct of the filter expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterClause {
    /// `attribute >= placeholder`
    AtLeast { attribute: String, placeholder: String },
    /// `attribute <= placeholder`
    AtMost { attribute: String, placeholder: String },
    /// `attribute = placeholder`
    Equals { attribute: String, placeholder: String },
    /// `attribute IN (placeholders...)`
    In { attribute: String, placeholders: Vec<String> },
}

impl FilterClause {
    /// Attribute the clause tests
    pub fn attribute(&self) -> &str {
        match self {
            FilterClause::AtLeast { attribute, .. }
            | FilterClause::AtMost { attribute, .. }
            | FilterClause::Equals { attribute, .. }
            | FilterClause::In { attribute, .. } => attribute,
        }
    }

    /// Placeholders the clause references
    pub fn placeholders(&self) -> Vec<&str> {
        match self {
            FilterClause::AtLeast { placeholder, .. }
            | FilterClause::AtMost { placeholder, .. }
            | FilterClause::Equals { placeholder, .. } => vec![placeholder.as_str()],
            FilterClause::In { placeholders, .. } => {
                placeholders.iter().map(String::as_str).collect()
            }
        }
    }

    /// Render in the store's expression syntax
    pub fn render(&self) -> String {
        match self {
            FilterClause::AtLeast { attribute, placeholder } => {
                format!("{} >= {}", attribute, placeholder)
            }
            FilterClause::AtMost { attribute, placeholder } => {
                format!("{} <= {}", attribute, placeholder)
            }
            FilterClause::Equals { attribute, placeholder } => {
                format!("{} = {}", attribute, placeholder)
            }
            FilterClause::In { attribute, placeholders } => {
                format!("{} IN ({})", attribute, placeholders.join(","))
            }
        }
    }
}

/// Immutable, partition-scoped query (no runtime state)
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    /// Table to query
    pub table: String,
    /// Chosen index
    pub index: TargetIndex,
    /// Partition this query is confined to
    pub partition_key: PartitionKey,
    /// Filter clauses in field-name order
    pub clauses: Vec<FilterClause>,
    /// Placeholder name (with leading `:`) to bound value
    pub values: BTreeMap<String, AttributeValue>,
}

impl QuerySpec {
    /// Index name as known to the store
    pub fn index_name(&self) -> &'static str {
        self.index.index_name()
    }

    /// Key condition expression
    pub fn key_condition(&self) -> String {
        format!(
            "{} = {} AND {} BETWEEN {} AND {}",
            self.index.partition_attribute(),
            LATITUDE_BOX_PLACEHOLDER,
            LONGITUDE_ATTRIBUTE,
            MIN_LONGITUDE_PLACEHOLDER,
            MAX_LONGITUDE_PLACEHOLDER
        )
    }

    /// Filter expression, `None` when there is nothing beyond the key condition
    pub fn filter_expression(&self) -> Option<String> {
        if self.clauses.is_empty() {
            return None;
        }
        let rendered: Vec<String> = self.clauses.iter().map(FilterClause::render).collect();
        Some(rendered.join(" AND "))
    }

    /// Bound value for a placeholder
    pub fn value(&self, placeholder: &str) -> Option<&AttributeValue> {
        self.values.get(placeholder)
    }

    /// Bound longitude range of the key condition
    pub fn longitude_range(&self) -> Option<(f64, f64)> {
        let min = self.value(MIN_LONGITUDE_PLACEHOLDER)?.as_f64()?;
        let max = self.value(MAX_LONGITUDE_PLACEHOLDER)?.as_f64()?;
        Some((min, max))
    }
}

/// Builds partition queries for one table
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    table: String,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE)
    }
}

impl QueryBuilder {
    /// Creates a builder for the given table
    pub fn new(table: impl Into<String>) -> Self {
        Self { table: table.into() }
    }

    /// Table the builder targets
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Build the query for a single partition.
    ///
    /// Pure; fails on the first filter that cannot be expressed.
    pub fn build_query(
        &self,
        filters: &FilterRequest,
        partition_key: PartitionKey,
    ) -> PlannerResult<QuerySpec> {
        let index = TargetIndex::for_available_only(filters.available_only()?);
        let window = filters.spatial_window()?;

        let mut values = BTreeMap::new();
        values.insert(
            LATITUDE_BOX_PLACEHOLDER.to_string(),
            AttributeValue::N(partition_key.to_string()),
        );
        values.insert(
            MIN_LONGITUDE_PLACEHOLDER.to_string(),
            AttributeValue::number(&window.min_longitude),
        );
        values.insert(
            MAX_LONGITUDE_PLACEHOLDER.to_string(),
            AttributeValue::number(&window.max_longitude),
        );

        let mut clauses = Vec::new();
        for (field, value) in filters.attribute_filters() {
            clauses.push(build_clause(field, value, &mut values)?);
        }

        Ok(QuerySpec {
            table: self.table.clone(),
            index,
            partition_key,
            clauses,
            values,
        })
    }

    /// Build the queries for every partition the request's window spans.
    ///
    /// Every query is built before any is returned, so a bad filter is
    /// reported before the first store request.
    pub fn plan_queries(&self, filters: &FilterRequest) -> PlannerResult<Vec<QuerySpec>> {
        let window = filters.spatial_window()?;
        partition_keys(window.min_latitude, window.max_latitude)?
            .into_iter()
            .map(|key| self.build_query(filters, key))
            .collect()
    }
}

/// Build the clause for one filter field and bind its values
fn build_clause(
    field: &str,
    value: &FilterValue,
    values: &mut BTreeMap<String, AttributeValue>,
) -> PlannerResult<FilterClause> {
    if let Some(rest) = field.strip_prefix("min") {
        let attribute = derive_attribute(field, rest)?;
        let placeholder = format!(":{}_min", attribute);
        bind(field, &placeholder, range_bound(field, value)?, values)?;
        return Ok(FilterClause::AtLeast { attribute, placeholder });
    }

    if let Some(rest) = field.strip_prefix("max") {
        let attribute = derive_attribute(field, rest)?;
        let placeholder = format!(":{}_max", attribute);
        bind(field, &placeholder, range_bound(field, value)?, values)?;
        return Ok(FilterClause::AtMost { attribute, placeholder });
    }

    let attribute = validate_attribute(field, field.to_string())?;
    match value {
        FilterValue::TextSet(items) if items.is_empty() => Err(PlannerError::unsupported_value(
            field,
            "an empty set matches nothing",
        )),
        FilterValue::TextSet(items) => {
            let mut placeholders = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let placeholder = format!(":{}_{}", attribute, i);
                bind(field, &placeholder, AttributeValue::S(item.clone()), values)?;
                placeholders.push(placeholder);
            }
            Ok(FilterClause::In { attribute, placeholders })
        }
        scalar => {
            let placeholder = format!(":{}", attribute);
            bind(field, &placeholder, scalar_value(scalar), values)?;
            Ok(FilterClause::Equals { attribute, placeholder })
        }
    }
}

/// `minBedrooms` -> `bedrooms`
fn derive_attribute(field: &str, rest: &str) -> PlannerResult<String> {
    let mut chars = rest.chars();
    let attribute = match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect::<String>(),
        None => {
            return Err(PlannerError::invalid_field(
                field,
                "range filter names an empty attribute",
            ))
        }
    };
    validate_attribute(field, attribute)
}

/// Attribute names must be plain identifiers to be usable in expressions
fn validate_attribute(field: &str, attribute: String) -> PlannerResult<String> {
    let mut chars = attribute.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(attribute)
    } else {
        Err(PlannerError::invalid_field(
            field,
            "attribute names must be letters, digits or '_'",
        ))
    }
}

fn range_bound(field: &str, value: &FilterValue) -> PlannerResult<AttributeValue> {
    match value {
        FilterValue::Number(n) => Ok(AttributeValue::number(n)),
        FilterValue::Text(s) => Ok(AttributeValue::S(s.clone())),
        other => Err(PlannerError::unsupported_value(
            field,
            format!("range bounds must be numbers or strings, found {}", other.kind()),
        )),
    }
}

fn scalar_value(value: &FilterValue) -> AttributeValue {
    match value {
        FilterValue::Number(n) => AttributeValue::number(n),
        FilterValue::Bool(b) => AttributeValue::Bool(*b),
        FilterValue::Text(s) => AttributeValue::S(s.clone()),
        FilterValue::TextSet(items) => AttributeValue::Ss(items.clone()),
    }
}

fn bind(
    field: &str,
    placeholder: &str,
    value: AttributeValue,
    values: &mut BTreeMap<String, AttributeValue>,
) -> PlannerResult<()> {
    if values.contains_key(placeholder) {
        return Err(PlannerError::invalid_field(
            field,
            format!("placeholder {} is already bound", placeholder),
        ));
    }
    values.insert(placeholder.to_string(), value);
    Ok(())
}
