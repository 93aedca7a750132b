//! Query Planning Property Tests
//!
//! Sweeps windows and filter combinations and checks, for every plan:
//! - Partition keys are contiguous, ascending and cover the window
//! - Every placeholder a query references is bound
//! - Clauses follow field-name order
//! - Planning is deterministic

use searchx::planner::{
    partition_key, FilterClause, FilterRequest, PlannerErrorCode, QueryBuilder, QuerySpec,
    TargetIndex, AVAILABLE_ONLY, MAX_LATITUDE, MAX_LONGITUDE, MIN_LATITUDE, MIN_LONGITUDE,
};

// =============================================================================
// Test Utilities
// =============================================================================

fn window(min_lat: f64, max_lat: f64) -> FilterRequest {
    FilterRequest::new()
        .with(MIN_LATITUDE, min_lat)
        .with(MAX_LATITUDE, max_lat)
        .with(MIN_LONGITUDE, -117.3)
        .with(MAX_LONGITUDE, -116.9)
}

/// Windows starting on, just after and just before band edges
fn sample_windows() -> Vec<(f64, f64)> {
    let mut windows = Vec::new();
    for start in [-0.25, -0.05, 0.0, 0.05, 32.5, 32.55, 32.61, 45.99, 89.7] {
        for width in [0.0, 0.01, 0.1, 0.25, 0.3] {
            let end: f64 = start + width;
            if end <= 90.0 {
                windows.push((start, end));
            }
        }
    }
    windows
}

fn filter_variants() -> Vec<FilterRequest> {
    vec![
        FilterRequest::new(),
        FilterRequest::new().with("minBedrooms", 2).with("maxBedrooms", 4),
        FilterRequest::new()
            .with("propertyType", ["Condo", "Townhouse"])
            .with("minListPrice", 300000)
            .with(AVAILABLE_ONLY, true),
        FilterRequest::new()
            .with("status", "Active")
            .with("minYearBuilt", 1990)
            .with("hasPool", true),
    ]
}

fn combine(base: &FilterRequest, extra: &FilterRequest) -> FilterRequest {
    let mut combined = base.clone();
    for (field, value) in extra.iter() {
        combined.insert(field, value.clone());
    }
    combined
}

fn referenced_placeholders(spec: &QuerySpec) -> Vec<String> {
    let mut names = vec![
        ":latitude_box".to_string(),
        ":minLongitude".to_string(),
        ":maxLongitude".to_string(),
    ];
    for clause in &spec.clauses {
        names.extend(clause.placeholders().into_iter().map(str::to_string));
    }
    names
}

fn plan_all() -> Vec<(FilterRequest, (f64, f64), Vec<QuerySpec>)> {
    let builder = QueryBuilder::default();
    let mut plans = Vec::new();
    for (min_lat, max_lat) in sample_windows() {
        for extra in filter_variants() {
            let filters = combine(&window(min_lat, max_lat), &extra);
            let specs = builder.plan_queries(&filters).unwrap();
            plans.push((filters, (min_lat, max_lat), specs));
        }
    }
    plans
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_partitions_cover_window_contiguously() {
    for (_, (min_lat, max_lat), specs) in plan_all() {
        let keys: Vec<i64> = specs.iter().map(|s| s.partition_key).collect();
        assert_eq!(keys.first(), Some(&partition_key(min_lat)), "{} {}", min_lat, max_lat);
        assert_eq!(keys.last(), Some(&partition_key(max_lat)), "{} {}", min_lat, max_lat);
        for pair in keys.windows(2) {
            assert_eq!(pair[1], pair[0] + 1);
        }
    }
}

#[test]
fn test_every_placeholder_bound() {
    for (_, _, specs) in plan_all() {
        for spec in &specs {
            let referenced = referenced_placeholders(spec);
            for name in &referenced {
                assert!(spec.value(name).is_some(), "{} unbound in {:?}", name, spec);
            }
            assert_eq!(referenced.len(), spec.values.len());
        }
    }
}

/// Request field a clause was built from
fn source_field(clause: &FilterClause) -> String {
    let capitalized = |attribute: &str| {
        let mut chars = attribute.chars();
        chars
            .next()
            .map(|first| first.to_uppercase().chain(chars).collect::<String>())
            .unwrap_or_default()
    };
    match clause {
        FilterClause::AtLeast { attribute, .. } => format!("min{}", capitalized(attribute)),
        FilterClause::AtMost { attribute, .. } => format!("max{}", capitalized(attribute)),
        FilterClause::Equals { attribute, .. } | FilterClause::In { attribute, .. } => {
            attribute.clone()
        }
    }
}

#[test]
fn test_clauses_in_field_order() {
    for (_, _, specs) in plan_all() {
        for spec in &specs {
            let fields: Vec<String> = spec.clauses.iter().map(source_field).collect();
            let mut sorted = fields.clone();
            sorted.sort();
            assert_eq!(fields, sorted);
        }
    }
}

#[test]
fn test_index_follows_available_only() {
    for (filters, _, specs) in plan_all() {
        let expected = if filters.contains(AVAILABLE_ONLY) {
            TargetIndex::WebAvailable
        } else {
            TargetIndex::LatitudeLongitude
        };
        assert!(specs.iter().all(|s| s.index == expected));
    }
}

#[test]
fn test_planning_is_deterministic() {
    let first = plan_all();
    let second = plan_all();
    for ((_, _, a), (_, _, b)) in first.iter().zip(second.iter()) {
        assert_eq!(a, b);
    }
}

#[test]
fn test_inverted_window_plans_nothing() {
    let specs = QueryBuilder::default()
        .plan_queries(&window(32.9, 32.1))
        .unwrap();
    assert!(specs.is_empty());
}

#[test]
fn test_bad_filter_rejected_for_every_window() {
    for (min_lat, max_lat) in sample_windows() {
        let filters = window(min_lat, max_lat).with("minBedrooms", true);
        let err = QueryBuilder::default().plan_queries(&filters).unwrap_err();
        assert_eq!(err.code(), PlannerErrorCode::SearchFilterUnsupportedValue);
    }
}
