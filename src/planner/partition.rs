//! Latitude partition planning
//!
//! Listings are partitioned into 0.1 degree latitude bands. The key of a band
//! is `floor(latitude * 10)`, so `[32.5, 32.6)` is band 325 and
//! `[-0.1, 0.0)` is band -1.

use super::errors::{PlannerError, PlannerResult};
use super::filters::{MAX_LATITUDE, MIN_LATITUDE};

/// Partition key of a latitude band
pub type PartitionKey = i64;

/// Bands per degree of latitude
pub const BANDS_PER_DEGREE: f64 = 10.0;

/// Returns the band a latitude falls in.
///
/// Uses `floor`, never truncation toward zero, so the band boundaries are the
/// same on both sides of the equator.
pub fn partition_key(latitude: f64) -> PartitionKey {
    (latitude * BANDS_PER_DEGREE).floor() as PartitionKey
}

/// Returns every band key intersecting `[min_lat, max_lat]`, ascending.
///
/// `min_lat > max_lat` yields no partitions. Latitudes must be finite and
/// within `[-90, 90]`.
pub fn partition_keys(min_lat: f64, max_lat: f64) -> PlannerResult<Vec<PartitionKey>> {
    check_latitude(MIN_LATITUDE, min_lat)?;
    check_latitude(MAX_LATITUDE, max_lat)?;

    if min_lat > max_lat {
        return Ok(Vec::new());
    }

    Ok((partition_key(min_lat)..=partition_key(max_lat)).collect())
}

fn check_latitude(field: &str, latitude: f64) -> PlannerResult<()> {
    if !latitude.is_finite() {
        return Err(PlannerError::window_invalid(field, "is not a finite number"));
    }
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(PlannerError::window_invalid(
            field,
            format!("{} is outside [-90, 90]", latitude),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::PlannerErrorCode;

    #[test]
    fn test_contiguous_inclusive_range() {
        assert_eq!(partition_keys(32.5, 32.8).unwrap(), vec![325, 326, 327, 328]);
    }

    #[test]
    fn test_single_band() {
        assert_eq!(partition_keys(32.51, 32.59).unwrap(), vec![325]);
        assert_eq!(partition_keys(32.5, 32.5).unwrap(), vec![325]);
    }

    #[test]
    fn test_inverted_window_is_empty() {
        assert!(partition_keys(32.8, 32.5).unwrap().is_empty());
    }

    #[test]
    fn test_count_matches_formula() {
        let windows = [(32.5, 32.8), (-33.95, -33.05), (0.0, 0.0), (-0.3, 0.3), (10.01, 12.99)];
        for (a, b) in windows {
            let keys = partition_keys(a, b).unwrap();
            let expected = partition_key(b) - partition_key(a) + 1;
            assert_eq!(keys.len() as i64, expected, "window [{}, {}]", a, b);
            assert!(keys.windows(2).all(|w| w[1] == w[0] + 1));
        }
    }

    #[test]
    fn test_floor_at_equator() {
        assert_eq!(partition_key(0.0), 0);
        assert_eq!(partition_key(0.05), 0);
        assert_eq!(partition_key(-0.05), -1);
        assert_eq!(partition_key(-0.1), -1);
        assert_eq!(partition_key(-0.11), -2);
        assert_eq!(partition_keys(-0.05, 0.05).unwrap(), vec![-1, 0]);
    }

    #[test]
    fn test_southern_hemisphere() {
        assert_eq!(partition_keys(-33.95, -33.75).unwrap(), vec![-340, -339, -338]);
    }

    #[test]
    fn test_invalid_latitudes() {
        for (a, b) in [(f64::NAN, 1.0), (1.0, f64::INFINITY), (-91.0, 0.0), (0.0, 90.5)] {
            let err = partition_keys(a, b).unwrap_err();
            assert_eq!(err.code(), PlannerErrorCode::SearchWindowInvalid);
        }
    }
}
