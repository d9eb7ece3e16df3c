//! Crossing detection between two straight street segments
//!
//! Segments are written as lines `A·x + B·y = C` and intersected with
//! Cramer's rule. The intersection is rounded before it is checked against
//! both segment extents, so a crossing that lands on an endpoint after
//! rounding still counts.

use std::str::FromStr;

use geo::{Coord, Rect};
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

use crate::{LandmarkId, LandmarkStore};

/// Rounds half-up (away from zero) on the shortest decimal representation
/// of `value`, so `2.0005` becomes `2.001` even though its binary value is
/// slightly below the midpoint.
pub fn round_half_up(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }

    Decimal::from_str(&value.to_string())
        .ok()
        .and_then(|decimal| {
            decimal
                .round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
                .to_f64()
        })
        .unwrap_or_else(|| {
            // Out of decimal range, fall back to binary rounding
            let factor = 10f64.powi(decimals as i32);
            (value * factor).round() / factor
        })
}

fn line_coefficients(p1: Coord<f64>, p2: Coord<f64>) -> (f64, f64, f64) {
    let a = p2.y - p1.y;
    let b = p1.x - p2.x;
    let c = a * p1.x + b * p1.y;
    (a, b, c)
}

fn within_extent(point: Coord<f64>, p1: Coord<f64>, p2: Coord<f64>) -> bool {
    let extent = Rect::new(p1, p2);
    let (min, max) = (extent.min(), extent.max());
    min.x <= point.x && point.x <= max.x && min.y <= point.y && point.y <= max.y
}

/// Intersection of segments `[a1, a2]` and `[b1, b2]`, rounded to
/// `precision` decimals.
///
/// Parallel and collinear segments never cross. Line intersections outside
/// either segment's bounding box are rejected.
pub fn crossing_point(
    a1: Coord<f64>,
    a2: Coord<f64>,
    b1: Coord<f64>,
    b2: Coord<f64>,
    precision: u32,
) -> Option<Coord<f64>> {
    let (a_a, a_b, a_c) = line_coefficients(a1, a2);
    let (b_a, b_b, b_c) = line_coefficients(b1, b2);

    let det = a_a * b_b - b_a * a_b;
    if det == 0.0 {
        return None;
    }

    let point = Coord {
        x: round_half_up((b_b * a_c - a_b * b_c) / det, precision),
        y: round_half_up((a_a * b_c - b_a * a_c) / det, precision),
    };

    (within_extent(point, a1, a2) && within_extent(point, b1, b2)).then_some(point)
}

/// Landmark at the crossing of `[a1, a2]` and `[b1, b2]`.
///
/// An existing landmark within tolerance of the crossing is reused,
/// otherwise a new one is allocated in `store`.
pub fn detect_crossing(
    store: &mut LandmarkStore,
    a1: Coord<f64>,
    a2: Coord<f64>,
    b1: Coord<f64>,
    b2: Coord<f64>,
    precision: u32,
) -> Option<LandmarkId> {
    crossing_point(a1, a2, b1, b2, precision).map(|point| store.insert_or_get(point.x, point.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_PRECISION;

    fn c(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    #[test]
    fn diagonals_cross_in_the_middle() {
        let point = crossing_point(
            c(0.0, 0.0),
            c(10.0, 10.0),
            c(0.0, 10.0),
            c(10.0, 0.0),
            DEFAULT_PRECISION,
        );
        assert_eq!(point, Some(c(5.0, 5.0)));
    }

    #[test]
    fn parallel_segments_do_not_cross() {
        let point = crossing_point(
            c(0.0, 0.0),
            c(10.0, 0.0),
            c(0.0, 1.0),
            c(10.0, 1.0),
            DEFAULT_PRECISION,
        );
        assert_eq!(point, None);
    }

    #[test]
    fn collinear_overlap_is_not_a_crossing() {
        let point = crossing_point(
            c(0.0, 0.0),
            c(10.0, 0.0),
            c(5.0, 0.0),
            c(15.0, 0.0),
            DEFAULT_PRECISION,
        );
        assert_eq!(point, None);
    }

    #[test]
    fn degenerate_segment_is_ignored() {
        let point = crossing_point(
            c(3.0, 3.0),
            c(3.0, 3.0),
            c(0.0, 0.0),
            c(10.0, 10.0),
            DEFAULT_PRECISION,
        );
        assert_eq!(point, None);
    }

    #[test]
    fn line_intersection_outside_segments_is_rejected() {
        // lines meet at (5, 5) but the second segment stops at x = 4
        let point = crossing_point(
            c(0.0, 0.0),
            c(10.0, 10.0),
            c(0.0, 10.0),
            c(4.0, 6.0),
            DEFAULT_PRECISION,
        );
        assert_eq!(point, None);
    }

    #[test]
    fn touching_endpoint_counts() {
        let point = crossing_point(
            c(0.0, 0.0),
            c(10.0, 0.0),
            c(5.0, 0.0),
            c(5.0, 10.0),
            DEFAULT_PRECISION,
        );
        assert_eq!(point, Some(c(5.0, 0.0)));
    }

    #[test]
    fn crossing_coordinates_are_rounded() {
        let point = crossing_point(
            c(0.0, 0.0),
            c(3.0, 1.0),
            c(0.0, 1.0),
            c(3.0, 0.0),
            DEFAULT_PRECISION,
        )
        .unwrap();
        assert_eq!(point, c(1.5, 0.5));

        let point = crossing_point(
            c(0.0, 0.0),
            c(1.0, 3.0),
            c(0.0, 1.0),
            c(1.0, 0.0),
            DEFAULT_PRECISION,
        )
        .unwrap();
        assert_eq!(point, c(0.25, 0.75));

        let point = crossing_point(
            c(0.0, 0.0),
            c(3.0, 1.0),
            c(1.0, 0.0),
            c(1.0, 3.0),
            DEFAULT_PRECISION,
        )
        .unwrap();
        assert_eq!(point, c(1.0, 0.333));
    }

    #[test]
    fn crossings_stay_inside_both_extents() {
        // deterministic pseudo random segments
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state % 10_000) as f64 / 100.0
        };

        for _ in 0..2_000 {
            let (a1, a2, b1, b2) = (
                c(next(), next()),
                c(next(), next()),
                c(next(), next()),
                c(next(), next()),
            );
            if let Some(point) = crossing_point(a1, a2, b1, b2, DEFAULT_PRECISION) {
                assert!(within_extent(point, a1, a2));
                assert!(within_extent(point, b1, b2));
            }
        }
    }

    #[test]
    fn detection_reuses_existing_landmark() {
        let mut store = LandmarkStore::default();
        let existing = store.insert_or_get(5.00004, 4.99996);

        let found = detect_crossing(
            &mut store,
            c(0.0, 0.0),
            c(10.0, 10.0),
            c(0.0, 10.0),
            c(10.0, 0.0),
            DEFAULT_PRECISION,
        );
        assert_eq!(found, Some(existing));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn detection_allocates_new_landmark() {
        let mut store = LandmarkStore::default();
        let found = detect_crossing(
            &mut store,
            c(0.0, 0.0),
            c(10.0, 10.0),
            c(0.0, 10.0),
            c(10.0, 0.0),
            DEFAULT_PRECISION,
        )
        .unwrap();

        assert_eq!(store.position(found), Some(c(5.0, 5.0)));
    }

    #[test]
    fn half_up_rounding() {
        assert_eq!(round_half_up(2.0005, 3), 2.001);
        assert_eq!(round_half_up(-2.0005, 3), -2.001);
        assert_eq!(round_half_up(1.2344, 3), 1.234);
        assert_eq!(round_half_up(0.1 + 0.2, 3), 0.3);
        assert_eq!(round_half_up(1e-10, 3), 0.0);
        assert!(round_half_up(f64::NAN, 3).is_nan());
    }
}
