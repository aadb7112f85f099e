//! Crossings between piecewise-linear curves in the complex plane.

use num_complex::Complex;
use serde::{Deserialize, Serialize};

/// Determinant magnitude below which two segments count as parallel.
pub const PARALLEL_TOLERANCE: f64 = 1e-8;

/// A crossing between segment `first` of one curve and segment `second` of
/// the other, at fractional positions `s1` and `s2` along each.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentCrossing {
    pub first: usize,
    pub second: usize,
    pub s1: f64,
    pub s2: f64,
}

/// Intersection of segments `l1a → l1b` and `l2a → l2b`.
///
/// Solves `l1a + s1 (l1b - l1a) = l2a + s2 (l2b - l2a)` and returns
/// `(s1, s2)` when both lie in `[0, 1]`. Near-parallel segments and segments
/// with non-finite endpoints have no intersection.
pub fn find_intersection(
    l1a: Complex<f64>,
    l1b: Complex<f64>,
    l2a: Complex<f64>,
    l2b: Complex<f64>,
    parallel_tolerance: f64,
) -> Option<(f64, f64)> {
    let t1 = l1b - l1a;
    let t2 = l2b - l2a;
    let b = l1a - l2a;

    let det = t1.im * t2.re - t1.re * t2.im;
    if !det.is_finite() || det.abs() < parallel_tolerance {
        return None;
    }

    let s1 = (t2.im * b.re - t2.re * b.im) / det;
    if !(0.0..=1.0).contains(&s1) {
        return None;
    }
    let s2 = (t1.im * b.re - t1.re * b.im) / det;
    if !(0.0..=1.0).contains(&s2) {
        return None;
    }

    let p1 = l1a + t1 * s1;
    let p2 = l2a + t2 * s2;
    debug_assert!(
        (p1 - p2).norm() <= 1e-7 * (1.0 + p1.norm()),
        "segment parametrizations disagree: {p1} vs {p2}"
    );

    Some((s1, s2))
}

/// All crossings between two polylines, `first` segments outer and `second`
/// segments inner.
pub fn curve_intersections(
    first: &[Complex<f64>],
    second: &[Complex<f64>],
    parallel_tolerance: f64,
) -> Vec<SegmentCrossing> {
    let mut crossings = Vec::new();
    for (i, a) in first.windows(2).enumerate() {
        for (j, b) in second.windows(2).enumerate() {
            if let Some((s1, s2)) = find_intersection(a[0], a[1], b[0], b[1], parallel_tolerance)
            {
                crossings.push(SegmentCrossing {
                    first: i,
                    second: j,
                    s1,
                    s2,
                });
            }
        }
    }
    crossings
}

/// Linear interpolation between `values[index]` and `values[index + 1]`.
pub fn interpolate(values: &[f64], index: usize, s: f64) -> f64 {
    (1.0 - s) * values[index] + s * values[index + 1]
}
