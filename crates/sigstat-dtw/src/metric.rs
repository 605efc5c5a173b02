//! Point distance functions plugged into the DTW recurrence.

/// Distance between two points of an aligned sequence.
///
/// Implemented for the built-in metrics and for any closure
/// `Fn(&P, &P) -> f64`, so callers can align arbitrary point types.
pub trait PointDistance<P: ?Sized> {
    /// Return the distance between `a` and `b`.
    fn distance(&self, a: &P, b: &P) -> f64;
}

impl<P: ?Sized, F> PointDistance<P> for F
where
    F: Fn(&P, &P) -> f64,
{
    fn distance(&self, a: &P, b: &P) -> f64 {
        self(a, b)
    }
}

/// Euclidean (L2) distance between fixed-dimension points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Euclidean;

impl<const N: usize> PointDistance<[f64; N]> for Euclidean {
    fn distance(&self, a: &[f64; N], b: &[f64; N]) -> f64 {
        a.iter()
            .zip(b)
            .map(|(x, y)| (x - y).powi(2))
            .sum::<f64>()
            .sqrt()
    }
}

/// Absolute difference between scalar samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Absolute;

impl PointDistance<f64> for Absolute {
    fn distance(&self, a: &f64, b: &f64) -> f64 {
        (a - b).abs()
    }
}
