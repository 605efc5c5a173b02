//! Accumulated alignment cost newtype.

use std::cmp::Ordering;
use std::fmt;

/// Total cost of an optimal DTW alignment, i.e. `cost[n][m]` of the
/// accumulated cost matrix.
///
/// Non-negative whenever the point distance is non-negative. A metric that
/// yields NaN for some pair of points propagates NaN here.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct DtwDistance(f64);

impl DtwDistance {
    pub(crate) fn new(value: f64) -> Self {
        Self(value)
    }

    /// Return the raw cost value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Total ordering comparison using [`f64::total_cmp`].
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<DtwDistance> for f64 {
    fn from(distance: DtwDistance) -> Self {
        distance.0
    }
}

impl fmt::Display for DtwDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}
