//! DTW distance computation.

use tracing::instrument;

use crate::distance::DtwDistance;
use crate::error::DtwError;
use crate::matrix::CostMatrix;
use crate::metric::PointDistance;
use crate::path::WarpingPath;

/// Dynamic time warping aligner parameterized by a point distance.
///
/// Holds no state between calls apart from the metric itself, so a shared
/// `&Dtw` can be used from many threads as long as the metric is `Sync`.
/// No windowing or pruning is applied: every call fills the full matrix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dtw<M> {
    metric: M,
}

impl<M> Dtw<M> {
    /// Create an aligner using `metric` as the point distance.
    #[must_use]
    pub fn new(metric: M) -> Self {
        Self { metric }
    }

    /// Return the point distance used by this aligner.
    #[must_use]
    pub fn metric(&self) -> &M {
        &self.metric
    }

    /// Compute the minimum cumulative alignment cost between two sequences.
    ///
    /// Uses a rolling two-row buffer rather than allocating the full cost
    /// matrix. Runs in O(n * m) time and O(m) space.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::EmptySeries`] | `a` or `b` is empty |
    #[instrument(level = "trace", skip_all, fields(n = a.len(), m = b.len()))]
    pub fn distance<P>(&self, a: &[P], b: &[P]) -> Result<DtwDistance, DtwError>
    where
        M: PointDistance<P>,
    {
        check_non_empty(a, b)?;
        Ok(DtwDistance::new(self.rolling_cost(a, b)))
    }

    /// Compute the alignment cost and the optimal warping path.
    ///
    /// Allocates the full `(n + 1) x (m + 1)` matrix. Use
    /// [`distance`][Dtw::distance] when only the scalar cost is needed.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::EmptySeries`] | `a` or `b` is empty |
    #[instrument(level = "trace", skip_all, fields(n = a.len(), m = b.len()))]
    pub fn distance_and_path<P>(
        &self,
        a: &[P],
        b: &[P],
    ) -> Result<(DtwDistance, WarpingPath), DtwError>
    where
        M: PointDistance<P>,
    {
        let matrix = self.cost_matrix(a, b)?;
        Ok((matrix.total(), matrix.warping_path()))
    }

    /// Compute the full accumulated cost matrix, e.g. for rendering.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::EmptySeries`] | `a` or `b` is empty |
    pub fn cost_matrix<P>(&self, a: &[P], b: &[P]) -> Result<CostMatrix, DtwError>
    where
        M: PointDistance<P>,
    {
        check_non_empty(a, b)?;
        Ok(CostMatrix::compute(a, b, &self.metric))
    }

    /// Rolling two-row evaluation of the recurrence.
    ///
    /// Slot 0 of each row is the `+inf` boundary column; `prev` starts as
    /// boundary row 0, where only `prev[0]` is reachable (cost 0).
    fn rolling_cost<P>(&self, a: &[P], b: &[P]) -> f64
    where
        M: PointDistance<P>,
    {
        let m = b.len();
        let mut prev = vec![f64::INFINITY; m + 1];
        let mut curr = vec![f64::INFINITY; m + 1];
        prev[0] = 0.0;

        for x in a {
            curr[0] = f64::INFINITY;
            for (j, y) in b.iter().enumerate() {
                let cost = self.metric.distance(x, y);
                curr[j + 1] = cost + prev[j + 1].min(curr[j]).min(prev[j]);
            }
            std::mem::swap(&mut prev, &mut curr);
        }

        // After the final swap, `prev` holds row n.
        prev[m]
    }
}

fn check_non_empty<P>(a: &[P], b: &[P]) -> Result<(), DtwError> {
    if a.is_empty() || b.is_empty() {
        return Err(DtwError::EmptySeries {
            len_a: a.len(),
            len_b: b.len(),
        });
    }
    Ok(())
}
