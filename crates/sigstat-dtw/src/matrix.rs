//! Accumulated cost matrix for full (unwindowed) DTW.

use crate::distance::DtwDistance;
use crate::metric::PointDistance;
use crate::path::{WarpingPath, WarpingStep};

/// Accumulated cost matrix of shape `(n + 1) x (m + 1)`, stored row-major.
///
/// Row and column 0 are the boundary: `cost[0][0] = 0` and every other
/// boundary cell is `+inf`, so no sequence can be skipped entirely. Cell
/// `(i, j)` with `i, j >= 1` holds the minimum cost of aligning `a[..i]`
/// with `b[..j]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    n: usize,
    m: usize,
    data: Vec<f64>,
}

impl CostMatrix {
    /// Fill the matrix with the classical recurrence
    /// `cost[i][j] = d(a[i-1], b[j-1]) + min(cost[i-1][j], cost[i][j-1], cost[i-1][j-1])`.
    ///
    /// Both slices must be non-empty; [`Dtw`](crate::Dtw) checks this.
    pub(crate) fn compute<P, M>(a: &[P], b: &[P], metric: &M) -> Self
    where
        M: PointDistance<P> + ?Sized,
    {
        let n = a.len();
        let m = b.len();
        let width = m + 1;
        let mut data = vec![f64::INFINITY; (n + 1) * width];
        data[0] = 0.0;

        for i in 1..=n {
            for j in 1..=m {
                let above = data[(i - 1) * width + j];
                let left = data[i * width + j - 1];
                let diag = data[(i - 1) * width + j - 1];
                let cost = metric.distance(&a[i - 1], &b[j - 1]);
                data[i * width + j] = cost + above.min(left).min(diag);
            }
        }

        Self { n, m, data }
    }

    /// Return the length of the first sequence.
    #[must_use]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Return the length of the second sequence.
    #[must_use]
    pub fn m(&self) -> usize {
        self.m
    }

    /// Return the accumulated cost at cell `(i, j)`, boundary included.
    ///
    /// # Panics
    ///
    /// Panics if `i > n` or `j > m`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i <= self.n, "row {i} out of bounds for {} rows", self.n + 1);
        assert!(j <= self.m, "column {j} out of bounds for {} columns", self.m + 1);
        self.data[i * (self.m + 1) + j]
    }

    /// Return the total alignment cost `cost[n][m]`.
    #[must_use]
    pub fn total(&self) -> DtwDistance {
        DtwDistance::new(self.get(self.n, self.m))
    }

    /// Reconstruct the optimal warping path.
    ///
    /// Walks backward from `(n, m)` to `(1, 1)`. At each cell the predecessor
    /// with the smallest accumulated cost is taken: diagonal wins ties, then
    /// "up" (`i - 1`) wins over "left" (`j - 1`). Once either index reaches 1
    /// the walk continues straight along the remaining axis. Steps are
    /// returned in forward order with zero-based sequence indices.
    #[must_use]
    pub fn warping_path(&self) -> WarpingPath {
        let mut steps = Vec::with_capacity(self.n + self.m);
        let mut i = self.n;
        let mut j = self.m;
        steps.push(WarpingStep { a: i - 1, b: j - 1 });

        while i > 1 || j > 1 {
            if i == 1 {
                j -= 1;
            } else if j == 1 {
                i -= 1;
            } else {
                let diag = self.get(i - 1, j - 1);
                let up = self.get(i - 1, j);
                let left = self.get(i, j - 1);
                if diag <= up && diag <= left {
                    i -= 1;
                    j -= 1;
                } else if up <= left {
                    i -= 1;
                } else {
                    j -= 1;
                }
            }
            steps.push(WarpingStep { a: i - 1, b: j - 1 });
        }

        steps.reverse();
        WarpingPath::new(steps)
    }
}
