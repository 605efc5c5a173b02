//! Dynamic time warping alignment over arbitrary point types.
//!
//! Pure math library with zero I/O. Provides the full-matrix DTW recurrence
//! under a pluggable point distance, optimal warping path reconstruction, and
//! z-normalization of numeric sequences.

mod distance;
mod dtw;
mod error;
mod matrix;
mod metric;
mod path;
mod preprocess;

pub use distance::DtwDistance;
pub use dtw::Dtw;
pub use error::{DtwError, PreprocessError};
pub use matrix::CostMatrix;
pub use metric::{Absolute, Euclidean, PointDistance};
pub use path::{WarpingPath, WarpingStep};
pub use preprocess::{mean, z_normalize};
