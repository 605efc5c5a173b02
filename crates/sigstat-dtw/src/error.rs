//! Error types for DTW alignment and sequence preprocessing.

/// Errors from DTW alignment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DtwError {
    /// Returned when either input sequence has no samples. Alignment of an
    /// empty sequence is undefined.
    #[error("cannot align an empty sequence (lengths {len_a} and {len_b})")]
    EmptySeries {
        /// Length of the first sequence.
        len_a: usize,
        /// Length of the second sequence.
        len_b: usize,
    },
}

/// Errors from sequence preprocessing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PreprocessError {
    /// Returned when an empty slice is normalized.
    #[error("cannot normalize an empty sequence")]
    EmptySeries,

    /// Returned when every value is identical, so the variance is zero.
    #[error("cannot z-normalize a constant sequence ({n} samples of {value})")]
    ConstantSeries {
        /// Number of samples.
        n: usize,
        /// The repeated value.
        value: f64,
    },
}
