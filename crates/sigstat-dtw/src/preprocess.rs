//! Sequence preprocessing: z-normalization.

use crate::error::PreprocessError;

/// Arithmetic mean of `values`. NaN for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Z-normalize a sequence to zero mean and unit variance.
///
/// Uses population standard deviation (divides by n, not n-1).
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`PreprocessError::EmptySeries`] | `values` is empty |
/// | [`PreprocessError::ConstantSeries`] | All values are identical (zero variance) |
#[must_use = "returns a new normalized sequence; the input is unchanged"]
pub fn z_normalize(values: &[f64]) -> Result<Vec<f64>, PreprocessError> {
    let Some(&first) = values.first() else {
        return Err(PreprocessError::EmptySeries);
    };
    let n = values.len() as f64;
    // Shifting by the first value keeps constant input exactly constant.
    let mean = first + values.iter().map(|&x| x - first).sum::<f64>() / n;
    let variance = values.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();

    if std == 0.0 {
        return Err(PreprocessError::ConstantSeries {
            n: values.len(),
            value: first,
        });
    }

    Ok(values.iter().map(|&x| (x - mean) / std).collect())
}
