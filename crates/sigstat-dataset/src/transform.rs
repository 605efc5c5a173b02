//! Feature-to-feature transforms applied before computing statistics.
//!
//! A [`Pipeline`] is plain data: an ordered list of [`Transform`] steps, each
//! reading one named feature and writing another (possibly the same name).
//! Pipelines run on a copy of a signature's [`FeatureStore`]; the loaded
//! signature is never modified.

use crate::error::FeatureError;
use crate::feature::{FeatureStore, names};
use crate::statistics::sample_std_dev;

/// Divisor used by [`Transform::Scale`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalingMode {
    /// Divide by the range of the translated values (1 if the range is 0).
    UnitRange,
    /// Divide by the sample standard deviation of the translated values.
    StandardDeviation,
}

/// Offset removed before scaling and restored afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleAnchor {
    /// The minimum value of the sequence.
    Min,
    /// Zero: values are scaled in place without translation.
    Zero,
}

/// One pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transform {
    /// Copy an integer feature into a float feature.
    IntToDouble { input: String, output: String },
    /// Translate by the anchor, divide per `mode`, translate back.
    Scale {
        input: String,
        output: String,
        mode: ScalingMode,
        anchor: ScaleAnchor,
    },
}

impl Transform {
    #[must_use]
    pub fn int_to_double(input: &str, output: &str) -> Self {
        Self::IntToDouble {
            input: input.to_string(),
            output: output.to_string(),
        }
    }

    /// A scaling step. The standard [`names::PRESSURE`] feature is anchored at
    /// zero; every other input is anchored at its minimum.
    #[must_use]
    pub fn scale(input: &str, output: &str, mode: ScalingMode) -> Self {
        let anchor = if input == names::PRESSURE {
            ScaleAnchor::Zero
        } else {
            ScaleAnchor::Min
        };
        Self::Scale {
            input: input.to_string(),
            output: output.to_string(),
            mode,
            anchor,
        }
    }

    /// Run the step against `store`, overwriting the output feature.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`FeatureError::Missing`] | the input feature is absent |
    /// | [`FeatureError::TypeMismatch`] | the input feature has the wrong element type |
    pub fn apply(&self, store: &mut FeatureStore) -> Result<(), FeatureError> {
        match self {
            Self::IntToDouble { input, output } => {
                let values = store.ints(input)?.iter().map(|&v| v as f64).collect();
                store.set_floats(output.as_str(), values)
            }
            Self::Scale {
                input,
                output,
                mode,
                anchor,
            } => {
                let values = scale(store.floats(input)?, *mode, *anchor);
                store.set_floats(output.as_str(), values)
            }
        }
    }
}

fn scale(values: &[f64], mode: ScalingMode, anchor: ScaleAnchor) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let offset = match anchor {
        ScaleAnchor::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
        ScaleAnchor::Zero => 0.0,
    };
    let translated: Vec<f64> = values.iter().map(|v| v - offset).collect();
    let divisor = match mode {
        ScalingMode::UnitRange => {
            let range = translated.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            if range == 0.0 { 1.0 } else { range }
        }
        ScalingMode::StandardDeviation => sample_std_dev(&translated),
    };
    translated.iter().map(|v| v / divisor + offset).collect()
}

/// An ordered list of transforms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    steps: Vec<Transform>,
}

impl Pipeline {
    #[must_use]
    pub fn new(steps: Vec<Transform>) -> Self {
        Self { steps }
    }

    /// Raw coordinates to floats, then unit-range scaling of X, Y and the raw
    /// pressure into `Pressure`.
    #[must_use]
    pub fn statistics_default() -> Self {
        Self::new(vec![
            Transform::int_to_double(names::RAW_X, names::X),
            Transform::int_to_double(names::RAW_Y, names::Y),
            Transform::scale(names::X, names::X, ScalingMode::UnitRange),
            Transform::scale(names::Y, names::Y, ScalingMode::UnitRange),
            Transform::scale(names::RAW_PRESSURE, names::PRESSURE, ScalingMode::UnitRange),
        ])
    }

    #[must_use]
    pub fn steps(&self) -> &[Transform] {
        &self.steps
    }

    /// Run every step, in order, on a copy of `store`.
    ///
    /// # Errors
    ///
    /// The first [`FeatureError`] raised by a step.
    pub fn apply(&self, store: &FeatureStore) -> Result<FeatureStore, FeatureError> {
        let mut out = store.clone();
        for step in &self.steps {
            step.apply(&mut out)?;
        }
        Ok(out)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::statistics_default()
    }
}
