//! Per-signature and per-pair statistics.
//!
//! Per signature: sample standard deviation of the normalized X, Y and
//! pressure, plus sample count and duration from the raw timestamps.
//! Per pair: both signatures' statistics, the DTW distance between their
//! z-normalized (X, Y) trajectories and the relative differences of the
//! per-signature values.
//!
//! Zero denominators are not guarded: relative differences propagate
//! `NaN` and infinities so degenerate signatures stay visible downstream.

use serde::Serialize;
use sigstat_dtw::{Dtw, Euclidean, PreprocessError, z_normalize};
use tracing::instrument;

use crate::error::DatasetError;
use crate::feature::names;
use crate::meta::InputDevice;
use crate::pair::{PairOrigin, SignaturePair};
use crate::signature::Signature;
use crate::transform::Pipeline;

/// Sample standard deviation (n - 1 denominator).
///
/// A single value yields `NaN` (0 / 0); identical values yield exactly 0.
#[must_use]
pub fn sample_std_dev(values: &[f64]) -> f64 {
    let Some(&first) = values.first() else {
        return f64::NAN;
    };
    let n = values.len() as f64;
    let shifted_mean = values.iter().map(|&v| v - first).sum::<f64>() / n;
    let sum_sq: f64 = values
        .iter()
        .map(|&v| (v - first - shifted_mean).powi(2))
        .sum();
    (sum_sq / (n - 1.0)).sqrt()
}

/// `|a - b| / a`.
#[must_use]
pub fn relative_difference(a: f64, b: f64) -> f64 {
    (a - b).abs() / a
}

/// `|b / a - 1|`.
#[must_use]
pub fn ratio_deviation(a: f64, b: f64) -> f64 {
    (b / a - 1.0).abs()
}

/// Scalar summary of one signature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignatureStatistics {
    pub stdev_x: f64,
    pub stdev_y: f64,
    pub stdev_pressure: f64,
    /// Number of samples.
    pub count: usize,
    /// Last raw timestamp minus the first.
    pub duration: i64,
}

/// Identifying columns of a signature in an exported record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureInfo {
    pub file: String,
    pub signer_id: String,
    pub device: InputDevice,
}

impl SignatureInfo {
    fn of(signature: &Signature) -> Self {
        Self {
            file: signature.file().to_string(),
            signer_id: signature.signer_id().to_string(),
            device: signature.device(),
        }
    }
}

/// Comparison record for one sampled pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignaturePairStatistics {
    pub reference: SignatureInfo,
    pub questioned: SignatureInfo,
    pub origin: PairOrigin,
    pub expected_label: u8,
    pub reference_statistics: SignatureStatistics,
    pub questioned_statistics: SignatureStatistics,
    /// DTW cost between the z-normalized (X, Y) trajectories.
    pub dtw_distance: f64,
    pub diff_x: f64,
    pub diff_y: f64,
    pub diff_pressure: f64,
    pub diff_count: f64,
    pub diff_duration: f64,
}

/// Statistics of one signature plus the trajectory used for alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSignature {
    pub statistics: SignatureStatistics,
    /// Z-normalized (X, Y) samples.
    pub trajectory: Vec<[f64; 2]>,
}

/// Z-normalize, falling back to mean-centring (all zeros) for constant input.
fn standardize(values: &[f64]) -> Result<Vec<f64>, PreprocessError> {
    match z_normalize(values) {
        Err(PreprocessError::ConstantSeries { n, .. }) => Ok(vec![0.0; n]),
        other => other,
    }
}

/// Computes signature and pair statistics with a fixed normalization pipeline.
#[derive(Debug, Clone)]
pub struct StatisticsEngine {
    pipeline: Pipeline,
    dtw: Dtw<Euclidean>,
}

impl Default for StatisticsEngine {
    fn default() -> Self {
        Self::new(Pipeline::statistics_default())
    }
}

impl StatisticsEngine {
    #[must_use]
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            dtw: Dtw::new(Euclidean),
        }
    }

    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Statistics and z-normalized trajectory of `signature`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DatasetError::Feature`] | a feature the pipeline or statistics need is missing or mistyped |
    /// | [`DatasetError::Preprocess`] | the signature has no samples |
    #[instrument(level = "debug", skip_all, fields(signature = signature.id()))]
    pub fn prepare(&self, signature: &Signature) -> Result<PreparedSignature, DatasetError> {
        let feature_err = |source| DatasetError::Feature {
            signature_id: signature.id().to_string(),
            source,
        };
        let store = self.pipeline.apply(signature.features()).map_err(feature_err)?;
        let xs = store.floats(names::X).map_err(feature_err)?;
        let ys = store.floats(names::Y).map_err(feature_err)?;
        let ps = store.floats(names::PRESSURE).map_err(feature_err)?;
        let ts = store.ints(names::RAW_T).map_err(feature_err)?;

        let duration = match (ts.first(), ts.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0,
        };
        let statistics = SignatureStatistics {
            stdev_x: sample_std_dev(xs),
            stdev_y: sample_std_dev(ys),
            stdev_pressure: sample_std_dev(ps),
            count: ts.len(),
            duration,
        };

        let preprocess_err = |source| DatasetError::Preprocess {
            signature_id: signature.id().to_string(),
            source,
        };
        let zx = standardize(xs).map_err(preprocess_err)?;
        let zy = standardize(ys).map_err(preprocess_err)?;
        let trajectory = zx.into_iter().zip(zy).map(|(x, y)| [x, y]).collect();

        Ok(PreparedSignature {
            statistics,
            trajectory,
        })
    }

    /// Statistics of one signature.
    ///
    /// # Errors
    ///
    /// Same as [`prepare`](Self::prepare).
    pub fn signature_statistics(
        &self,
        signature: &Signature,
    ) -> Result<SignatureStatistics, DatasetError> {
        Ok(self.prepare(signature)?.statistics)
    }

    /// Combine two prepared signatures into a pair record.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DatasetError::Dtw`] | either trajectory is empty |
    pub fn compare(
        &self,
        pair: &SignaturePair<'_>,
        reference: &PreparedSignature,
        questioned: &PreparedSignature,
    ) -> Result<SignaturePairStatistics, DatasetError> {
        let distance = self
            .dtw
            .distance(&reference.trajectory, &questioned.trajectory)
            .map_err(|source| DatasetError::Dtw {
                reference: pair.reference().id().to_string(),
                questioned: pair.questioned().id().to_string(),
                source,
            })?;

        let r = &reference.statistics;
        let q = &questioned.statistics;
        Ok(SignaturePairStatistics {
            reference: SignatureInfo::of(pair.reference()),
            questioned: SignatureInfo::of(pair.questioned()),
            origin: pair.origin(),
            expected_label: pair.expected_label(),
            reference_statistics: *r,
            questioned_statistics: *q,
            dtw_distance: distance.value(),
            diff_x: relative_difference(r.stdev_x, q.stdev_x),
            diff_y: relative_difference(r.stdev_y, q.stdev_y),
            diff_pressure: relative_difference(r.stdev_pressure, q.stdev_pressure),
            diff_count: ratio_deviation(r.count as f64, q.count as f64),
            diff_duration: ratio_deviation(r.duration as f64, q.duration as f64),
        })
    }

    /// Prepare both members of `pair` and compare them.
    ///
    /// # Errors
    ///
    /// Errors from [`prepare`](Self::prepare) and [`compare`](Self::compare).
    pub fn pair_statistics(
        &self,
        pair: &SignaturePair<'_>,
    ) -> Result<SignaturePairStatistics, DatasetError> {
        let reference = self.prepare(pair.reference())?;
        let questioned = self.prepare(pair.questioned())?;
        self.compare(pair, &reference, &questioned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::FeatureStore;
    use crate::meta::Origin;
    use crate::signature::{Signature, fixtures};

    fn from_points(signer: &str, id: &str, origin: Origin, points: &[(i64, i64)]) -> Signature {
        let n = points.len();
        let mut features = FeatureStore::new();
        features
            .set_ints(names::RAW_X, points.iter().map(|p| p.0).collect())
            .unwrap();
        features
            .set_ints(names::RAW_Y, points.iter().map(|p| p.1).collect())
            .unwrap();
        features
            .set_ints(names::RAW_T, (0..n as i64).map(|i| i * 10).collect())
            .unwrap();
        features
            .set_floats(names::RAW_PRESSURE, vec![0.5; n])
            .unwrap();
        let meta = fixtures::signature(signer, id, origin, 1).meta().clone();
        Signature::new(meta, features)
    }

    #[test]
    fn sample_std_dev_uses_n_minus_one() {
        assert_eq!(sample_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), (32.0f64 / 7.0).sqrt());
    }

    #[test]
    fn sample_std_dev_of_identical_values_is_zero() {
        assert_eq!(sample_std_dev(&[0.1, 0.1, 0.1]), 0.0);
        assert_eq!(sample_std_dev(&[7.0, 7.0]), 0.0);
    }

    #[test]
    fn sample_std_dev_of_one_value_is_nan() {
        assert!(sample_std_dev(&[3.0]).is_nan());
        assert!(sample_std_dev(&[]).is_nan());
    }

    #[test]
    fn relative_differences_propagate_non_finite() {
        assert_eq!(relative_difference(2.0, 1.0), 0.5);
        assert_eq!(ratio_deviation(4.0, 6.0), 0.5);
        assert!(relative_difference(0.0, 0.0).is_nan());
        assert_eq!(relative_difference(0.0, 1.0), f64::INFINITY);
        assert_eq!(ratio_deviation(0.0, 3.0), f64::INFINITY);
    }

    #[test]
    fn identical_trajectories_align_at_zero() {
        let a = from_points("u1", "a", Origin::Genuine, &[(0, 0), (1, 1), (2, 2)]);
        let b = from_points("u1", "b", Origin::Genuine, &[(0, 0), (1, 1), (2, 2)]);
        let pair = SignaturePair::new(&a, &b).unwrap();
        let stats = StatisticsEngine::default().pair_statistics(&pair).unwrap();
        assert!(stats.dtw_distance.abs() < 1e-12);
        assert_eq!(stats.origin, PairOrigin::Genuine);
        assert_eq!(stats.expected_label, 1);
        assert_eq!(stats.diff_count, 0.0);
        assert_eq!(stats.diff_duration, 0.0);
        assert_eq!(stats.diff_x, 0.0);
    }

    #[test]
    fn signature_statistics_from_normalized_features() {
        let sig = from_points("u1", "a", Origin::Genuine, &[(0, 10), (5, 10), (10, 10)]);
        let stats = StatisticsEngine::default().signature_statistics(&sig).unwrap();
        // X scales to [0, 0.5, 1]
        assert!((stats.stdev_x - 0.5).abs() < 1e-12);
        assert_eq!(stats.stdev_y, 0.0);
        assert_eq!(stats.stdev_pressure, 0.0);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.duration, 20);
    }

    #[test]
    fn constant_coordinate_is_mean_centred() {
        let sig = from_points("u1", "a", Origin::Genuine, &[(0, 4), (1, 4), (2, 4)]);
        let prepared = StatisticsEngine::default().prepare(&sig).unwrap();
        assert!(prepared.trajectory.iter().all(|p| p[1] == 0.0));
        assert!(prepared.trajectory[0][0] < 0.0);
    }

    #[test]
    fn single_sample_signature_has_nan_spread() {
        let sig = from_points("u1", "a", Origin::Genuine, &[(3, 3)]);
        let stats = StatisticsEngine::default().signature_statistics(&sig).unwrap();
        assert!(stats.stdev_x.is_nan());
        assert_eq!(stats.count, 1);
        assert_eq!(stats.duration, 0);
    }

    #[test]
    fn forged_pair_is_labelled_zero() {
        let a = fixtures::signature("u1", "u1_g_1", Origin::Genuine, 10);
        let f = fixtures::signature("u1", "u1_s_1", Origin::Forged, 12);
        let pair = SignaturePair::new(&a, &f).unwrap();
        let stats = StatisticsEngine::default().pair_statistics(&pair).unwrap();
        assert_eq!(stats.origin, PairOrigin::Forged);
        assert_eq!(stats.expected_label, 0);
        assert!(stats.dtw_distance >= 0.0);
        assert!((stats.diff_count - 0.2).abs() < 1e-12);
    }

    #[test]
    fn missing_raw_feature_names_the_signature() {
        let meta = fixtures::signature("u1", "broken", Origin::Genuine, 1).meta().clone();
        let sig = Signature::new(meta, FeatureStore::new());
        let err = StatisticsEngine::default().prepare(&sig).unwrap_err();
        assert!(matches!(err, DatasetError::Feature { ref signature_id, .. } if signature_id == "broken"));
    }
}
