//! Dataset assembly: signer split, pair sampling, statistics and export.

use std::collections::{BTreeSet, HashMap};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{info, instrument, warn};

use crate::config::RunManifest;
use crate::error::DatasetError;
use crate::export::DatasetExporter;
use crate::pair::{IndexPair, SignatureRef};
use crate::progress::{Progress, ProgressTracker};
use crate::result::{GenerationSummary, SampledDataset, SliceSummary};
use crate::sampler::PairSampler;
use crate::signature::Signer;
use crate::statistics::{PreparedSignature, SignaturePairStatistics, StatisticsEngine};

/// Builds training and test datasets from a loaded signer list.
#[derive(Debug, Clone)]
pub struct DatasetGenerator<'a> {
    signers: &'a [Signer],
    engine: StatisticsEngine,
}

impl<'a> DatasetGenerator<'a> {
    #[must_use]
    pub fn new(signers: &'a [Signer]) -> Self {
        Self {
            signers,
            engine: StatisticsEngine::default(),
        }
    }

    /// Replace the default statistics engine.
    #[must_use]
    pub fn with_engine(mut self, engine: StatisticsEngine) -> Self {
        self.engine = engine;
        self
    }

    #[must_use]
    pub fn signers(&self) -> &'a [Signer] {
        self.signers
    }

    /// Split signers and sample pairs for both slices of `manifest`.
    ///
    /// One generator seeded from the manifest drives the signer permutation
    /// and then every draw, training slice first. Slices are truncated with a
    /// warning when too few signers pass the filter.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DatasetError::SignerOutOfRange`] | never for a consistent signer list |
    #[instrument(skip_all, fields(run = manifest.name(), seed = manifest.seed()))]
    pub fn sample(&self, manifest: &RunManifest) -> Result<SampledDataset, DatasetError> {
        let mut rng = ChaCha8Rng::seed_from_u64(manifest.seed());
        let sampler = PairSampler::new(self.signers, manifest.filter());
        let order = sampler.permute_signers(&mut rng);

        let wanted_training = manifest.training().signer_count();
        let wanted_test = manifest.test().signer_count();
        if wanted_training + wanted_test > order.len() {
            warn!(
                available = order.len(),
                training = wanted_training,
                test = wanted_test,
                "fewer signers pass the filter than requested, truncating"
            );
        }
        let training_end = wanted_training.min(order.len());
        let test_end = (training_end + wanted_test).min(order.len());
        let training_signers = order[..training_end].to_vec();
        let test_signers = order[training_end..test_end].to_vec();

        let mut training_pairs = Vec::new();
        for &signer in &training_signers {
            training_pairs.extend(sampler.sample(signer, manifest.training(), &mut rng)?);
        }
        let mut test_pairs = Vec::new();
        for &signer in &test_signers {
            test_pairs.extend(sampler.sample(signer, manifest.test(), &mut rng)?);
        }

        info!(
            training_signers = training_signers.len(),
            training_pairs = training_pairs.len(),
            test_signers = test_signers.len(),
            test_pairs = test_pairs.len(),
            "sampled pairs"
        );
        Ok(SampledDataset {
            training_signers,
            test_signers,
            training_pairs,
            test_pairs,
        })
    }

    /// Compute statistics for `pairs`, preserving their order.
    ///
    /// `progress` is called after each pair, possibly from worker threads.
    ///
    /// # Errors
    ///
    /// The first error from resolving a pair or from the
    /// [`StatisticsEngine`]; see [`DatasetError`].
    pub fn compute(
        &self,
        pairs: &[IndexPair],
        progress: &(dyn Fn(Progress) + Sync),
    ) -> Result<Vec<SignaturePairStatistics>, DatasetError> {
        let tracker = ProgressTracker::new(pairs.len(), progress);
        self.compute_tracked(pairs, &tracker)
    }

    fn compute_tracked(
        &self,
        pairs: &[IndexPair],
        tracker: &ProgressTracker<'_>,
    ) -> Result<Vec<SignaturePairStatistics>, DatasetError> {
        let resolved = pairs
            .iter()
            .map(|pair| pair.resolve(self.signers))
            .collect::<Result<Vec<_>, _>>()?;

        // Each signature is normalized once however many pairs it appears in.
        let unique: BTreeSet<SignatureRef> = pairs
            .iter()
            .flat_map(|p| [p.reference, p.questioned])
            .collect();
        let prepared: HashMap<SignatureRef, PreparedSignature> = unique
            .into_par_iter()
            .map(|r| -> Result<_, DatasetError> {
                let signature = r.resolve(self.signers)?;
                Ok((r, self.engine.prepare(signature)?))
            })
            .collect::<Result<_, _>>()?;

        pairs
            .par_iter()
            .zip(resolved.par_iter())
            .map(|(index, pair)| -> Result<_, DatasetError> {
                let record = self.engine.compare(
                    pair,
                    &prepared[&index.reference],
                    &prepared[&index.questioned],
                )?;
                tracker.tick();
                Ok(record)
            })
            .collect()
    }

    /// Run a full generation: save the manifest, sample, compute and export.
    ///
    /// The manifest is handed to the exporter before any statistics are
    /// computed, so it survives a failed run.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DatasetError::Export`] | the exporter failed |
    /// | others | see [`sample`](Self::sample) and [`compute`](Self::compute) |
    pub fn generate<E: DatasetExporter>(
        &self,
        manifest: &RunManifest,
        exporter: &mut E,
        progress: &(dyn Fn(Progress) + Sync),
    ) -> Result<GenerationSummary, DatasetError> {
        exporter.save_info(manifest).map_err(DatasetError::export)?;
        self.generate_slices(manifest, exporter, progress)
    }

    /// Sample, compute and export both slices without saving the manifest.
    ///
    /// For callers that saved the manifest themselves, e.g. before loading
    /// the signers this generator borrows.
    ///
    /// # Errors
    ///
    /// As [`generate`](Self::generate).
    #[instrument(skip_all, fields(run = manifest.name()))]
    pub fn generate_slices<E: DatasetExporter>(
        &self,
        manifest: &RunManifest,
        exporter: &mut E,
        progress: &(dyn Fn(Progress) + Sync),
    ) -> Result<GenerationSummary, DatasetError> {
        let sampled = self.sample(manifest)?;
        let tracker = ProgressTracker::new(
            sampled.training_pairs.len() + sampled.test_pairs.len(),
            progress,
        );

        let training = self.compute_tracked(&sampled.training_pairs, &tracker)?;
        exporter
            .export(manifest.training().name(), &training)
            .map_err(DatasetError::export)?;
        info!(name = manifest.training().name(), records = training.len(), "exported slice");

        let test = self.compute_tracked(&sampled.test_pairs, &tracker)?;
        exporter
            .export(manifest.test().name(), &test)
            .map_err(DatasetError::export)?;
        info!(name = manifest.test().name(), records = test.len(), "exported slice");

        Ok(GenerationSummary {
            seed: manifest.seed(),
            training: SliceSummary::new(
                manifest.training().name(),
                &sampled.training_signers,
                self.signers,
                &training,
            ),
            test: SliceSummary::new(
                manifest.test().name(),
                &sampled.test_signers,
                self.signers,
                &test,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::config::DatasetParameters;
    use crate::export::MemoryExporter;
    use crate::pair::PairOrigin;
    use crate::signature::fixtures;

    fn signers(n: usize) -> Vec<Signer> {
        (0..n)
            .map(|i| fixtures::signer(&format!("u{i:04}"), 4, 2))
            .collect()
    }

    fn manifest(training: usize, test: usize) -> RunManifest {
        let params = |name: &str, n| {
            DatasetParameters::new(name)
                .unwrap()
                .with_signer_count(n)
                .with_genuine_pairs(2)
                .with_skilled_forgery_pairs(1)
                .with_random_forgery_pairs(3)
        };
        RunManifest::new("run", params("train", training), params("test", test))
            .unwrap()
            .with_seed(5)
    }

    fn no_progress(_: Progress) {}

    #[test]
    fn slices_are_disjoint() {
        let signers = signers(6);
        let sampled = DatasetGenerator::new(&signers).sample(&manifest(3, 2)).unwrap();
        assert_eq!(sampled.training_signers.len(), 3);
        assert_eq!(sampled.test_signers.len(), 2);
        assert!(sampled
            .test_signers
            .iter()
            .all(|s| !sampled.training_signers.contains(s)));
        assert_eq!(sampled.training_pairs.len(), 3 * 6);
        assert_eq!(sampled.test_pairs.len(), 2 * 6);
    }

    #[test]
    fn too_few_signers_truncates() {
        let signers = signers(4);
        let sampled = DatasetGenerator::new(&signers).sample(&manifest(3, 3)).unwrap();
        assert_eq!(sampled.training_signers.len(), 3);
        assert_eq!(sampled.test_signers.len(), 1);
    }

    #[test]
    fn compute_preserves_order_and_reports_progress() {
        let signers = signers(3);
        let generator = DatasetGenerator::new(&signers);
        let sampled = generator.sample(&manifest(2, 1)).unwrap();
        let ticks = AtomicUsize::new(0);
        let records = generator
            .compute(&sampled.training_pairs, &|_| {
                ticks.fetch_add(1, Ordering::Relaxed);
            })
            .unwrap();
        assert_eq!(records.len(), sampled.training_pairs.len());
        assert_eq!(ticks.load(Ordering::Relaxed), records.len());
        for (pair, record) in sampled.training_pairs.iter().zip(&records) {
            let reference = pair.reference.resolve(&signers).unwrap();
            let questioned = pair.questioned.resolve(&signers).unwrap();
            assert_eq!(record.reference.file, reference.file());
            assert_eq!(record.questioned.file, questioned.file());
        }
    }

    #[test]
    fn generate_exports_both_slices() {
        let signers = signers(5);
        let mut exporter = MemoryExporter::new();
        let summary = DatasetGenerator::new(&signers)
            .generate(&manifest(3, 2), &mut exporter, &no_progress)
            .unwrap();

        assert_eq!(exporter.manifests.len(), 1);
        let train = exporter.dataset("train").unwrap();
        let test = exporter.dataset("test").unwrap();
        assert_eq!(train.len(), 18);
        assert_eq!(test.len(), 12);
        assert_eq!(summary.training.pairs.genuine, 6);
        assert_eq!(summary.training.pairs.forged, 3);
        assert_eq!(summary.training.pairs.random, 9);
        assert!(train
            .iter()
            .filter(|r| r.origin == PairOrigin::Genuine)
            .all(|r| r.expected_label == 1));
    }

    #[test]
    fn generate_slices_leaves_manifest_to_caller() {
        let signers = signers(4);
        let mut exporter = MemoryExporter::new();
        DatasetGenerator::new(&signers)
            .generate_slices(&manifest(2, 1), &mut exporter, &no_progress)
            .unwrap();
        assert!(exporter.manifests.is_empty());
        assert_eq!(exporter.datasets.len(), 2);
    }

    #[test]
    fn generate_is_deterministic() {
        let signers = signers(5);
        let run = || {
            let mut exporter = MemoryExporter::new();
            DatasetGenerator::new(&signers)
                .generate(&manifest(2, 2), &mut exporter, &no_progress)
                .unwrap();
            exporter.datasets
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn invalid_pair_fails_compute() {
        let signers = signers(1);
        let pairs = [IndexPair::new(SignatureRef::new(0, 0), SignatureRef::new(2, 0))];
        let err = DatasetGenerator::new(&signers)
            .compute(&pairs, &no_progress)
            .unwrap_err();
        assert!(matches!(err, DatasetError::SignerOutOfRange { index: 2, .. }));
    }
}
