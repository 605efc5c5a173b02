//! Result types for sampling and dataset generation.

use serde::Serialize;

use crate::pair::{IndexPair, PairOrigin};
use crate::signature::Signer;
use crate::statistics::SignaturePairStatistics;

/// Sampled pairs for both slices of a run, before statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampledDataset {
    /// Signer indices of the training slice, in permutation order.
    pub training_signers: Vec<usize>,
    /// Signer indices of the test slice, disjoint from the training slice.
    pub test_signers: Vec<usize>,
    pub training_pairs: Vec<IndexPair>,
    pub test_pairs: Vec<IndexPair>,
}

/// Per-origin record counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OriginCounts {
    pub genuine: usize,
    pub forged: usize,
    pub random: usize,
}

impl OriginCounts {
    #[must_use]
    pub fn of(records: &[SignaturePairStatistics]) -> Self {
        let mut counts = Self::default();
        for record in records {
            match record.origin {
                PairOrigin::Genuine => counts.genuine += 1,
                PairOrigin::Forged => counts.forged += 1,
                PairOrigin::Random => counts.random += 1,
            }
        }
        counts
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.genuine + self.forged + self.random
    }
}

/// What was exported for one slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SliceSummary {
    pub name: String,
    pub signers: Vec<String>,
    pub pairs: OriginCounts,
}

impl SliceSummary {
    pub(crate) fn new(
        name: &str,
        signer_indices: &[usize],
        signers: &[Signer],
        records: &[SignaturePairStatistics],
    ) -> Self {
        Self {
            name: name.to_string(),
            signers: signer_indices
                .iter()
                .map(|&i| signers[i].id().to_string())
                .collect(),
            pairs: OriginCounts::of(records),
        }
    }
}

/// Outcome of [`DatasetGenerator::generate`](crate::DatasetGenerator::generate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationSummary {
    pub seed: u64,
    pub training: SliceSummary,
    pub test: SliceSummary,
}
