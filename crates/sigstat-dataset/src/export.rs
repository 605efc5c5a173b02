//! Where generated datasets go: the [`DatasetExporter`] seam and an
//! in-memory implementation for tests and embedding.

use std::error::Error as StdError;

use crate::config::RunManifest;
use crate::statistics::SignaturePairStatistics;

/// Persistence seam for generated datasets.
///
/// [`DatasetGenerator::generate`](crate::DatasetGenerator::generate) calls
/// [`save_info`](Self::save_info) once before computing any statistics, then
/// [`export`](Self::export) once per slice.
pub trait DatasetExporter {
    /// Error raised by the backing store.
    type Error: StdError + Send + Sync + 'static;

    /// Persist the run manifest.
    ///
    /// # Errors
    ///
    /// Implementation-defined.
    fn save_info(&mut self, manifest: &RunManifest) -> Result<(), Self::Error>;

    /// Persist the records of the slice called `name`, in order.
    ///
    /// # Errors
    ///
    /// Implementation-defined.
    fn export(&mut self, name: &str, records: &[SignaturePairStatistics]) -> Result<(), Self::Error>;
}

/// Keeps everything in memory. Useful for tests and for callers that
/// serialize the records themselves.
#[derive(Debug, Clone, Default)]
pub struct MemoryExporter {
    /// Manifests in the order they were saved.
    pub manifests: Vec<RunManifest>,
    /// `(name, records)` in the order they were exported.
    pub datasets: Vec<(String, Vec<SignaturePairStatistics>)>,
}

impl MemoryExporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records exported under `name`, if any.
    #[must_use]
    pub fn dataset(&self, name: &str) -> Option<&[SignaturePairStatistics]> {
        self.datasets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, records)| records.as_slice())
    }
}

impl DatasetExporter for MemoryExporter {
    type Error = std::convert::Infallible;

    fn save_info(&mut self, manifest: &RunManifest) -> Result<(), Self::Error> {
        self.manifests.push(manifest.clone());
        Ok(())
    }

    fn export(&mut self, name: &str, records: &[SignaturePairStatistics]) -> Result<(), Self::Error> {
        self.datasets.push((name.to_string(), records.to_vec()));
        Ok(())
    }
}
