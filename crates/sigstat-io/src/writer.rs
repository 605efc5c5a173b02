//! CSV dataset and text manifest writer.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sigstat_dataset::{
    DatasetExporter, InputDevice, PairOrigin, RunManifest, SignaturePairStatistics,
};
use tracing::{debug, info, instrument};

use crate::error::IoError;

/// Writes `<name>.csv` datasets and `<name>.txt` manifests into one directory.
///
/// Creates the output directory on construction if it does not exist.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    output_dir: PathBuf,
    written: Vec<PathBuf>,
}

impl CsvExporter {
    /// Create an exporter targeting `output_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display()))]
    pub fn new(output_dir: &Path) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            written: Vec::new(),
        })
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Files written so far, in order.
    #[must_use]
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

// Column names and order are read by downstream tooling; do not change.
#[derive(Serialize)]
struct Row<'a> {
    #[serde(rename = "ReferenceSignatureFile")]
    reference_file: &'a str,
    #[serde(rename = "ReferenceSigner")]
    reference_signer: &'a str,
    #[serde(rename = "ReferenceInput")]
    reference_input: InputDevice,
    #[serde(rename = "QuestionedSignatureFile")]
    questioned_file: &'a str,
    #[serde(rename = "QuestionedSigner")]
    questioned_signer: &'a str,
    #[serde(rename = "QuestionedInput")]
    questioned_input: InputDevice,
    #[serde(rename = "Origin")]
    origin: PairOrigin,
    #[serde(rename = "ExpectedPrediction")]
    expected_prediction: u8,
    #[serde(rename = "stdevX1")]
    stdev_x1: f64,
    #[serde(rename = "stdevY1")]
    stdev_y1: f64,
    #[serde(rename = "stdevP1")]
    stdev_p1: f64,
    count1: usize,
    duration1: i64,
    #[serde(rename = "stdevX2")]
    stdev_x2: f64,
    #[serde(rename = "stdevY2")]
    stdev_y2: f64,
    #[serde(rename = "stdevP2")]
    stdev_p2: f64,
    count2: usize,
    duration2: i64,
    #[serde(rename = "diffDTW")]
    diff_dtw: f64,
    #[serde(rename = "diffX")]
    diff_x: f64,
    #[serde(rename = "diffY")]
    diff_y: f64,
    #[serde(rename = "diffP")]
    diff_p: f64,
    #[serde(rename = "diffCount")]
    diff_count: f64,
    #[serde(rename = "diffDuration")]
    diff_duration: f64,
}

impl<'a> From<&'a SignaturePairStatistics> for Row<'a> {
    fn from(s: &'a SignaturePairStatistics) -> Self {
        let (r, q) = (&s.reference_statistics, &s.questioned_statistics);
        Self {
            reference_file: &s.reference.file,
            reference_signer: &s.reference.signer_id,
            reference_input: s.reference.device,
            questioned_file: &s.questioned.file,
            questioned_signer: &s.questioned.signer_id,
            questioned_input: s.questioned.device,
            origin: s.origin,
            expected_prediction: s.expected_label,
            stdev_x1: r.stdev_x,
            stdev_y1: r.stdev_y,
            stdev_p1: r.stdev_pressure,
            count1: r.count,
            duration1: r.duration,
            stdev_x2: q.stdev_x,
            stdev_y2: q.stdev_y,
            stdev_p2: q.stdev_pressure,
            count2: q.count,
            duration2: q.duration,
            diff_dtw: s.dtw_distance,
            diff_x: s.diff_x,
            diff_y: s.diff_y,
            diff_p: s.diff_pressure,
            diff_count: s.diff_count,
            diff_duration: s.diff_duration,
        }
    }
}

impl DatasetExporter for CsvExporter {
    type Error = IoError;

    /// Write the manifest to `<manifest name>.txt`.
    #[instrument(skip_all, fields(name = manifest.name()))]
    fn save_info(&mut self, manifest: &RunManifest) -> Result<(), IoError> {
        let path = self.output_dir.join(format!("{}.txt", manifest.name()));
        fs::write(&path, manifest.to_string()).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;
        info!(path = %path.display(), "manifest written");
        self.written.push(path);
        Ok(())
    }

    /// Write `records` to `<name>.csv`, header first.
    #[instrument(skip_all, fields(name = %name, records = records.len()))]
    fn export(&mut self, name: &str, records: &[SignaturePairStatistics]) -> Result<(), IoError> {
        let path = self.output_dir.join(format!("{name}.csv"));
        let csv_err = |source| IoError::Csv {
            path: path.clone(),
            source,
        };
        let mut writer = csv::Writer::from_path(&path).map_err(csv_err)?;
        if records.is_empty() {
            writer.write_record(HEADERS).map_err(csv_err)?;
        }
        for record in records {
            writer.serialize(Row::from(record)).map_err(csv_err)?;
        }
        writer.flush().map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;
        info!(path = %path.display(), rows = records.len(), "dataset written");
        self.written.push(path);
        Ok(())
    }
}

/// The 24 dataset columns, in file order.
pub const HEADERS: [&str; 24] = [
    "ReferenceSignatureFile",
    "ReferenceSigner",
    "ReferenceInput",
    "QuestionedSignatureFile",
    "QuestionedSigner",
    "QuestionedInput",
    "Origin",
    "ExpectedPrediction",
    "stdevX1",
    "stdevY1",
    "stdevP1",
    "count1",
    "duration1",
    "stdevX2",
    "stdevY2",
    "stdevP2",
    "count2",
    "duration2",
    "diffDTW",
    "diffX",
    "diffY",
    "diffP",
    "diffCount",
    "diffDuration",
];
