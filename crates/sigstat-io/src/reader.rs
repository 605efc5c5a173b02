//! Raw signature file parsing and anomaly repair.
//!
//! A file holds one header line followed by one whitespace-separated sample
//! per line: `X Y T ...` with pressure in a database-specific column.

use std::fs;
use std::path::Path;

use sigstat_dataset::{
    FeatureError, FeatureStore, InputDevice, PenState, Signature, SignatureMeta, names,
};
use tracing::{debug, instrument, warn};

use crate::error::IoError;
use crate::table::DatabaseTable;

/// Reader settings.
///
/// # Defaults
///
/// | Parameter           | Default |
/// |---------------------|---------|
/// | `standard_features` | true    |
/// | `timestamp_step`    | 10      |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    pub(crate) standard_features: bool,
    pub(crate) timestamp_step: i64,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            standard_features: true,
            timestamp_step: 10,
        }
    }
}

impl ReaderOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Also store float `X`, `Y`, `T`, `Pressure` and `PenState` features.
    #[must_use]
    pub fn with_standard_features(mut self, enabled: bool) -> Self {
        self.standard_features = enabled;
        self
    }

    /// Step used when synthesizing timestamps for files whose timestamps are all zero.
    #[must_use]
    pub fn with_timestamp_step(mut self, step: i64) -> Self {
        self.timestamp_step = step;
        self
    }
}

/// Repairs applied while parsing one signature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Every timestamp was zero and a uniform sequence was substituted.
    pub timestamps_synthesized: bool,
    /// Samples dropped for repeating the previous sample's timestamp.
    pub duplicates_dropped: usize,
    /// Zero-pressure samples trimmed from the start.
    pub leading_trimmed: usize,
    /// Zero-pressure samples trimmed from the end.
    pub trailing_trimmed: usize,
    /// Device inferred from pressure when the path did not give one.
    pub inferred_device: Option<InputDevice>,
}

impl RepairReport {
    /// Whether any repair was applied.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Sample {
    x: i64,
    y: i64,
    t: i64,
    pressure: f64,
}

fn parse_line(
    line: &str,
    pressure_column: usize,
    file: &str,
    line_no: usize,
) -> Result<Sample, IoError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let malformed = |reason: String| IoError::MalformedLine {
        file: file.to_string(),
        line: line_no,
        reason,
    };
    let field = |index: usize, what: &str| {
        fields
            .get(index)
            .copied()
            .ok_or_else(|| malformed(format!("missing {what} column {index}")))
    };
    let int = |index: usize, what: &str| -> Result<i64, IoError> {
        let raw = field(index, what)?;
        raw.parse()
            .map_err(|_| malformed(format!("{what} \"{raw}\" is not an integer")))
    };
    let raw_pressure = field(pressure_column, "pressure")?;
    let pressure = raw_pressure
        .parse()
        .map_err(|_| malformed(format!("pressure \"{raw_pressure}\" is not a number")))?;
    Ok(Sample {
        x: int(0, "x")?,
        y: int(1, "y")?,
        t: int(2, "timestamp")?,
        pressure,
    })
}

/// Parses and repairs signature files.
#[derive(Debug, Clone, Default)]
pub struct SignatureReader {
    table: DatabaseTable,
    options: ReaderOptions,
}

impl SignatureReader {
    #[must_use]
    pub fn new(table: DatabaseTable, options: ReaderOptions) -> Self {
        Self { table, options }
    }

    #[must_use]
    pub fn table(&self) -> &DatabaseTable {
        &self.table
    }

    #[must_use]
    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Read and parse the file at `path`.
    ///
    /// # Errors
    ///
    /// [`IoError::FileNotFound`] if the file cannot be read, otherwise as
    /// [`parse`](Self::parse).
    pub fn read(
        &self,
        path: &Path,
        meta: SignatureMeta,
    ) -> Result<(Signature, RepairReport), IoError> {
        let content = fs::read_to_string(path).map_err(|e| IoError::FileNotFound {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.parse(meta, &content)
    }

    /// Parse file `content` into a signature tagged with `meta`.
    ///
    /// Repairs, in order: synthesize timestamps if all are zero, drop samples
    /// repeating the previous timestamp, infer an unknown device from
    /// pressure, trim leading and trailing zero-pressure samples of stylus
    /// signatures. Synthesized timestamps are logged as a warning.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::UnsupportedDatabase`] | no pressure column for `meta.database` |
    /// | [`IoError::MalformedLine`] | a sample line is short or not numeric |
    /// | [`IoError::DataIntegrity`] | no samples remain after repair |
    #[instrument(level = "debug", skip_all, fields(signature = %meta.id))]
    pub fn parse(
        &self,
        mut meta: SignatureMeta,
        content: &str,
    ) -> Result<(Signature, RepairReport), IoError> {
        let pressure_column = self.table.pressure_column(meta.database)?;
        let mut samples = content
            .lines()
            .enumerate()
            .skip(1)
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| parse_line(line, pressure_column, &meta.file, i + 1))
            .collect::<Result<Vec<_>, _>>()?;

        let mut report = RepairReport::default();

        if !samples.is_empty() && samples.iter().all(|s| s.t == 0) {
            warn!(
                signature = %meta.id,
                step = self.options.timestamp_step,
                "all timestamps are 0, substituting uniform timestamps"
            );
            for (i, sample) in samples.iter_mut().enumerate() {
                sample.t = i as i64 * self.options.timestamp_step;
            }
            report.timestamps_synthesized = true;
        }

        let before = samples.len();
        samples.dedup_by_key(|s| s.t);
        report.duplicates_dropped = before - samples.len();

        if meta.device == InputDevice::Unknown {
            meta.device = if samples.iter().all(|s| s.pressure == 0.0) {
                InputDevice::Finger
            } else {
                InputDevice::Stylus
            };
            report.inferred_device = Some(meta.device);
        }

        if meta.device == InputDevice::Stylus {
            let leading = samples.iter().take_while(|s| s.pressure == 0.0).count();
            samples.drain(..leading);
            let trailing = samples.iter().rev().take_while(|s| s.pressure == 0.0).count();
            samples.truncate(samples.len() - trailing);
            report.leading_trimmed = leading;
            report.trailing_trimmed = trailing;
        }

        if samples.is_empty() {
            return Err(IoError::DataIntegrity {
                signature_id: meta.id,
            });
        }

        let features = self
            .build_features(&samples)
            .map_err(|source| IoError::Feature {
                signature_id: meta.id.clone(),
                source,
            })?;
        debug!(samples = samples.len(), ?report, "parsed signature");
        Ok((Signature::new(meta, features), report))
    }

    fn build_features(&self, samples: &[Sample]) -> Result<FeatureStore, FeatureError> {
        let mut store = FeatureStore::new();
        store.set_ints(names::RAW_X, samples.iter().map(|s| s.x).collect())?;
        store.set_ints(names::RAW_Y, samples.iter().map(|s| s.y).collect())?;
        store.set_ints(names::RAW_T, samples.iter().map(|s| s.t).collect())?;
        store.set_floats(names::RAW_PRESSURE, samples.iter().map(|s| s.pressure).collect())?;
        if self.options.standard_features {
            store.set_floats(names::X, samples.iter().map(|s| s.x as f64).collect())?;
            store.set_floats(names::Y, samples.iter().map(|s| s.y as f64).collect())?;
            store.set_floats(names::T, samples.iter().map(|s| s.t as f64).collect())?;
            store.set_floats(names::PRESSURE, samples.iter().map(|s| s.pressure).collect())?;
            store.set_pen_states(
                names::PEN_STATE,
                samples
                    .iter()
                    .map(|s| PenState::from_pressure(s.pressure))
                    .collect(),
            )?;
        }
        Ok(store)
    }
}
