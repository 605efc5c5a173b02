//! Loading a signature database from an extracted directory tree.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use sigstat_dataset::{Signature, SignatureMeta, Signer};
use tracing::{debug, info, instrument, warn};

use crate::classify::classify;
use crate::error::IoError;
use crate::reader::SignatureReader;

/// A file the loader could not turn into a signature.
#[derive(Debug)]
pub struct SkippedFile {
    /// Path relative to the data root, `/`-separated.
    pub path: String,
    /// Why the file was skipped.
    pub reason: IoError,
}

/// Outcome of loading a directory or archive.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Signers ordered by ID, each with signatures ordered by signature ID.
    pub signers: Vec<Signer>,
    /// Files that failed classification or parsing.
    pub skipped: Vec<SkippedFile>,
}

impl LoadReport {
    /// Total number of loaded signatures.
    #[must_use]
    pub fn signature_count(&self) -> usize {
        self.signers.iter().map(|s| s.signatures().len()).sum()
    }
}

/// Loads every `*.txt` signature file below a root directory.
///
/// Signature-local failures (see [`IoError::is_signature_local`]) are
/// logged and recorded in [`LoadReport::skipped`]; anything else aborts.
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    root: PathBuf,
    reader: SignatureReader,
}

impl DirectoryLoader {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            reader: SignatureReader::default(),
        }
    }

    #[must_use]
    pub fn with_reader(mut self, reader: SignatureReader) -> Self {
        self.reader = reader;
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load all signers.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::FileNotFound`] | the root does not exist |
    /// | [`IoError::ReadDir`] | a directory below the root cannot be listed |
    pub fn load(&self) -> Result<LoadReport, IoError> {
        self.load_with_progress(|_, _| {})
    }

    /// Load all signers, calling `progress(signers, signatures)` with running
    /// totals after each signer.
    ///
    /// # Errors
    ///
    /// As [`load`](Self::load).
    #[instrument(skip_all, fields(root = %self.root.display()))]
    pub fn load_with_progress(
        &self,
        progress: impl FnMut(usize, usize),
    ) -> Result<LoadReport, IoError> {
        if !self.root.is_dir() {
            return Err(IoError::FileNotFound {
                path: self.root.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            });
        }
        let mut files = Vec::new();
        collect_txt_files(&self.root, &mut files)?;
        let mut relative: Vec<String> = files
            .iter()
            .map(|p| relative_path(&self.root, p))
            .collect();
        relative.sort();
        debug!(files = relative.len(), "signature files found");

        assemble(
            &self.reader,
            relative,
            |file| {
                let path = self.root.join(file);
                fs::read_to_string(&path).map_err(|e| IoError::FileNotFound { path, source: e })
            },
            progress,
        )
    }
}

/// Classify `files` (paths relative to the data root, sorted), group them by
/// signer and parse each through `read`, which returns a file's content.
///
/// Signature-local errors are recorded as skipped; any other error aborts.
pub(crate) fn assemble(
    reader: &SignatureReader,
    files: Vec<String>,
    mut read: impl FnMut(&str) -> Result<String, IoError>,
    mut progress: impl FnMut(usize, usize),
) -> Result<LoadReport, IoError> {
    let mut report = LoadReport::default();
    let mut by_signer: BTreeMap<String, Vec<SignatureMeta>> = BTreeMap::new();
    for file in files {
        match classify(&file, reader.table()) {
            Ok(meta) => by_signer.entry(meta.signer_id.clone()).or_default().push(meta),
            Err(e) => skip(&mut report, file, e)?,
        }
    }

    let mut signature_total = 0;
    for (signer_id, metas) in by_signer {
        let mut signatures: Vec<Signature> = Vec::with_capacity(metas.len());
        for meta in metas {
            let file = meta.file.clone();
            match read(&file).and_then(|content| reader.parse(meta, &content)) {
                Ok((signature, repairs)) => {
                    if !repairs.is_clean() {
                        debug!(signature = signature.id(), ?repairs, "repaired");
                    }
                    signatures.push(signature);
                }
                Err(e) => skip(&mut report, file, e)?,
            }
        }
        if signatures.is_empty() {
            continue;
        }
        signatures.sort_by(|a, b| a.id().cmp(b.id()));
        signature_total += signatures.len();
        report.signers.push(Signer::new(signer_id, signatures));
        progress(report.signers.len(), signature_total);
    }

    info!(
        signers = report.signers.len(),
        signatures = signature_total,
        skipped = report.skipped.len(),
        "signers loaded"
    );
    Ok(report)
}

fn skip(report: &mut LoadReport, path: String, reason: IoError) -> Result<(), IoError> {
    if !reason.is_signature_local() {
        return Err(reason);
    }
    warn!(file = %path, error = %reason, "skipping signature file");
    report.skipped.push(SkippedFile { path, reason });
    Ok(())
}

fn collect_txt_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), IoError> {
    let read_dir_err = |e| IoError::ReadDir {
        path: dir.to_path_buf(),
        source: e,
    };
    for entry in fs::read_dir(dir).map_err(read_dir_err)? {
        let path = entry.map_err(read_dir_err)?.path();
        if path.is_dir() {
            collect_txt_files(&path, out)?;
        } else if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
        {
            out.push(path);
        }
    }
    Ok(())
}

fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
