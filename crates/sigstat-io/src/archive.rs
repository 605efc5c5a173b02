//! Loading a signature database straight from its zip archive.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};
use zip::ZipArchive;

use crate::error::IoError;
use crate::loader::{LoadReport, assemble};
use crate::reader::SignatureReader;

/// Loads every `*.txt` entry of a zip archive such as `DeepSignDB.zip`.
///
/// Entry names play the role of paths relative to the data root. The
/// fail-soft rule of [`DirectoryLoader`](crate::DirectoryLoader) applies: an
/// entry that cannot be extracted, classified or parsed is skipped, while an
/// archive that cannot be opened aborts the load.
#[derive(Debug, Clone)]
pub struct ArchiveLoader {
    path: PathBuf,
    reader: SignatureReader,
}

impl ArchiveLoader {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            reader: SignatureReader::default(),
        }
    }

    #[must_use]
    pub fn with_reader(mut self, reader: SignatureReader) -> Self {
        self.reader = reader;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all signers.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::FileNotFound`] | the archive cannot be opened |
    /// | [`IoError::Archive`] | the file is not a readable zip archive |
    pub fn load(&self) -> Result<LoadReport, IoError> {
        self.load_with_progress(|_, _| {})
    }

    /// Load all signers, calling `progress(signers, signatures)` with running
    /// totals after each signer.
    ///
    /// # Errors
    ///
    /// As [`load`](Self::load).
    #[instrument(skip_all, fields(archive = %self.path.display()))]
    pub fn load_with_progress(
        &self,
        progress: impl FnMut(usize, usize),
    ) -> Result<LoadReport, IoError> {
        let file = File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;
        let mut archive = ZipArchive::new(file).map_err(|e| IoError::Archive {
            path: self.path.clone(),
            source: e,
        })?;

        let mut entries: Vec<String> = archive
            .file_names()
            .filter(|name| !name.ends_with('/') && is_txt(name))
            .map(String::from)
            .collect();
        entries.sort();
        debug!(entries = entries.len(), "signature entries found");

        // Entry names keep their original separators; classification
        // normalizes them, so map back through the normalized form.
        let normalized: Vec<String> = entries.iter().map(|e| e.replace('\\', "/")).collect();

        assemble(
            &self.reader,
            normalized.clone(),
            |file| {
                let name = normalized
                    .iter()
                    .position(|n| n == file)
                    .map_or(file, |i| entries[i].as_str());
                read_entry(&mut archive, name)
            },
            progress,
        )
    }
}

fn is_txt(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
}

fn read_entry(archive: &mut ZipArchive<File>, name: &str) -> Result<String, IoError> {
    let entry_err = |source| IoError::ArchiveEntry {
        entry: name.to_string(),
        source,
    };
    let mut entry = archive
        .by_name(name)
        .map_err(|e| entry_err(std::io::Error::other(e)))?;
    let mut content = String::new();
    entry.read_to_string(&mut content).map_err(entry_err)?;
    Ok(content)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use zip::write::SimpleFileOptions;

    use super::*;

    const SAMPLES: &str = "X Y T P\n1 2 10 0.5\n2 3 20 0.6\n3 5 30 0.4\n";

    fn build_zip(path: &Path, entries: &[(&str, &str)]) {
        let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
        for (name, content) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn loads_entries_like_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("DeepSignDB.zip");
        build_zip(
            &path,
            &[
                ("DeepSignDB/Development/stylus/u1010_g_2.txt", SAMPLES),
                ("DeepSignDB/Development/stylus/u1010_g_1.txt", SAMPLES),
                ("DeepSignDB/Development/finger/u1009_s_1.txt", SAMPLES),
                ("DeepSignDB/README.md", "not a signature"),
            ],
        );

        let mut calls = Vec::new();
        let report = ArchiveLoader::new(&path)
            .load_with_progress(|signers, signatures| calls.push((signers, signatures)))
            .unwrap();

        let ids: Vec<&str> = report.signers.iter().map(|s| s.id()).collect();
        assert_eq!(ids, ["1009", "1010"]);
        let first = &report.signers[1].signatures()[0];
        assert_eq!(first.id(), "Development/stylus/u1010_g_1.txt");
        assert_eq!(first.file(), "DeepSignDB/Development/stylus/u1010_g_1.txt");
        assert_eq!(calls, [(1, 1), (2, 3)]);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn bad_entries_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("DeepSignDB.zip");
        build_zip(
            &path,
            &[
                ("DeepSignDB/Development/stylus/u1010_g_1.txt", SAMPLES),
                ("DeepSignDB/Development/stylus/u1010_g_2.txt", "X Y T P\n1 2 10 0\n"),
                ("DeepSignDB/readme.txt", "notes"),
            ],
        );

        let report = ArchiveLoader::new(&path).load().unwrap();
        assert_eq!(report.signature_count(), 1);
        assert_eq!(report.skipped.len(), 2);
        assert!(report.skipped.iter().any(|s| s.path == "DeepSignDB/readme.txt"));
    }

    #[test]
    fn corrupt_archive_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("DeepSignDB.zip");
        std::fs::write(&path, b"PK\x03\x04 truncated").unwrap();
        let err = ArchiveLoader::new(&path).load().unwrap_err();
        assert!(matches!(err, IoError::Archive { .. }));
        assert!(!err.is_signature_local());
    }

    #[test]
    fn missing_archive_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ArchiveLoader::new(dir.path().join("absent.zip"))
            .load()
            .unwrap_err();
        assert!(matches!(err, IoError::FileNotFound { .. }));
    }
}
