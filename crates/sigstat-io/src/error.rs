//! I/O error types for sigstat-io.

use std::path::PathBuf;

use sigstat_dataset::{Database, FeatureError};

/// Errors from reading signature files and writing datasets.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when an input file or the data root cannot be opened.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a directory under the data root cannot be listed.
    #[error("cannot read directory {path}")]
    ReadDir {
        /// Directory that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when an archive cannot be opened or its central directory
    /// is corrupt.
    #[error("cannot read archive {path}")]
    Archive {
        /// Archive that was attempted.
        path: PathBuf,
        /// Underlying zip error.
        source: zip::result::ZipError,
    },

    /// Returned when a single archive entry cannot be extracted.
    #[error("cannot extract archive entry {entry}")]
    ArchiveEntry {
        /// Entry name inside the archive.
        entry: String,
        /// Underlying extraction error.
        source: std::io::Error,
    },

    /// Returned when a file's path does not map to a known split, device,
    /// origin or database.
    #[error("cannot classify {file}: {reason}")]
    Configuration {
        /// Path of the offending file.
        file: String,
        /// What did not match.
        reason: String,
    },

    /// Returned when no pressure column is registered for a database.
    #[error("no pressure column registered for database {database}")]
    UnsupportedDatabase {
        /// The database without a mapping.
        database: Database,
    },

    /// Returned when a sample line cannot be parsed.
    #[error("{file}:{line}: {reason}")]
    MalformedLine {
        /// Path of the offending file.
        file: String,
        /// One-based line number.
        line: usize,
        /// What failed to parse.
        reason: String,
    },

    /// Returned when a signature has no samples left after repair.
    #[error("signature {signature_id} has no samples after repair")]
    DataIntegrity {
        /// Identifier of the empty signature.
        signature_id: String,
    },

    /// Wraps a feature store rejection while building a signature.
    #[error("signature {signature_id}: {source}")]
    Feature {
        /// Signature being built.
        signature_id: String,
        /// Underlying feature error.
        source: FeatureError,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when an output file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV writer fails.
    #[error("CSV error writing {path}")]
    Csv {
        /// Path of the CSV file.
        path: PathBuf,
        /// Underlying CSV error.
        source: csv::Error,
    },
}

impl IoError {
    /// Whether the error concerns a single signature file, so a batch load
    /// may skip that file and continue.
    #[must_use]
    pub fn is_signature_local(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound { .. }
                | Self::ArchiveEntry { .. }
                | Self::Configuration { .. }
                | Self::UnsupportedDatabase { .. }
                | Self::MalformedLine { .. }
                | Self::DataIntegrity { .. }
                | Self::Feature { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_level_errors_are_local() {
        let err = IoError::DataIntegrity {
            signature_id: "Development/stylus/u0001_g_0.txt".into(),
        };
        assert!(err.is_signature_local());
        let err = IoError::Configuration {
            file: "x.txt".into(),
            reason: "unknown split".into(),
        };
        assert!(err.is_signature_local());
    }

    #[test]
    fn corrupt_entry_is_local_corrupt_archive_is_not() {
        let entry = IoError::ArchiveEntry {
            entry: "DeepSignDB/Development/stylus/u0001_g_1.txt".into(),
            source: std::io::Error::other("invalid checksum"),
        };
        assert!(entry.is_signature_local());
        let archive = IoError::Archive {
            path: PathBuf::from("DeepSignDB.zip"),
            source: zip::result::ZipError::InvalidArchive("no central directory".into()),
        };
        assert!(!archive.is_signature_local());
    }

    #[test]
    fn output_errors_abort() {
        let err = IoError::OutputDirCreate {
            path: PathBuf::from("/out"),
            source: std::io::Error::other("denied"),
        };
        assert!(!err.is_signature_local());
    }

    #[test]
    fn malformed_line_message() {
        let err = IoError::MalformedLine {
            file: "a.txt".into(),
            line: 3,
            reason: "missing pressure column 5".into(),
        };
        assert_eq!(err.to_string(), "a.txt:3: missing pressure column 5");
    }
}
