//! Signature file ingestion and dataset export for sigstat.
//!
//! [`DirectoryLoader`] and [`ArchiveLoader`] turn a database directory or
//! zip archive into [`Signer`](sigstat_dataset::Signer)s; [`CsvExporter`]
//! persists generated datasets.

mod archive;
mod classify;
mod error;
mod loader;
mod reader;
mod table;
mod writer;

pub use archive::ArchiveLoader;
pub use classify::classify;
pub use error::IoError;
pub use loader::{DirectoryLoader, LoadReport, SkippedFile};
pub use reader::{ReaderOptions, RepairReport, SignatureReader};
pub use table::{DatabaseTable, SignerRange};
pub use writer::{CsvExporter, HEADERS};
