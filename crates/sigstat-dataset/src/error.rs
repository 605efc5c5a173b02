use std::error::Error as StdError;

use sigstat_dtw::{DtwError, PreprocessError};

use crate::feature::FeatureKind;

/// Errors from reading or writing features on a [`FeatureStore`](crate::FeatureStore).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeatureError {
    /// Returned when a feature is read that was never stored.
    #[error("feature \"{name}\" is not present")]
    Missing {
        /// Requested feature name.
        name: String,
    },

    /// Returned when a feature is read as the wrong element type.
    #[error("feature \"{name}\" holds {found} values, expected {expected}")]
    TypeMismatch {
        /// Requested feature name.
        name: String,
        /// Element type the caller asked for.
        expected: FeatureKind,
        /// Element type actually stored.
        found: FeatureKind,
    },

    /// Returned when a stored sequence would break the equal-length invariant.
    #[error("feature \"{name}\" has {got} samples, store holds {expected}")]
    LengthMismatch {
        /// Feature being written.
        name: String,
        /// Length shared by the features already stored.
        expected: usize,
        /// Length of the rejected sequence.
        got: usize,
    },
}

/// Errors from sampling, statistics and dataset assembly.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// Returned when a dataset or run name is not usable as a file stem.
    #[error("invalid name \"{name}\": use letters, digits, '_' or '-'")]
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// Returned when the training and test slices share a name, so one
    /// export would overwrite the other.
    #[error("training and test slices are both named \"{name}\"")]
    DuplicateSliceName {
        /// The shared, lower-cased name.
        name: String,
    },

    /// Returned when a signer index is outside the signer list.
    #[error("signer index {index} out of range for {n_signers} signers")]
    SignerOutOfRange {
        /// The invalid index.
        index: usize,
        /// Number of signers available.
        n_signers: usize,
    },

    /// Returned when a signature index is outside a signer's signature list.
    #[error("signature index {index} out of range for signer {signer} with {n_signatures} signatures")]
    SignatureOutOfRange {
        /// Signer the lookup was made against.
        signer: String,
        /// The invalid index.
        index: usize,
        /// Number of signatures the signer holds.
        n_signatures: usize,
    },

    /// Returned when a pair would compare a signature with itself.
    #[error("signature {signature_id} cannot be paired with itself")]
    SelfPair {
        /// Identifier of the offending signature.
        signature_id: String,
    },

    /// Wraps a feature lookup failure on a specific signature.
    #[error("signature {signature_id}: {source}")]
    Feature {
        /// Signature whose features were being read.
        signature_id: String,
        /// Underlying feature error.
        source: FeatureError,
    },

    /// Wraps a preprocessing failure on a specific signature.
    #[error("signature {signature_id}: {source}")]
    Preprocess {
        /// Signature being normalized.
        signature_id: String,
        /// Underlying preprocessing error.
        source: PreprocessError,
    },

    /// Wraps a DTW failure for a signature pair.
    #[error("aligning {reference} against {questioned}: {source}")]
    Dtw {
        /// Reference signature identifier.
        reference: String,
        /// Questioned signature identifier.
        questioned: String,
        /// Underlying DTW error.
        source: DtwError,
    },

    /// Wraps a failure raised by a [`DatasetExporter`](crate::DatasetExporter).
    #[error("export failed: {0}")]
    Export(#[source] Box<dyn StdError + Send + Sync>),
}

impl DatasetError {
    pub(crate) fn export<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::Export(Box::new(err))
    }
}
