//! Parameters for one dataset slice and for a whole generation run.

use std::fmt;

use serde::Serialize;

use crate::error::DatasetError;
use crate::filter::SignatureFilter;

/// Lower-case `name` and check it is a usable file stem.
pub(crate) fn validate_name(name: &str) -> Result<String, DatasetError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return Err(DatasetError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(name.to_ascii_lowercase())
}

/// How many signers and pairs one dataset slice (training or test) holds.
///
/// Construct via [`DatasetParameters::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter                   | Default |
/// |-----------------------------|---------|
/// | `signer_count`              | 0       |
/// | `genuine_pairs`             | 0       |
/// | `skilled_forgery_pairs`     | 0       |
/// | `random_forgery_pairs`      | 0       |
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetParameters {
    name: String,
    signer_count: usize,
    genuine_pairs: usize,
    skilled_forgery_pairs: usize,
    random_forgery_pairs: usize,
}

impl DatasetParameters {
    /// Create parameters for the slice called `name`, stored lower-cased.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DatasetError::InvalidName`] | `name` is empty or has characters outside `[a-zA-Z0-9_-]` |
    pub fn new(name: &str) -> Result<Self, DatasetError> {
        Ok(Self {
            name: validate_name(name)?,
            signer_count: 0,
            genuine_pairs: 0,
            skilled_forgery_pairs: 0,
            random_forgery_pairs: 0,
        })
    }

    #[must_use]
    pub fn with_signer_count(mut self, n: usize) -> Self {
        self.signer_count = n;
        self
    }

    /// Genuine-genuine pairs drawn per signer.
    #[must_use]
    pub fn with_genuine_pairs(mut self, n: usize) -> Self {
        self.genuine_pairs = n;
        self
    }

    /// Genuine-forged pairs drawn per signer.
    #[must_use]
    pub fn with_skilled_forgery_pairs(mut self, n: usize) -> Self {
        self.skilled_forgery_pairs = n;
        self
    }

    /// Genuine-other-signer pairs drawn per signer.
    #[must_use]
    pub fn with_random_forgery_pairs(mut self, n: usize) -> Self {
        self.random_forgery_pairs = n;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn signer_count(&self) -> usize {
        self.signer_count
    }

    #[must_use]
    pub fn genuine_pairs(&self) -> usize {
        self.genuine_pairs
    }

    #[must_use]
    pub fn skilled_forgery_pairs(&self) -> usize {
        self.skilled_forgery_pairs
    }

    #[must_use]
    pub fn random_forgery_pairs(&self) -> usize {
        self.random_forgery_pairs
    }

    /// Upper bound on pairs in the slice; pools may be smaller.
    #[must_use]
    pub fn max_pairs(&self) -> usize {
        self.signer_count
            * (self.genuine_pairs + self.skilled_forgery_pairs + self.random_forgery_pairs)
    }
}

impl fmt::Display for DatasetParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Signers: {}", self.signer_count)?;
        writeln!(f, "Genuine pairs per signer: {}", self.genuine_pairs)?;
        writeln!(f, "Skilled forgery pairs per signer: {}", self.skilled_forgery_pairs)?;
        write!(f, "Random forgery pairs per signer: {}", self.random_forgery_pairs)
    }
}

/// Everything that determines a generation run: the persisted manifest.
///
/// Construct via [`RunManifest::new`]; `seed` defaults to 42 and `filter`
/// to [`SignatureFilter::all`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunManifest {
    name: String,
    seed: u64,
    filter: SignatureFilter,
    training: DatasetParameters,
    test: DatasetParameters,
}

impl RunManifest {
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DatasetError::InvalidName`] | `name` is empty or has characters outside `[a-zA-Z0-9_-]` |
    /// | [`DatasetError::DuplicateSliceName`] | `training` and `test` have the same name |
    pub fn new(
        name: &str,
        training: DatasetParameters,
        test: DatasetParameters,
    ) -> Result<Self, DatasetError> {
        if training.name == test.name {
            return Err(DatasetError::DuplicateSliceName {
                name: training.name,
            });
        }
        Ok(Self {
            name: validate_name(name)?,
            seed: 42,
            filter: SignatureFilter::all(),
            training,
            test,
        })
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: SignatureFilter) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn filter(&self) -> &SignatureFilter {
        &self.filter
    }

    #[must_use]
    pub fn training(&self) -> &DatasetParameters {
        &self.training
    }

    #[must_use]
    pub fn test(&self) -> &DatasetParameters {
        &self.test
    }
}

impl fmt::Display for RunManifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Seed: {}", self.seed)?;
        writeln!(f)?;
        writeln!(f, "{}", self.filter)?;
        writeln!(f)?;
        writeln!(f, "[Training]")?;
        writeln!(f, "{}", self.training)?;
        writeln!(f)?;
        writeln!(f, "[Test]")?;
        writeln!(f, "{}", self.test)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_lowercased() {
        let p = DatasetParameters::new("Train_Set-1").unwrap();
        assert_eq!(p.name(), "train_set-1");
    }

    #[test]
    fn rejects_bad_names() {
        for bad in ["", "has space", "dot.csv", "slash/name", "ünï"] {
            assert!(
                matches!(
                    DatasetParameters::new(bad),
                    Err(DatasetError::InvalidName { .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn max_pairs_multiplies_by_signers() {
        let p = DatasetParameters::new("train")
            .unwrap()
            .with_signer_count(10)
            .with_genuine_pairs(3)
            .with_skilled_forgery_pairs(2)
            .with_random_forgery_pairs(1);
        assert_eq!(p.max_pairs(), 60);
    }

    #[test]
    fn manifest_defaults() {
        let m = RunManifest::new(
            "Run",
            DatasetParameters::new("train").unwrap(),
            DatasetParameters::new("test").unwrap(),
        )
        .unwrap();
        assert_eq!(m.name(), "run");
        assert_eq!(m.seed(), 42);
        assert_eq!(m.filter(), &SignatureFilter::all());
    }

    #[test]
    fn slices_need_distinct_names() {
        let err = RunManifest::new(
            "run",
            DatasetParameters::new("Same").unwrap(),
            DatasetParameters::new("same").unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, DatasetError::DuplicateSliceName { ref name } if name == "same"));
    }

    #[test]
    fn manifest_text_lists_both_slices() {
        let m = RunManifest::new(
            "run",
            DatasetParameters::new("train").unwrap().with_signer_count(4),
            DatasetParameters::new("test").unwrap().with_signer_count(2),
        )
        .unwrap()
        .with_seed(7);
        let text = m.to_string();
        assert!(text.starts_with("Seed: 7\n"));
        assert!(text.contains("[Training]\nName: train\nSigners: 4\n"));
        assert!(text.contains("[Test]\nName: test\nSigners: 2\n"));
    }
}
