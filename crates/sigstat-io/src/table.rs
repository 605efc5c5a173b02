//! Per-database lookup tables: pressure column and signer-ID ranges.

use std::collections::BTreeMap;

use sigstat_dataset::{Database, InputDevice, Split};

use crate::error::IoError;

/// An inclusive signer-ID range mapped to a database for one split and device.
///
/// Bounds compare lexicographically, so IDs must be zero-padded to the same
/// width as the bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerRange {
    pub split: Split,
    pub device: InputDevice,
    pub low: String,
    pub high: String,
    pub database: Database,
}

impl SignerRange {
    #[must_use]
    pub fn contains(&self, split: Split, device: InputDevice, signer_id: &str) -> bool {
        self.split == split
            && self.device == device
            && signer_id >= self.low.as_str()
            && signer_id <= self.high.as_str()
    }
}

/// Classification and parsing tables.
///
/// [`DatabaseTable::default`] holds the DeepSignDB / SVC 2021 layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseTable {
    pressure_columns: BTreeMap<Database, usize>,
    ranges: Vec<SignerRange>,
}

impl DatabaseTable {
    /// An empty table: every lookup fails.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            pressure_columns: BTreeMap::new(),
            ranges: Vec::new(),
        }
    }

    /// Register the zero-based whitespace column holding pressure for `database`.
    #[must_use]
    pub fn with_pressure_column(mut self, database: Database, column: usize) -> Self {
        self.pressure_columns.insert(database, column);
        self
    }

    /// Append a signer range. Earlier ranges win on overlap.
    #[must_use]
    pub fn with_range(
        mut self,
        split: Split,
        device: InputDevice,
        low: &str,
        high: &str,
        database: Database,
    ) -> Self {
        self.ranges.push(SignerRange {
            split,
            device,
            low: low.to_string(),
            high: high.to_string(),
            database,
        });
        self
    }

    #[must_use]
    pub fn ranges(&self) -> &[SignerRange] {
        &self.ranges
    }

    /// Pressure column for `database`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::UnsupportedDatabase`] | no column is registered for `database` |
    pub fn pressure_column(&self, database: Database) -> Result<usize, IoError> {
        self.pressure_columns
            .get(&database)
            .copied()
            .ok_or(IoError::UnsupportedDatabase { database })
    }

    /// The database whose range holds `signer_id` for this split and device.
    #[must_use]
    pub fn database_for(&self, split: Split, device: InputDevice, signer_id: &str) -> Option<Database> {
        self.ranges
            .iter()
            .find(|r| r.contains(split, device, signer_id))
            .map(|r| r.database)
    }
}

impl Default for DatabaseTable {
    fn default() -> Self {
        use Database::{BiosecureDs2, BiosecurId, EBioSignDs1, EBioSignDs2, EvalDb, Mcyt};
        use InputDevice::{Finger, Stylus};
        use Split::{Development, Evaluation};

        Self::empty()
            .with_pressure_column(Mcyt, 5)
            .with_pressure_column(BiosecurId, 6)
            .with_pressure_column(BiosecureDs2, 6)
            .with_pressure_column(EBioSignDs1, 3)
            .with_pressure_column(EBioSignDs2, 3)
            .with_pressure_column(EvalDb, 3)
            .with_range(Development, Finger, "1009", "1038", EBioSignDs1)
            .with_range(Development, Finger, "1039", "1084", EBioSignDs2)
            .with_range(Development, Stylus, "0001", "0230", Mcyt)
            .with_range(Development, Stylus, "0231", "0498", BiosecurId)
            .with_range(Development, Stylus, "1009", "1038", EBioSignDs1)
            .with_range(Development, Stylus, "1039", "1084", EBioSignDs2)
            .with_range(Evaluation, Finger, "0373", "0407", EBioSignDs1)
            .with_range(Evaluation, Finger, "0408", "0442", EBioSignDs2)
            .with_range(Evaluation, Stylus, "0001", "0100", Mcyt)
            .with_range(Evaluation, Stylus, "0101", "0232", BiosecurId)
            .with_range(Evaluation, Stylus, "0233", "0372", BiosecureDs2)
            .with_range(Evaluation, Stylus, "0373", "0407", EBioSignDs1)
            .with_range(Evaluation, Stylus, "0408", "0442", EBioSignDs2)
    }
}
