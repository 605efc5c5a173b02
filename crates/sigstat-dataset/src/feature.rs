//! Named, equal-length per-sample feature sequences.
//!
//! A [`FeatureStore`] maps feature names to homogeneously-typed sequences.
//! All sequences in one store share a length: the number of samples in the
//! signature. Raw ingestion writes the `Svc2021.*` features, the standard
//! features (`X`, `Y`, `T`, `Pressure`) are derived from them, and
//! [`Pipeline`](crate::Pipeline) stages overwrite features in place.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::FeatureError;

/// Well-known feature names.
pub mod names {
    /// Raw horizontal coordinate as read from the file.
    pub const RAW_X: &str = "Svc2021.X";
    /// Raw vertical coordinate as read from the file.
    pub const RAW_Y: &str = "Svc2021.Y";
    /// Raw timestamp after repair.
    pub const RAW_T: &str = "Svc2021.T";
    /// Raw pressure as read from the file.
    pub const RAW_PRESSURE: &str = "Svc2021.Pressure";
    /// Standard horizontal coordinate.
    pub const X: &str = "X";
    /// Standard vertical coordinate.
    pub const Y: &str = "Y";
    /// Standard timestamp.
    pub const T: &str = "T";
    /// Standard pressure.
    pub const PRESSURE: &str = "Pressure";
    /// Per-sample pen state derived from pressure.
    pub const PEN_STATE: &str = "PenState";
}

/// Whether the pen touches the surface at a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PenState {
    Down,
    Up,
}

impl PenState {
    /// Positive pressure means the pen is down.
    #[must_use]
    pub fn from_pressure(pressure: f64) -> Self {
        if pressure > 0.0 { Self::Down } else { Self::Up }
    }
}

/// Element type of a stored feature sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Int,
    Float,
    PenState,
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Int => "integer",
            Self::Float => "float",
            Self::PenState => "pen-state",
        })
    }
}

/// One feature sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValues {
    Int(Vec<i64>),
    Float(Vec<f64>),
    PenState(Vec<PenState>),
}

impl FeatureValues {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Int(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::PenState(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn kind(&self) -> FeatureKind {
        match self {
            Self::Int(_) => FeatureKind::Int,
            Self::Float(_) => FeatureKind::Float,
            Self::PenState(_) => FeatureKind::PenState,
        }
    }
}

/// Name-indexed collection of equal-length feature sequences.
///
/// The first sequence inserted fixes the sample count; later insertions of a
/// different length are rejected. Re-inserting under an existing name
/// replaces the old sequence.
///
/// ```
/// use sigstat_dataset::{FeatureStore, names};
///
/// let mut store = FeatureStore::new();
/// store.set_ints(names::RAW_T, vec![0, 10, 20]).unwrap();
/// assert!(store.set_floats(names::X, vec![1.0]).is_err());
/// assert_eq!(store.ints(names::RAW_T).unwrap(), &[0, 10, 20]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureStore {
    len: Option<usize>,
    features: BTreeMap<String, FeatureValues>,
}

impl FeatureStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of samples shared by every stored feature (0 when empty).
    #[must_use]
    pub fn len(&self) -> usize {
        self.len.unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store `values` under `name`, returning the sequence it replaced.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`FeatureError::LengthMismatch`] | `values` differs in length from the features already stored |
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        values: FeatureValues,
    ) -> Result<Option<FeatureValues>, FeatureError> {
        let name = name.into();
        let got = values.len();
        if let Some(expected) = self.len
            && expected != got
        {
            return Err(FeatureError::LengthMismatch {
                name,
                expected,
                got,
            });
        }
        self.len = Some(got);
        Ok(self.features.insert(name, values))
    }

    /// Store an integer sequence. See [`insert`](Self::insert).
    ///
    /// # Errors
    ///
    /// Same as [`insert`](Self::insert).
    pub fn set_ints(&mut self, name: impl Into<String>, values: Vec<i64>) -> Result<(), FeatureError> {
        self.insert(name, FeatureValues::Int(values)).map(|_| ())
    }

    /// Store a float sequence. See [`insert`](Self::insert).
    ///
    /// # Errors
    ///
    /// Same as [`insert`](Self::insert).
    pub fn set_floats(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<(), FeatureError> {
        self.insert(name, FeatureValues::Float(values)).map(|_| ())
    }

    /// Store a pen-state sequence. See [`insert`](Self::insert).
    ///
    /// # Errors
    ///
    /// Same as [`insert`](Self::insert).
    pub fn set_pen_states(
        &mut self,
        name: impl Into<String>,
        values: Vec<PenState>,
    ) -> Result<(), FeatureError> {
        self.insert(name, FeatureValues::PenState(values)).map(|_| ())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FeatureValues> {
        self.features.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.features.contains_key(name)
    }

    /// Stored feature names in lexical order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.features.keys().map(String::as_str)
    }

    fn missing(name: &str) -> FeatureError {
        FeatureError::Missing {
            name: name.to_string(),
        }
    }

    fn mismatch(name: &str, expected: FeatureKind, found: &FeatureValues) -> FeatureError {
        FeatureError::TypeMismatch {
            name: name.to_string(),
            expected,
            found: found.kind(),
        }
    }

    /// Read an integer feature.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`FeatureError::Missing`] | no feature named `name` |
    /// | [`FeatureError::TypeMismatch`] | the feature is not integer-valued |
    pub fn ints(&self, name: &str) -> Result<&[i64], FeatureError> {
        match self.get(name) {
            Some(FeatureValues::Int(v)) => Ok(v),
            Some(other) => Err(Self::mismatch(name, FeatureKind::Int, other)),
            None => Err(Self::missing(name)),
        }
    }

    /// Read a float feature.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`FeatureError::Missing`] | no feature named `name` |
    /// | [`FeatureError::TypeMismatch`] | the feature is not float-valued |
    pub fn floats(&self, name: &str) -> Result<&[f64], FeatureError> {
        match self.get(name) {
            Some(FeatureValues::Float(v)) => Ok(v),
            Some(other) => Err(Self::mismatch(name, FeatureKind::Float, other)),
            None => Err(Self::missing(name)),
        }
    }

    /// Read a pen-state feature.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`FeatureError::Missing`] | no feature named `name` |
    /// | [`FeatureError::TypeMismatch`] | the feature holds another element type |
    pub fn pen_states(&self, name: &str) -> Result<&[PenState], FeatureError> {
        match self.get(name) {
            Some(FeatureValues::PenState(v)) => Ok(v),
            Some(other) => Err(Self::mismatch(name, FeatureKind::PenState, other)),
            None => Err(Self::missing(name)),
        }
    }
}
