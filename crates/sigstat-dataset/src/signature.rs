//! Signatures, signers and pen strokes.

use std::ops::Range;

use crate::error::FeatureError;
use crate::feature::{FeatureStore, PenState, names};
use crate::meta::{Database, InputDevice, Origin, Split};

/// Descriptive tags attached to a signature at ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureMeta {
    /// Unique identifier, the file stem.
    pub id: String,
    /// Identifier of the owning signer, e.g. `u1001`.
    pub signer_id: String,
    /// Path of the source file.
    pub file: String,
    pub origin: Origin,
    pub database: Database,
    pub device: InputDevice,
    pub split: Split,
}

/// One online signature: its tags plus its sample features.
///
/// Immutable once loaded; normalization works on copies of the features.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    meta: SignatureMeta,
    features: FeatureStore,
}

impl Signature {
    #[must_use]
    pub fn new(meta: SignatureMeta, features: FeatureStore) -> Self {
        Self { meta, features }
    }

    #[must_use]
    pub fn meta(&self) -> &SignatureMeta {
        &self.meta
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.meta.id
    }

    #[must_use]
    pub fn signer_id(&self) -> &str {
        &self.meta.signer_id
    }

    #[must_use]
    pub fn file(&self) -> &str {
        &self.meta.file
    }

    #[must_use]
    pub fn origin(&self) -> Origin {
        self.meta.origin
    }

    #[must_use]
    pub fn database(&self) -> Database {
        self.meta.database
    }

    #[must_use]
    pub fn device(&self) -> InputDevice {
        self.meta.device
    }

    #[must_use]
    pub fn split(&self) -> Split {
        self.meta.split
    }

    #[must_use]
    pub fn features(&self) -> &FeatureStore {
        &self.features
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Split the signature into maximal runs of equal pen state.
    ///
    /// Uses the stored [`names::PEN_STATE`] feature when present and
    /// otherwise derives pen state from [`names::PRESSURE`], or from
    /// [`names::RAW_PRESSURE`] when only the raw columns were read.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`FeatureError::Missing`] | neither pen state nor any pressure is stored |
    /// | [`FeatureError::TypeMismatch`] | the feature found has the wrong element type |
    pub fn strokes(&self) -> Result<Vec<Stroke>, FeatureError> {
        if self.features.contains(names::PEN_STATE) {
            return Ok(Stroke::split(self.features.pen_states(names::PEN_STATE)?));
        }
        let pressure = if self.features.contains(names::PRESSURE) {
            names::PRESSURE
        } else if self.features.contains(names::RAW_PRESSURE) {
            names::RAW_PRESSURE
        } else {
            names::PRESSURE
        };
        let states: Vec<PenState> = self
            .features
            .floats(pressure)?
            .iter()
            .map(|&p| PenState::from_pressure(p))
            .collect();
        Ok(Stroke::split(&states))
    }
}

/// A contiguous run of samples with the same pen state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stroke {
    pub state: PenState,
    /// Sample indices covered by the stroke.
    pub range: Range<usize>,
}

impl Stroke {
    /// Group consecutive equal states into strokes.
    #[must_use]
    pub fn split(states: &[PenState]) -> Vec<Self> {
        let mut strokes: Vec<Self> = Vec::new();
        for (i, &state) in states.iter().enumerate() {
            match strokes.last_mut() {
                Some(last) if last.state == state => last.range.end = i + 1,
                _ => strokes.push(Self {
                    state,
                    range: i..i + 1,
                }),
            }
        }
        strokes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.range.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// A person and the signatures attributed to them.
#[derive(Debug, Clone, PartialEq)]
pub struct Signer {
    id: String,
    signatures: Vec<Signature>,
}

impl Signer {
    #[must_use]
    pub fn new(id: impl Into<String>, signatures: Vec<Signature>) -> Self {
        Self {
            id: id.into(),
            signatures,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    /// Signatures with [`Origin::Genuine`].
    pub fn genuine(&self) -> impl Iterator<Item = &Signature> {
        self.signatures
            .iter()
            .filter(|s| s.origin() == Origin::Genuine)
    }

    /// Signatures with [`Origin::Forged`].
    pub fn forged(&self) -> impl Iterator<Item = &Signature> {
        self.signatures
            .iter()
            .filter(|s| s.origin() == Origin::Forged)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Build a stylus signature with linearly increasing coordinates.
    pub(crate) fn signature(signer: &str, id: &str, origin: Origin, n: usize) -> Signature {
        let meta = SignatureMeta {
            id: id.to_string(),
            signer_id: signer.to_string(),
            file: format!("{id}.txt"),
            origin,
            database: Database::Mcyt,
            device: InputDevice::Stylus,
            split: Split::Development,
        };
        let mut features = FeatureStore::new();
        let xs: Vec<i64> = (0..n as i64).map(|i| 100 + 3 * i).collect();
        let ys: Vec<i64> = (0..n as i64).map(|i| 200 + (i * i) % 7).collect();
        let ts: Vec<i64> = (0..n as i64).map(|i| i * 10).collect();
        let ps: Vec<f64> = (0..n).map(|i| 0.1 + (i % 4) as f64 * 0.2).collect();
        features.set_floats(names::X, xs.iter().map(|&v| v as f64).collect()).unwrap();
        features.set_floats(names::Y, ys.iter().map(|&v| v as f64).collect()).unwrap();
        features.set_floats(names::T, ts.iter().map(|&v| v as f64).collect()).unwrap();
        features.set_floats(names::PRESSURE, ps.clone()).unwrap();
        features.set_ints(names::RAW_X, xs).unwrap();
        features.set_ints(names::RAW_Y, ys).unwrap();
        features.set_ints(names::RAW_T, ts).unwrap();
        features.set_floats(names::RAW_PRESSURE, ps).unwrap();
        Signature::new(meta, features)
    }

    /// A signer with `genuine` genuine and `forged` forged signatures.
    pub(crate) fn signer(id: &str, genuine: usize, forged: usize) -> Signer {
        let mut signatures = Vec::new();
        for g in 0..genuine {
            signatures.push(signature(id, &format!("{id}_g_{g:03}"), Origin::Genuine, 8 + g));
        }
        for f in 0..forged {
            signatures.push(signature(id, &format!("{id}_s_{f:03}"), Origin::Forged, 9 + f));
        }
        Signer::new(id, signatures)
    }
}
