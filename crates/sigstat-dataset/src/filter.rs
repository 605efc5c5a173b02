//! Signature selection by database, device and split.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::meta::{Database, InputDevice, Origin, Split};
use crate::signature::{Signature, Signer};

/// Allowed databases, input devices and splits.
///
/// A signature passes when all three of its tags are allowed.
/// [`SignatureFilter::all`] allows everything; the `with_*` methods
/// replace one allowed set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureFilter {
    databases: BTreeSet<Database>,
    devices: BTreeSet<InputDevice>,
    splits: BTreeSet<Split>,
}

impl SignatureFilter {
    /// A filter accepting every signature.
    #[must_use]
    pub fn all() -> Self {
        Self {
            databases: Database::ALL.iter().copied().collect(),
            devices: InputDevice::ALL.iter().copied().collect(),
            splits: Split::ALL.iter().copied().collect(),
        }
    }

    #[must_use]
    pub fn with_databases(mut self, databases: impl IntoIterator<Item = Database>) -> Self {
        self.databases = databases.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_devices(mut self, devices: impl IntoIterator<Item = InputDevice>) -> Self {
        self.devices = devices.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_splits(mut self, splits: impl IntoIterator<Item = Split>) -> Self {
        self.splits = splits.into_iter().collect();
        self
    }

    #[must_use]
    pub fn databases(&self) -> &BTreeSet<Database> {
        &self.databases
    }

    #[must_use]
    pub fn devices(&self) -> &BTreeSet<InputDevice> {
        &self.devices
    }

    #[must_use]
    pub fn splits(&self) -> &BTreeSet<Split> {
        &self.splits
    }

    #[must_use]
    pub fn matches(&self, signature: &Signature) -> bool {
        self.databases.contains(&signature.database())
            && self.devices.contains(&signature.device())
            && self.splits.contains(&signature.split())
    }
}

impl Default for SignatureFilter {
    fn default() -> Self {
        Self::all()
    }
}

fn write_set<T: fmt::Display>(f: &mut fmt::Formatter<'_>, set: &BTreeSet<T>) -> fmt::Result {
    let mut first = true;
    for item in set {
        if !first {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
        first = false;
    }
    Ok(())
}

impl fmt::Display for SignatureFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Databases: ")?;
        write_set(f, &self.databases)?;
        f.write_str("\nInput devices: ")?;
        write_set(f, &self.devices)?;
        f.write_str("\nSplits: ")?;
        write_set(f, &self.splits)
    }
}

/// Inclusive minimum and maximum of a per-signer count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountRange {
    pub min: usize,
    pub max: usize,
}

impl CountRange {
    fn of(counts: impl Iterator<Item = usize>) -> Self {
        counts.fold(None, |acc: Option<Self>, c| match acc {
            None => Some(Self { min: c, max: c }),
            Some(r) => Some(Self {
                min: r.min.min(c),
                max: r.max.max(c),
            }),
        })
        .unwrap_or(Self { min: 0, max: 0 })
    }
}

impl fmt::Display for CountRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// Per-signer counts of the signatures passing a filter.
///
/// Signers with no passing signature are not counted. Pair maxima are the
/// pool sizes the sampler can draw from for the least-populated signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSummary {
    /// Signers with at least one passing signature.
    pub signer_count: usize,
    pub signatures_per_signer: CountRange,
    pub genuine_per_signer: CountRange,
    pub forged_per_signer: CountRange,
    /// `g * (g - 1) / 2` for the smallest genuine count `g`.
    pub max_genuine_pairs: usize,
    /// `g * f` for the smallest genuine and forged counts.
    pub max_forged_pairs: usize,
}

impl FilterSummary {
    #[must_use]
    pub fn compute(signers: &[Signer], filter: &SignatureFilter) -> Self {
        let counts: Vec<(usize, usize, usize)> = signers
            .iter()
            .map(|signer| {
                let passing: Vec<&Signature> =
                    signer.signatures().iter().filter(|s| filter.matches(s)).collect();
                let genuine = passing
                    .iter()
                    .filter(|s| s.origin() == Origin::Genuine)
                    .count();
                let forged = passing
                    .iter()
                    .filter(|s| s.origin() == Origin::Forged)
                    .count();
                (passing.len(), genuine, forged)
            })
            .filter(|&(total, _, _)| total > 0)
            .collect();

        let genuine_per_signer = CountRange::of(counts.iter().map(|c| c.1));
        let forged_per_signer = CountRange::of(counts.iter().map(|c| c.2));
        let g = genuine_per_signer.min;
        Self {
            signer_count: counts.len(),
            signatures_per_signer: CountRange::of(counts.iter().map(|c| c.0)),
            genuine_per_signer,
            forged_per_signer,
            max_genuine_pairs: g * g.saturating_sub(1) / 2,
            max_forged_pairs: g * forged_per_signer.min,
        }
    }
}

impl fmt::Display for FilterSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Signers: {}", self.signer_count)?;
        writeln!(f, "Signatures per signer: {}", self.signatures_per_signer)?;
        writeln!(f, "Genuine per signer: {}", self.genuine_per_signer)?;
        writeln!(f, "Forged per signer: {}", self.forged_per_signer)?;
        writeln!(f, "Max genuine pairs per signer: {}", self.max_genuine_pairs)?;
        write!(f, "Max skilled forgery pairs per signer: {}", self.max_forged_pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::fixtures;

    #[test]
    fn all_accepts_everything() {
        let sig = fixtures::signature("u1", "a", Origin::Genuine, 3);
        assert!(SignatureFilter::all().matches(&sig));
        assert!(SignatureFilter::default().matches(&sig));
    }

    #[test]
    fn each_tag_must_be_allowed() {
        let sig = fixtures::signature("u1", "a", Origin::Genuine, 3);
        let finger_only = SignatureFilter::all().with_devices([InputDevice::Finger]);
        assert!(!finger_only.matches(&sig));
        let eval_only = SignatureFilter::all().with_splits([Split::Evaluation]);
        assert!(!eval_only.matches(&sig));
        let mcyt = SignatureFilter::all().with_databases([Database::Mcyt]);
        assert!(mcyt.matches(&sig));
    }

    #[test]
    fn summary_counts_pairs() {
        let signers = vec![fixtures::signer("u1", 4, 3), fixtures::signer("u2", 5, 2)];
        let summary = FilterSummary::compute(&signers, &SignatureFilter::all());
        assert_eq!(summary.signer_count, 2);
        assert_eq!(summary.signatures_per_signer, CountRange { min: 7, max: 7 });
        assert_eq!(summary.genuine_per_signer, CountRange { min: 4, max: 5 });
        assert_eq!(summary.forged_per_signer, CountRange { min: 2, max: 3 });
        assert_eq!(summary.max_genuine_pairs, 6);
        assert_eq!(summary.max_forged_pairs, 8);
    }

    #[test]
    fn summary_skips_signers_without_passing_signatures() {
        let signers = vec![fixtures::signer("u1", 4, 3)];
        let filter = SignatureFilter::all().with_devices([InputDevice::Finger]);
        let summary = FilterSummary::compute(&signers, &filter);
        assert_eq!(summary.signer_count, 0);
        assert_eq!(summary.max_genuine_pairs, 0);
        assert_eq!(summary.max_forged_pairs, 0);
    }

    #[test]
    fn display_lists_allowed_tags() {
        let filter = SignatureFilter::all()
            .with_databases([Database::Mcyt])
            .with_devices([InputDevice::Stylus, InputDevice::Finger])
            .with_splits([Split::Development]);
        assert_eq!(
            filter.to_string(),
            "Databases: Mcyt\nInput devices: Finger, Stylus\nSplits: Development"
        );
    }
}
