//! Signature pairs and their ground-truth origin.

use std::fmt;

use serde::Serialize;

use crate::error::DatasetError;
use crate::meta::Origin;
use crate::signature::{Signature, Signer};

/// Ground truth of a pair, from the questioned signature's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PairOrigin {
    /// Same signer, questioned signature genuine.
    Genuine,
    /// Same signer, questioned signature forged.
    Forged,
    /// Different signers, or a questioned signature of unknown origin.
    Random,
}

impl PairOrigin {
    #[must_use]
    pub fn classify(reference: &Signature, questioned: &Signature) -> Self {
        if reference.signer_id() != questioned.signer_id() {
            return Self::Random;
        }
        match questioned.origin() {
            Origin::Genuine => Self::Genuine,
            Origin::Forged => Self::Forged,
            Origin::Unknown => Self::Random,
        }
    }

    /// 1 for a genuine match, 0 otherwise.
    #[must_use]
    pub fn expected_label(self) -> u8 {
        u8::from(self == Self::Genuine)
    }
}

impl fmt::Display for PairOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Genuine => "Genuine",
            Self::Forged => "Forged",
            Self::Random => "Random",
        })
    }
}

/// Position of a signature inside a signer list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SignatureRef {
    /// Index into the signer list.
    pub signer: usize,
    /// Index into that signer's signatures.
    pub signature: usize,
}

impl SignatureRef {
    #[must_use]
    pub fn new(signer: usize, signature: usize) -> Self {
        Self { signer, signature }
    }

    /// Look the signature up in `signers`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DatasetError::SignerOutOfRange`] | `signer` is not a valid index |
    /// | [`DatasetError::SignatureOutOfRange`] | `signature` is not a valid index for that signer |
    pub fn resolve<'a>(&self, signers: &'a [Signer]) -> Result<&'a Signature, DatasetError> {
        let signer = signers
            .get(self.signer)
            .ok_or(DatasetError::SignerOutOfRange {
                index: self.signer,
                n_signers: signers.len(),
            })?;
        signer
            .signatures()
            .get(self.signature)
            .ok_or_else(|| DatasetError::SignatureOutOfRange {
                signer: signer.id().to_string(),
                index: self.signature,
                n_signatures: signer.signatures().len(),
            })
    }
}

/// A sampled pair expressed as positions in a signer list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexPair {
    pub reference: SignatureRef,
    pub questioned: SignatureRef,
}

impl IndexPair {
    #[must_use]
    pub fn new(reference: SignatureRef, questioned: SignatureRef) -> Self {
        Self {
            reference,
            questioned,
        }
    }

    /// Resolve both members against `signers`.
    ///
    /// # Errors
    ///
    /// Index errors from [`SignatureRef::resolve`], or
    /// [`DatasetError::SelfPair`] if both refer to the same signature.
    pub fn resolve<'a>(&self, signers: &'a [Signer]) -> Result<SignaturePair<'a>, DatasetError> {
        SignaturePair::new(
            self.reference.resolve(signers)?,
            self.questioned.resolve(signers)?,
        )
    }
}

/// Two distinct signatures and their computed origin.
#[derive(Debug, Clone, Copy)]
pub struct SignaturePair<'a> {
    reference: &'a Signature,
    questioned: &'a Signature,
    origin: PairOrigin,
}

impl<'a> SignaturePair<'a> {
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DatasetError::SelfPair`] | both arguments are the same signature |
    pub fn new(reference: &'a Signature, questioned: &'a Signature) -> Result<Self, DatasetError> {
        if std::ptr::eq(reference, questioned) {
            return Err(DatasetError::SelfPair {
                signature_id: reference.id().to_string(),
            });
        }
        Ok(Self {
            reference,
            questioned,
            origin: PairOrigin::classify(reference, questioned),
        })
    }

    #[must_use]
    pub fn reference(&self) -> &'a Signature {
        self.reference
    }

    #[must_use]
    pub fn questioned(&self) -> &'a Signature {
        self.questioned
    }

    #[must_use]
    pub fn origin(&self) -> PairOrigin {
        self.origin
    }

    #[must_use]
    pub fn expected_label(&self) -> u8 {
        self.origin.expected_label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::fixtures;

    #[test]
    fn classifies_three_ways() {
        let a = fixtures::signature("u1", "u1_g_1", Origin::Genuine, 3);
        let b = fixtures::signature("u1", "u1_g_2", Origin::Genuine, 3);
        let f = fixtures::signature("u1", "u1_s_1", Origin::Forged, 3);
        let other = fixtures::signature("u2", "u2_g_1", Origin::Genuine, 3);
        let unknown = fixtures::signature("u1", "u1_x", Origin::Unknown, 3);

        assert_eq!(PairOrigin::classify(&a, &b), PairOrigin::Genuine);
        assert_eq!(PairOrigin::classify(&a, &f), PairOrigin::Forged);
        assert_eq!(PairOrigin::classify(&a, &other), PairOrigin::Random);
        assert_eq!(PairOrigin::classify(&a, &unknown), PairOrigin::Random);
    }

    #[test]
    fn only_genuine_is_labelled_one() {
        assert_eq!(PairOrigin::Genuine.expected_label(), 1);
        assert_eq!(PairOrigin::Forged.expected_label(), 0);
        assert_eq!(PairOrigin::Random.expected_label(), 0);
    }

    #[test]
    fn rejects_self_pair() {
        let a = fixtures::signature("u1", "u1_g_1", Origin::Genuine, 3);
        let err = SignaturePair::new(&a, &a).unwrap_err();
        assert!(matches!(err, DatasetError::SelfPair { signature_id } if signature_id == "u1_g_1"));
    }

    #[test]
    fn equal_but_distinct_signatures_may_pair() {
        let a = fixtures::signature("u1", "u1_g_1", Origin::Genuine, 3);
        let b = a.clone();
        let pair = SignaturePair::new(&a, &b).unwrap();
        assert_eq!(pair.origin(), PairOrigin::Genuine);
    }

    #[test]
    fn resolve_checks_indices() {
        let signers = vec![fixtures::signer("u1", 2, 1)];
        let ok = IndexPair::new(SignatureRef::new(0, 0), SignatureRef::new(0, 2));
        assert_eq!(ok.resolve(&signers).unwrap().origin(), PairOrigin::Forged);

        let bad_signer = IndexPair::new(SignatureRef::new(0, 0), SignatureRef::new(3, 0));
        assert!(matches!(
            bad_signer.resolve(&signers),
            Err(DatasetError::SignerOutOfRange { index: 3, n_signers: 1 })
        ));

        let bad_sig = IndexPair::new(SignatureRef::new(0, 9), SignatureRef::new(0, 0));
        assert!(matches!(
            bad_sig.resolve(&signers),
            Err(DatasetError::SignatureOutOfRange { index: 9, n_signatures: 3, .. })
        ));

        let same = IndexPair::new(SignatureRef::new(0, 1), SignatureRef::new(0, 1));
        assert!(matches!(same.resolve(&signers), Err(DatasetError::SelfPair { .. })));
    }
}
