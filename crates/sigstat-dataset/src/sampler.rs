//! Seeded pair sampling over the genuine, forged and random pools.
//!
//! Each pool is enumerated in a fixed order and sampled without replacement
//! by repeatedly drawing a uniform index and removing it from the pool. The
//! same [`ChaCha8Rng`] is threaded through every draw of a run, so a fixed
//! seed reproduces the whole dataset.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::config::DatasetParameters;
use crate::error::DatasetError;
use crate::filter::SignatureFilter;
use crate::meta::Origin;
use crate::pair::{IndexPair, SignatureRef};
use crate::signature::Signer;

/// Draw up to `count` items from `pool` uniformly without replacement.
///
/// Returns `min(count, pool.len())` items in draw order. Consumes exactly
/// that many values from `rng`.
pub fn draw_without_replacement<T>(mut pool: Vec<T>, count: usize, rng: &mut ChaCha8Rng) -> Vec<T> {
    let take = count.min(pool.len());
    let mut drawn = Vec::with_capacity(take);
    for _ in 0..take {
        let index = rng.gen_range(0..pool.len());
        drawn.push(pool.remove(index));
    }
    drawn
}

/// Indices of `signer`'s signatures that pass `filter`.
fn passing<'a>(signer: &'a Signer, filter: &'a SignatureFilter) -> impl Iterator<Item = usize> + 'a {
    signer
        .signatures()
        .iter()
        .enumerate()
        .filter(move |(_, s)| filter.matches(s))
        .map(|(i, _)| i)
}

/// The three candidate pools for one signer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairPools {
    /// Unordered pairs of distinct genuine signatures, lower index first.
    pub genuine: Vec<IndexPair>,
    /// (genuine, forged) pairs within the signer.
    pub forged: Vec<IndexPair>,
    /// (genuine, any signature of another signer) pairs.
    pub random: Vec<IndexPair>,
}

/// Enumerates and samples pairs from a signer list under a filter.
///
/// Signatures failing the filter are invisible to every pool.
#[derive(Debug, Clone, Copy)]
pub struct PairSampler<'a> {
    signers: &'a [Signer],
    filter: &'a SignatureFilter,
}

impl<'a> PairSampler<'a> {
    #[must_use]
    pub fn new(signers: &'a [Signer], filter: &'a SignatureFilter) -> Self {
        Self { signers, filter }
    }

    fn passing_with_origin(&self, signer: usize, origin: Origin) -> Vec<SignatureRef> {
        let signatures = self.signers[signer].signatures();
        passing(&self.signers[signer], self.filter)
            .filter(|&i| signatures[i].origin() == origin)
            .map(|i| SignatureRef::new(signer, i))
            .collect()
    }

    fn check_signer(&self, signer: usize) -> Result<(), DatasetError> {
        if signer >= self.signers.len() {
            return Err(DatasetError::SignerOutOfRange {
                index: signer,
                n_signers: self.signers.len(),
            });
        }
        Ok(())
    }

    /// Enumerate all three pools for the signer at index `signer`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DatasetError::SignerOutOfRange`] | `signer` is not a valid index |
    pub fn pools(&self, signer: usize) -> Result<PairPools, DatasetError> {
        self.check_signer(signer)?;
        let genuine = self.passing_with_origin(signer, Origin::Genuine);
        let forged = self.passing_with_origin(signer, Origin::Forged);

        let mut pools = PairPools::default();
        for (a, &first) in genuine.iter().enumerate() {
            for &second in &genuine[a + 1..] {
                pools.genuine.push(IndexPair::new(first, second));
            }
        }
        for &g in &genuine {
            for &f in &forged {
                pools.forged.push(IndexPair::new(g, f));
            }
        }

        let filter = self.filter;
        let others: Vec<SignatureRef> = self
            .signers
            .iter()
            .enumerate()
            .filter(|&(other, _)| other != signer)
            .flat_map(|(other, s)| passing(s, filter).map(move |i| SignatureRef::new(other, i)))
            .collect();
        for &g in &genuine {
            for &o in &others {
                pools.random.push(IndexPair::new(g, o));
            }
        }
        Ok(pools)
    }

    /// Sample one signer's pairs: genuine, then forged, then random draws.
    ///
    /// Pools smaller than the requested count are returned whole.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DatasetError::SignerOutOfRange`] | `signer` is not a valid index |
    pub fn sample(
        &self,
        signer: usize,
        params: &DatasetParameters,
        rng: &mut ChaCha8Rng,
    ) -> Result<Vec<IndexPair>, DatasetError> {
        let pools = self.pools(signer)?;
        debug!(
            signer = self.signers[signer].id(),
            genuine_pool = pools.genuine.len(),
            forged_pool = pools.forged.len(),
            random_pool = pools.random.len(),
            "sampling signer"
        );
        let mut pairs = draw_without_replacement(pools.genuine, params.genuine_pairs(), rng);
        pairs.extend(draw_without_replacement(
            pools.forged,
            params.skilled_forgery_pairs(),
            rng,
        ));
        pairs.extend(draw_without_replacement(
            pools.random,
            params.random_forgery_pairs(),
            rng,
        ));
        Ok(pairs)
    }

    /// Indices of signers with at least one passing signature, in ascending order.
    #[must_use]
    pub fn eligible_signers(&self) -> Vec<usize> {
        self.signers
            .iter()
            .enumerate()
            .filter(|(_, s)| passing(s, self.filter).next().is_some())
            .map(|(i, _)| i)
            .collect()
    }

    /// A uniform random permutation of [`eligible_signers`](Self::eligible_signers).
    pub fn permute_signers(&self, rng: &mut ChaCha8Rng) -> Vec<usize> {
        let eligible = self.eligible_signers();
        let n = eligible.len();
        draw_without_replacement(eligible, n, rng)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;

    use super::*;
    use crate::meta::InputDevice;
    use crate::signature::fixtures;

    fn params(genuine: usize, forged: usize, random: usize) -> DatasetParameters {
        DatasetParameters::new("t")
            .unwrap()
            .with_genuine_pairs(genuine)
            .with_skilled_forgery_pairs(forged)
            .with_random_forgery_pairs(random)
    }

    #[test]
    fn draw_returns_min_of_count_and_pool() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(draw_without_replacement(vec![1, 2, 3], 10, &mut rng).len(), 3);
        assert_eq!(draw_without_replacement(vec![1, 2, 3], 2, &mut rng).len(), 2);
        assert!(draw_without_replacement(Vec::<u8>::new(), 4, &mut rng).is_empty());
        assert!(draw_without_replacement(vec![1], 0, &mut rng).is_empty());
    }

    #[test]
    fn draw_is_a_permutation() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut drawn = draw_without_replacement((0..50).collect(), 50, &mut rng);
        drawn.sort_unstable();
        assert_eq!(drawn, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn pool_sizes() {
        let signers = vec![fixtures::signer("u1", 3, 2), fixtures::signer("u2", 4, 1)];
        let filter = SignatureFilter::all();
        let pools = PairSampler::new(&signers, &filter).pools(0).unwrap();
        assert_eq!(pools.genuine.len(), 3);
        assert_eq!(pools.forged.len(), 6);
        assert_eq!(pools.random.len(), 3 * 5);
        assert!(pools.genuine.iter().all(|p| p.reference.signature < p.questioned.signature));
        assert!(pools.random.iter().all(|p| p.questioned.signer == 1));
    }

    #[test]
    fn filter_hides_signatures_from_pools() {
        let signers = vec![fixtures::signer("u1", 3, 2), fixtures::signer("u2", 4, 1)];
        let filter = SignatureFilter::all().with_devices([InputDevice::Finger]);
        let sampler = PairSampler::new(&signers, &filter);
        let pools = sampler.pools(0).unwrap();
        assert_eq!(pools, PairPools::default());
        assert!(sampler.eligible_signers().is_empty());
    }

    #[test]
    fn genuine_request_larger_than_pool() {
        let signers = vec![fixtures::signer("S1", 3, 2)];
        let filter = SignatureFilter::all();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let pairs = PairSampler::new(&signers, &filter)
            .sample(0, &params(5, 0, 0), &mut rng)
            .unwrap();
        assert_eq!(pairs.len(), 3);
        let unique: HashSet<_> = pairs
            .iter()
            .map(|p| (p.reference.signature, p.questioned.signature))
            .collect();
        assert_eq!(unique.len(), 3);
        assert!(pairs.iter().all(|p| p.reference != p.questioned));
    }

    #[test]
    fn same_seed_same_pairs() {
        let signers: Vec<Signer> = (0..5)
            .map(|i| fixtures::signer(&format!("u{i}"), 4, 3))
            .collect();
        let filter = SignatureFilter::all();
        let sampler = PairSampler::new(&signers, &filter);
        let run = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let order = sampler.permute_signers(&mut rng);
            let pairs: Vec<IndexPair> = order
                .iter()
                .flat_map(|&s| sampler.sample(s, &params(3, 2, 4), &mut rng).unwrap())
                .collect();
            (order, pairs)
        };
        assert_eq!(run(7), run(7));
        assert_eq!(run(7).1.len(), 5 * (3 + 2 + 4));
    }

    #[test]
    fn no_duplicates_within_a_call() {
        let signers: Vec<Signer> = (0..3)
            .map(|i| fixtures::signer(&format!("u{i}"), 5, 5))
            .collect();
        let filter = SignatureFilter::all();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let pairs = PairSampler::new(&signers, &filter)
            .sample(1, &params(10, 25, 50), &mut rng)
            .unwrap();
        let unique: HashSet<_> = pairs.iter().collect();
        assert_eq!(unique.len(), pairs.len());
        assert_eq!(pairs.len(), 10 + 25 + 50);
    }

    #[test]
    fn permutation_covers_eligible_signers() {
        let signers: Vec<Signer> = (0..6)
            .map(|i| fixtures::signer(&format!("u{i}"), 1, 0))
            .collect();
        let filter = SignatureFilter::all();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut order = PairSampler::new(&signers, &filter).permute_signers(&mut rng);
        order.sort_unstable();
        assert_eq!(order, (0..6).collect::<Vec<_>>());
    }

    #[test]
    fn out_of_range_signer() {
        let signers = vec![fixtures::signer("u1", 2, 0)];
        let filter = SignatureFilter::all();
        assert!(matches!(
            PairSampler::new(&signers, &filter).pools(4),
            Err(DatasetError::SignerOutOfRange { index: 4, n_signers: 1 })
        ));
    }
}
