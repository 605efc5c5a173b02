//! Signature model, pair sampling, pair statistics and dataset assembly.
//!
//! Holds the domain types (signers, signatures, feature stores), the seeded
//! [`PairSampler`], the [`StatisticsEngine`] and the [`DatasetGenerator`]
//! that ties them together. Performs no file I/O: loading and persistence
//! live behind the [`DatasetExporter`] seam and in `sigstat-io`.

mod config;
mod error;
mod export;
mod feature;
mod filter;
mod generator;
mod meta;
mod pair;
mod progress;
mod result;
mod sampler;
mod signature;
mod statistics;
mod transform;

pub use config::{DatasetParameters, RunManifest};
pub use error::{DatasetError, FeatureError};
pub use export::{DatasetExporter, MemoryExporter};
pub use feature::{FeatureKind, FeatureStore, FeatureValues, PenState, names};
pub use filter::{CountRange, FilterSummary, SignatureFilter};
pub use generator::DatasetGenerator;
pub use meta::{Database, InputDevice, Origin, ParseMetaError, Split};
pub use pair::{IndexPair, PairOrigin, SignaturePair, SignatureRef};
pub use progress::Progress;
pub use result::{GenerationSummary, OriginCounts, SampledDataset, SliceSummary};
pub use sampler::{PairPools, PairSampler, draw_without_replacement};
pub use signature::{Signature, SignatureMeta, Signer, Stroke};
pub use statistics::{
    PreparedSignature, SignatureInfo, SignaturePairStatistics, SignatureStatistics,
    StatisticsEngine, ratio_deviation, relative_difference, sample_std_dev,
};
pub use transform::{Pipeline, ScaleAnchor, ScalingMode, Transform};
