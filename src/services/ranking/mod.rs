/// Ranking Module
///
/// The scoring half of the engine: a weighted-linear scorer over percentile
/// features, and the `RankingEngine` entry point that orchestrates
/// normalize → score → consolidate → order for one request.
///
/// # Workflow
/// 1. Load the user's weight vector and resolve null entries (fallback)
/// 2. Fetch the candidate snapshot from the catalog collaborator
/// 3. Match candidates against the requested query terms
/// 4. Normalize features, score, consolidate by parent ASIN
/// 5. Return items ordered by descending score
pub mod engine;
pub mod scorer;

pub use engine::RankingEngine;
pub use scorer::LinearScorer;

use crate::services::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RankingError {
    /// Every stored weight is null (or nothing is stored at all): fallback
    /// has no magnitude to derive substitutes from, so ranking cannot
    /// proceed. Distinct from an empty result on purpose.
    #[error("no usable coefficients: all weights are null and no fallback is possible")]
    NoUsableWeights,

    #[error("coefficient store error: {0}")]
    Store(#[from] StoreError),

    #[error("upstream collaborator error: {0}")]
    Upstream(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RankingError>;
