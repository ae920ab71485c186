use crate::models::{FeatureVector, ResolvedWeights};
use std::cmp::Ordering;

/// Weighted-linear scorer over percentile features.
///
/// `score = Σ percentile_i × weight_i + constant`. A null percentile
/// contributes nothing: a feature with no data anywhere in the candidate
/// set degrades to zero contribution instead of failing the request.
pub struct LinearScorer {
    weights: ResolvedWeights,
}

impl LinearScorer {
    pub fn new(weights: ResolvedWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ResolvedWeights {
        &self.weights
    }

    /// Score a single feature vector. Pure; no side effects.
    pub fn score(&self, features: &FeatureVector) -> f64 {
        let w = &self.weights;
        features.price.unwrap_or(0.0) * w.price
            + features.rating.unwrap_or(0.0) * w.rating
            + features.recency.unwrap_or(0.0) * w.recency
            + features.popularity.unwrap_or(0.0) * w.popularity
            + features.search_rank.unwrap_or(0.0) * w.search_rank
            + w.constant
    }
}

/// Descending score comparator. NaN scores are treated as equal so a
/// degenerate value cannot poison the sort.
pub fn by_score_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}
