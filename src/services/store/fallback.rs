use crate::models::{ResolvedWeights, WeightVector};
use tracing::warn;

/// Resolve a possibly-null stored vector into scoring-time weights.
///
/// Substitutes are derived from the smallest non-null magnitude: null price
/// and search-rank weights default mildly negative (cheaper and
/// better-positioned still preferred), the remaining features mildly
/// positive. Popularity and recency are additionally clamped to be
/// non-negative even when a learned weight exists. The constant re-centers
/// the fully-neutral item (every percentile = 1) at a score of 1.
///
/// Returns `None` when every weight is null: there is no magnitude to derive
/// substitutes from, and ranking cannot proceed.
///
/// Resolution is recomputed from the stored vector on every invocation and
/// never persisted.
pub fn resolve_weights(weights: &WeightVector) -> Option<ResolvedWeights> {
    let min_abs = weights
        .non_null()
        .map(|(_, w)| w.abs())
        .fold(None, |acc: Option<f64>, w| Some(acc.map_or(w, |a| a.min(w))))?;
    let substitute = min_abs / 2.0;

    let price = weights.price.unwrap_or_else(|| {
        warn!(fallback = -substitute, "price weight is null, using fallback");
        -substitute
    });
    let search_rank = weights.search_rank.unwrap_or_else(|| {
        warn!(fallback = -substitute, "search rank weight is null, using fallback");
        -substitute
    });
    let rating = weights.rating.unwrap_or_else(|| {
        warn!(fallback = substitute, "rating weight is null, using fallback");
        substitute
    });

    // Popularity and recency must never pull a score down.
    let popularity = match weights.popularity {
        Some(w) if w < 0.0 => {
            warn!(learned = w, corrected = substitute, "popularity weight negative, correcting");
            substitute
        }
        Some(w) => w,
        None => {
            warn!(fallback = substitute, "popularity weight is null, using fallback");
            substitute
        }
    };
    let recency = match weights.recency {
        Some(w) if w < 0.0 => {
            warn!(learned = w, corrected = substitute, "recency weight negative, correcting");
            substitute
        }
        Some(w) => w,
        None => {
            warn!(fallback = substitute, "recency weight is null, using fallback");
            substitute
        }
    };

    let sum = price + rating + recency + popularity + search_rank;
    Some(ResolvedWeights {
        price,
        rating,
        recency,
        popularity,
        search_rank,
        constant: 1.0 - sum,
    })
}
