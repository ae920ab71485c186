/// Feature Normalizer
///
/// Converts raw item attributes into rank-based percentiles relative to the
/// current candidate set only. Percentiles are recomputed on every
/// invocation and never persisted; the transform is a pure function of
/// (items, as_of).
use crate::models::{FeatureVector, Item};
use crate::utils::percentile_ranks;
use chrono::{DateTime, Utc};
use tracing::debug;

/// Compute the percentile feature vector for every item, in input order.
///
/// Missing-data policy:
/// - no resolved release date: recency and popularity percentiles are both
///   forced to 1.0, so missing data never penalizes an item on those two
///   features;
/// - resolved date but no rating count: popularity percentile stays null;
/// - null price/rating/search_rank: that one percentile stays null and the
///   item is excluded from that feature's ranking pool.
pub fn normalize(items: &[Item], as_of: DateTime<Utc>) -> Vec<FeatureVector> {
    let today = as_of.date_naive();

    // Whole days since the resolved release date, floored at zero.
    let recency_days: Vec<Option<f64>> = items
        .iter()
        .map(|item| {
            item.resolved_release_date()
                .map(|date| (today - date).num_days().max(0) as f64)
        })
        .collect();

    // Newer items have fewer days, hence a lower ascending rank; the
    // percentile is inverted below so newer ranks higher.
    let recency_pct = percentile_ranks(&recency_days);

    // Rating-count accumulation rate since release.
    let popularity: Vec<Option<f64>> = items
        .iter()
        .zip(&recency_days)
        .map(|(item, days)| match (item.rating_count, days) {
            (Some(count), Some(days)) => Some(count as f64 / (days + 1.0)),
            _ => None,
        })
        .collect();
    let popularity_pct = percentile_ranks(&popularity);

    let price_pct = percentile_ranks(&items.iter().map(|i| i.price).collect::<Vec<_>>());
    let rating_pct = percentile_ranks(&items.iter().map(|i| i.rating).collect::<Vec<_>>());
    let search_rank_pct = percentile_ranks(
        &items
            .iter()
            .map(|i| i.search_rank.map(f64::from))
            .collect::<Vec<_>>(),
    );

    debug!(items = items.len(), "Computed percentile features");

    items
        .iter()
        .enumerate()
        .map(|(i, _)| {
            let has_date = recency_days[i].is_some();
            FeatureVector {
                price: price_pct[i],
                rating: rating_pct[i],
                recency: if has_date {
                    recency_pct[i].map(|p| 1.0 - p)
                } else {
                    Some(1.0)
                },
                popularity: if has_date { popularity_pct[i] } else { Some(1.0) },
                search_rank: search_rank_pct[i],
            }
        })
        .collect()
}
