/// Consolidation Layer
///
/// Collapses variant listings (color/size of one product) that share a
/// parent ASIN into a single representative entry. Standalone items pass
/// through untouched; only explicit parent-sharing triggers consolidation.
use crate::models::RankedItem;
use crate::services::ranking::scorer::by_score_desc;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

/// Pick one representative per parent ASIN and return the combined list
/// ordered by descending score.
///
/// Representative selection keys, in order: presence of a rating count
/// (more complete data), higher score, better (lower) search rank, lower
/// price. Nulls sort last on the rank and price keys.
pub fn consolidate(scored: Vec<RankedItem>) -> Vec<RankedItem> {
    let input_count = scored.len();

    let mut groups: HashMap<String, Vec<RankedItem>> = HashMap::new();
    let mut output: Vec<RankedItem> = Vec::new();

    for entry in scored {
        match entry.item.canonical_parent() {
            Some(parent) => groups.entry(parent.to_string()).or_default().push(entry),
            None => output.push(entry),
        }
    }

    let group_count = groups.len();
    for (_, variations) in groups {
        if let Some(best) = variations.into_iter().min_by(representative_order) {
            output.push(best);
        }
    }

    output.sort_by(|a, b| by_score_desc(a.score, b.score));

    debug!(
        input = input_count,
        parents = group_count,
        output = output.len(),
        "Consolidated variations"
    );
    output
}

/// `Less` means "preferred as the representative".
fn representative_order(a: &RankedItem, b: &RankedItem) -> Ordering {
    b.item
        .rating_count
        .is_some()
        .cmp(&a.item.rating_count.is_some())
        .then_with(|| by_score_desc(a.score, b.score))
        .then_with(|| {
            ascending_nulls_last(
                a.item.search_rank.map(f64::from),
                b.item.search_rank.map(f64::from),
            )
        })
        .then_with(|| ascending_nulls_last(a.item.price, b.item.price))
}

fn ascending_nulls_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
