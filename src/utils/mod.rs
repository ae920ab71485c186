// Utility functions for reccd-ranking

use std::cmp::Ordering;

/// Fractional percentile ranks (average rank / N) over the non-null entries.
///
/// Ties receive the mean rank of their tied group. Null entries stay null
/// and do not count toward N, so a feature that is missing everywhere
/// yields all-null percentiles rather than an error.
pub fn percentile_ranks(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    let mut present: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .collect();
    if present.is_empty() {
        return out;
    }

    present.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

    let n = present.len() as f64;
    let mut start = 0;
    while start < present.len() {
        let mut end = start;
        while end + 1 < present.len() && present[end + 1].1 == present[start].1 {
            end += 1;
        }
        // 1-based ranks; the tied group shares its mean rank
        let mean_rank = (start + end + 2) as f64 / 2.0;
        for &(idx, _) in &present[start..=end] {
            out[idx] = Some(mean_rank / n);
        }
        start = end + 1;
    }

    out
}
