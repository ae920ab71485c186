use super::{LinearScorer, RankingError, Result};
use crate::models::{ExclusionSet, Item, RankedItem};
use crate::services::catalog::ItemCatalog;
use crate::services::consolidation::consolidate;
use crate::services::features;
use crate::services::store::{resolve_weights, CoefficientStore};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Personalized ranking engine.
///
/// Stateless batch transform over a catalog snapshot: every request fetches
/// candidates once, normalizes features relative to that set, scores with
/// the user's resolved weights, consolidates variations, and orders by
/// score. Weights are read once per invocation; a concurrent learner write
/// simply means the next invocation sees the new vector.
pub struct RankingEngine {
    catalog: Arc<dyn ItemCatalog>,
    store: Arc<dyn CoefficientStore>,
    /// Lowercased title fragments that disqualify an item outright.
    excluded_title_terms: Vec<String>,
}

impl RankingEngine {
    pub fn new(catalog: Arc<dyn ItemCatalog>, store: Arc<dyn CoefficientStore>) -> Self {
        Self {
            catalog,
            store,
            excluded_title_terms: Vec::new(),
        }
    }

    /// Drop candidates whose title contains any of `terms`
    /// (case-insensitive substring).
    pub fn with_excluded_title_terms(mut self, terms: Vec<String>) -> Self {
        self.excluded_title_terms = terms
            .into_iter()
            .map(|t| t.to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        self
    }

    /// Rank the user's candidates for the given query terms.
    pub async fn rank(
        &self,
        query_terms: &[String],
        user_id: Uuid,
        exclusions: &ExclusionSet,
    ) -> Result<Vec<RankedItem>> {
        self.rank_as_of(query_terms, user_id, exclusions, Utc::now())
            .await
    }

    /// `rank` with an explicit reference time, for deterministic replay.
    pub async fn rank_as_of(
        &self,
        query_terms: &[String],
        user_id: Uuid,
        exclusions: &ExclusionSet,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<RankedItem>> {
        if query_terms.is_empty() {
            return Ok(Vec::new());
        }

        let stored = self.store.load(user_id).await?.unwrap_or_default();
        let weights = resolve_weights(&stored).ok_or(RankingError::NoUsableWeights)?;

        let snapshot = self
            .catalog
            .snapshot(query_terms, user_id, exclusions)
            .await?;
        let candidates = self.match_candidates(snapshot, query_terms);
        if candidates.is_empty() {
            info!(user_id = %user_id, ?query_terms, "No candidates matched the query");
            return Ok(Vec::new());
        }

        debug!(
            user_id = %user_id,
            candidate_count = candidates.len(),
            "Scoring candidates"
        );

        let scorer = LinearScorer::new(weights);
        let feature_vectors = features::normalize(&candidates, as_of);
        let scored: Vec<RankedItem> = candidates
            .into_iter()
            .zip(feature_vectors)
            .map(|(item, features)| {
                let score = scorer.score(&features);
                RankedItem {
                    item,
                    features,
                    score,
                }
            })
            .collect();

        let ranked = consolidate(scored);

        debug!(
            user_id = %user_id,
            result_count = ranked.len(),
            top_score = ranked.first().map(|r| r.score),
            "Ranking complete"
        );
        Ok(ranked)
    }

    /// Select candidates for the requested terms.
    ///
    /// A multi-term request matches on whole delimited tokens of the stored
    /// origin term ("cat" must not match "category"); if nothing matches,
    /// the first term is retried under single-term semantics before the
    /// request is declared empty. A single-term request matches by
    /// substring, mirroring the wildcard search it originates from.
    fn match_candidates(&self, snapshot: Vec<Item>, query_terms: &[String]) -> Vec<Item> {
        let matched: Vec<Item> = if query_terms.len() > 1 {
            let (hits, misses): (Vec<Item>, Vec<Item>) = snapshot
                .into_iter()
                .partition(|item| matches_whole_token(item, query_terms));
            if hits.is_empty() {
                debug!(
                    term = %query_terms[0],
                    "Multi-term query matched nothing, retrying with the first term only"
                );
                misses
                    .into_iter()
                    .filter(|item| matches_substring(item, &query_terms[0]))
                    .collect()
            } else {
                hits
            }
        } else {
            snapshot
                .into_iter()
                .filter(|item| matches_substring(item, &query_terms[0]))
                .collect()
        };

        if self.excluded_title_terms.is_empty() {
            return matched;
        }
        matched
            .into_iter()
            .filter(|item| !self.title_excluded(item))
            .collect()
    }

    fn title_excluded(&self, item: &Item) -> bool {
        let Some(title) = item.title.as_deref() else {
            return false;
        };
        let title = title.to_lowercase();
        self.excluded_title_terms
            .iter()
            .any(|term| title.contains(term))
    }
}

fn matches_whole_token(item: &Item, terms: &[String]) -> bool {
    item.origin_terms()
        .any(|token| terms.iter().any(|term| token == term.trim()))
}

fn matches_substring(item: &Item, term: &str) -> bool {
    item.origin_term.contains(term)
}
