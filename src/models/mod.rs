use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Delimiter joining multiple query terms inside `Item::origin_term`.
pub const TERM_DELIMITER: char = '|';

/// One product listing from the catalog snapshot. Created by the catalog
/// collaborator; the ranking engine never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub asin: String,
    /// Shared identifier grouping variations of one canonical product.
    /// Absent or empty means the listing stands on its own.
    pub parent_asin: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
    pub price: Option<f64>,
    /// Star rating, 0–5.
    pub rating: Option<f64>,
    pub rating_count: Option<u64>,
    /// Position in the upstream search results, 1 = best.
    pub search_rank: Option<u32>,
    pub release_date: Option<NaiveDate>,
    pub listed_date: Option<NaiveDate>,
    pub oldest_review: Option<NaiveDate>,
    /// Query term(s) that produced this item, pipe-delimited when several.
    pub origin_term: String,
}

impl Item {
    /// Non-empty parent ASIN, if this listing is a variation.
    pub fn canonical_parent(&self) -> Option<&str> {
        self.parent_asin.as_deref().filter(|p| !p.is_empty())
    }

    /// Earliest of the three candidate date sources, if any is known.
    pub fn resolved_release_date(&self) -> Option<NaiveDate> {
        [self.release_date, self.listed_date, self.oldest_review]
            .into_iter()
            .flatten()
            .min()
    }

    /// Individual query terms stored in `origin_term`.
    pub fn origin_terms(&self) -> impl Iterator<Item = &str> {
        self.origin_term
            .split(TERM_DELIMITER)
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// The five scoring features, in canonical column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    Price,
    Rating,
    Recency,
    Popularity,
    SearchRank,
}

impl Feature {
    pub const ALL: [Feature; 5] = [
        Feature::Price,
        Feature::Rating,
        Feature::Recency,
        Feature::Popularity,
        Feature::SearchRank,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Price => "price_percentile",
            Feature::Rating => "rating_percentile",
            Feature::Recency => "recency_percentile",
            Feature::Popularity => "popularity_percentile",
            Feature::SearchRank => "search_rank_percentile",
        }
    }
}

/// Per-item percentile features, each in [0, 1] relative to the candidate
/// set of the current invocation.
///
/// A null entry means the underlying raw value was missing and the feature
/// contributes nothing at scoring time. Recency and popularity are never
/// null after normalization: items without a resolved release date get 1.0
/// (missing data is treated as favorable for those two features only).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub price: Option<f64>,
    pub rating: Option<f64>,
    pub recency: Option<f64>,
    pub popularity: Option<f64>,
    pub search_rank: Option<f64>,
}

impl FeatureVector {
    pub fn get(&self, feature: Feature) -> Option<f64> {
        match feature {
            Feature::Price => self.price,
            Feature::Rating => self.rating,
            Feature::Recency => self.recency,
            Feature::Popularity => self.popularity,
            Feature::SearchRank => self.search_rank,
        }
    }

    /// True when every feature carries a value.
    pub fn is_complete(&self) -> bool {
        Feature::ALL.iter().all(|f| self.get(*f).is_some())
    }
}

/// Learned weights as persisted by the coefficient store.
///
/// A null weight was pruned by a validation rule: historical evidence
/// contradicted the assumed preference direction, so the signal is unused
/// until more data arrives. The constant term is never persisted; it is
/// derived during fallback resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightVector {
    pub price: Option<f64>,
    pub rating: Option<f64>,
    pub recency: Option<f64>,
    pub popularity: Option<f64>,
    pub search_rank: Option<f64>,
}

impl WeightVector {
    pub fn get(&self, feature: Feature) -> Option<f64> {
        match feature {
            Feature::Price => self.price,
            Feature::Rating => self.rating,
            Feature::Recency => self.recency,
            Feature::Popularity => self.popularity,
            Feature::SearchRank => self.search_rank,
        }
    }

    pub fn set(&mut self, feature: Feature, weight: Option<f64>) {
        match feature {
            Feature::Price => self.price = weight,
            Feature::Rating => self.rating = weight,
            Feature::Recency => self.recency = weight,
            Feature::Popularity => self.popularity = weight,
            Feature::SearchRank => self.search_rank = weight,
        }
    }

    pub fn non_null(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        Feature::ALL
            .iter()
            .filter_map(|f| self.get(*f).map(|w| (*f, w)))
    }
}

/// Scoring-time weights with every entry resolved; the only form the scorer
/// accepts. `constant` re-centers the fully-neutral item at a score of 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedWeights {
    pub price: f64,
    pub rating: f64,
    pub recency: f64,
    pub popularity: f64,
    pub search_rank: f64,
    pub constant: f64,
}

impl ResolvedWeights {
    pub fn sum(&self) -> f64 {
        self.price + self.rating + self.recency + self.popularity + self.search_rank
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Purchase,
    Click,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Purchase => "purchase",
            EventType::Click => "click",
        }
    }
}

/// One positive or negative feedback event, carrying the percentile values
/// captured when the event happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackEvent {
    pub asin: String,
    pub parent_asin: Option<String>,
    pub percentiles: FeatureVector,
    pub occurred_at: DateTime<Utc>,
    pub event_type: EventType,
    pub is_relevant: bool,
}

impl FeedbackEvent {
    /// Identifier of the canonical product this event counts toward.
    pub fn canonical_asin(&self) -> &str {
        self.parent_asin
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or(&self.asin)
    }
}

/// One regression row per (user, canonical product), rebuilt on every
/// learning run and never persisted.
#[derive(Debug, Clone)]
pub struct TrainingExample {
    pub canonical_asin: String,
    pub percentiles: FeatureVector,
    pub event_count: usize,
    /// Feedback events per day since the first event for this product.
    pub engagement_rate: f64,
}

/// A scored, consolidated entry in the ranking output.
#[derive(Debug, Clone)]
pub struct RankedItem {
    pub item: Item,
    pub features: FeatureVector,
    pub score: f64,
}

/// An (item, term) pair the user marked irrelevant; the catalog excludes
/// these from the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Exclusion {
    pub asin: String,
    pub term: String,
}

pub type ExclusionSet = HashSet<Exclusion>;
