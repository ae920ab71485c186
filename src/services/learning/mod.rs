/// Coefficient Learning Module
///
/// Offline batch job that fits the user's weight vector from historical
/// positive-feedback events and prunes directionally unreliable features.
///
/// # Workflow
/// 1. Aggregate relevant feedback events per canonical product into
///    training examples (target: engagement rate)
/// 2. Fit a ridge regression on the standardized percentile features
/// 3. Apply the ordered feature-validation rules, refitting after each
///    removal
/// 4. Persist the resulting vector, nulls where features were pruned
///
/// Runs are infrequent and independent; external orchestration keeps
/// concurrent runs for the same user from overlapping. A scorer reading
/// mid-write simply sees either the old or the new vector.
pub mod regression;
pub mod validation;

pub use regression::{ridge_fit, Diagnostics, RidgeFit};
pub use validation::{
    apply_validation_rules, ForbiddenSign, ValidationRule, ValidationState, VALIDATION_RULES,
};

use crate::models::{Feature, FeedbackEvent, TrainingExample, WeightVector};
use crate::services::catalog::FeedbackLog;
use crate::services::store::{CoefficientStore, StoreError};
use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

/// Regularization strength used when none is configured.
pub const DEFAULT_RIDGE_ALPHA: f64 = 1.0;

#[derive(Debug, Error)]
pub enum LearningError {
    /// The feedback log yielded no usable training examples. Stored weights
    /// are left untouched; reported instead of silently corrupting state.
    #[error("no training examples for user {0}")]
    NoTrainingData(Uuid),

    #[error("coefficient store error: {0}")]
    Store(#[from] StoreError),

    #[error("upstream collaborator error: {0}")]
    Upstream(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, LearningError>;

/// Coefficient Learner
pub struct CoefficientLearner {
    feedback: Arc<dyn FeedbackLog>,
    store: Arc<dyn CoefficientStore>,
    alpha: f64,
}

impl CoefficientLearner {
    pub fn new(feedback: Arc<dyn FeedbackLog>, store: Arc<dyn CoefficientStore>) -> Self {
        Self {
            feedback,
            store,
            alpha: DEFAULT_RIDGE_ALPHA,
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Fit, validate, and persist the user's weight vector.
    pub async fn learn(&self, user_id: Uuid) -> Result<WeightVector> {
        self.learn_as_of(user_id, Utc::now()).await
    }

    /// `learn` with an explicit reference time, for deterministic replay.
    pub async fn learn_as_of(
        &self,
        user_id: Uuid,
        as_of: DateTime<Utc>,
    ) -> Result<WeightVector> {
        let events = self.feedback.events_for_user(user_id).await?;
        let examples = build_training_examples(&events, as_of);
        if examples.is_empty() {
            warn!(user_id = %user_id, "No usable training examples, aborting learn run");
            return Err(LearningError::NoTrainingData(user_id));
        }

        info!(
            user_id = %user_id,
            examples = examples.len(),
            alpha = self.alpha,
            "Fitting ridge regression"
        );

        let initial_features = Feature::ALL.to_vec();
        let fit = fit_subset(&examples, &initial_features, self.alpha);
        info!(
            r2 = fit.diagnostics.r2,
            rmse = fit.diagnostics.rmse,
            mae = fit.diagnostics.mae,
            "Initial fit"
        );

        let state = apply_validation_rules(
            ValidationState {
                active: initial_features,
                coefficients: fit.coefficients,
            },
            |subset| {
                let refit = fit_subset(&examples, subset, self.alpha);
                info!(
                    features = subset.len(),
                    r2 = refit.diagnostics.r2,
                    rmse = refit.diagnostics.rmse,
                    mae = refit.diagnostics.mae,
                    "Refit on reduced feature set"
                );
                refit.coefficients
            },
        );

        let mut weights = WeightVector::default();
        for (feature, coefficient) in state.active.iter().zip(&state.coefficients) {
            weights.set(*feature, Some(*coefficient));
        }

        self.store.save(user_id, &weights).await?;
        info!(user_id = %user_id, ?weights, "Persisted learned weight vector");
        Ok(weights)
    }
}

/// One training example per canonical product.
///
/// Only relevant events carrying all five captured percentiles are usable.
/// The earliest event's percentiles represent the group, and the target is
/// the event rate per day since that first event.
pub fn build_training_examples(
    events: &[FeedbackEvent],
    as_of: DateTime<Utc>,
) -> Vec<TrainingExample> {
    // BTreeMap keeps example order deterministic across runs
    let mut groups: BTreeMap<&str, Vec<&FeedbackEvent>> = BTreeMap::new();
    for event in events {
        if !event.is_relevant || !event.percentiles.is_complete() {
            continue;
        }
        groups.entry(event.canonical_asin()).or_default().push(event);
    }

    groups
        .into_iter()
        .map(|(canonical, mut group)| {
            group.sort_by_key(|e| e.occurred_at);
            let first = group[0];
            let days = (as_of - first.occurred_at).num_days().max(1) as f64;
            TrainingExample {
                canonical_asin: canonical.to_string(),
                percentiles: first.percentiles,
                event_count: group.len(),
                engagement_rate: group.len() as f64 / days,
            }
        })
        .collect()
}

fn fit_subset(examples: &[TrainingExample], features: &[Feature], alpha: f64) -> RidgeFit {
    let x = Array2::from_shape_fn((examples.len(), features.len()), |(i, j)| {
        examples[i].percentiles.get(features[j]).unwrap_or(0.0)
    });
    let y = Array1::from_iter(examples.iter().map(|e| e.engagement_rate));
    ridge_fit(&x, &y, alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventType, FeatureVector};
    use crate::services::catalog::InMemoryFeedbackLog;
    use crate::services::store::InMemoryCoefficientStore;

    fn as_of() -> DateTime<Utc> {
        "2026-08-01T00:00:00Z".parse().unwrap()
    }

    fn event(asin: &str, parent: Option<&str>, occurred_at: &str, rating_pct: f64) -> FeedbackEvent {
        FeedbackEvent {
            asin: asin.to_string(),
            parent_asin: parent.map(str::to_string),
            percentiles: FeatureVector {
                price: Some(0.5),
                rating: Some(rating_pct),
                recency: Some(0.5),
                popularity: Some(0.5),
                search_rank: Some(0.5),
            },
            occurred_at: occurred_at.parse().unwrap(),
            event_type: EventType::Purchase,
            is_relevant: true,
        }
    }

    #[test]
    fn variations_aggregate_under_their_parent() {
        let events = vec![
            event("A1", Some("P1"), "2026-07-01T00:00:00Z", 0.8),
            event("A2", Some("P1"), "2026-07-12T00:00:00Z", 0.9),
            event("B1", None, "2026-07-22T00:00:00Z", 0.4),
        ];

        let examples = build_training_examples(&events, as_of());

        assert_eq!(examples.len(), 2);
        let p1 = examples.iter().find(|e| e.canonical_asin == "P1").unwrap();
        assert_eq!(p1.event_count, 2);
        // earliest event's percentiles represent the group
        assert_eq!(p1.percentiles.rating, Some(0.8));
        // 2 events over 31 days
        assert!((p1.engagement_rate - 2.0 / 31.0).abs() < 1e-9);
    }

    #[test]
    fn same_day_events_divide_by_one_day_minimum() {
        let events = vec![event("A1", None, "2026-08-01T00:00:00Z", 0.5)];

        let examples = build_training_examples(&events, as_of());

        assert!((examples[0].engagement_rate - 1.0).abs() < 1e-9);
    }

    #[test]
    fn irrelevant_and_incomplete_events_are_skipped() {
        let mut irrelevant = event("A1", None, "2026-07-01T00:00:00Z", 0.5);
        irrelevant.is_relevant = false;
        let mut incomplete = event("A2", None, "2026-07-01T00:00:00Z", 0.5);
        incomplete.percentiles.price = None;

        let examples = build_training_examples(&[irrelevant, incomplete], as_of());

        assert!(examples.is_empty());
    }

    #[tokio::test]
    async fn empty_training_set_aborts_without_store_writes() {
        let user = Uuid::new_v4();
        let store = Arc::new(InMemoryCoefficientStore::new());

        // pre-existing weights must survive the aborted run
        let mut existing = WeightVector::default();
        existing.set(Feature::Rating, Some(0.3));
        store.save(user, &existing).await.unwrap();

        let learner =
            CoefficientLearner::new(Arc::new(InMemoryFeedbackLog::new()), store.clone());

        let result = learner.learn_as_of(user, as_of()).await;

        assert!(matches!(result, Err(LearningError::NoTrainingData(u)) if u == user));
        assert_eq!(store.load(user).await.unwrap(), Some(existing));
    }

    #[tokio::test]
    async fn learned_weights_are_persisted() {
        let user = Uuid::new_v4();
        let store = Arc::new(InMemoryCoefficientStore::new());
        let mut log = InMemoryFeedbackLog::new();

        // engagement grows with the rating percentile
        for (i, rating_pct) in [0.1, 0.3, 0.5, 0.7, 0.9].iter().enumerate() {
            let day = format!("2026-07-{:02}T00:00:00Z", i + 1);
            let mut e = event(&format!("A{i}"), None, &day, *rating_pct);
            // spread the other features so columns are not constant
            e.percentiles.price = Some(1.0 - rating_pct);
            e.percentiles.search_rank = Some(1.0 - rating_pct);
            e.percentiles.recency = Some(*rating_pct);
            e.percentiles.popularity = Some(*rating_pct);
            log.record(user, e);
        }

        let learner = CoefficientLearner::new(Arc::new(log), store.clone());
        let weights = learner.learn_as_of(user, as_of()).await.unwrap();

        assert_eq!(store.load(user).await.unwrap(), Some(weights));
        // at least one feature survived with a value
        assert!(weights.non_null().count() > 0);
    }

    #[tokio::test]
    async fn positive_price_coefficient_is_pruned_to_null() {
        let user = Uuid::new_v4();
        let store = Arc::new(InMemoryCoefficientStore::new());
        let mut log = InMemoryFeedbackLog::new();

        // engagement rises with the price percentile: the price rule fires.
        // Later events accumulate fewer days, so give pricier products more
        // events per elapsed day via earlier, denser histories.
        let specs: [(f64, usize); 4] = [(0.2, 1), (0.4, 2), (0.7, 5), (0.9, 9)];
        for (i, (price_pct, count)) in specs.iter().enumerate() {
            let parent = format!("P{i}");
            for k in 0..*count {
                let day = format!("2026-06-{:02}T00:00:00Z", (k % 28) + 1);
                let mut e = event(&format!("A{i}"), Some(parent.as_str()), &day, 0.5);
                e.percentiles.price = Some(*price_pct);
                log.record(user, e);
            }
        }

        let learner = CoefficientLearner::new(Arc::new(log), store.clone());
        let weights = learner.learn_as_of(user, as_of()).await.unwrap();

        assert_eq!(weights.price, None, "price should be pruned: {weights:?}");
    }
}
