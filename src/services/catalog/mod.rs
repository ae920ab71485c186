/// Collaborator boundaries for the ranking engine.
///
/// The engine never talks to the product-search APIs or the feedback tables
/// directly; it consumes snapshots through these traits. Failures from a
/// collaborator are propagated to the caller unmodified. Retry and backoff
/// policy lives on the other side of this boundary.
use crate::models::{ExclusionSet, FeedbackEvent, Item};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

/// Candidate-item supplier.
#[async_trait]
pub trait ItemCatalog: Send + Sync {
    /// Current snapshot of items eligible for ranking against `terms` for
    /// this user, minus the user's exclusions.
    async fn snapshot(
        &self,
        terms: &[String],
        user_id: Uuid,
        exclusions: &ExclusionSet,
    ) -> Result<Vec<Item>>;
}

/// Historical feedback-event log.
#[async_trait]
pub trait FeedbackLog: Send + Sync {
    /// Every recorded feedback event for the user, relevant or not.
    async fn events_for_user(&self, user_id: Uuid) -> Result<Vec<FeedbackEvent>>;
}

/// Catalog over a fixed in-memory snapshot, applying exclusions the way the
/// backing store's query would. Used by tests and embedders that already
/// hold the items.
pub struct InMemoryCatalog {
    items: Vec<Item>,
}

impl InMemoryCatalog {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl ItemCatalog for InMemoryCatalog {
    async fn snapshot(
        &self,
        _terms: &[String],
        _user_id: Uuid,
        exclusions: &ExclusionSet,
    ) -> Result<Vec<Item>> {
        Ok(self
            .items
            .iter()
            .filter(|item| {
                !exclusions
                    .iter()
                    .any(|e| e.asin == item.asin && e.term == item.origin_term)
            })
            .cloned()
            .collect())
    }
}

/// Feedback log over fixed in-memory events.
#[derive(Default)]
pub struct InMemoryFeedbackLog {
    events: HashMap<Uuid, Vec<FeedbackEvent>>,
}

impl InMemoryFeedbackLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, user_id: Uuid, event: FeedbackEvent) {
        self.events.entry(user_id).or_default().push(event);
    }
}

#[async_trait]
impl FeedbackLog for InMemoryFeedbackLog {
    async fn events_for_user(&self, user_id: Uuid) -> Result<Vec<FeedbackEvent>> {
        Ok(self.events.get(&user_id).cloned().unwrap_or_default())
    }
}
