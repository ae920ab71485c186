/// Coefficient Store
///
/// Durable storage for learned weight vectors, keyed by user, plus the
/// scoring-time fallback resolution that turns a possibly-null stored vector
/// into the non-null form the scorer accepts.
mod fallback;
mod redis_store;

pub use fallback::resolve_weights;
pub use redis_store::RedisCoefficientStore;

use crate::models::WeightVector;
use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("serialization error: {0}")]
    Serialization(String),
}

#[async_trait]
pub trait CoefficientStore: Send + Sync {
    /// Stored weights for the user; `None` when nothing has been learned yet.
    async fn load(&self, user_id: Uuid) -> Result<Option<WeightVector>, StoreError>;

    /// Persist the weights, nulls included.
    async fn save(&self, user_id: Uuid, weights: &WeightVector) -> Result<(), StoreError>;
}

/// Process-local store for tests and embedders without a Redis deployment.
#[derive(Default)]
pub struct InMemoryCoefficientStore {
    weights: DashMap<Uuid, WeightVector>,
}

impl InMemoryCoefficientStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CoefficientStore for InMemoryCoefficientStore {
    async fn load(&self, user_id: Uuid) -> Result<Option<WeightVector>, StoreError> {
        Ok(self.weights.get(&user_id).map(|w| *w))
    }

    async fn save(&self, user_id: Uuid, weights: &WeightVector) -> Result<(), StoreError> {
        self.weights.insert(user_id, *weights);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Feature;

    #[tokio::test]
    async fn in_memory_store_roundtrips() {
        let store = InMemoryCoefficientStore::new();
        let user = Uuid::new_v4();

        assert_eq!(store.load(user).await.unwrap(), None);

        let mut weights = WeightVector::default();
        weights.set(Feature::Rating, Some(0.3));
        store.save(user, &weights).await.unwrap();

        assert_eq!(store.load(user).await.unwrap(), Some(weights));
    }
}
