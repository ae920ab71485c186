use super::{CoefficientStore, StoreError};
use crate::models::WeightVector;
use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;
use uuid::Uuid;

const DEFAULT_KEY_PREFIX: &str = "reccd:coefficients";

/// Coefficient store backed by Redis, one JSON value per user.
pub struct RedisCoefficientStore {
    client: redis::Client,
    key_prefix: String,
}

impl RedisCoefficientStore {
    pub fn new(client: redis::Client) -> Self {
        Self::with_key_prefix(client, DEFAULT_KEY_PREFIX)
    }

    pub fn with_key_prefix(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn key(&self, user_id: Uuid) -> String {
        format!("{}:{}", self.key_prefix, user_id)
    }
}

#[async_trait]
impl CoefficientStore for RedisCoefficientStore {
    async fn load(&self, user_id: Uuid) -> Result<Option<WeightVector>, StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let json: Option<String> = conn.get(self.key(user_id)).await?;
        match json {
            Some(data) => {
                let weights = serde_json::from_str(&data)
                    .map_err(|e| StoreError::Serialization(e.to_string()))?;
                Ok(Some(weights))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, user_id: Uuid, weights: &WeightVector) -> Result<(), StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let json = serde_json::to_string(weights)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let _: () = conn.set(self.key(user_id), json).await?;

        debug!(user_id = %user_id, "Saved coefficient vector");
        Ok(())
    }
}
