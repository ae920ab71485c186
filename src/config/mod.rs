use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub redis: RedisConfig,
    pub ranking: RankingConfig,
    pub learning: LearningConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    /// Key prefix for stored coefficient vectors.
    pub key_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RankingConfig {
    /// Items whose title contains any of these (case-insensitive) are
    /// dropped before ranking.
    pub excluded_title_terms: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LearningConfig {
    pub ridge_alpha: f64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Config {
            redis: RedisConfig {
                url: env::var("REDIS_URL")
                    .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
                key_prefix: env::var("COEFFICIENT_KEY_PREFIX")
                    .unwrap_or_else(|_| "reccd:coefficients".to_string()),
            },
            ranking: RankingConfig {
                excluded_title_terms: env::var("RANKING_EXCLUDE_TITLE_TERMS")
                    .map(|raw| {
                        raw.split(',')
                            .map(|t| t.trim().to_string())
                            .filter(|t| !t.is_empty())
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            learning: LearningConfig {
                ridge_alpha: env::var("LEARNING_RIDGE_ALPHA")
                    .unwrap_or_else(|_| "1.0".to_string())
                    .parse()
                    .expect("LEARNING_RIDGE_ALPHA must be a valid f64"),
            },
        }
    }
}
