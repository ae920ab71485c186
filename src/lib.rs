pub mod config;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use services::catalog::{FeedbackLog, InMemoryCatalog, InMemoryFeedbackLog, ItemCatalog};
pub use services::learning::{CoefficientLearner, LearningError};
pub use services::ranking::{LinearScorer, RankingEngine, RankingError};
pub use services::store::{
    CoefficientStore, InMemoryCoefficientStore, RedisCoefficientStore, StoreError,
};
