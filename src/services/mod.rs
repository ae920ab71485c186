pub mod catalog;
pub mod consolidation;
pub mod features;
pub mod learning;
pub mod ranking;
pub mod store;

pub use learning::CoefficientLearner;
pub use ranking::{LinearScorer, RankingEngine};
