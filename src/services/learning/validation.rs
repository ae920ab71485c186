/// Feature validation rules.
///
/// Each rule asserts that a learned coefficient's sign matches the assumed
/// preference direction. Rules run in a fixed order; every violation removes
/// the feature and refits on the reduced set before the next rule is
/// evaluated, so the feature subsets shrink strictly and each violated rule
/// costs at most one refit.
use crate::models::Feature;
use tracing::{debug, info};

/// Coefficient sign a feature is not allowed to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForbiddenSign {
    Positive,
    Negative,
}

#[derive(Debug, Clone, Copy)]
pub struct ValidationRule {
    pub feature: Feature,
    pub forbidden: ForbiddenSign,
    pub reason: &'static str,
}

impl ValidationRule {
    pub fn violated_by(&self, coefficient: f64) -> bool {
        match self.forbidden {
            ForbiddenSign::Positive => coefficient > 0.0,
            ForbiddenSign::Negative => coefficient < 0.0,
        }
    }
}

/// Checked in exactly this order.
pub const VALIDATION_RULES: [ValidationRule; 5] = [
    ValidationRule {
        feature: Feature::Price,
        forbidden: ForbiddenSign::Positive,
        reason: "positive price coefficient would mean preferring costlier items",
    },
    ValidationRule {
        feature: Feature::SearchRank,
        forbidden: ForbiddenSign::Positive,
        reason: "positive search rank coefficient would mean preferring worse search positions",
    },
    ValidationRule {
        feature: Feature::Popularity,
        forbidden: ForbiddenSign::Negative,
        reason: "negative popularity coefficient would mean preferring less-reviewed items",
    },
    ValidationRule {
        feature: Feature::Recency,
        forbidden: ForbiddenSign::Negative,
        reason: "negative recency coefficient would mean preferring older items",
    },
    ValidationRule {
        feature: Feature::Rating,
        forbidden: ForbiddenSign::Negative,
        reason: "negative rating coefficient would mean preferring lower-rated items",
    },
];

/// Feature subset and its fitted coefficients, kept in lockstep; the state
/// threaded through the rule fold.
#[derive(Debug, Clone)]
pub struct ValidationState {
    pub active: Vec<Feature>,
    pub coefficients: Vec<f64>,
}

/// Walk the rule list in order, removing violating features and refitting.
///
/// `refit` maps a feature subset to its fitted coefficients, in subset
/// order. Pure with respect to the threaded state: each rule produces a new
/// state, so the final trace is replayable.
pub fn apply_validation_rules<F>(initial: ValidationState, mut refit: F) -> ValidationState
where
    F: FnMut(&[Feature]) -> Vec<f64>,
{
    VALIDATION_RULES.iter().fold(initial, |state, rule| {
        let Some(pos) = state.active.iter().position(|f| *f == rule.feature) else {
            debug!(feature = rule.feature.as_str(), "Feature already removed, skipping rule");
            return state;
        };

        let coefficient = state.coefficients[pos];
        if !rule.violated_by(coefficient) {
            debug!(
                feature = rule.feature.as_str(),
                coefficient, "Keeping feature, sign constraint holds"
            );
            return state;
        }

        info!(
            feature = rule.feature.as_str(),
            coefficient,
            reason = rule.reason,
            "Removing feature and refitting"
        );
        let mut active = state.active;
        active.remove(pos);
        let coefficients = if active.is_empty() {
            Vec::new()
        } else {
            refit(&active)
        };
        ValidationState {
            active,
            coefficients,
        }
    })
}
