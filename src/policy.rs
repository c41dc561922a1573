use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::engine::{RiskCategory, ScoreResult};

/// Policy verdict: the final pass/fail decision over every scored
/// extension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyVerdict {
    pub pass: bool,
    pub total_extensions: usize,
    pub failing_extensions: usize,
    pub worst_category: Option<RiskCategory>,
    pub lowest_score: Option<u8>,
    pub fail_threshold: RiskCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_score: Option<u8>,
}

/// Policy configuration loaded from `.modcore-trust.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    /// Category at or beyond which an extension fails.
    #[serde(default = "default_fail_on")]
    pub fail_on: RiskCategory,
    /// Additionally fail any extension scoring below this.
    #[serde(default)]
    pub min_score: Option<u8>,
    /// Permissions removed before scoring (accepted risk).
    #[serde(default)]
    pub ignore_permissions: HashSet<String>,
}

fn default_fail_on() -> RiskCategory {
    RiskCategory::Concerning
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            fail_on: default_fail_on(),
            min_score: None,
            ignore_permissions: HashSet::new(),
        }
    }
}

impl Policy {
    /// Drop ignored permissions from a list.
    pub fn apply(&self, permissions: &[String]) -> Vec<String> {
        permissions
            .iter()
            .filter(|p| !self.ignore_permissions.contains(*p))
            .cloned()
            .collect()
    }

    /// Whether a single result breaches the policy.
    pub fn fails(&self, result: &ScoreResult) -> bool {
        result.risk_category >= self.fail_on
            || self
                .min_score
                .is_some_and(|min| result.overall_score < min)
    }

    /// Evaluate results against this policy and produce a verdict.
    pub fn evaluate<'a>(&self, results: impl IntoIterator<Item = &'a ScoreResult>) -> PolicyVerdict {
        let mut total = 0;
        let mut failing = 0;
        let mut worst: Option<RiskCategory> = None;
        let mut lowest: Option<u8> = None;

        for result in results {
            total += 1;
            if self.fails(result) {
                failing += 1;
            }
            worst = worst.max(Some(result.risk_category));
            lowest = Some(lowest.map_or(result.overall_score, |l| l.min(result.overall_score)));
        }

        PolicyVerdict {
            pass: failing == 0,
            total_extensions: total,
            failing_extensions: failing,
            worst_category: worst,
            lowest_score: lowest,
            fail_threshold: self.fail_on,
            min_score: self.min_score,
        }
    }
}
