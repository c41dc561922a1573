use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::registry::{Category, ImpactType, PermissionPair, RiskTier};

use super::classifier::RiskCategory;

/// Output of one scoring run. Always fully populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// 0-100, higher is safer.
    pub overall_score: u8,
    pub risk_category: RiskCategory,
    pub privacy_score: u8,
    pub security_score: u8,
    /// Accumulated risk points before normalization.
    pub total_risk: f64,
    pub privacy_risk: f64,
    pub security_risk: f64,
    /// Portion of `total_risk` caused by requesting too many permissions.
    pub sprawl_penalty: f64,
    pub synergy_penalties: Vec<SynergyPenalty>,
    /// One entry per distinct permission, sorted by id.
    pub permissions: Vec<PermissionAssessment>,
    /// SHA-256 of the deduplicated, sorted permission set.
    pub fingerprint: String,
    pub registry_version: String,
}

impl ScoreResult {
    /// Synergy contribution to `total_risk`.
    pub fn synergy_total(&self) -> f64 {
        self.synergy_penalties.iter().map(|p| p.penalty_points).sum()
    }

    /// Permissions the registry did not recognize.
    pub fn unrecognized(&self) -> impl Iterator<Item = &PermissionAssessment> {
        self.permissions.iter().filter(|p| !p.recognized)
    }

    /// Permissions ordered by their weighted contribution, largest first.
    pub fn top_contributors(&self, limit: usize) -> Vec<&PermissionAssessment> {
        let mut sorted: Vec<&PermissionAssessment> = self.permissions.iter().collect();
        sorted.sort_by(|a, b| {
            b.weighted_points
                .total_cmp(&a.weighted_points)
                .then_with(|| a.id.cmp(&b.id))
        });
        sorted.truncate(limit);
        sorted
    }
}

/// Extra risk from one matched synergy pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynergyPenalty {
    pub pair: PermissionPair,
    pub multiplier: f64,
    pub penalty_points: f64,
    pub rationale: String,
}

/// How a single requested permission was scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionAssessment {
    /// The id as requested, even when it fell back to `unknown`.
    pub id: String,
    pub risk_tier: RiskTier,
    pub impact_type: ImpactType,
    pub categories: BTreeSet<Category>,
    pub base_points: f64,
    pub weighted_points: f64,
    pub recognized: bool,
    /// Closest known id, for unrecognized permissions that look like typos.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}
