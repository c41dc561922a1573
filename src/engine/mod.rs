//! The permission scoring engine.
//!
//! A `ScoreCalculator` is a pure function of a permission set: it resolves
//! each permission in the registry, weights it by impact type, adds synergy
//! and sprawl penalties, normalizes the accumulated risk against fixed
//! ceilings and classifies the resulting score. There is no I/O and no
//! shared mutable state, so one calculator can serve any number of callers.

pub mod classifier;
pub mod result;
pub mod weights;

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Result, TrustError};
use crate::registry::host::SITE_ACCESS_CAP_POINTS;
use crate::registry::{Category, ImpactType, PermissionRegistry, SynergyTable, REGISTRY_VERSION};

pub use classifier::{RiskCategory, TierBand, TierScheme};
pub use result::{PermissionAssessment, ScoreResult, SynergyPenalty};
pub use weights::TypeWeights;

/// Named constant sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Preset {
    /// Synergy-aware, type-weighted model.
    #[serde(rename = "trustguard", alias = "trust_guard")]
    TrustGuard,
    /// Additive model: no synergy, no type weighting.
    #[serde(rename = "safety_center", alias = "safety-center")]
    SafetyCenter,
}

impl Preset {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "trustguard" | "trust_guard" | "detailed" => Some(Self::TrustGuard),
            "safety_center" | "safetycenter" | "simple" => Some(Self::SafetyCenter),
            _ => None,
        }
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::TrustGuard
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TrustGuard => write!(f, "trustguard"),
            Self::SafetyCenter => write!(f, "safety_center"),
        }
    }
}

/// Risk that maps to a score of 0, per dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ceilings {
    pub total: f64,
    pub privacy: f64,
    pub security: f64,
}

/// Penalty for requesting an unusually broad permission set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SprawlConfig {
    /// Distinct permissions allowed before the penalty applies.
    pub threshold: usize,
    pub points_per_excess: f64,
}

impl SprawlConfig {
    pub fn penalty_for(&self, count: usize) -> f64 {
        count.saturating_sub(self.threshold) as f64 * self.points_per_excess
    }
}

/// Every tunable of the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub preset: Preset,
    pub enable_synergy: bool,
    pub enable_type_weighting: bool,
    pub type_weights: TypeWeights,
    pub ceilings: Ceilings,
    pub sprawl: SprawlConfig,
    /// Share of the overall score taken from the worse of the privacy and
    /// security sub-scores. Between 0.5 and 1.0.
    pub worse_dimension_weight: f64,
    pub tiers: TierScheme,
}

impl EngineConfig {
    pub fn trustguard() -> Self {
        Self {
            preset: Preset::TrustGuard,
            enable_synergy: true,
            enable_type_weighting: true,
            type_weights: TypeWeights::default(),
            ceilings: Ceilings {
                total: 200.0,
                privacy: 150.0,
                security: 150.0,
            },
            sprawl: SprawlConfig {
                threshold: 10,
                points_per_excess: 5.0,
            },
            worse_dimension_weight: 0.7,
            tiers: TierScheme::trustguard(),
        }
    }

    pub fn safety_center() -> Self {
        Self {
            preset: Preset::SafetyCenter,
            enable_synergy: false,
            enable_type_weighting: false,
            type_weights: TypeWeights::default(),
            ceilings: Ceilings {
                total: 150.0,
                privacy: 120.0,
                security: 120.0,
            },
            sprawl: SprawlConfig {
                threshold: 10,
                points_per_excess: 5.0,
            },
            worse_dimension_weight: 0.7,
            tiers: TierScheme::safety_center(),
        }
    }

    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::TrustGuard => Self::trustguard(),
            Preset::SafetyCenter => Self::safety_center(),
        }
    }

    /// Check the numeric invariants the calculator relies on.
    pub fn validate(&self) -> Result<()> {
        let ceilings = [
            ("total", self.ceilings.total),
            ("privacy", self.ceilings.privacy),
            ("security", self.ceilings.security),
        ];
        for (name, value) in ceilings {
            if !value.is_finite() || value <= 0.0 {
                return Err(TrustError::Config(format!(
                    "{name} ceiling must be a positive number, got {value}"
                )));
            }
        }
        if !(0.5..=1.0).contains(&self.worse_dimension_weight) {
            return Err(TrustError::Config(format!(
                "worse_dimension_weight must be between 0.5 and 1.0, got {}",
                self.worse_dimension_weight
            )));
        }
        for impact in ImpactType::ALL {
            let weight = self.type_weights.get(impact);
            if !weight.is_finite() || weight < 0.0 {
                return Err(TrustError::Config(format!(
                    "type weight for {impact} must be non-negative, got {weight}"
                )));
            }
        }
        let points = self.sprawl.points_per_excess;
        if !points.is_finite() || points < 0.0 {
            return Err(TrustError::Config(format!(
                "sprawl points_per_excess must be non-negative, got {points}"
            )));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::trustguard()
    }
}

/// Deduplicated, sorted set of permission ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionSet(BTreeSet<String>);

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.0.insert(id.into())
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.0.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Hex SHA-256 over the sorted ids joined by newlines. Equal sets
    /// always share a fingerprint, whatever order they were built in.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                hasher.update(b"\n");
            }
            hasher.update(id.as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Maps permission sets to scores.
#[derive(Debug, Clone)]
pub struct ScoreCalculator {
    config: EngineConfig,
    registry: PermissionRegistry,
    synergies: SynergyTable,
}

static DEFAULT_CALCULATOR: Lazy<ScoreCalculator> = Lazy::new(ScoreCalculator::default);

/// Score a permission list with the default (TrustGuard) engine.
pub fn compute_score<S: AsRef<str>>(permissions: &[S]) -> ScoreResult {
    DEFAULT_CALCULATOR.compute_score(permissions)
}

impl ScoreCalculator {
    /// Calculator over the built-in registry and synergy table.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_registry(config, PermissionRegistry::new())
    }

    pub fn with_registry(config: EngineConfig, registry: PermissionRegistry) -> Self {
        Self {
            config,
            registry,
            synergies: SynergyTable::new(),
        }
    }

    pub fn from_preset(preset: Preset) -> Self {
        Self::new(EngineConfig::from_preset(preset))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &PermissionRegistry {
        &self.registry
    }

    pub fn synergies(&self) -> &SynergyTable {
        &self.synergies
    }

    /// Score a permission list. Duplicates count once and order is
    /// irrelevant.
    pub fn compute_score<S: AsRef<str>>(&self, permissions: &[S]) -> ScoreResult {
        let set: PermissionSet = permissions.iter().map(|p| p.as_ref()).collect();
        self.score_set(&set)
    }

    pub fn score_set(&self, set: &PermissionSet) -> ScoreResult {
        let fingerprint = set.fingerprint();
        if set.is_empty() {
            return self.perfect(fingerprint);
        }

        let mut total = 0.0;
        let mut privacy = 0.0;
        let mut security = 0.0;
        let mut permissions = Vec::with_capacity(set.len());
        // Site-specific host patterns share one capped budget.
        let mut site_points = 0.0;
        let mut site_patterns = 0;

        for id in set.iter() {
            let descriptor = self.registry.lookup(id);
            let weight = if self.config.enable_type_weighting {
                self.config.type_weights.get(descriptor.impact_type)
            } else {
                1.0
            };
            let mut points = descriptor.base_risk_points;
            if self.registry.is_site_pattern(id) {
                site_patterns += 1;
                points = points.min(SITE_ACCESS_CAP_POINTS - site_points).max(0.0);
                site_points += points;
            }
            let weighted = points * weight;

            total += weighted;
            if descriptor.has_category(Category::Privacy) {
                privacy += weighted;
            }
            if descriptor.has_category(Category::Security) {
                security += weighted;
            }

            let recognized = self.registry.recognizes(id);
            permissions.push(PermissionAssessment {
                id: id.to_string(),
                risk_tier: descriptor.risk_tier,
                impact_type: descriptor.impact_type,
                categories: descriptor.categories.clone(),
                base_points: descriptor.base_risk_points,
                weighted_points: weighted,
                recognized,
                suggestion: if recognized {
                    None
                } else {
                    self.registry.suggest(id).map(str::to_string)
                },
            });
        }

        let mut synergy_penalties = Vec::new();
        if self.config.enable_synergy {
            for rule in self.synergies.matching(set) {
                let a = self.registry.lookup(rule.pair.first());
                let b = self.registry.lookup(rule.pair.second());
                let penalty = rule.penalty(a.base_risk_points, b.base_risk_points);

                total += penalty;
                let half = penalty / 2.0;
                if a.has_category(Category::Privacy) || b.has_category(Category::Privacy) {
                    privacy += half;
                }
                if a.has_category(Category::Security) || b.has_category(Category::Security) {
                    security += half;
                }

                tracing::debug!(pair = %rule.pair, penalty, "synergy penalty applied");
                synergy_penalties.push(SynergyPenalty {
                    pair: rule.pair.clone(),
                    multiplier: rule.multiplier,
                    penalty_points: penalty,
                    rationale: rule.rationale.clone(),
                });
            }
        }

        // The site pattern group counts as one permission.
        let sprawl_count = set.len() - site_patterns + usize::from(site_patterns > 0);
        let sprawl_penalty = self.config.sprawl.penalty_for(sprawl_count);
        if sprawl_penalty > 0.0 {
            tracing::debug!(
                count = sprawl_count,
                threshold = self.config.sprawl.threshold,
                sprawl_penalty,
                "sprawl penalty applied"
            );
            total += sprawl_penalty;
        }

        let ceilings = &self.config.ceilings;
        let total_score = normalize(total, ceilings.total);
        let privacy_score = normalize(privacy, ceilings.privacy);
        let security_score = normalize(security, ceilings.security);

        let (worse, better) = if privacy_score <= security_score {
            (privacy_score, security_score)
        } else {
            (security_score, privacy_score)
        };
        let w = self.config.worse_dimension_weight;
        let blended = w * worse + (1.0 - w) * better;
        let overall_score = to_score(total_score.min(blended));

        ScoreResult {
            overall_score,
            risk_category: self.config.tiers.classify(overall_score),
            privacy_score: to_score(privacy_score),
            security_score: to_score(security_score),
            total_risk: total,
            privacy_risk: privacy,
            security_risk: security,
            sprawl_penalty,
            synergy_penalties,
            permissions,
            fingerprint,
            registry_version: REGISTRY_VERSION.into(),
        }
    }

    fn perfect(&self, fingerprint: String) -> ScoreResult {
        ScoreResult {
            overall_score: 100,
            risk_category: self.config.tiers.best(),
            privacy_score: 100,
            security_score: 100,
            total_risk: 0.0,
            privacy_risk: 0.0,
            security_risk: 0.0,
            sprawl_penalty: 0.0,
            synergy_penalties: Vec::new(),
            permissions: Vec::new(),
            fingerprint,
            registry_version: REGISTRY_VERSION.into(),
        }
    }
}

impl Default for ScoreCalculator {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

fn normalize(risk: f64, ceiling: f64) -> f64 {
    (100.0 - (risk / ceiling) * 100.0).clamp(0.0, 100.0)
}

fn to_score(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}
