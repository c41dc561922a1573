use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::{
    Ceilings, EngineConfig, Preset, ScoreCalculator, SprawlConfig, TierScheme, TypeWeights,
};
use crate::error::Result;
use crate::policy::Policy;
use crate::registry::PermissionRegistry;

/// Top-level configuration from `.modcore-trust.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub registry: RegistrySettings,
    #[serde(default)]
    pub scan: ScanSettings,
    #[serde(default)]
    pub policy: Policy,
}

/// Engine preset plus optional overrides of individual constants.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineSettings {
    #[serde(default)]
    pub preset: Preset,
    pub enable_synergy: Option<bool>,
    pub enable_type_weighting: Option<bool>,
    pub type_weights: Option<TypeWeights>,
    pub ceilings: Option<Ceilings>,
    pub sprawl: Option<SprawlConfig>,
    pub worse_dimension_weight: Option<f64>,
    pub tiers: Option<TierScheme>,
}

impl EngineSettings {
    /// Resolve the preset and overrides into a validated engine config.
    pub fn build(&self) -> Result<EngineConfig> {
        let mut config = EngineConfig::from_preset(self.preset);
        if let Some(on) = self.enable_synergy {
            config.enable_synergy = on;
        }
        if let Some(on) = self.enable_type_weighting {
            config.enable_type_weighting = on;
        }
        if let Some(weights) = self.type_weights {
            config.type_weights = weights;
        }
        if let Some(ceilings) = self.ceilings {
            config.ceilings = ceilings;
        }
        if let Some(sprawl) = self.sprawl {
            config.sprawl = sprawl;
        }
        if let Some(weight) = self.worse_dimension_weight {
            config.worse_dimension_weight = weight;
        }
        if let Some(tiers) = &self.tiers {
            config.tiers = tiers.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

/// Local adjustments to the permission catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrySettings {
    /// Risk points per permission id. Unknown ids are registered.
    #[serde(default)]
    pub overrides: HashMap<String, f64>,
}

/// Which declared permissions are scored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSettings {
    #[serde(default = "default_true")]
    pub include_host_permissions: bool,
    #[serde(default)]
    pub include_optional_permissions: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            include_host_permissions: true,
            include_optional_permissions: false,
        }
    }
}

impl Config {
    /// Load config from a TOML file. Returns default if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Build the calculator this config describes.
    pub fn calculator(&self) -> Result<ScoreCalculator> {
        let engine = self.engine.build()?;
        let registry = PermissionRegistry::new().with_overrides(&self.registry.overrides)?;
        Ok(ScoreCalculator::with_registry(engine, registry))
    }

    /// Generate a starter config file.
    pub fn starter_toml() -> &'static str {
        r#"# modcore-trust configuration

[engine]
# Constant set: "trustguard" (synergy-aware) or "safety_center" (additive).
preset = "trustguard"

# Individual overrides on top of the preset.
# enable_synergy = true
# enable_type_weighting = true
# worse_dimension_weight = 0.7
# type_weights = { code_injection = 1.8, functionality = 0.3 }
# ceilings = { total = 200.0, privacy = 150.0, security = 150.0 }
# sprawl = { threshold = 10, points_per_excess = 5.0 }

# Custom tier bands (highest first; the last must start at 0).
# [[engine.tiers]]
# category = "excellent"
# min_score = 85
# [[engine.tiers]]
# category = "high_risk"
# min_score = 0

[registry]
# Risk points per permission. Unknown ids are registered as new permissions.
# overrides = { "nativeMessaging" = 45.0 }

[scan]
include_host_permissions = true
include_optional_permissions = false

[policy]
# Fail when any extension reaches this category
# (excellent, good, moderate, concerning, high_risk).
fail_on = "concerning"

# Also fail below this score.
# min_score = 60

# Permissions accepted as-is and removed before scoring.
# ignore_permissions = ["storage"]
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RiskCategory;

    #[test]
    fn missing_file_gives_defaults() {
        let config = Config::load(Path::new("/nonexistent/.modcore-trust.toml")).unwrap();
        assert_eq!(config.engine.preset, Preset::TrustGuard);
        assert!(config.scan.include_host_permissions);
        assert_eq!(config.policy.fail_on, RiskCategory::Concerning);
    }

    #[test]
    fn starter_config_parses() {
        let config: Config = toml::from_str(Config::starter_toml()).unwrap();
        let engine = config.engine.build().unwrap();
        assert_eq!(engine, EngineConfig::trustguard());
    }

    #[test]
    fn overrides_apply_on_top_of_preset() {
        let config: Config = toml::from_str(
            r#"
            [engine]
            preset = "safety_center"
            enable_synergy = true
            sprawl = { threshold = 5, points_per_excess = 2.0 }

            [[engine.tiers]]
            category = "good"
            min_score = 60

            [[engine.tiers]]
            category = "high_risk"
            min_score = 0
            "#,
        )
        .unwrap();
        let engine = config.engine.build().unwrap();
        assert_eq!(engine.preset, Preset::SafetyCenter);
        assert!(engine.enable_synergy);
        assert!(!engine.enable_type_weighting);
        assert_eq!(engine.sprawl.threshold, 5);
        assert_eq!(engine.tiers.classify(59), RiskCategory::HighRisk);
    }

    #[test]
    fn invalid_tiers_rejected_at_parse_time() {
        let parsed: std::result::Result<Config, _> = toml::from_str(
            r#"
            [[engine.tiers]]
            category = "good"
            min_score = 60
            "#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn inverted_tiers_rejected_at_parse_time() {
        let parsed: std::result::Result<Config, _> = toml::from_str(
            r#"
            [[engine.tiers]]
            category = "high_risk"
            min_score = 80

            [[engine.tiers]]
            category = "excellent"
            min_score = 0
            "#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn partial_type_weights_override() {
        let config: Config = toml::from_str(
            r#"
            [engine.type_weights]
            code_injection = 2.0
            "#,
        )
        .unwrap();
        let engine = config.engine.build().unwrap();
        assert_eq!(engine.type_weights.code_injection, 2.0);
        assert_eq!(
            engine.type_weights.functionality,
            TypeWeights::default().functionality
        );

        let negative: Config = toml::from_str(
            r#"
            [engine.type_weights]
            network_control = -1.0
            "#,
        )
        .unwrap();
        assert!(negative.engine.build().is_err());
    }

    #[test]
    fn invalid_weight_rejected_at_build_time() {
        let config: Config = toml::from_str(
            r#"
            [engine]
            worse_dimension_weight = 0.2
            "#,
        )
        .unwrap();
        assert!(config.engine.build().is_err());
    }

    #[test]
    fn registry_overrides_reach_calculator() {
        let config: Config = toml::from_str(
            r#"
            [engine]
            preset = "safety_center"

            [registry]
            overrides = { "storage" = 0.0, "futureApi" = 12.0 }
            "#,
        )
        .unwrap();
        let calc = config.calculator().unwrap();
        assert_eq!(calc.compute_score(&["storage"]).total_risk, 0.0);
        assert_eq!(calc.compute_score(&["futureApi"]).total_risk, 12.0);
        assert!(calc.compute_score(&["futureApi"]).permissions[0].recognized);
    }

    #[test]
    fn load_reads_policy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".modcore-trust.toml");
        std::fs::write(
            &path,
            "[policy]\nfail_on = \"moderate\"\nignore_permissions = [\"tabs\"]\n",
        )
        .unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.policy.fail_on, RiskCategory::Moderate);
        assert!(config.policy.ignore_permissions.contains("tabs"));
    }
}
