//! modcore-trust: permission risk scoring for browser extensions.
//!
//! Maps the permissions an extension requests to a 0-100 trust score, a
//! risk category, and privacy/security sub-scores. Risky combinations are
//! amplified through synergy rules, and oversized permission sets pay a
//! sprawl penalty. Scoring is pure and deterministic.
//!
//! # Quick Start
//!
//! ```
//! use modcore_trust::engine::{compute_score, RiskCategory};
//!
//! let result = compute_score(&["<all_urls>", "webRequest", "scripting"]);
//! assert_eq!(result.risk_category, RiskCategory::HighRisk);
//! println!("score {}, synergy {:.1}", result.overall_score, result.synergy_total());
//! ```
//!
//! Scanning a directory of unpacked extensions:
//!
//! ```no_run
//! use std::path::Path;
//! use modcore_trust::{scan, ScanOptions};
//!
//! let report = scan(Path::new("./extensions"), &ScanOptions::default()).unwrap();
//! println!("Pass: {}, Extensions: {}", report.verdict.pass, report.extensions.len());
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod policy;
pub mod registry;
pub mod sandbox;
pub mod source;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use config::Config;
use engine::{Preset, RiskCategory, ScoreResult};
use error::Result;
use output::OutputFormat;
use policy::PolicyVerdict;
use source::{ExtensionRecord, ManifestDirSource, PermissionSource};

/// Name of the per-project config file.
pub const CONFIG_FILE_NAME: &str = ".modcore-trust.toml";

/// Options for a scan invocation.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Path to config file (defaults to `.modcore-trust.toml` in scan dir).
    pub config_path: Option<PathBuf>,
    /// Output format.
    pub format: OutputFormat,
    /// CLI override for the engine preset.
    pub preset_override: Option<Preset>,
    /// CLI override for the fail_on threshold.
    pub fail_on_override: Option<RiskCategory>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            config_path: None,
            format: OutputFormat::Console,
            preset_override: None,
            fail_on_override: None,
        }
    }
}

impl ScanOptions {
    /// Load the config (explicit path, else `base_dir/.modcore-trust.toml`)
    /// and apply CLI overrides.
    pub fn resolve_config(&self, base_dir: &Path) -> Result<Config> {
        let config_path = self
            .config_path
            .clone()
            .unwrap_or_else(|| base_dir.join(CONFIG_FILE_NAME));
        let mut config = Config::load(&config_path)?;

        if let Some(preset) = self.preset_override {
            config.engine.preset = preset;
        }
        if let Some(fail_on) = self.fail_on_override {
            config.policy.fail_on = fail_on;
        }
        Ok(config)
    }
}

/// Score and verdict for one extension.
#[derive(Debug, Clone, Serialize)]
pub struct ExtensionAssessment {
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub passed: bool,
    pub result: ScoreResult,
}

/// Complete assessment report.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentReport {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub preset: Preset,
    pub registry_version: String,
    pub extensions: Vec<ExtensionAssessment>,
    pub verdict: PolicyVerdict,
}

/// Score every extension a source provides and evaluate the policy.
pub fn assess(source: &dyn PermissionSource, config: &Config) -> Result<AssessmentReport> {
    let records = source.load()?;
    assess_records(records, source.describe(), config)
}

/// Score already-loaded records and evaluate the policy.
pub fn assess_records(
    records: Vec<ExtensionRecord>,
    source: String,
    config: &Config,
) -> Result<AssessmentReport> {
    let calculator = config.calculator()?;

    let extensions: Vec<ExtensionAssessment> = records
        .into_iter()
        .map(|record| {
            let permissions = config
                .policy
                .apply(&record.effective_permissions(&config.scan));
            let result = calculator.compute_score(&permissions);
            tracing::debug!(
                extension = %record.name,
                score = result.overall_score,
                category = %result.risk_category,
                "scored extension"
            );
            ExtensionAssessment {
                passed: !config.policy.fails(&result),
                name: record.name,
                version: record.version,
                path: record.path,
                result,
            }
        })
        .collect();

    let verdict = config.policy.evaluate(extensions.iter().map(|e| &e.result));

    Ok(AssessmentReport {
        generated_at: Utc::now(),
        source,
        preset: calculator.config().preset,
        registry_version: registry::REGISTRY_VERSION.into(),
        extensions,
        verdict,
    })
}

/// Run a complete scan: discover manifests, score, evaluate policy.
pub fn scan(path: &Path, options: &ScanOptions) -> Result<AssessmentReport> {
    let base_dir = if path.is_file() {
        path.parent().unwrap_or(Path::new("."))
    } else {
        path
    };
    let config = options.resolve_config(base_dir)?;
    assess(&ManifestDirSource::new(path), &config)
}

/// Render an assessment report in the specified format.
pub fn render_report(report: &AssessmentReport, format: OutputFormat) -> Result<String> {
    output::render(report, format)
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use source::StaticSource;

    fn write_extension(root: &Path, dir: &str, permissions: &str) {
        let dir = root.join(dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("manifest.json"),
            format!(
                r#"{{"manifest_version": 3, "name": "{}", "version": "1.0", "permissions": {}}}"#,
                dir.file_name().unwrap().to_string_lossy(),
                permissions
            ),
        )
        .unwrap();
    }

    #[test]
    fn safe_extension_passes() {
        let root = tempfile::tempdir().unwrap();
        write_extension(root.path(), "clock", r#"["alarms", "storage"]"#);
        let report = scan(root.path(), &ScanOptions::default()).unwrap();
        assert_eq!(report.extensions.len(), 1);
        assert!(report.verdict.pass);
        assert_eq!(report.extensions[0].result.risk_category, RiskCategory::Excellent);
    }

    #[test]
    fn interceptor_fails() {
        let root = tempfile::tempdir().unwrap();
        write_extension(root.path(), "clock", r#"["alarms"]"#);
        write_extension(
            root.path(),
            "sniffer",
            r#"["webRequest", "webRequestBlocking", "scripting", "<all_urls>"]"#,
        );
        let report = scan(root.path(), &ScanOptions::default()).unwrap();
        assert!(!report.verdict.pass);
        assert_eq!(report.verdict.failing_extensions, 1);
        let sniffer = report
            .extensions
            .iter()
            .find(|e| e.name == "sniffer")
            .unwrap();
        assert!(!sniffer.passed);
        assert!(sniffer.result.synergy_penalties.len() >= 2);
    }

    #[test]
    fn config_file_in_scan_dir_is_used() {
        let root = tempfile::tempdir().unwrap();
        write_extension(root.path(), "tabby", r#"["tabs", "history"]"#);
        std::fs::write(
            root.path().join(CONFIG_FILE_NAME),
            "[policy]\nignore_permissions = [\"tabs\", \"history\"]\n",
        )
        .unwrap();
        let report = scan(root.path(), &ScanOptions::default()).unwrap();
        assert_eq!(report.extensions[0].result.overall_score, 100);
    }

    #[test]
    fn preset_override_switches_engine() {
        let root = tempfile::tempdir().unwrap();
        write_extension(root.path(), "sniffer", r#"["webRequest", "<all_urls>"]"#);
        let options = ScanOptions {
            preset_override: Some(Preset::SafetyCenter),
            ..ScanOptions::default()
        };
        let report = scan(root.path(), &options).unwrap();
        assert_eq!(report.preset, Preset::SafetyCenter);
        assert!(report.extensions[0].result.synergy_penalties.is_empty());
    }

    #[test]
    fn static_source_assessment() {
        let source = StaticSource::new(vec![ExtensionRecord::from_permissions(
            "inline",
            vec!["storage".into(), "storage".into()],
        )]);
        let report = assess(&source, &Config::default()).unwrap();
        assert_eq!(report.extensions[0].result.permissions.len(), 1);
        assert!(report.verdict.pass);
    }

    #[test]
    fn missing_manifests_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        assert!(scan(root.path(), &ScanOptions::default()).is_err());
    }
}
