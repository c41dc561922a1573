//! Maps a 0-100 score onto ordered threshold bands.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrustError};

/// Overall classification of an extension's permission set, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Excellent,
    Good,
    Moderate,
    Concerning,
    HighRisk,
    /// Never produced by a validated scheme.
    Unknown,
}

impl RiskCategory {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "excellent" => Some(Self::Excellent),
            "good" | "low" => Some(Self::Good),
            "moderate" | "medium" => Some(Self::Moderate),
            "concerning" | "high" => Some(Self::Concerning),
            "high_risk" | "critical" => Some(Self::HighRisk),
            _ => None,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::Concerning => "Concerning",
            Self::HighRisk => "High Risk",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Excellent => write!(f, "excellent"),
            Self::Good => write!(f, "good"),
            Self::Moderate => write!(f, "moderate"),
            Self::Concerning => write!(f, "concerning"),
            Self::HighRisk => write!(f, "high_risk"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// A category together with its inclusive minimum score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierBand {
    pub category: RiskCategory,
    pub min_score: u8,
}

impl TierBand {
    pub const fn new(category: RiskCategory, min_score: u8) -> Self {
        Self {
            category,
            min_score,
        }
    }
}

/// Validated, exhaustive, non-overlapping set of bands, highest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TierBand>", into = "Vec<TierBand>")]
pub struct TierScheme {
    bands: Vec<TierBand>,
}

impl TierScheme {
    /// Build a scheme from bands in any order.
    ///
    /// Rejects empty schemes, duplicate thresholds or categories, thresholds
    /// above 100, `Unknown` bands, schemes without a band starting at 0, and
    /// schemes where a higher threshold maps to a worse category.
    pub fn new(mut bands: Vec<TierBand>) -> Result<Self> {
        if bands.is_empty() {
            return Err(TrustError::InvalidTierScheme("no bands defined".into()));
        }
        bands.sort_by(|a, b| b.min_score.cmp(&a.min_score));

        for band in &bands {
            if band.category == RiskCategory::Unknown {
                return Err(TrustError::InvalidTierScheme(
                    "'unknown' cannot be used as a band".into(),
                ));
            }
            if band.min_score > 100 {
                return Err(TrustError::InvalidTierScheme(format!(
                    "threshold {} for {} exceeds 100",
                    band.min_score, band.category
                )));
            }
        }
        for pair in bands.windows(2) {
            if pair[0].min_score == pair[1].min_score {
                return Err(TrustError::InvalidTierScheme(format!(
                    "{} and {} share threshold {}",
                    pair[0].category, pair[1].category, pair[0].min_score
                )));
            }
        }
        for (i, band) in bands.iter().enumerate() {
            if bands[..i].iter().any(|b| b.category == band.category) {
                return Err(TrustError::InvalidTierScheme(format!(
                    "{} appears more than once",
                    band.category
                )));
            }
        }
        for pair in bands.windows(2) {
            if pair[0].category > pair[1].category {
                return Err(TrustError::InvalidTierScheme(format!(
                    "{} (>= {}) ranks above {} (>= {}) but is a worse category",
                    pair[0].category, pair[0].min_score, pair[1].category, pair[1].min_score
                )));
            }
        }
        if bands.last().map(|b| b.min_score) != Some(0) {
            return Err(TrustError::InvalidTierScheme(
                "lowest band must start at 0".into(),
            ));
        }

        Ok(Self { bands })
    }

    /// Five bands used by the detailed trust dashboard.
    pub fn trustguard() -> Self {
        Self {
            bands: vec![
                TierBand::new(RiskCategory::Excellent, 85),
                TierBand::new(RiskCategory::Good, 70),
                TierBand::new(RiskCategory::Moderate, 50),
                TierBand::new(RiskCategory::Concerning, 30),
                TierBand::new(RiskCategory::HighRisk, 0),
            ],
        }
    }

    /// Five bands used by the simpler safety overview.
    pub fn safety_center() -> Self {
        Self {
            bands: vec![
                TierBand::new(RiskCategory::Excellent, 80),
                TierBand::new(RiskCategory::Good, 60),
                TierBand::new(RiskCategory::Moderate, 40),
                TierBand::new(RiskCategory::Concerning, 20),
                TierBand::new(RiskCategory::HighRisk, 0),
            ],
        }
    }

    /// First band whose minimum the score meets, scanning from the top.
    pub fn classify(&self, score: u8) -> RiskCategory {
        self.bands
            .iter()
            .find(|band| score >= band.min_score)
            .map(|band| band.category)
            .unwrap_or(RiskCategory::Unknown)
    }

    /// Category of the highest band.
    pub fn best(&self) -> RiskCategory {
        self.bands
            .first()
            .map(|band| band.category)
            .unwrap_or(RiskCategory::Unknown)
    }

    pub fn bands(&self) -> &[TierBand] {
        &self.bands
    }
}

impl Default for TierScheme {
    fn default() -> Self {
        Self::trustguard()
    }
}

impl TryFrom<Vec<TierBand>> for TierScheme {
    type Error = TrustError;

    fn try_from(bands: Vec<TierBand>) -> Result<Self> {
        Self::new(bands)
    }
}

impl From<TierScheme> for Vec<TierBand> {
    fn from(scheme: TierScheme) -> Self {
        scheme.bands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_inclusive() {
        let scheme = TierScheme::trustguard();
        assert_eq!(scheme.classify(85), RiskCategory::Excellent);
        assert_eq!(scheme.classify(84), RiskCategory::Good);
        assert_eq!(scheme.classify(70), RiskCategory::Good);
        assert_eq!(scheme.classify(50), RiskCategory::Moderate);
        assert_eq!(scheme.classify(30), RiskCategory::Concerning);
        assert_eq!(scheme.classify(29), RiskCategory::HighRisk);
    }

    #[test]
    fn extremes_classify() {
        for scheme in [TierScheme::trustguard(), TierScheme::safety_center()] {
            assert_eq!(scheme.classify(100), RiskCategory::Excellent);
            assert_eq!(scheme.classify(0), RiskCategory::HighRisk);
        }
    }

    #[test]
    fn every_score_has_a_band() {
        let scheme = TierScheme::safety_center();
        for score in 0..=100u8 {
            assert_ne!(scheme.classify(score), RiskCategory::Unknown);
        }
    }

    #[test]
    fn unsorted_bands_are_ordered() {
        let scheme = TierScheme::new(vec![
            TierBand::new(RiskCategory::HighRisk, 0),
            TierBand::new(RiskCategory::Excellent, 90),
            TierBand::new(RiskCategory::Moderate, 40),
        ])
        .unwrap();
        assert_eq!(scheme.best(), RiskCategory::Excellent);
        assert_eq!(scheme.classify(60), RiskCategory::Moderate);
    }

    #[test]
    fn rejects_gap_at_bottom() {
        let err = TierScheme::new(vec![
            TierBand::new(RiskCategory::Excellent, 80),
            TierBand::new(RiskCategory::Moderate, 10),
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn rejects_overlapping_thresholds() {
        let err = TierScheme::new(vec![
            TierBand::new(RiskCategory::Excellent, 50),
            TierBand::new(RiskCategory::Good, 50),
            TierBand::new(RiskCategory::HighRisk, 0),
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn rejects_duplicate_category() {
        let err = TierScheme::new(vec![
            TierBand::new(RiskCategory::Good, 50),
            TierBand::new(RiskCategory::Good, 0),
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn rejects_inverted_categories() {
        let err = TierScheme::new(vec![
            TierBand::new(RiskCategory::HighRisk, 80),
            TierBand::new(RiskCategory::Excellent, 0),
        ]);
        assert!(matches!(err, Err(TrustError::InvalidTierScheme(_))));

        let err = TierScheme::new(vec![
            TierBand::new(RiskCategory::Excellent, 90),
            TierBand::new(RiskCategory::Concerning, 60),
            TierBand::new(RiskCategory::Good, 30),
            TierBand::new(RiskCategory::HighRisk, 0),
        ]);
        assert!(err.is_err());

        let inverted: std::result::Result<TierScheme, _> = serde_json::from_str(
            r#"[{"category":"high_risk","min_score":80},{"category":"excellent","min_score":0}]"#,
        );
        assert!(inverted.is_err());
    }

    #[test]
    fn rejects_empty_and_unknown() {
        assert!(TierScheme::new(vec![]).is_err());
        assert!(TierScheme::new(vec![TierBand::new(RiskCategory::Unknown, 0)]).is_err());
    }

    #[test]
    fn deserialization_validates() {
        let ok: TierScheme = serde_json::from_str(
            r#"[{"category":"good","min_score":50},{"category":"high_risk","min_score":0}]"#,
        )
        .unwrap();
        assert_eq!(ok.classify(50), RiskCategory::Good);

        let bad: std::result::Result<TierScheme, _> =
            serde_json::from_str(r#"[{"category":"good","min_score":50}]"#);
        assert!(bad.is_err());
    }

    #[test]
    fn lenient_parsing() {
        assert_eq!(
            RiskCategory::from_str_lenient("High-Risk"),
            Some(RiskCategory::HighRisk)
        );
        assert_eq!(
            RiskCategory::from_str_lenient("critical"),
            Some(RiskCategory::HighRisk)
        );
        assert_eq!(RiskCategory::from_str_lenient("nope"), None);
    }
}
