//! Permission registry: static risk metadata for every permission an
//! extension manifest can declare.
//!
//! Lookups never fail. Well-formed host patterns the catalog does not list
//! resolve to a shared `site_access` descriptor. Any other identifier the
//! catalog does not know resolves to a fixed `unknown` descriptor, which keeps the engine total over any input
//! and forward-compatible with permissions the host platform adds later.

mod catalog;
pub mod host;
pub mod synergy;

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrustError};

pub use synergy::{PermissionPair, SynergyRule, SynergyTable};

/// Version of the built-in permission catalog. Bumped whenever descriptors
/// or synergy rules change, so stored reports can be compared fairly.
pub const REGISTRY_VERSION: &str = "2024.3";

/// Identifier used for the fallback descriptor.
pub const UNKNOWN_PERMISSION_ID: &str = "unknown";

/// Risk points assigned to an unrecognized permission.
pub const UNKNOWN_RISK_POINTS: f64 = 15.0;

/// Severity bucket of a single permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Moderate,
    High,
    Critical,
    Unknown,
}

impl RiskTier {
    /// Tier a custom permission falls into given its risk points.
    pub fn for_points(points: f64) -> Self {
        if points >= 30.0 {
            Self::Critical
        } else if points >= 18.0 {
            Self::High
        } else if points >= 8.0 {
            Self::Moderate
        } else {
            Self::Low
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Moderate => write!(f, "moderate"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// The kind of risk a permission introduces. Drives the type-weight lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactType {
    DataAccess,
    CodeInjection,
    NetworkControl,
    SystemInteraction,
    AccountAccess,
    PrivacySensitive,
    BrowserControl,
    UiInteraction,
    DataTransfer,
    DevelopmentTools,
    SecurityFeature,
    Unknown,
    Functionality,
}

impl ImpactType {
    pub const ALL: [ImpactType; 13] = [
        Self::DataAccess,
        Self::CodeInjection,
        Self::NetworkControl,
        Self::SystemInteraction,
        Self::AccountAccess,
        Self::PrivacySensitive,
        Self::BrowserControl,
        Self::UiInteraction,
        Self::DataTransfer,
        Self::DevelopmentTools,
        Self::SecurityFeature,
        Self::Unknown,
        Self::Functionality,
    ];
}

impl std::fmt::Display for ImpactType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DataAccess => write!(f, "data access"),
            Self::CodeInjection => write!(f, "code injection"),
            Self::NetworkControl => write!(f, "network control"),
            Self::SystemInteraction => write!(f, "system interaction"),
            Self::AccountAccess => write!(f, "account access"),
            Self::PrivacySensitive => write!(f, "privacy sensitive"),
            Self::BrowserControl => write!(f, "browser control"),
            Self::UiInteraction => write!(f, "UI interaction"),
            Self::DataTransfer => write!(f, "data transfer"),
            Self::DevelopmentTools => write!(f, "development tools"),
            Self::SecurityFeature => write!(f, "security feature"),
            Self::Unknown => write!(f, "unknown"),
            Self::Functionality => write!(f, "functionality"),
        }
    }
}

/// Which sub-score(s) a permission contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Security,
    Privacy,
    Functionality,
    Unclassified,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Security => write!(f, "Security"),
            Self::Privacy => write!(f, "Privacy"),
            Self::Functionality => write!(f, "Functionality"),
            Self::Unclassified => write!(f, "Unclassified"),
        }
    }
}

/// Risk metadata for one permission identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionDescriptor {
    pub id: String,
    pub risk_tier: RiskTier,
    /// Unweighted severity contribution.
    pub base_risk_points: f64,
    pub impact_type: ImpactType,
    pub categories: BTreeSet<Category>,
    pub description: String,
    pub documentation_link: String,
}

impl PermissionDescriptor {
    pub fn has_category(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }

    fn unknown() -> Self {
        Self {
            id: UNKNOWN_PERMISSION_ID.into(),
            risk_tier: RiskTier::Moderate,
            base_risk_points: UNKNOWN_RISK_POINTS,
            impact_type: ImpactType::Unknown,
            categories: BTreeSet::from([Category::Unclassified]),
            description: "Unrecognized permission; treated as moderate risk".into(),
            documentation_link: catalog::PERMISSIONS_LIST_URL.into(),
        }
    }

    fn custom(id: &str, points: f64) -> Self {
        Self {
            id: id.into(),
            risk_tier: RiskTier::for_points(points),
            base_risk_points: points,
            impact_type: ImpactType::Unknown,
            categories: BTreeSet::from([Category::Unclassified]),
            description: "Locally registered permission".into(),
            documentation_link: catalog::PERMISSIONS_LIST_URL.into(),
        }
    }
}

/// Read-only map from permission id to descriptor.
#[derive(Debug, Clone)]
pub struct PermissionRegistry {
    descriptors: HashMap<String, PermissionDescriptor>,
    site_access: PermissionDescriptor,
    unknown: PermissionDescriptor,
}

impl PermissionRegistry {
    /// Registry populated from the built-in catalog.
    pub fn new() -> Self {
        let descriptors = catalog::descriptors()
            .map(|d| (d.id.clone(), d))
            .collect();
        Self {
            descriptors,
            site_access: host::site_access_descriptor(),
            unknown: PermissionDescriptor::unknown(),
        }
    }

    /// Apply per-permission risk point overrides.
    ///
    /// Known permissions keep their tier metadata but take the new points.
    /// Ids absent from the catalog are registered as unclassified
    /// permissions, so newly shipped platform permissions can be scored
    /// before the catalog catches up.
    pub fn with_overrides(mut self, overrides: &HashMap<String, f64>) -> Result<Self> {
        for (id, &points) in overrides {
            if !points.is_finite() || points < 0.0 {
                return Err(TrustError::Config(format!(
                    "risk points for '{id}' must be a non-negative number, got {points}"
                )));
            }
            match self.descriptors.get_mut(id) {
                Some(descriptor) => descriptor.base_risk_points = points,
                None => {
                    self.descriptors
                        .insert(id.clone(), PermissionDescriptor::custom(id, points));
                }
            }
        }
        Ok(self)
    }

    /// Resolve a permission. Site-specific host patterns yield the shared
    /// site access descriptor, anything else unknown the fallback.
    pub fn lookup(&self, id: &str) -> &PermissionDescriptor {
        match self.descriptors.get(id) {
            Some(descriptor) => descriptor,
            None if self.is_site_pattern(id) => &self.site_access,
            None => &self.unknown,
        }
    }

    /// Whether the catalog (or an override) lists this exact id.
    pub fn is_known(&self, id: &str) -> bool {
        self.descriptors.contains_key(id)
    }

    /// A well-formed host pattern not listed in the catalog.
    pub fn is_site_pattern(&self, id: &str) -> bool {
        !self.is_known(id) && host::is_host_pattern(id) && host::is_valid_match_pattern(id)
    }

    /// Whether `lookup` resolves the id to real metadata rather than the
    /// unknown fallback.
    pub fn recognizes(&self, id: &str) -> bool {
        self.is_known(id) || self.is_site_pattern(id)
    }

    /// The fallback descriptor for unrecognized permissions.
    pub fn unknown(&self) -> &PermissionDescriptor {
        &self.unknown
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// All descriptors, sorted by id.
    pub fn iter(&self) -> impl Iterator<Item = &PermissionDescriptor> {
        let mut all: Vec<&PermissionDescriptor> = self.descriptors.values().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all.into_iter()
    }

    /// Closest known permission id for a likely typo.
    ///
    /// Compares case-insensitively and accepts an edit distance of at most 2.
    /// Ties resolve to the lexicographically smallest id. Host patterns get
    /// no suggestion.
    pub fn suggest(&self, id: &str) -> Option<&str> {
        if self.is_known(id) || host::is_host_pattern(id) {
            return None;
        }
        let needle = id.to_lowercase();
        self.descriptors
            .keys()
            .map(|known| (levenshtein::levenshtein(&needle, &known.to_lowercase()), known))
            .filter(|(distance, _)| *distance <= 2)
            .min_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)))
            .map(|(_, known)| known.as_str())
    }
}

impl Default for PermissionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_permission_resolves() {
        let registry = PermissionRegistry::new();
        let d = registry.lookup("webRequest");
        assert_eq!(d.id, "webRequest");
        assert_eq!(d.risk_tier, RiskTier::High);
        assert!(d.has_category(Category::Privacy));
        assert!(d.has_category(Category::Security));
    }

    #[test]
    fn unknown_permission_falls_back() {
        let registry = PermissionRegistry::new();
        let d = registry.lookup("totally-not-a-real-permission");
        assert_eq!(d.id, UNKNOWN_PERMISSION_ID);
        assert_eq!(d.risk_tier, RiskTier::Moderate);
        assert_eq!(d.base_risk_points, UNKNOWN_RISK_POINTS);
        assert!(!registry.is_known("totally-not-a-real-permission"));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let registry = PermissionRegistry::new();
        assert!(registry.is_known("webRequest"));
        assert!(!registry.is_known("webrequest"));
    }

    #[test]
    fn covers_core_manifest_permissions() {
        let registry = PermissionRegistry::new();
        for id in [
            "<all_urls>",
            "activeTab",
            "alarms",
            "bookmarks",
            "cookies",
            "debugger",
            "declarativeNetRequest",
            "downloads",
            "history",
            "management",
            "nativeMessaging",
            "notifications",
            "proxy",
            "scripting",
            "storage",
            "tabs",
            "webNavigation",
            "webRequest",
        ] {
            assert!(registry.is_known(id), "missing descriptor for {id}");
        }
    }

    #[test]
    fn override_changes_points_only() {
        let overrides = HashMap::from([("tabs".to_string(), 3.0)]);
        let registry = PermissionRegistry::new().with_overrides(&overrides).unwrap();
        let d = registry.lookup("tabs");
        assert_eq!(d.base_risk_points, 3.0);
        assert_eq!(d.risk_tier, RiskTier::High);
    }

    #[test]
    fn override_registers_new_permission() {
        let overrides = HashMap::from([("aiLanguageModel".to_string(), 20.0)]);
        let registry = PermissionRegistry::new().with_overrides(&overrides).unwrap();
        assert!(registry.is_known("aiLanguageModel"));
        assert_eq!(registry.lookup("aiLanguageModel").risk_tier, RiskTier::High);
    }

    #[test]
    fn negative_override_rejected() {
        let overrides = HashMap::from([("tabs".to_string(), -1.0)]);
        assert!(PermissionRegistry::new().with_overrides(&overrides).is_err());
    }

    #[test]
    fn suggests_close_match() {
        let registry = PermissionRegistry::new();
        assert_eq!(registry.suggest("webrequest"), Some("webRequest"));
        assert_eq!(registry.suggest("storge"), Some("storage"));
        assert_eq!(registry.suggest("storage"), None);
        assert_eq!(registry.suggest("completely-unrelated"), None);
    }

    #[test]
    fn site_patterns_resolve_to_site_access() {
        let registry = PermissionRegistry::new();
        for pattern in ["https://mail.example.com/*", "*://*.example.org/*", "file:///home/*"] {
            assert!(registry.is_site_pattern(pattern), "{pattern}");
            assert!(registry.recognizes(pattern));
            assert!(!registry.is_known(pattern));
            let d = registry.lookup(pattern);
            assert_eq!(d.id, host::SITE_ACCESS_ID);
            assert_eq!(d.impact_type, ImpactType::DataAccess);
            assert!(d.has_category(Category::Security));
            assert_eq!(registry.suggest(pattern), None);
        }
    }

    #[test]
    fn broad_and_malformed_hosts_are_not_site_patterns() {
        let registry = PermissionRegistry::new();
        assert!(!registry.is_site_pattern("<all_urls>"));
        assert_eq!(registry.lookup("https://*/*").id, "https://*/*");

        assert!(!registry.recognizes("https://example.com"));
        assert_eq!(registry.lookup("https://example.com").id, UNKNOWN_PERMISSION_ID);
        assert_eq!(registry.suggest("https://example.com"), None);
    }

    #[test]
    fn iter_is_sorted() {
        let registry = PermissionRegistry::new();
        let ids: Vec<&str> = registry.iter().map(|d| d.id.as_str()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert_eq!(ids.len(), registry.len());
    }
}
