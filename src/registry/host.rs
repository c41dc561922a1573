//! Host match patterns: `<all_urls>` and `<scheme>://<host><path>`.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Category, ImpactType, PermissionDescriptor, RiskTier};

/// Match patterns as accepted by Chrome: `<scheme>://<host><path>`.
static MATCH_PATTERN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\*|https?|wss?|ftp|file|urn)://(\*|\*\.[^/*]+|[^/*]+)?/.*$").unwrap()
});

/// Catalogued patterns granting access to every site. They share one set of
/// synergy rules.
pub const BROAD_HOSTS: [&str; 4] = ["<all_urls>", "*://*/*", "https://*/*", "http://*/*"];

/// Identifier of the descriptor shared by site-specific host patterns.
pub const SITE_ACCESS_ID: &str = "site_access";

/// Risk points of one site-specific host pattern.
pub const SITE_ACCESS_POINTS: f64 = 8.0;

/// Combined risk points of all site-specific patterns in one set. Stays
/// below every broad host entry, so listing sites never outweighs
/// requesting all of them.
pub const SITE_ACCESS_CAP_POINTS: f64 = 25.0;

/// Whether a permission entry is a host pattern rather than an API name.
pub fn is_host_pattern(entry: &str) -> bool {
    entry == "<all_urls>" || entry.contains("://")
}

/// Whether a host pattern is well formed.
pub fn is_valid_match_pattern(pattern: &str) -> bool {
    pattern == "<all_urls>" || MATCH_PATTERN_RE.is_match(pattern)
}

pub(super) fn site_access_descriptor() -> PermissionDescriptor {
    PermissionDescriptor {
        id: SITE_ACCESS_ID.into(),
        risk_tier: RiskTier::for_points(SITE_ACCESS_POINTS),
        base_risk_points: SITE_ACCESS_POINTS,
        impact_type: ImpactType::DataAccess,
        categories: BTreeSet::from([Category::Security, Category::Privacy]),
        description: "Read and change data on specific sites".into(),
        documentation_link: super::catalog::MATCH_PATTERNS_URL.into(),
    }
}
