//! Synergy rules: permission pairs that are riskier together than apart.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::PermissionSet;

use super::host::BROAD_HOSTS;

/// Unordered pair of permission ids. Stored with the smaller id first so
/// `(a, b)` and `(b, a)` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "(String, String)")]
pub struct PermissionPair(String, String);

impl PermissionPair {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    pub fn first(&self) -> &str {
        &self.0
    }

    pub fn second(&self) -> &str {
        &self.1
    }
}

impl From<(String, String)> for PermissionPair {
    fn from((a, b): (String, String)) -> Self {
        Self::new(a, b)
    }
}

impl std::fmt::Display for PermissionPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} + {}", self.0, self.1)
    }
}

/// Amplification applied when both permissions of a pair are requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynergyRule {
    pub pair: PermissionPair,
    /// Always greater than 1.0.
    pub multiplier: f64,
    pub rationale: String,
}

impl SynergyRule {
    /// Extra risk on top of the pair's own points:
    /// `(points_a + points_b) * (multiplier - 1)`.
    pub fn penalty(&self, points_a: f64, points_b: f64) -> f64 {
        (points_a + points_b) * (self.multiplier - 1.0)
    }
}

/// Partners of every broad host pattern (`<all_urls>`, `*://*/*`, ...).
#[rustfmt::skip]
const BROAD_HOST_SYNERGIES: &[(&str, f64, &str)] = &[
    ("webRequest", 1.5, "Observe traffic to every site"),
    ("webRequestBlocking", 1.6, "Rewrite traffic to every site"),
    ("scripting", 1.6, "Inject code into every site"),
    ("userScripts", 1.6, "Run arbitrary scripts on every site"),
    ("cookies", 1.5, "Harvest session cookies for every site"),
    ("tabs", 1.3, "Correlate page content with tab URLs"),
];

#[rustfmt::skip]
const SYNERGIES: &[(&str, &str, f64, &str)] = &[
    ("webRequest", "webRequestBlocking", 1.4, "Full man-in-the-browser traffic control"),
    ("webRequest", "cookies", 1.5, "Session hijacking from observed traffic"),
    ("cookies", "identity", 1.4, "Account takeover across signed-in services"),
    ("tabs", "history", 1.3, "Complete browsing profile"),
    ("history", "topSites", 1.2, "Browsing habit profiling"),
    ("tabs", "scripting", 1.4, "Targeted injection into chosen tabs"),
    ("activeTab", "scripting", 1.2, "Injection into the focused page"),
    ("nativeMessaging", "downloads", 1.4, "Drop and launch native payloads"),
    ("nativeMessaging", "management", 1.5, "Disable other extensions from a native host"),
    ("nativeMessaging", "clipboardRead", 1.3, "Exfiltrate clipboard to a native host"),
    ("nativeMessaging", "desktopCapture", 1.4, "Stream the screen to a native host"),
    ("debugger", "tabs", 1.5, "Instrument any tab via the debugger protocol"),
    ("proxy", "webRequest", 1.5, "Redirect and inspect all traffic"),
    ("privacy", "proxy", 1.3, "Weaken privacy settings while routing traffic"),
    ("management", "downloads.open", 1.3, "Install and launch arbitrary payloads"),
    ("geolocation", "webRequest", 1.3, "Tie location to observed traffic"),
];

/// Static lookup of permission pairs to amplification rules.
#[derive(Debug, Clone)]
pub struct SynergyTable {
    rules: BTreeMap<PermissionPair, SynergyRule>,
}

impl SynergyTable {
    /// Table populated from the built-in synergy rules.
    pub fn new() -> Self {
        let broad = BROAD_HOSTS.iter().flat_map(|&host| {
            BROAD_HOST_SYNERGIES
                .iter()
                .map(move |&(partner, multiplier, rationale)| (host, partner, multiplier, rationale))
        });
        let rules = broad
            .chain(SYNERGIES.iter().copied())
            .map(|(a, b, multiplier, rationale)| {
                let pair = PermissionPair::new(a, b);
                (
                    pair.clone(),
                    SynergyRule {
                        pair,
                        multiplier,
                        rationale: rationale.into(),
                    },
                )
            })
            .collect();
        Self { rules }
    }

    /// Rule for a pair, regardless of argument order.
    pub fn rule_for(&self, a: &str, b: &str) -> Option<&SynergyRule> {
        self.rules.get(&PermissionPair::new(a, b))
    }

    /// Rules whose both permissions are in `set`, in pair order.
    ///
    /// Pairs of a permission with itself never match.
    pub fn matching<'a>(&'a self, set: &'a PermissionSet) -> impl Iterator<Item = &'a SynergyRule> {
        self.rules.values().filter(move |rule| {
            rule.pair.first() != rule.pair.second()
                && set.contains(rule.pair.first())
                && set.contains(rule.pair.second())
        })
    }

    pub fn rules(&self) -> impl Iterator<Item = &SynergyRule> {
        self.rules.values()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for SynergyTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_is_unordered() {
        assert_eq!(
            PermissionPair::new("webRequest", "<all_urls>"),
            PermissionPair::new("<all_urls>", "webRequest")
        );
    }

    #[test]
    fn lookup_ignores_argument_order() {
        let table = SynergyTable::new();
        let forward = table.rule_for("cookies", "webRequest").unwrap();
        let backward = table.rule_for("webRequest", "cookies").unwrap();
        assert_eq!(forward, backward);
    }

    #[test]
    fn all_multipliers_amplify() {
        let table = SynergyTable::new();
        assert_eq!(
            table.len(),
            SYNERGIES.len() + BROAD_HOSTS.len() * BROAD_HOST_SYNERGIES.len(),
            "duplicate synergy pair"
        );
        for rule in table.rules() {
            assert!(rule.multiplier > 1.0, "{} does not amplify", rule.pair);
            assert_ne!(rule.pair.first(), rule.pair.second());
        }
    }

    #[test]
    fn penalty_formula() {
        let table = SynergyTable::new();
        let rule = table.rule_for("<all_urls>", "webRequest").unwrap();
        assert_eq!(rule.penalty(35.0, 25.0), 30.0);
    }

    #[test]
    fn every_broad_host_has_the_same_partners() {
        let table = SynergyTable::new();
        for host in BROAD_HOSTS {
            for &(partner, multiplier, _) in BROAD_HOST_SYNERGIES {
                let rule = table.rule_for(host, partner).unwrap();
                assert_eq!(rule.multiplier, multiplier, "{}", rule.pair);
            }
        }
    }

    #[test]
    fn pair_deserializes_in_canonical_order() {
        let pair: PermissionPair = serde_json::from_str(r#"["webRequest", "<all_urls>"]"#).unwrap();
        assert_eq!(pair, PermissionPair::new("<all_urls>", "webRequest"));
        assert_eq!(pair.first(), "<all_urls>");
    }

    #[test]
    fn matching_requires_both_members() {
        let table = SynergyTable::new();
        let set: PermissionSet = ["<all_urls>", "webRequest", "storage"].into_iter().collect();
        let matched: Vec<String> = table.matching(&set).map(|r| r.pair.to_string()).collect();
        assert_eq!(matched, vec!["<all_urls> + webRequest".to_string()]);

        let lone: PermissionSet = ["webRequest"].into_iter().collect();
        assert_eq!(table.matching(&lone).count(), 0);
    }
}
