//! What-if sandbox: switch individual permissions off and see how the
//! score would change.
//!
//! The sandbox only ever narrows an extension's actual permission list, so
//! by monotonicity the current score is never below the baseline.

use serde::Serialize;

use crate::engine::{PermissionSet, ScoreCalculator, ScoreResult};

/// A baseline permission list plus the subset currently switched on.
#[derive(Debug, Clone)]
pub struct Sandbox<'a> {
    calculator: &'a ScoreCalculator,
    /// Distinct permissions in first-seen order.
    permissions: Vec<String>,
    enabled: PermissionSet,
    baseline: ScoreResult,
}

/// Baseline and hypothetical scores side by side.
#[derive(Debug, Clone, Serialize)]
pub struct WhatIfOutcome {
    pub baseline: ScoreResult,
    pub current: ScoreResult,
    /// `current.overall_score - baseline.overall_score`.
    pub delta: i16,
    pub privacy_delta: i16,
    pub security_delta: i16,
    /// Permissions switched off, in first-seen order.
    pub removed: Vec<String>,
}

impl WhatIfOutcome {
    pub fn category_changed(&self) -> bool {
        self.baseline.risk_category != self.current.risk_category
    }
}

impl<'a> Sandbox<'a> {
    /// Start with every permission switched on.
    pub fn new<S: AsRef<str>>(calculator: &'a ScoreCalculator, permissions: &[S]) -> Self {
        let mut distinct: Vec<String> = Vec::with_capacity(permissions.len());
        for p in permissions {
            let p = p.as_ref();
            if !distinct.iter().any(|d| d == p) {
                distinct.push(p.to_string());
            }
        }
        let enabled: PermissionSet = distinct.iter().collect();
        let baseline = calculator.score_set(&enabled);
        Self {
            calculator,
            permissions: distinct,
            enabled,
            baseline,
        }
    }

    /// Switch a permission on or off. Returns `false` when the id is not
    /// part of the extension's permission list.
    pub fn set_enabled(&mut self, id: &str, on: bool) -> bool {
        if !self.permissions.iter().any(|p| p == id) {
            return false;
        }
        if on {
            self.enabled.insert(id);
        } else {
            self.enabled.remove(id);
        }
        true
    }

    /// Flip a permission. Returns its new state, or `None` for ids outside
    /// the extension's permission list.
    pub fn toggle(&mut self, id: &str) -> Option<bool> {
        let now_on = !self.enabled.contains(id);
        self.set_enabled(id, now_on).then_some(now_on)
    }

    /// Switch everything back on.
    pub fn reset(&mut self) {
        self.enabled = self.permissions.iter().collect();
    }

    pub fn is_enabled(&self, id: &str) -> bool {
        self.enabled.contains(id)
    }

    pub fn permissions(&self) -> &[String] {
        &self.permissions
    }

    pub fn enabled(&self) -> &PermissionSet {
        &self.enabled
    }

    pub fn baseline(&self) -> &ScoreResult {
        &self.baseline
    }

    /// Rescore the enabled subset.
    pub fn evaluate(&self) -> WhatIfOutcome {
        let current = self.calculator.score_set(&self.enabled);
        let diff = |now: u8, before: u8| i16::from(now) - i16::from(before);
        WhatIfOutcome {
            delta: diff(current.overall_score, self.baseline.overall_score),
            privacy_delta: diff(current.privacy_score, self.baseline.privacy_score),
            security_delta: diff(current.security_score, self.baseline.security_score),
            removed: self
                .permissions
                .iter()
                .filter(|p| !self.enabled.contains(p))
                .cloned()
                .collect(),
            baseline: self.baseline.clone(),
            current,
        }
    }
}
