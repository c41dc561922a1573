use crate::engine::{RiskCategory, ScoreResult};
use crate::registry::RiskTier;
use crate::sandbox::WhatIfOutcome;
use crate::{AssessmentReport, ExtensionAssessment};

const TOP_CONTRIBUTORS: usize = 5;

/// Render a report as plain console text, worst extension first.
pub fn render(report: &AssessmentReport) -> String {
    let mut output = String::new();

    if report.extensions.is_empty() {
        output.push_str("\n  No extensions to assess.\n\n");
        return output;
    }

    let mut sorted: Vec<&ExtensionAssessment> = report.extensions.iter().collect();
    sorted.sort_by(|a, b| {
        a.result
            .overall_score
            .cmp(&b.result.overall_score)
            .then_with(|| a.name.cmp(&b.name))
    });

    output.push_str(&format!(
        "\n  {} extension(s) assessed ({} engine, registry {}):\n\n",
        report.extensions.len(),
        report.preset,
        report.registry_version
    ));

    for ext in sorted {
        render_extension(&mut output, ext);
    }

    let verdict = &report.verdict;
    let status = if verdict.pass { "PASS" } else { "FAIL" };
    output.push_str(&format!(
        "  Result: {} ({} of {} failing, threshold: {}, worst: {})\n\n",
        status,
        verdict.failing_extensions,
        verdict.total_extensions,
        verdict.fail_threshold,
        verdict
            .worst_category
            .map(|c| c.to_string())
            .unwrap_or_else(|| "none".into()),
    ));

    output
}

fn render_extension(output: &mut String, ext: &ExtensionAssessment) {
    let result = &ext.result;
    let mark = if ext.passed { " " } else { "!" };

    output.push_str(&format!("{} {} {}\n", mark, ext.name, ext.version));
    if let Some(path) = &ext.path {
        output.push_str(&format!("    at {}\n", path.display()));
    }
    output.push_str(&format!(
        "    score {:>3}/100 {}  privacy {}  security {}\n",
        result.overall_score,
        category_tag(result.risk_category),
        result.privacy_score,
        result.security_score,
    ));

    render_breakdown(output, result);
    output.push('\n');
}

fn render_breakdown(output: &mut String, result: &ScoreResult) {
    let top = result.top_contributors(TOP_CONTRIBUTORS);
    if !top.is_empty() {
        output.push_str("    top risks:\n");
        for p in top {
            output.push_str(&format!(
                "      {:<28} {} {:>6.1} pts  ({})\n",
                p.id,
                tier_tag(p.risk_tier),
                p.weighted_points,
                p.impact_type
            ));
        }
    }

    if !result.synergy_penalties.is_empty() {
        output.push_str("    synergy:\n");
        for s in &result.synergy_penalties {
            output.push_str(&format!(
                "      {:<28} +{:.1} pts  {}\n",
                s.pair.to_string(),
                s.penalty_points,
                s.rationale
            ));
        }
    }

    if result.sprawl_penalty > 0.0 {
        output.push_str(&format!(
            "    sprawl: +{:.1} pts for {} permissions\n",
            result.sprawl_penalty,
            result.permissions.len()
        ));
    }

    for p in result.unrecognized() {
        match &p.suggestion {
            Some(s) => output.push_str(&format!(
                "    unrecognized: {} (did you mean '{}'?)\n",
                p.id, s
            )),
            None => output.push_str(&format!("    unrecognized: {}\n", p.id)),
        }
    }
}

/// Render a what-if comparison as console text.
pub fn render_what_if(outcome: &WhatIfOutcome, name: &str) -> String {
    let mut output = String::new();
    let before = &outcome.baseline;
    let after = &outcome.current;

    output.push_str(&format!("\n  What-if for {}\n\n", name));
    if outcome.removed.is_empty() {
        output.push_str("    no permissions removed\n");
    } else {
        output.push_str(&format!("    removed: {}\n", outcome.removed.join(", ")));
    }
    output.push_str(&format!(
        "    overall  {:>3} -> {:>3}  ({:+})\n",
        before.overall_score, after.overall_score, outcome.delta
    ));
    output.push_str(&format!(
        "    privacy  {:>3} -> {:>3}  ({:+})\n",
        before.privacy_score, after.privacy_score, outcome.privacy_delta
    ));
    output.push_str(&format!(
        "    security {:>3} -> {:>3}  ({:+})\n",
        before.security_score, after.security_score, outcome.security_delta
    ));
    output.push_str(&format!(
        "    category {} -> {}\n",
        before.risk_category.label(),
        after.risk_category.label()
    ));

    let dropped: Vec<String> = before
        .synergy_penalties
        .iter()
        .filter(|s| !after.synergy_penalties.iter().any(|a| a.pair == s.pair))
        .map(|s| s.pair.to_string())
        .collect();
    if !dropped.is_empty() {
        output.push_str(&format!("    synergy removed: {}\n", dropped.join(", ")));
    }
    output.push('\n');

    output
}

fn category_tag(category: RiskCategory) -> &'static str {
    match category {
        RiskCategory::Excellent => "[EXCELLENT] ",
        RiskCategory::Good => "[GOOD]      ",
        RiskCategory::Moderate => "[MODERATE]  ",
        RiskCategory::Concerning => "[CONCERNING]",
        RiskCategory::HighRisk => "[HIGH RISK] ",
        RiskCategory::Unknown => "[UNKNOWN]   ",
    }
}

fn tier_tag(tier: RiskTier) -> &'static str {
    match tier {
        RiskTier::Critical => "critical",
        RiskTier::High => "high    ",
        RiskTier::Moderate => "moderate",
        RiskTier::Low => "low     ",
        RiskTier::Unknown => "unknown ",
    }
}
