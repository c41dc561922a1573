use crate::error::Result;
use crate::sandbox::WhatIfOutcome;
use crate::AssessmentReport;

use serde::Serialize;

#[derive(Serialize)]
struct JsonWhatIf<'a> {
    extension: &'a str,
    #[serde(flatten)]
    outcome: &'a WhatIfOutcome,
}

/// Render a report as JSON.
pub fn render(report: &AssessmentReport) -> Result<String> {
    let json = serde_json::to_string_pretty(report)?;
    Ok(json)
}

/// Render a what-if comparison as JSON.
pub fn render_what_if(outcome: &WhatIfOutcome, name: &str) -> Result<String> {
    let json = serde_json::to_string_pretty(&JsonWhatIf {
        extension: name,
        outcome,
    })?;
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::engine::ScoreCalculator;
    use crate::sandbox::Sandbox;
    use crate::source::ExtensionRecord;

    #[test]
    fn report_is_valid_json() {
        let records = vec![ExtensionRecord::from_permissions(
            "sniffer",
            vec!["<all_urls>".into(), "webRequest".into(), "bogusPerm".into()],
        )];
        let report = crate::assess_records(records, "test".into(), &Config::default()).unwrap();
        let rendered = render(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        let result = &value["extensions"][0]["result"];
        assert_eq!(result["risk_category"], "concerning");
        assert_eq!(result["synergy_penalties"][0]["pair"][0], "<all_urls>");
        assert_eq!(value["preset"], "trustguard");
        assert_eq!(value["verdict"]["pass"], false);
    }

    #[test]
    fn what_if_is_flattened() {
        let calc = ScoreCalculator::default();
        let mut sandbox = Sandbox::new(&calc, &["cookies", "storage"]);
        sandbox.toggle("cookies");
        let rendered = render_what_if(&sandbox.evaluate(), "cookie-jar").unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["extension"], "cookie-jar");
        assert_eq!(value["removed"][0], "cookies");
        assert!(value["delta"].as_i64().unwrap() > 0);
    }
}
