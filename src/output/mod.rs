pub mod console;
pub mod json;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sandbox::WhatIfOutcome;
use crate::AssessmentReport;

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
}

impl OutputFormat {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "console" | "text" => Some(Self::Console),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Render an assessment report into the specified format.
pub fn render(report: &AssessmentReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Console => Ok(console::render(report)),
        OutputFormat::Json => json::render(report),
    }
}

/// Render a what-if comparison into the specified format.
pub fn render_what_if(outcome: &WhatIfOutcome, name: &str, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Console => Ok(console::render_what_if(outcome, name)),
        OutputFormat::Json => json::render_what_if(outcome, name),
    }
}
