use std::fmt;

use serde::{Deserialize, Serialize};

/// Shape of the text the model should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Text,
    Json,
}

/// Per-call generation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub format: ResponseFormat,
}

impl GenerationConfig {
    pub fn text(temperature: f32) -> Self {
        Self {
            temperature,
            format: ResponseFormat::Text,
        }
    }

    pub fn json(temperature: f32) -> Self {
        Self {
            temperature,
            format: ResponseFormat::Json,
        }
    }
}

/// Documents the AI can draft from project data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DocumentKind {
    RequirementsSpecification,
    RiskRegister,
    TestPlan,
    ReleaseNotes,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DocumentKind::RequirementsSpecification => "requirements specification",
            DocumentKind::RiskRegister => "risk register",
            DocumentKind::TestPlan => "test plan",
            DocumentKind::ReleaseNotes => "release notes",
        })
    }
}

/// Structured review of a pull request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrAnalysis {
    pub summary: String,
    #[serde(default = "unknown")]
    pub risk_level: String,
    #[serde(default)]
    pub affected_requirements: Vec<String>,
    #[serde(default)]
    pub suggested_tests: Vec<String>,
    #[serde(default)]
    pub concerns: Vec<String>,
}

fn unknown() -> String {
    "Unknown".to_string()
}

impl PrAnalysis {
    /// Render as a Markdown comment body.
    pub fn to_markdown(&self, pr_number: u64) -> String {
        let mut out = format!(
            "### Ignition review of #{pr_number}\n\n{}\n\n**Risk level:** {}\n",
            self.summary, self.risk_level
        );
        for (title, items) in [
            ("Affected requirements", &self.affected_requirements),
            ("Suggested tests", &self.suggested_tests),
            ("Concerns", &self.concerns),
        ] {
            if items.is_empty() {
                continue;
            }
            out.push_str(&format!("\n**{title}**\n"));
            for item in items {
                out.push_str(&format!("- {item}\n"));
            }
        }
        out
    }
}

/// One file proposed by repository scaffolding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaffoldFile {
    pub path: String,
    pub content: String,
}
