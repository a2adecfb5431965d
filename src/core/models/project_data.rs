use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::models::audit_entry::AuditLogEntry;
use crate::core::models::configuration_item::ConfigurationItem;
use crate::core::models::process_asset::ProcessAsset;
use crate::core::models::requirement::Requirement;
use crate::core::models::risk::Risk;
use crate::core::models::test_case::TestCase;

/// Current format version of the project document.
pub const CURRENT_FORMAT_VERSION: u32 = 1;

fn default_format_version() -> u32 {
    CURRENT_FORMAT_VERSION
}

/// Everything Ignition tracks for one project, persisted as a single
/// JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectData {
    pub project_name: String,
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
    #[serde(default)]
    pub risks: Vec<Risk>,
    #[serde(default)]
    pub configuration_items: Vec<ConfigurationItem>,
    #[serde(default)]
    pub process_assets: Vec<ProcessAsset>,
    /// Requirement id → linked entities.
    #[serde(default)]
    pub links: BTreeMap<String, RequirementLinks>,
    #[serde(default)]
    pub audit_log: Vec<AuditLogEntry>,
}

impl ProjectData {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            format_version: CURRENT_FORMAT_VERSION,
            requirements: Vec::new(),
            test_cases: Vec::new(),
            risks: Vec::new(),
            configuration_items: Vec::new(),
            process_assets: Vec::new(),
            links: BTreeMap::new(),
            audit_log: Vec::new(),
        }
    }
}

/// Entities linked to one requirement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequirementLinks {
    #[serde(default)]
    pub tests: Vec<String>,
    #[serde(default)]
    pub risks: Vec<String>,
    #[serde(default)]
    pub cis: Vec<String>,
    /// GitHub issue numbers. External, so never swept.
    #[serde(default)]
    pub issues: Vec<u64>,
}

impl RequirementLinks {
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty() && self.risks.is_empty() && self.cis.is_empty() && self.issues.is_empty()
    }

    /// Remove `id` from every list. Returns how many references were dropped.
    pub fn forget(&mut self, id: &str) -> usize {
        let before = self.tests.len() + self.risks.len() + self.cis.len();
        self.tests.retain(|t| t != id);
        self.risks.retain(|r| r != id);
        self.cis.retain(|c| c != id);
        before - (self.tests.len() + self.risks.len() + self.cis.len())
    }
}

/// Last known state of the remote copies, used as optimistic-concurrency
/// tokens on the next write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteState {
    #[serde(default)]
    pub project_sha: Option<String>,
    #[serde(default)]
    pub audit_sha: Option<String>,
    #[serde(default)]
    pub last_synced_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::common::{Actor, AuditStamp, Level};
    use crate::core::models::requirement::Priority;
    use crate::core::models::test_case::TestCase;

    fn sample_project() -> ProjectData {
        let now = Utc::now();
        let mut project = ProjectData::new("Apollo");
        let mut req = Requirement::new("The system shall log in users", Priority::High);
        req.stamp = AuditStamp::created(Actor::User, now);
        let mut test = TestCase::new("Login works", Some("Given a user\nWhen they log in".into()));
        test.stamp = AuditStamp::created(Actor::User, now);
        let mut risk = Risk::new("Password leak", Level::Medium, Level::High);
        risk.mitigation = Some("Hash passwords".into());
        project.links.insert(
            req.id.clone(),
            RequirementLinks {
                tests: vec![test.id.clone()],
                risks: vec![risk.id.clone()],
                cis: vec![],
                issues: vec![42],
            },
        );
        project.requirements.push(req);
        project.test_cases.push(test);
        project.risks.push(risk);
        project
    }

    #[test]
    fn json_round_trip_is_lossless() {
        let project = sample_project();
        let json = serde_json::to_string_pretty(&project).unwrap();
        let parsed: ProjectData = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, project);
    }

    #[test]
    fn serialized_fields_are_camel_case() {
        let json = serde_json::to_string(&sample_project()).unwrap();
        assert!(json.contains("\"projectName\""));
        assert!(json.contains("\"testCases\""));
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"updatedBy\":\"User\""));
        assert!(json.contains("\"status\":\"Not Run\""));
    }

    #[test]
    fn missing_arrays_default_to_empty() {
        let parsed: ProjectData = serde_json::from_str(r#"{"projectName":"Bare"}"#).unwrap();
        assert_eq!(parsed.format_version, CURRENT_FORMAT_VERSION);
        assert!(parsed.requirements.is_empty());
        assert!(parsed.links.is_empty());
    }

    #[test]
    fn forget_counts_dropped_references() {
        let mut links = RequirementLinks {
            tests: vec!["a".into(), "b".into()],
            risks: vec!["a".into()],
            cis: vec![],
            issues: vec![7],
        };
        assert_eq!(links.forget("a"), 2);
        assert_eq!(links.tests, vec!["b".to_string()]);
        assert!(links.risks.is_empty());
        assert!(!links.is_empty());
    }
}
