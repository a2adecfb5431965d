use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::models::common::{AuditStamp, Entity, EntityKind, new_id};
use crate::core::models::project_data::ProjectData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum)]
pub enum TestStatus {
    #[serde(rename = "Not Run")]
    NotRun,
    Passed,
    Failed,
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestStatus::NotRun => f.write_str("Not Run"),
            other => fmt::Debug::fmt(other, f),
        }
    }
}

/// A verification case, optionally backed by a Gherkin scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub id: String,
    pub description: String,
    pub status: TestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gherkin: Option<String>,
    #[serde(flatten)]
    pub stamp: AuditStamp,
}

impl TestCase {
    pub fn new(description: impl Into<String>, gherkin: Option<String>) -> Self {
        Self {
            id: new_id(),
            description: description.into(),
            status: TestStatus::NotRun,
            gherkin,
            stamp: AuditStamp::default(),
        }
    }
}

impl Entity for TestCase {
    const KIND: EntityKind = EntityKind::TestCase;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.description
    }

    fn stamp(&self) -> &AuditStamp {
        &self.stamp
    }

    fn stamp_mut(&mut self) -> &mut AuditStamp {
        &mut self.stamp
    }

    fn collection(project: &ProjectData) -> &Vec<Self> {
        &project.test_cases
    }

    fn collection_mut(project: &mut ProjectData) -> &mut Vec<Self> {
        &mut project.test_cases
    }
}
