use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::models::common::{AuditStamp, Entity, EntityKind, new_id};
use crate::core::models::project_data::ProjectData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum)]
pub enum RequirementStatus {
    Proposed,
    Active,
    Implemented,
    Verified,
}

impl fmt::Display for RequirementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum)]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A tracked requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    pub id: String,
    pub description: String,
    pub status: RequirementStatus,
    pub priority: Priority,
    #[serde(flatten)]
    pub stamp: AuditStamp,
}

impl Requirement {
    pub fn new(description: impl Into<String>, priority: Priority) -> Self {
        Self {
            id: new_id(),
            description: description.into(),
            status: RequirementStatus::Proposed,
            priority,
            stamp: AuditStamp::default(),
        }
    }
}

impl Entity for Requirement {
    const KIND: EntityKind = EntityKind::Requirement;

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
        &project.requirements
    }

    fn collection_mut(project: &mut ProjectData) -> &mut Vec<Self> {
        &mut project.requirements
    }
}
