use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::models::common::{AuditStamp, Entity, EntityKind, new_id};
use crate::core::models::project_data::ProjectData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum)]
pub enum CiType {
    Software,
    Hardware,
    Documentation,
    Network,
    Database,
    Service,
    Library,
    Infrastructure,
    Tool,
}

impl fmt::Display for CiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum)]
pub enum CiStatus {
    Planned,
    #[serde(rename = "In Development")]
    InDevelopment,
    Active,
    Deprecated,
    Retired,
}

impl fmt::Display for CiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CiStatus::InDevelopment => f.write_str("In Development"),
            other => fmt::Debug::fmt(other, f),
        }
    }
}

/// An item under configuration control.
///
/// `dependencies` holds ids of other configuration items; the project
/// service keeps it free of ids that no longer exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub ci_type: CiType,
    pub version: String,
    pub status: CiStatus,
    #[serde(default)]
    pub quality_attributes: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(flatten)]
    pub stamp: AuditStamp,
}

impl ConfigurationItem {
    pub fn new(name: impl Into<String>, ci_type: CiType, version: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            ci_type,
            version: version.into(),
            status: CiStatus::Planned,
            quality_attributes: Vec::new(),
            dependencies: Vec::new(),
            stamp: AuditStamp::default(),
        }
    }
}

impl Entity for ConfigurationItem {
    const KIND: EntityKind = EntityKind::ConfigurationItem;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.name
    }

    fn stamp(&self) -> &AuditStamp {
        &self.stamp
    }

    fn stamp_mut(&mut self) -> &mut AuditStamp {
        &mut self.stamp
    }

    fn collection(project: &ProjectData) -> &Vec<Self> {
        &project.configuration_items
    }

    fn collection_mut(project: &mut ProjectData) -> &mut Vec<Self> {
        &mut project.configuration_items
    }

    fn dependencies(&self) -> &[String] {
        &self.dependencies
    }
}
