use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::models::common::{AuditStamp, Entity, EntityKind, new_id};
use crate::core::models::project_data::ProjectData;

/// What a process asset instantiates into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum)]
pub enum AssetType {
    RequirementArchetype,
    SolutionBlueprint,
    RiskPlaybook,
    TestStrategy,
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A reusable template with usage tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessAsset {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    #[serde(default)]
    pub description: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub usage_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub stamp: AuditStamp,
}

impl ProcessAsset {
    pub fn new(name: impl Into<String>, asset_type: AssetType, content: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            asset_type,
            description: String::new(),
            content: content.into(),
            tags: Vec::new(),
            usage_count: 0,
            last_used_at: None,
            stamp: AuditStamp::default(),
        }
    }

    /// Record one instantiation of this template.
    pub fn mark_used(&mut self, at: DateTime<Utc>) {
        self.usage_count += 1;
        self.last_used_at = Some(at);
    }
}

impl Entity for ProcessAsset {
    const KIND: EntityKind = EntityKind::ProcessAsset;

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
        &project.process_assets
    }

    fn collection_mut(project: &mut ProjectData) -> &mut Vec<Self> {
        &mut project.process_assets
    }
}
