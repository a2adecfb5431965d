use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::models::project_data::ProjectData;

/// Who performed an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum)]
pub enum Actor {
    User,
    #[serde(rename = "AI")]
    #[value(name = "ai")]
    Ai,
    System,
    Automation,
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Actor::User => "User",
            Actor::Ai => "AI",
            Actor::System => "System",
            Actor::Automation => "Automation",
        })
    }
}

/// Creation and last-modification stamps carried by every entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditStamp {
    pub created_at: DateTime<Utc>,
    pub created_by: Actor,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Actor,
}

impl AuditStamp {
    /// A fresh stamp where creation and update coincide.
    pub fn created(actor: Actor, at: DateTime<Utc>) -> Self {
        Self {
            created_at: at,
            created_by: actor,
            updated_at: at,
            updated_by: actor,
        }
    }

    pub fn touch(&mut self, actor: Actor, at: DateTime<Utc>) {
        self.updated_at = at;
        self.updated_by = actor;
    }
}

impl Default for AuditStamp {
    fn default() -> Self {
        Self::created(Actor::System, DateTime::<Utc>::UNIX_EPOCH)
    }
}

/// Three-step scale used for risk probability and impact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum)]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    pub fn weight(self) -> u8 {
        match self {
            Level::Low => 1,
            Level::Medium => 2,
            Level::High => 3,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The five kinds of tracked entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EntityKind {
    Requirement,
    TestCase,
    Risk,
    ConfigurationItem,
    ProcessAsset,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Requirement => "requirement",
            EntityKind::TestCase => "test case",
            EntityKind::Risk => "risk",
            EntityKind::ConfigurationItem => "configuration item",
            EntityKind::ProcessAsset => "process asset",
        })
    }
}

/// A record stored in one of the `ProjectData` arrays.
pub trait Entity: Clone {
    const KIND: EntityKind;

    fn id(&self) -> &str;

    /// Short human-readable label (description or name).
    fn label(&self) -> &str;

    fn stamp(&self) -> &AuditStamp;

    fn stamp_mut(&mut self) -> &mut AuditStamp;

    fn collection(project: &ProjectData) -> &Vec<Self>;

    fn collection_mut(project: &mut ProjectData) -> &mut Vec<Self>;

    /// Ids of configuration items this entity depends on.
    fn dependencies(&self) -> &[String] {
        &[]
    }
}

/// Generate a new entity id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
