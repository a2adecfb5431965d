use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::models::common::Actor;

/// Event type tags recorded in the audit log.
pub mod event {
    pub const PROJECT_INITIALIZED: &str = "ProjectInitialized";
    pub const ENTITY_CREATED: &str = "EntityCreated";
    pub const ENTITY_UPDATED: &str = "EntityUpdated";
    pub const ENTITY_DELETED: &str = "EntityDeleted";
    pub const LINK_ADDED: &str = "LinkAdded";
    pub const LINK_REMOVED: &str = "LinkRemoved";
    pub const ASSET_APPLIED: &str = "AssetApplied";
    pub const PROJECT_PUSHED: &str = "ProjectPushed";
    pub const PROJECT_PULLED: &str = "ProjectPulled";
    pub const PROJECT_IMPORTED: &str = "ProjectImported";
    pub const DOCUMENT_DRAFTED: &str = "DocumentDrafted";
    pub const PULL_REQUEST_ANALYZED: &str = "PullRequestAnalyzed";
    pub const COMMENT_POSTED: &str = "CommentPosted";
    pub const REPOSITORY_SCAFFOLDED: &str = "RepositoryScaffolded";
}

/// A single entry in the project audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub actor: Actor,
    pub event_type: String,
    pub summary: String,
    #[serde(default)]
    pub details: BTreeMap<String, serde_json::Value>,
}
