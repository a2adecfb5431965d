use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::core::errors::Result;
use crate::core::models::audit_entry::AuditLogEntry;
use crate::core::models::common::{Actor, new_id};
use crate::core::models::project_data::RemoteState;
use crate::core::traits::audit_mirror::AuditMirror;

/// Filters for reading the audit log. All filters combine with AND.
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    pub actor: Option<Actor>,
    /// Case-insensitive event type match.
    pub event_type: Option<String>,
    pub since: Option<DateTime<Utc>>,
    /// Keep only the newest N matches.
    pub last: Option<usize>,
}

/// Append-only accumulator over a project's audit log.
pub struct AuditTrail;

impl AuditTrail {
    /// Append an entry stamped with the current time.
    pub fn record<'a>(
        log: &'a mut Vec<AuditLogEntry>,
        actor: Actor,
        event_type: &str,
        summary: String,
        details: BTreeMap<String, Value>,
    ) -> &'a AuditLogEntry {
        log.push(AuditLogEntry {
            id: new_id(),
            timestamp: Utc::now(),
            actor,
            event_type: event_type.to_string(),
            summary,
            details,
        });
        &log[log.len() - 1]
    }

    /// Entries matching `query`, oldest first.
    pub fn query<'a>(entries: &'a [AuditLogEntry], query: &AuditQuery) -> Vec<&'a AuditLogEntry> {
        let matches: Vec<&AuditLogEntry> = entries
            .iter()
            .filter(|e| query.actor.is_none_or(|a| e.actor == a))
            .filter(|e| {
                query
                    .event_type
                    .as_deref()
                    .is_none_or(|t| e.event_type.eq_ignore_ascii_case(t))
            })
            .filter(|e| query.since.is_none_or(|s| e.timestamp >= s))
            .collect();

        match query.last {
            Some(n) if n < matches.len() => matches[matches.len() - n..].to_vec(),
            _ => matches,
        }
    }

    /// Write the whole log through `mirror`, remembering the new SHA in
    /// `remote` on success.
    pub fn mirror(
        entries: &[AuditLogEntry],
        mirror: &dyn AuditMirror,
        remote: &mut RemoteState,
    ) -> Result<()> {
        let sha = mirror.mirror(entries, remote.audit_sha.as_deref())?;
        remote.audit_sha = Some(sha);
        Ok(())
    }
}

/// Build an audit `details` map from string pairs.
pub fn details<const N: usize>(pairs: [(&str, Value); N]) -> BTreeMap<String, Value> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}
