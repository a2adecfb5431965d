use crate::core::errors::Result;
use crate::core::models::audit_entry::AuditLogEntry;

/// Port for mirroring the audit log to a remote copy.
pub trait AuditMirror {
    /// Write the whole log. `known_sha` is the blob SHA from the previous
    /// mirror, if any. Returns the new SHA.
    fn mirror(&self, entries: &[AuditLogEntry], known_sha: Option<&str>) -> Result<String>;
}
