use crate::core::errors::{GitHubErrorKind, IgnitionError, Result};
use crate::core::models::audit_entry::AuditLogEntry;
use crate::core::traits::audit_mirror::AuditMirror;
use crate::core::traits::repository_contents::RepositoryContents;

/// Mirrors the audit log to a JSON array file in the repository.
///
/// The local log is the source of truth; the remote file is overwritten
/// with the full log on every mirror.
pub struct GitHubAuditMirror<'a, C: RepositoryContents> {
    contents: &'a C,
    path: &'a str,
}

impl<'a, C: RepositoryContents> GitHubAuditMirror<'a, C> {
    pub fn new(contents: &'a C, path: &'a str) -> Self {
        Self { contents, path }
    }

    /// SHA of the current remote file, or `None` if it does not exist yet.
    fn current_sha(&self) -> Result<Option<String>> {
        match self.contents.fetch_file(self.path) {
            Ok(file) => Ok(Some(file.sha)),
            Err(e) if e.github_kind() == Some(GitHubErrorKind::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl<C: RepositoryContents> AuditMirror for GitHubAuditMirror<'_, C> {
    fn mirror(&self, entries: &[AuditLogEntry], known_sha: Option<&str>) -> Result<String> {
        let body = serde_json::to_string_pretty(entries).map_err(|e| IgnitionError::InvalidInput {
            detail: format!("Failed to serialize audit log: {e}"),
        })?;

        let sha = match known_sha {
            Some(sha) => Some(sha.to_string()),
            None => self.current_sha()?,
        };
        let message = format!("Update audit log ({} entries)", entries.len());
        let result = self
            .contents
            .write_file(self.path, &(body + "\n"), &message, sha.as_deref())?;
        Ok(result.content_sha)
    }
}
