use chrono::Utc;
use tracing::debug;

use crate::core::errors::{GitHubError, GitHubErrorKind, IgnitionError, Result};
use crate::core::models::github::CommitResult;
use crate::core::models::project_data::{CURRENT_FORMAT_VERSION, ProjectData, RemoteState};
use crate::core::traits::repository_contents::RepositoryContents;

/// Moves the project document between the local working copy and the
/// repository, using the remembered blob SHA as a write precondition.
pub struct SyncService<'a, C: RepositoryContents> {
    contents: &'a C,
    project_path: &'a str,
}

impl<'a, C: RepositoryContents> SyncService<'a, C> {
    pub fn new(contents: &'a C, project_path: &'a str) -> Self {
        Self {
            contents,
            project_path,
        }
    }

    /// Write `project` to the repository.
    ///
    /// With no remembered SHA the file must not exist yet; an existing
    /// remote file means someone else pushed first, which is a conflict.
    pub fn push(
        &self,
        project: &ProjectData,
        remote: &mut RemoteState,
        message: &str,
    ) -> Result<CommitResult> {
        let body = format!(
            "{}\n",
            serde_json::to_string_pretty(project).map_err(|e| IgnitionError::InvalidInput {
                detail: format!("project cannot be serialized: {e}"),
            })?
        );

        if remote.project_sha.is_none() {
            match self.contents.fetch_file(self.project_path) {
                Ok(existing) => {
                    debug!(path = self.project_path, sha = %existing.sha, "remote project already exists");
                    return Err(GitHubError {
                        kind: GitHubErrorKind::Conflict,
                        status: None,
                        message: format!(
                            "{} already exists in the repository and was never pulled here",
                            self.project_path
                        ),
                    }
                    .into());
                }
                Err(e) if e.github_kind() == Some(GitHubErrorKind::NotFound) => {}
                Err(e) => return Err(e),
            }
        }

        let result = self.contents.write_file(
            self.project_path,
            &body,
            message,
            remote.project_sha.as_deref(),
        )?;
        remote.project_sha = Some(result.content_sha.clone());
        remote.last_synced_at = Some(Utc::now());
        Ok(result)
    }

    /// Read the project from the repository and remember its SHA.
    ///
    /// The remembered audit SHA is dropped: the pulled document carries the
    /// full log, so the next mirror looks the remote file up again.
    pub fn pull(&self, remote: &mut RemoteState) -> Result<ProjectData> {
        let file = self.contents.fetch_file(self.project_path)?;
        let project: ProjectData =
            serde_json::from_str(&file.content).map_err(|e| IgnitionError::ParseError {
                file: self.project_path.into(),
                detail: e.to_string(),
            })?;

        if project.format_version > CURRENT_FORMAT_VERSION {
            return Err(IgnitionError::FormatVersionTooNew {
                project_version: project.format_version,
                supported_version: CURRENT_FORMAT_VERSION,
            });
        }

        remote.project_sha = Some(file.sha);
        remote.audit_sha = None;
        remote.last_synced_at = Some(Utc::now());
        Ok(project)
    }
}
