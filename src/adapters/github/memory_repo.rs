//! In-memory `RepositoryContents` for service tests.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::core::errors::{GitHubError, GitHubErrorKind, Result};
use crate::core::models::github::{CommitResult, FileContents};
use crate::core::traits::repository_contents::RepositoryContents;

/// Repository that enforces blob SHA preconditions the way the contents
/// API does. Every write mints `sha-<n>`.
#[derive(Default)]
pub struct MemoryRepo {
    pub files: RefCell<BTreeMap<String, (String, String)>>,
    pub writes: RefCell<u32>,
}

impl MemoryRepo {
    pub fn with_file(path: &str, content: &str, sha: &str) -> Self {
        let repo = Self::default();
        repo.files
            .borrow_mut()
            .insert(path.into(), (content.into(), sha.into()));
        repo
    }

    pub fn content(&self, path: &str) -> Option<String> {
        self.files.borrow().get(path).map(|(c, _)| c.clone())
    }
}

impl RepositoryContents for MemoryRepo {
    fn fetch_file(&self, path: &str) -> Result<FileContents> {
        self.files
            .borrow()
            .get(path)
            .map(|(content, sha)| FileContents {
                path: path.into(),
                sha: sha.clone(),
                content: content.clone(),
            })
            .ok_or_else(|| {
                GitHubError {
                    kind: GitHubErrorKind::NotFound,
                    status: Some(404),
                    message: "Not Found".into(),
                }
                .into()
            })
    }

    fn write_file(
        &self,
        path: &str,
        content: &str,
        _message: &str,
        sha: Option<&str>,
    ) -> Result<CommitResult> {
        let mut files = self.files.borrow_mut();
        let current = files.get(path).map(|(_, s)| s.as_str());
        if current != sha {
            return Err(GitHubError {
                kind: GitHubErrorKind::Conflict,
                status: Some(409),
                message: "sha mismatch".into(),
            }
            .into());
        }
        *self.writes.borrow_mut() += 1;
        let new_sha = format!("sha-{}", self.writes.borrow());
        files.insert(path.into(), (content.into(), new_sha.clone()));
        Ok(CommitResult {
            content_sha: new_sha,
            commit_sha: "commit".into(),
        })
    }
}
