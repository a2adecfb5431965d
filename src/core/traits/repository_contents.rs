use crate::core::errors::Result;
use crate::core::models::github::{CommitResult, FileContents};

/// Port for reading and writing files in a remote repository.
pub trait RepositoryContents {
    /// Fetch and decode a file. A missing file is a `not_found` GitHub error.
    fn fetch_file(&self, path: &str) -> Result<FileContents>;

    /// Create (`sha = None`) or update a file. A stale `sha` is a
    /// `conflict` GitHub error.
    fn write_file(
        &self,
        path: &str,
        content: &str,
        message: &str,
        sha: Option<&str>,
    ) -> Result<CommitResult>;
}
