use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::errors::{IgnitionError, Result};
use crate::core::models::project_data::{CURRENT_FORMAT_VERSION, ProjectData, RemoteState};
use crate::core::traits::project_store::ProjectStore;

pub const PROJECT_FILE: &str = "project.json";
pub const REMOTE_FILE: &str = "remote.json";

/// Working copy of the project kept as pretty JSON in the workspace
/// directory, next to `remote.json` with the last known remote SHAs.
pub struct JsonProjectStore {
    dir: PathBuf,
}

impl JsonProjectStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    pub fn project_path(&self) -> PathBuf {
        self.dir.join(PROJECT_FILE)
    }

    fn remote_path(&self) -> PathBuf {
        self.dir.join(REMOTE_FILE)
    }

    fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| IgnitionError::ParseError {
            file: path.to_path_buf(),
            detail: e.to_string(),
        })
    }

    /// Write through a sibling temp file so a crash never leaves half a document.
    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        if !self.dir.exists() {
            return Err(IgnitionError::NotInitialized {
                dir: self.dir.clone(),
            });
        }
        let json = serde_json::to_string_pretty(value).map_err(|e| IgnitionError::InvalidInput {
            detail: format!("Failed to serialize {}: {e}", path.display()),
        })?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json + "\n")?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl ProjectStore for JsonProjectStore {
    fn load(&self) -> Result<ProjectData> {
        let path = self.project_path();
        if !path.exists() {
            return Err(IgnitionError::NotInitialized {
                dir: self.dir.clone(),
            });
        }
        let project: ProjectData = Self::read_json(&path)?;
        if project.format_version > CURRENT_FORMAT_VERSION {
            return Err(IgnitionError::FormatVersionTooNew {
                project_version: project.format_version,
                supported_version: CURRENT_FORMAT_VERSION,
            });
        }
        Ok(project)
    }

    fn save(&self, project: &ProjectData) -> Result<()> {
        self.write_json(&self.project_path(), project)
    }

    /// A missing `remote.json` means the project was never pushed or pulled.
    fn remote_state(&self) -> Result<RemoteState> {
        let path = self.remote_path();
        if !path.exists() {
            return Ok(RemoteState::default());
        }
        Self::read_json(&path)
    }

    fn save_remote_state(&self, state: &RemoteState) -> Result<()> {
        self.write_json(&self.remote_path(), state)
    }
}
