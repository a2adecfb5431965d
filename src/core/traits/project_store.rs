use crate::core::errors::Result;
use crate::core::models::project_data::{ProjectData, RemoteState};

/// Port for the local working copy of a project.
pub trait ProjectStore {
    fn load(&self) -> Result<ProjectData>;

    fn save(&self, project: &ProjectData) -> Result<()>;

    /// SHAs of the remote files as of the last push or pull.
    fn remote_state(&self) -> Result<RemoteState>;

    fn save_remote_state(&self, state: &RemoteState) -> Result<()>;
}
