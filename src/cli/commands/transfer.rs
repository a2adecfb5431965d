use std::path::Path;

use crate::cli::commands::workspace::Workspace;
use crate::cli::context::Credentials;
use crate::cli::output;
use crate::core::errors::{IgnitionError, Result};
use crate::core::models::audit_entry::event;
use crate::core::models::common::Actor;
use crate::core::models::project_data::{CURRENT_FORMAT_VERSION, ProjectData};
use crate::core::services::audit_trail::details;
use crate::core::services::project_service::ProjectService;

/// Execute the `ignition export` command.
///
/// Writes the project exactly as stored, without adding an audit entry.
pub fn export(file: &str, creds: &Credentials) -> Result<()> {
    let ws = Workspace::open(creds)?;
    let json = serde_json::to_string_pretty(ws.service.project()).map_err(|e| {
        IgnitionError::InvalidInput {
            detail: format!("project cannot be serialized: {e}"),
        }
    })?;
    std::fs::write(file, format!("{json}\n"))?;
    output::success(&format!("Exported project to {file}"));
    Ok(())
}

/// Execute the `ignition import` command.
///
/// Replaces the working copy with the file's project. Links and
/// dependencies that name unknown ids are dropped.
pub fn import(file: &str, creds: &Credentials) -> Result<()> {
    let mut ws = Workspace::open(creds)?;
    let path = Path::new(file);
    let content = std::fs::read_to_string(path)?;
    let project: ProjectData =
        serde_json::from_str(&content).map_err(|e| IgnitionError::ParseError {
            file: path.to_path_buf(),
            detail: e.to_string(),
        })?;
    if project.format_version > CURRENT_FORMAT_VERSION {
        return Err(IgnitionError::FormatVersionTooNew {
            project_version: project.format_version,
            supported_version: CURRENT_FORMAT_VERSION,
        });
    }

    ws.service = ProjectService::new(project);
    let pruned = ws.service.prune_dangling();
    ws.service.record(
        Actor::User,
        event::PROJECT_IMPORTED,
        format!("Imported project from {file}"),
        details([
            ("file", file.into()),
            ("prunedReferences", pruned.into()),
        ]),
    );
    ws.save()?;

    output::success(&format!("Imported project from {file}"));
    if pruned > 0 {
        output::warning(&format!("Dropped {pruned} reference(s) to unknown ids"));
    }
    Ok(())
}
