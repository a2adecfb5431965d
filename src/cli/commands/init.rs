use std::path::Path;

use crate::adapters::storage::json_project_store::JsonProjectStore;
use crate::cli::{context, output};
use crate::config::app_config::AppConfig;
use crate::core::errors::{IgnitionError, Result};
use crate::core::models::audit_entry::event;
use crate::core::models::common::Actor;
use crate::core::models::github::RepoRef;
use crate::core::models::project_data::ProjectData;
use crate::core::services::audit_trail::details;
use crate::core::services::project_service::ProjectService;
use crate::core::traits::project_store::ProjectStore;

/// Execute the `ignition init` command.
///
/// Creates the workspace directory with a default `config.toml` and an
/// empty project whose audit log starts with a `ProjectInitialized` entry.
pub fn execute(name: Option<&str>, repo: Option<&str>) -> Result<()> {
    let dir = context::ignition_dir();
    if dir.exists() {
        return Err(IgnitionError::AlreadyInitialized {
            dir: dir.to_path_buf(),
        });
    }

    if let Some(repo) = repo
        && RepoRef::parse(repo).is_none()
    {
        return Err(IgnitionError::InvalidInput {
            detail: format!("'{repo}' is not 'owner/repo' or a GitHub URL"),
        });
    }

    let project_name = name
        .map(str::to_string)
        .unwrap_or_else(default_project_name);

    output::header(&format!("Ignition: initializing '{project_name}'"));

    std::fs::create_dir_all(dir)?;
    output::success(&format!("Created {}/", dir.display()));

    let config = AppConfig::new(&project_name, repo.map(str::to_string));
    config.save(dir)?;
    output::success("Generated config.toml with defaults");

    let mut service = ProjectService::new(ProjectData::new(project_name.as_str()));
    service.record(
        Actor::User,
        event::PROJECT_INITIALIZED,
        format!("Initialized project '{project_name}'"),
        details([("projectName", project_name.clone().into())]),
    );
    JsonProjectStore::new(dir).save(service.project())?;
    output::success("Created project.json");

    match &config.github {
        Some(github) => output::detail(&format!(
            "Sync target: {}. Set IGNITION_GITHUB_TOKEN, then run 'ignition push'.",
            github.repository
        )),
        None => output::detail("Local only. Add a [github] section to config.toml to sync."),
    }
    Ok(())
}

/// Name of the current directory, or a generic fallback.
fn default_project_name() -> String {
    std::env::current_dir()
        .ok()
        .as_deref()
        .and_then(Path::file_name)
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| "Ignition Project".to_string())
}
