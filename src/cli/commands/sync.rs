use crate::cli::commands::workspace::{Workspace, warn_if_rate_limit_low};
use crate::cli::context::Credentials;
use crate::cli::output;
use crate::core::errors::Result;
use crate::core::models::audit_entry::event;
use crate::core::models::common::Actor;
use crate::core::services::audit_trail::details;
use crate::core::services::project_service::ProjectService;
use crate::core::services::sync_service::SyncService;
use crate::core::traits::project_store::ProjectStore;

/// Execute the `ignition push` command.
///
/// The push is recorded in the audit log before the write, so the pushed
/// document includes its own `ProjectPushed` entry. Nothing is saved
/// locally when the push fails.
pub fn push(message: Option<&str>, creds: &Credentials) -> Result<()> {
    let mut ws = Workspace::open(creds)?;
    let client = ws.github_client()?;
    let github = ws.config.github()?.clone();
    let repo = client.repo().full_name();
    let message = message
        .map(str::to_string)
        .unwrap_or_else(|| format!("Update {} via Ignition", ws.service.project().project_name));

    ws.service.record(
        Actor::User,
        event::PROJECT_PUSHED,
        format!("Pushed project to {repo}"),
        details([
            ("repository", repo.clone().into()),
            ("path", github.project_path.clone().into()),
        ]),
    );

    let mut remote = ws.store.remote_state()?;
    let bar = output::spinner(&format!("Pushing to {repo}..."));
    let result = SyncService::new(&client, &github.project_path).push(
        ws.service.project(),
        &mut remote,
        &message,
    );
    output::finish_spinner(bar);
    let commit = result?;

    ws.store.save_remote_state(&remote)?;
    ws.save_with(&client)?;
    output::success(&format!(
        "Pushed {} to {repo} (commit {})",
        github.project_path,
        output::short_id(&commit.commit_sha)
    ));
    warn_if_rate_limit_low(&client);
    Ok(())
}

/// Execute the `ignition pull` command.
///
/// Replaces the local working copy with the repository's copy. Links and
/// dependencies that name unknown ids are dropped, as on import.
pub fn pull(creds: &Credentials) -> Result<()> {
    let mut ws = Workspace::open(creds)?;
    let client = ws.github_client()?;
    let github = ws.config.github()?.clone();
    let repo = client.repo().full_name();

    let mut remote = ws.store.remote_state()?;
    let bar = output::spinner(&format!("Pulling from {repo}..."));
    let result = SyncService::new(&client, &github.project_path).pull(&mut remote);
    output::finish_spinner(bar);
    let pulled = result?;

    ws.service = ProjectService::new(pulled);
    let pruned = ws.service.prune_dangling();
    ws.service.record(
        Actor::User,
        event::PROJECT_PULLED,
        format!("Pulled project from {repo}"),
        details([
            ("repository", repo.clone().into()),
            ("path", github.project_path.clone().into()),
            ("prunedReferences", pruned.into()),
        ]),
    );
    ws.store.save_remote_state(&remote)?;
    ws.save_with(&client)?;

    let project = ws.service.project();
    output::success(&format!(
        "Pulled '{}' from {repo}: {} requirements, {} tests, {} risks, {} configuration items",
        project.project_name,
        project.requirements.len(),
        project.test_cases.len(),
        project.risks.len(),
        project.configuration_items.len(),
    ));
    if pruned > 0 {
        output::warning(&format!("Dropped {pruned} reference(s) to unknown ids"));
    }
    warn_if_rate_limit_low(&client);
    Ok(())
}
