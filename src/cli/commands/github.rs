use colored::Colorize;

use crate::cli::commands::workspace::{Workspace, warn_if_rate_limit_low};
use crate::cli::context::Credentials;
use crate::cli::{PrsAction, output};
use crate::core::errors::{IgnitionError, Result};
use crate::core::models::audit_entry::event;
use crate::core::models::common::Actor;
use crate::core::services::audit_trail::details;

/// Execute the `ignition issues` command.
///
/// Lists open issues and the requirements linked to each.
pub fn issues(creds: &Credentials) -> Result<()> {
    let ws = Workspace::open(creds)?;
    let client = ws.github_client()?;
    let repo = client.repo().full_name();

    let bar = output::spinner(&format!("Fetching issues from {repo}..."));
    let result = client.list_open_issues();
    output::finish_spinner(bar);
    let issues = result?;

    output::header(&format!("Open issues in {repo} ({})", issues.len()));
    if issues.is_empty() {
        output::warning("No open issues");
    }
    let links = &ws.service.project().links;
    for issue in &issues {
        let author = issue.user.as_ref().map(|u| u.login.as_str()).unwrap_or("?");
        println!(
            "  {} {} {}",
            format!("#{:<5}", issue.number).cyan(),
            issue.title,
            format!("by {author}").dimmed(),
        );
        let linked: Vec<&str> = links
            .iter()
            .filter(|(_, l)| l.issues.contains(&issue.number))
            .map(|(req, _)| output::short_id(req))
            .collect();
        if !linked.is_empty() {
            output::detail(&format!("requirements: {}", linked.join(", ")));
        }
    }

    warn_if_rate_limit_low(&client);
    Ok(())
}

/// Execute the `ignition prs` subcommands.
pub fn prs(action: &PrsAction, creds: &Credentials) -> Result<()> {
    let mut ws = Workspace::open(creds)?;
    let client = ws.github_client()?;
    let repo = client.repo().full_name();

    match action {
        PrsAction::List => {
            let bar = output::spinner(&format!("Fetching pull requests from {repo}..."));
            let result = client.list_open_pull_requests();
            output::finish_spinner(bar);
            let prs = result?;

            output::header(&format!("Open pull requests in {repo} ({})", prs.len()));
            if prs.is_empty() {
                output::warning("No open pull requests");
            }
            for pr in &prs {
                println!(
                    "  {} {} {}",
                    format!("#{:<5}", pr.number).cyan(),
                    pr.title,
                    format!("{} -> {}", pr.head.ref_name, pr.base.ref_name).dimmed(),
                );
            }
        }
        PrsAction::Files { number } => {
            let bar = output::spinner(&format!("Fetching files for #{number}..."));
            let result = client.list_pull_request_files(*number);
            output::finish_spinner(bar);
            let files = result?;

            output::header(&format!("Files changed in #{number} ({})", files.len()));
            for file in &files {
                println!(
                    "  {:<9} {} {} {}",
                    file.status,
                    file.filename,
                    format!("+{}", file.additions).green(),
                    format!("-{}", file.deletions).red(),
                );
            }
        }
        PrsAction::Comment { number, body } => {
            if body.trim().is_empty() {
                return Err(IgnitionError::InvalidInput {
                    detail: "comment body must not be empty".into(),
                });
            }
            let bar = output::spinner(&format!("Commenting on #{number}..."));
            let result = client.post_comment(*number, body);
            output::finish_spinner(bar);
            let comment = result?;

            ws.service.record(
                Actor::User,
                event::COMMENT_POSTED,
                format!("Commented on pull request #{number}"),
                details([
                    ("repository", repo.clone().into()),
                    ("pullRequest", (*number).into()),
                    ("url", comment.html_url.clone().into()),
                ]),
            );
            ws.save_with(&client)?;
            output::success(&format!("Posted comment: {}", comment.html_url));
        }
    }

    warn_if_rate_limit_low(&client);
    Ok(())
}
