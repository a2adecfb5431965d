use colored::Colorize;
use serde_json::Value;

use crate::adapters::github::github_client::GitHubClient;
use crate::cli::commands::workspace::{Workspace, warn_if_rate_limit_low};
use crate::cli::context::Credentials;
use crate::cli::{AiAction, output};
use crate::core::errors::{GitHubErrorKind, IgnitionError, Result};
use crate::core::models::ai::{DocumentKind, ScaffoldFile};
use crate::core::models::audit_entry::event;
use crate::core::models::common::Actor;
use crate::core::services::audit_trail::details;
use crate::core::traits::http_transport::HttpTransport;

/// Execute the `ignition ai` subcommands.
pub fn execute(action: &AiAction, creds: &Credentials) -> Result<()> {
    match action {
        AiAction::Draft { kind, output } => draft(*kind, output.as_deref(), creds),
        AiAction::ReviewPr { number, comment } => review_pr(*number, *comment, creds),
        AiAction::Scaffold {
            description,
            commit,
        } => scaffold(description, *commit, creds),
    }
}

fn draft(kind: DocumentKind, destination: Option<&str>, creds: &Credentials) -> Result<()> {
    let mut ws = Workspace::open(creds)?;
    let ai = ws.ai_service()?;

    let bar = output::spinner(&format!("Drafting {kind}..."));
    let result = ai.draft_document(kind, ws.service.project());
    output::finish_spinner(bar);
    let document = result?;

    match destination {
        Some(path) => {
            std::fs::write(path, format!("{}\n", document.trim_end()))?;
            output::success(&format!("Wrote {kind} to {path}"));
        }
        None => println!("{document}"),
    }

    ws.service.record(
        Actor::Ai,
        event::DOCUMENT_DRAFTED,
        format!("Drafted {kind}"),
        details([
            ("kind", kind.to_string().into()),
            ("characters", document.chars().count().into()),
        ]),
    );
    ws.save()
}

fn review_pr(number: u64, post: bool, creds: &Credentials) -> Result<()> {
    let mut ws = Workspace::open(creds)?;
    let client = ws.github_client()?;
    let ai = ws.ai_service()?;

    let bar = output::spinner(&format!("Fetching pull request #{number}..."));
    let fetched = client
        .get_pull_request(number)
        .and_then(|pr| client.list_pull_request_files(number).map(|files| (pr, files)));
    output::finish_spinner(bar);
    let (pr, files) = fetched?;

    let bar = output::spinner(&format!("Reviewing #{number}..."));
    let result = ai.analyze_pull_request(&pr, &files, ws.service.project());
    output::finish_spinner(bar);
    let analysis = result?;

    let body = analysis.to_markdown(number);
    println!("{body}");

    ws.service.record(
        Actor::Ai,
        event::PULL_REQUEST_ANALYZED,
        format!("Reviewed pull request #{number} ({} risk)", analysis.risk_level),
        details([
            ("pullRequest", number.into()),
            ("riskLevel", analysis.risk_level.clone().into()),
            (
                "affectedRequirements",
                Value::from(analysis.affected_requirements.clone()),
            ),
        ]),
    );

    if post {
        let bar = output::spinner(&format!("Commenting on #{number}..."));
        let result = client.post_comment(number, &body);
        output::finish_spinner(bar);
        match result {
            Ok(comment) => {
                ws.service.record(
                    Actor::User,
                    event::COMMENT_POSTED,
                    format!("Posted AI review on pull request #{number}"),
                    details([
                        ("pullRequest", number.into()),
                        ("url", comment.html_url.clone().into()),
                    ]),
                );
                output::success(&format!("Posted review: {}", comment.html_url));
            }
            Err(e) => {
                // Keep the analysis entry even when posting fails.
                ws.save_with(&client)?;
                return Err(e);
            }
        }
    }

    ws.save_with(&client)?;
    warn_if_rate_limit_low(&client);
    Ok(())
}

fn scaffold(description: &str, commit: bool, creds: &Credentials) -> Result<()> {
    if description.trim().is_empty() {
        return Err(IgnitionError::InvalidInput {
            detail: "describe the repository to scaffold".into(),
        });
    }
    let mut ws = Workspace::open(creds)?;
    // Fail on missing GitHub settings before spending an AI call.
    let client = if commit {
        Some(ws.github_client()?)
    } else {
        None
    };
    let ai = ws.ai_service()?;

    let bar = output::spinner("Proposing repository files...");
    let result = ai.scaffold_repository(description);
    output::finish_spinner(bar);
    let files = result?;

    output::header(&format!("Proposed files ({})", files.len()));
    for file in &files {
        println!("\n  {}", file.path.bold());
        for line in file.content.lines() {
            println!("    {}", line.dimmed());
        }
    }

    let committed = match &client {
        Some(client) => commit_files(client, &files)?,
        None => 0,
    };

    let paths: Vec<Value> = files.iter().map(|f| Value::from(f.path.clone())).collect();
    ws.service.record(
        Actor::Ai,
        event::REPOSITORY_SCAFFOLDED,
        format!("Proposed {} repository files", files.len()),
        details([
            ("files", Value::Array(paths)),
            ("committed", committed.into()),
        ]),
    );

    match &client {
        Some(client) => {
            output::success(&format!(
                "Committed {committed} file(s) to {}",
                client.repo().full_name()
            ));
            ws.save_with(client)?;
            warn_if_rate_limit_low(client);
            Ok(())
        }
        None => {
            output::detail("Re-run with --commit to write these files to the repository.");
            ws.save()
        }
    }
}

/// Write each proposed file, updating files that already exist.
fn commit_files<T: HttpTransport>(client: &GitHubClient<T>, files: &[ScaffoldFile]) -> Result<usize> {
    let bar = output::spinner("Committing files...");
    let result = (|| -> Result<usize> {
        for file in files {
            let sha = match client.fetch_file(&file.path) {
                Ok(existing) => Some(existing.sha),
                Err(e) if e.github_kind() == Some(GitHubErrorKind::NotFound) => None,
                Err(e) => return Err(e),
            };
            client.write_file(
                &file.path,
                &file.content,
                &format!("Scaffold {} via Ignition", file.path),
                sha.as_deref(),
            )?;
        }
        Ok(files.len())
    })();
    output::finish_spinner(bar);
    result
}
