use colored::Colorize;

use crate::cli::ReqAction;
use crate::cli::commands::workspace::Workspace;
use crate::cli::context::Credentials;
use crate::cli::output;
use crate::core::errors::{IgnitionError, Result};
use crate::core::models::common::Actor;
use crate::core::models::requirement::{Priority, Requirement, RequirementStatus};

/// Execute the `ignition req` subcommands.
pub fn execute(action: &ReqAction, creds: &Credentials) -> Result<()> {
    match action {
        ReqAction::Add {
            description,
            priority,
        } => add(description, *priority, creds),
        ReqAction::Update {
            id,
            description,
            status,
            priority,
        } => update(id, description.as_deref(), *status, *priority, creds),
        ReqAction::List { status } => list(*status, creds),
    }
}

fn add(description: &str, priority: Priority, creds: &Credentials) -> Result<()> {
    if description.trim().is_empty() {
        return Err(IgnitionError::InvalidInput {
            detail: "requirement description must not be empty".into(),
        });
    }
    let mut ws = Workspace::open(creds)?;
    let id = ws
        .service
        .create(Requirement::new(description.trim(), priority), Actor::User)?;
    ws.save()?;
    output::success(&format!("Added requirement {}", output::short_id(&id)));
    Ok(())
}

fn update(
    id: &str,
    description: Option<&str>,
    status: Option<RequirementStatus>,
    priority: Option<Priority>,
    creds: &Credentials,
) -> Result<()> {
    if description.is_none() && status.is_none() && priority.is_none() {
        return Err(IgnitionError::InvalidInput {
            detail: "nothing to update. Pass --description, --status or --priority.".into(),
        });
    }
    let mut ws = Workspace::open(creds)?;
    let id = ws.service.resolve::<Requirement>(id)?;
    ws.service.update::<Requirement>(&id, Actor::User, |req| {
        if let Some(d) = description {
            req.description = d.trim().to_string();
        }
        if let Some(s) = status {
            req.status = s;
        }
        if let Some(p) = priority {
            req.priority = p;
        }
    })?;
    ws.save()?;
    output::success(&format!("Updated requirement {}", output::short_id(&id)));
    Ok(())
}

fn list(status: Option<RequirementStatus>, creds: &Credentials) -> Result<()> {
    let ws = Workspace::open(creds)?;
    let project = ws.service.project();
    let rows: Vec<&Requirement> = project
        .requirements
        .iter()
        .filter(|r| status.is_none_or(|s| r.status == s))
        .collect();

    output::header(&format!("Requirements ({})", rows.len()));
    if rows.is_empty() {
        output::warning("No requirements found");
        return Ok(());
    }
    for req in rows {
        let tests = project
            .links
            .get(&req.id)
            .map(|l| l.tests.len())
            .unwrap_or(0);
        println!(
            "  {} {:<12} {:<9} {} {}",
            output::short_id(&req.id).cyan(),
            req.status.to_string(),
            req.priority.to_string(),
            req.description,
            format!("[{tests} tests]").dimmed(),
        );
    }
    Ok(())
}
