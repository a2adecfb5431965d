use colored::Colorize;

use crate::cli::TestAction;
use crate::cli::commands::workspace::Workspace;
use crate::cli::context::Credentials;
use crate::cli::output;
use crate::core::errors::{IgnitionError, Result};
use crate::core::models::common::Actor;
use crate::core::models::test_case::{TestCase, TestStatus};

/// Execute the `ignition test` subcommands.
pub fn execute(action: &TestAction, creds: &Credentials) -> Result<()> {
    match action {
        TestAction::Add {
            description,
            gherkin,
        } => add(description, gherkin.clone(), creds),
        TestAction::Update {
            id,
            description,
            status,
            gherkin,
        } => update(id, description.as_deref(), *status, gherkin.as_deref(), creds),
        TestAction::List { status } => list(*status, creds),
    }
}

fn add(description: &str, gherkin: Option<String>, creds: &Credentials) -> Result<()> {
    if description.trim().is_empty() {
        return Err(IgnitionError::InvalidInput {
            detail: "test case description must not be empty".into(),
        });
    }
    let mut ws = Workspace::open(creds)?;
    let id = ws
        .service
        .create(TestCase::new(description.trim(), gherkin), Actor::User)?;
    ws.save()?;
    output::success(&format!("Added test case {}", output::short_id(&id)));
    Ok(())
}

fn update(
    id: &str,
    description: Option<&str>,
    status: Option<TestStatus>,
    gherkin: Option<&str>,
    creds: &Credentials,
) -> Result<()> {
    if description.is_none() && status.is_none() && gherkin.is_none() {
        return Err(IgnitionError::InvalidInput {
            detail: "nothing to update. Pass --description, --status or --gherkin.".into(),
        });
    }
    let mut ws = Workspace::open(creds)?;
    let id = ws.service.resolve::<TestCase>(id)?;
    ws.service.update::<TestCase>(&id, Actor::User, |test| {
        if let Some(d) = description {
            test.description = d.trim().to_string();
        }
        if let Some(s) = status {
            test.status = s;
        }
        // An empty scenario clears it.
        if let Some(g) = gherkin {
            test.gherkin = Some(g.to_string()).filter(|g| !g.trim().is_empty());
        }
    })?;
    ws.save()?;
    output::success(&format!("Updated test case {}", output::short_id(&id)));
    Ok(())
}

fn list(status: Option<TestStatus>, creds: &Credentials) -> Result<()> {
    let ws = Workspace::open(creds)?;
    let rows: Vec<&TestCase> = ws
        .service
        .project()
        .test_cases
        .iter()
        .filter(|t| status.is_none_or(|s| t.status == s))
        .collect();

    output::header(&format!("Test cases ({})", rows.len()));
    if rows.is_empty() {
        output::warning("No test cases found");
        return Ok(());
    }
    for test in rows {
        let status = match test.status {
            TestStatus::Passed => test.status.to_string().green(),
            TestStatus::Failed => test.status.to_string().red(),
            TestStatus::NotRun => test.status.to_string().dimmed(),
        };
        let gherkin = if test.gherkin.is_some() { " [gherkin]" } else { "" };
        println!(
            "  {} {:<8} {}{}",
            output::short_id(&test.id).cyan(),
            status,
            test.description,
            gherkin.dimmed(),
        );
    }
    Ok(())
}
