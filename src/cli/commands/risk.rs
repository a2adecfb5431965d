use colored::Colorize;

use crate::cli::RiskAction;
use crate::cli::commands::workspace::Workspace;
use crate::cli::context::Credentials;
use crate::cli::output;
use crate::core::errors::{IgnitionError, Result};
use crate::core::models::common::{Actor, Level};
use crate::core::models::risk::{Risk, RiskStatus};

/// Execute the `ignition risk` subcommands.
pub fn execute(action: &RiskAction, creds: &Credentials) -> Result<()> {
    match action {
        RiskAction::Add {
            description,
            probability,
            impact,
            mitigation,
        } => add(description, *probability, *impact, mitigation.clone(), creds),
        RiskAction::Update {
            id,
            description,
            probability,
            impact,
            status,
            mitigation,
        } => {
            let edit = RiskEdit {
                description: description.as_deref(),
                probability: *probability,
                impact: *impact,
                status: *status,
                mitigation: mitigation.as_deref(),
            };
            update(id, edit, creds)
        }
        RiskAction::List { open } => list(*open, creds),
    }
}

struct RiskEdit<'a> {
    description: Option<&'a str>,
    probability: Option<Level>,
    impact: Option<Level>,
    status: Option<RiskStatus>,
    mitigation: Option<&'a str>,
}

impl RiskEdit<'_> {
    fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.probability.is_none()
            && self.impact.is_none()
            && self.status.is_none()
            && self.mitigation.is_none()
    }

    fn apply(&self, risk: &mut Risk) {
        if let Some(d) = self.description {
            risk.description = d.trim().to_string();
        }
        if let Some(p) = self.probability {
            risk.probability = p;
        }
        if let Some(i) = self.impact {
            risk.impact = i;
        }
        if let Some(s) = self.status {
            risk.status = s;
        }
        if let Some(m) = self.mitigation {
            risk.mitigation = Some(m.to_string()).filter(|m| !m.trim().is_empty());
        }
    }
}

fn add(
    description: &str,
    probability: Level,
    impact: Level,
    mitigation: Option<String>,
    creds: &Credentials,
) -> Result<()> {
    if description.trim().is_empty() {
        return Err(IgnitionError::InvalidInput {
            detail: "risk description must not be empty".into(),
        });
    }
    let mut ws = Workspace::open(creds)?;
    let mut risk = Risk::new(description.trim(), probability, impact);
    risk.mitigation = mitigation.filter(|m| !m.trim().is_empty());
    let score = risk.score();
    let id = ws.service.create(risk, Actor::User)?;
    ws.save()?;
    output::success(&format!(
        "Added risk {} (score {score})",
        output::short_id(&id)
    ));
    Ok(())
}

fn update(id: &str, edit: RiskEdit<'_>, creds: &Credentials) -> Result<()> {
    if edit.is_empty() {
        return Err(IgnitionError::InvalidInput {
            detail: "nothing to update. Pass --description, --probability, --impact, \
                     --status or --mitigation."
                .into(),
        });
    }
    let mut ws = Workspace::open(creds)?;
    let id = ws.service.resolve::<Risk>(id)?;
    ws.service
        .update::<Risk>(&id, Actor::User, |risk| edit.apply(risk))?;
    ws.save()?;
    output::success(&format!("Updated risk {}", output::short_id(&id)));
    Ok(())
}

fn list(open_only: bool, creds: &Credentials) -> Result<()> {
    let ws = Workspace::open(creds)?;
    let mut rows: Vec<&Risk> = ws
        .service
        .project()
        .risks
        .iter()
        .filter(|r| !open_only || r.status == RiskStatus::Open)
        .collect();
    rows.sort_by(|a, b| b.score().cmp(&a.score()));

    output::header(&format!("Risks ({})", rows.len()));
    if rows.is_empty() {
        output::warning("No risks found");
        return Ok(());
    }
    for risk in rows {
        let score = format!("{:>2}", risk.score());
        let score = if risk.is_high_exposure() {
            score.red().bold()
        } else {
            score.normal()
        };
        println!(
            "  {} {} {:<9} P:{:<6} I:{:<6} {}",
            output::short_id(&risk.id).cyan(),
            score,
            risk.status.to_string(),
            risk.probability.to_string(),
            risk.impact.to_string(),
            risk.description,
        );
        if let Some(m) = &risk.mitigation {
            output::detail(&format!("mitigation: {m}"));
        }
    }
    Ok(())
}
