use colored::Colorize;

use crate::cli::CiAction;
use crate::cli::commands::workspace::Workspace;
use crate::cli::context::Credentials;
use crate::cli::output;
use crate::core::errors::{IgnitionError, Result};
use crate::core::models::common::Actor;
use crate::core::models::configuration_item::{CiStatus, CiType, ConfigurationItem};
use crate::core::services::project_service::ProjectService;

/// Execute the `ignition ci` subcommands.
pub fn execute(action: &CiAction, creds: &Credentials) -> Result<()> {
    match action {
        CiAction::Add {
            name,
            ci_type,
            version,
            status,
            quality,
            depends_on,
        } => add(name, *ci_type, version, *status, quality, depends_on, creds),
        CiAction::Update {
            id,
            name,
            ci_type,
            version,
            status,
            quality,
            depends_on,
            drop_dependency,
        } => {
            let edit = CiEdit {
                name: name.as_deref(),
                ci_type: *ci_type,
                version: version.as_deref(),
                status: *status,
                quality,
                depends_on,
                drop_dependency,
            };
            update(id, edit, creds)
        }
        CiAction::List { ci_type } => list(*ci_type, creds),
    }
}

struct CiEdit<'a> {
    name: Option<&'a str>,
    ci_type: Option<CiType>,
    version: Option<&'a str>,
    status: Option<CiStatus>,
    quality: &'a [String],
    depends_on: &'a [String],
    drop_dependency: &'a [String],
}

impl CiEdit<'_> {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.ci_type.is_none()
            && self.version.is_none()
            && self.status.is_none()
            && self.quality.is_empty()
            && self.depends_on.is_empty()
            && self.drop_dependency.is_empty()
    }
}

/// Resolve dependency prefixes to full configuration item ids.
fn resolve_all(service: &ProjectService, prefixes: &[String]) -> Result<Vec<String>> {
    prefixes
        .iter()
        .map(|p| service.resolve::<ConfigurationItem>(p))
        .collect()
}

/// Match each `--drop-dependency` value against the item's current
/// dependencies. Dropped ids may already be deleted, so matching is against
/// the dependency list rather than the project.
fn match_dependencies(current: &[String], values: &[String]) -> Result<Vec<String>> {
    values
        .iter()
        .map(|value| {
            let prefix = value.trim();
            if prefix.is_empty() {
                return Err(IgnitionError::InvalidInput {
                    detail: "--drop-dependency needs an id or id prefix".into(),
                });
            }
            if let Some(exact) = current.iter().find(|d| d.as_str() == prefix) {
                return Ok(exact.clone());
            }
            let matches: Vec<&String> = current.iter().filter(|d| d.starts_with(prefix)).collect();
            match matches.as_slice() {
                [one] => Ok((*one).clone()),
                [] => Err(IgnitionError::InvalidInput {
                    detail: format!("no dependency matches '{prefix}'"),
                }),
                many => Err(IgnitionError::AmbiguousId {
                    prefix: prefix.to_string(),
                    count: many.len(),
                }),
            }
        })
        .collect()
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

fn add(
    name: &str,
    ci_type: CiType,
    version: &str,
    status: Option<CiStatus>,
    quality: &[String],
    depends_on: &[String],
    creds: &Credentials,
) -> Result<()> {
    if name.trim().is_empty() {
        return Err(IgnitionError::InvalidInput {
            detail: "configuration item name must not be empty".into(),
        });
    }
    let mut ws = Workspace::open(creds)?;
    let mut item = ConfigurationItem::new(name.trim(), ci_type, version);
    if let Some(s) = status {
        item.status = s;
    }
    for q in quality {
        push_unique(&mut item.quality_attributes, q.trim().to_string());
    }
    for dep in resolve_all(&ws.service, depends_on)? {
        push_unique(&mut item.dependencies, dep);
    }
    let id = ws.service.create(item, Actor::User)?;
    ws.save()?;
    output::success(&format!(
        "Added configuration item {}",
        output::short_id(&id)
    ));
    Ok(())
}

fn update(id: &str, edit: CiEdit<'_>, creds: &Credentials) -> Result<()> {
    if edit.is_empty() {
        return Err(IgnitionError::InvalidInput {
            detail: "nothing to update. Pass --name, --type, --version, --status, --quality, \
                     --depends-on or --drop-dependency."
                .into(),
        });
    }
    let mut ws = Workspace::open(creds)?;
    let id = ws.service.resolve::<ConfigurationItem>(id)?;
    let added = resolve_all(&ws.service, edit.depends_on)?;
    let current = &ws.service.get::<ConfigurationItem>(&id)?.dependencies;
    let dropped = match_dependencies(current, edit.drop_dependency)?;

    ws.service
        .update::<ConfigurationItem>(&id, Actor::User, |item| {
            if let Some(n) = edit.name {
                item.name = n.trim().to_string();
            }
            if let Some(t) = edit.ci_type {
                item.ci_type = t;
            }
            if let Some(v) = edit.version {
                item.version = v.to_string();
            }
            if let Some(s) = edit.status {
                item.status = s;
            }
            for q in edit.quality {
                push_unique(&mut item.quality_attributes, q.trim().to_string());
            }
            item.dependencies.retain(|dep| !dropped.contains(dep));
            for dep in added {
                push_unique(&mut item.dependencies, dep);
            }
        })?;
    ws.save()?;
    output::success(&format!(
        "Updated configuration item {}",
        output::short_id(&id)
    ));
    Ok(())
}

fn list(ci_type: Option<CiType>, creds: &Credentials) -> Result<()> {
    let ws = Workspace::open(creds)?;
    let rows: Vec<&ConfigurationItem> = ws
        .service
        .project()
        .configuration_items
        .iter()
        .filter(|c| ci_type.is_none_or(|t| c.ci_type == t))
        .collect();

    output::header(&format!("Configuration items ({})", rows.len()));
    if rows.is_empty() {
        output::warning("No configuration items found");
        return Ok(());
    }
    for item in rows {
        println!(
            "  {} {:<14} {:<15} {} {}",
            output::short_id(&item.id).cyan(),
            item.ci_type.to_string(),
            item.status.to_string(),
            item.name.bold(),
            item.version.dimmed(),
        );
        if !item.dependencies.is_empty() {
            let deps: Vec<&str> = item.dependencies.iter().map(|d| output::short_id(d)).collect();
            output::detail(&format!("depends on: {}", deps.join(", ")));
        }
        if !item.quality_attributes.is_empty() {
            output::detail(&format!("quality: {}", item.quality_attributes.join(", ")));
        }
    }
    Ok(())
}
