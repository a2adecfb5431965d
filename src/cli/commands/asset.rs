use colored::Colorize;

use crate::cli::AssetAction;
use crate::cli::commands::workspace::Workspace;
use crate::cli::context::Credentials;
use crate::cli::output;
use crate::core::errors::{IgnitionError, Result};
use crate::core::models::common::Actor;
use crate::core::models::process_asset::{AssetType, ProcessAsset};

/// Execute the `ignition asset` subcommands.
pub fn execute(action: &AssetAction, creds: &Credentials) -> Result<()> {
    match action {
        AssetAction::Add {
            name,
            asset_type,
            content,
            description,
            tags,
        } => add(name, *asset_type, content, description, tags, creds),
        AssetAction::List => list(creds),
        AssetAction::Apply { id } => apply(id, creds),
    }
}

fn add(
    name: &str,
    asset_type: AssetType,
    content: &str,
    description: &str,
    tags: &[String],
    creds: &Credentials,
) -> Result<()> {
    if name.trim().is_empty() || content.trim().is_empty() {
        return Err(IgnitionError::InvalidInput {
            detail: "a process asset needs a name and content".into(),
        });
    }
    let mut ws = Workspace::open(creds)?;
    let mut asset = ProcessAsset::new(name.trim(), asset_type, content);
    asset.description = description.trim().to_string();
    for tag in tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        if !asset.tags.iter().any(|t| t == tag) {
            asset.tags.push(tag.to_string());
        }
    }
    let id = ws.service.create(asset, Actor::User)?;
    ws.save()?;
    output::success(&format!("Added process asset {}", output::short_id(&id)));
    Ok(())
}

fn list(creds: &Credentials) -> Result<()> {
    let ws = Workspace::open(creds)?;
    let assets = &ws.service.project().process_assets;

    output::header(&format!("Process assets ({})", assets.len()));
    if assets.is_empty() {
        output::warning("No process assets found");
        return Ok(());
    }
    for asset in assets {
        let used = match asset.last_used_at {
            Some(at) => format!("used {}x, last {}", asset.usage_count, at.format("%Y-%m-%d")),
            None => "never used".to_string(),
        };
        println!(
            "  {} {:<21} {} {}",
            output::short_id(&asset.id).cyan(),
            asset.asset_type.to_string(),
            asset.name.bold(),
            format!("({used})").dimmed(),
        );
        if !asset.tags.is_empty() {
            output::detail(&format!("tags: {}", asset.tags.join(", ")));
        }
    }
    Ok(())
}

fn apply(id: &str, creds: &Credentials) -> Result<()> {
    let mut ws = Workspace::open(creds)?;
    let id = ws.service.resolve::<ProcessAsset>(id)?;
    let (kind, created) = ws.service.apply_asset(&id, Actor::User)?;
    ws.save()?;
    output::success(&format!(
        "Created {kind} {} from asset {}",
        output::short_id(&created),
        output::short_id(&id)
    ));
    Ok(())
}
