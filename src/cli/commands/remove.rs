use crate::cli::commands::workspace::Workspace;
use crate::cli::context::Credentials;
use crate::cli::output;
use crate::core::errors::Result;
use crate::core::models::common::Actor;

/// Execute the `ignition remove` command.
///
/// Deletes the entity and every link or dependency that names it.
pub fn execute(id: &str, creds: &Credentials) -> Result<()> {
    let mut ws = Workspace::open(creds)?;
    let (_, id) = ws.service.resolve_id(id)?;
    let kind = ws.service.remove_entity(&id, Actor::User)?;
    ws.save()?;
    output::success(&format!("Removed {kind} {}", output::short_id(&id)));
    Ok(())
}
