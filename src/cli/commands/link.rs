use crate::cli::commands::workspace::Workspace;
use crate::cli::context::Credentials;
use crate::cli::{LinkAction, LinkTargetArgs, output};
use crate::core::errors::{IgnitionError, Result};
use crate::core::models::common::{Actor, Entity};
use crate::core::models::configuration_item::ConfigurationItem;
use crate::core::models::requirement::Requirement;
use crate::core::models::risk::Risk;
use crate::core::models::test_case::TestCase;
use crate::core::services::project_service::{LinkTarget, ProjectService};

/// Execute the `ignition link` subcommands.
pub fn execute(action: &LinkAction, creds: &Credentials) -> Result<()> {
    let mut ws = Workspace::open(creds)?;
    let (requirement, target, adding) = match action {
        LinkAction::Add {
            requirement,
            target,
        } => (requirement, target, true),
        LinkAction::Remove {
            requirement,
            target,
        } => (requirement, target, false),
    };

    let requirement_id = ws.service.resolve::<Requirement>(requirement)?;
    let target = to_target(&ws.service, target)?;

    let changed = if adding {
        ws.service.link(&requirement_id, &target, Actor::User)?
    } else {
        ws.service.unlink(&requirement_id, &target, Actor::User)?
    };

    if !changed {
        output::warning(if adding {
            "Link already exists, nothing changed"
        } else {
            "No such link, nothing changed"
        });
        return Ok(());
    }

    ws.save()?;
    let verb = if adding { "Linked" } else { "Unlinked" };
    output::success(&format!(
        "{verb} requirement {} and {}",
        output::short_id(&requirement_id),
        describe(&target)
    ));
    Ok(())
}

/// Turn the flag group into a target, expanding id prefixes. An unknown id
/// is passed through as given so the service can reject or unlink it.
fn to_target(service: &ProjectService, args: &LinkTargetArgs) -> Result<LinkTarget> {
    if let Some(id) = &args.test {
        return Ok(LinkTarget::Test(expand::<TestCase>(service, id)?));
    }
    if let Some(id) = &args.risk {
        return Ok(LinkTarget::Risk(expand::<Risk>(service, id)?));
    }
    if let Some(id) = &args.ci {
        return Ok(LinkTarget::Ci(expand::<ConfigurationItem>(service, id)?));
    }
    match args.issue {
        Some(number) => Ok(LinkTarget::Issue(number)),
        None => Err(IgnitionError::InvalidInput {
            detail: "pass one of --test, --risk, --ci or --issue".into(),
        }),
    }
}

fn expand<E: Entity>(service: &ProjectService, prefix: &str) -> Result<String> {
    match service.resolve::<E>(prefix) {
        Err(IgnitionError::EntityNotFound { .. }) => Ok(prefix.to_string()),
        other => other,
    }
}

fn describe(target: &LinkTarget) -> String {
    match target {
        LinkTarget::Test(id) => format!("test case {}", output::short_id(id)),
        LinkTarget::Risk(id) => format!("risk {}", output::short_id(id)),
        LinkTarget::Ci(id) => format!("configuration item {}", output::short_id(id)),
        LinkTarget::Issue(n) => format!("issue #{n}"),
    }
}
