use chrono::{NaiveDate, TimeZone, Utc};
use colored::Colorize;

use crate::cli::commands::workspace::Workspace;
use crate::cli::context::Credentials;
use crate::cli::output;
use crate::core::errors::{IgnitionError, Result};
use crate::core::models::audit_entry::AuditLogEntry;
use crate::core::models::common::Actor;
use crate::core::services::audit_trail::{AuditQuery, AuditTrail};

/// Execute the `ignition log` command.
///
/// Displays the audit log with optional filters for actor, event type,
/// date and entry count.
pub fn execute(
    actor: Option<Actor>,
    event: Option<&str>,
    since: Option<&str>,
    last: Option<usize>,
    creds: &Credentials,
) -> Result<()> {
    let ws = Workspace::open(creds)?;

    let query = AuditQuery {
        actor,
        event_type: event.map(str::to_string),
        since: since.map(parse_since).transpose()?,
        last,
    };
    let entries = AuditTrail::query(&ws.service.project().audit_log, &query);

    if entries.is_empty() {
        output::header("ignition log");
        output::warning("No audit entries found");
        if actor.is_some() || event.is_some() || since.is_some() {
            println!("  Try removing filters to see all entries.");
        }
        return Ok(());
    }

    output::header(&format!("ignition log ({} entries)", entries.len()));
    println!();
    for entry in entries {
        print_entry(entry);
    }
    Ok(())
}

/// Parse a date string (ISO 8601: `YYYY-MM-DD`) into a UTC DateTime.
fn parse_since(s: &str) -> Result<chrono::DateTime<Utc>> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt))
        .ok_or_else(|| IgnitionError::InvalidInput {
            detail: format!(
                "Invalid date format: '{s}'. Expected ISO 8601 (YYYY-MM-DD), e.g. 2026-01-15"
            ),
        })
}

/// Print a single audit entry as a formatted row.
fn print_entry(entry: &AuditLogEntry) {
    let date = entry.timestamp.format("%Y-%m-%d %H:%M:%S");
    println!(
        "  {} {} {} {:<22} {}",
        date.to_string().dimmed(),
        "│".dimmed(),
        format_actor(entry.actor),
        entry.event_type,
        entry.summary,
    );
}

/// Actor label padded to its column before colouring, so escape codes do
/// not count toward the width.
fn format_actor(actor: Actor) -> String {
    let label = format!("{:<10}", actor.to_string());
    match actor {
        Actor::User => label.cyan().to_string(),
        Actor::Ai => label.magenta().to_string(),
        Actor::System => label.yellow().to_string(),
        Actor::Automation => label.blue().to_string(),
    }
}
