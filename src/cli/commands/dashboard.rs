use std::collections::BTreeMap;

use colored::Colorize;

use crate::cli::commands::workspace::Workspace;
use crate::cli::context::Credentials;
use crate::cli::output;
use crate::core::errors::Result;
use crate::core::services::metrics_service::MetricsService;

/// Execute the `ignition dashboard` command.
pub fn execute(creds: &Credentials) -> Result<()> {
    let ws = Workspace::open(creds)?;
    let project = ws.service.project();
    let metrics = MetricsService::compute(project);

    output::header(&format!("{} dashboard", project.project_name));

    println!("\n{}", "  Requirements".bold());
    println!("  Total: {}", metrics.requirement_total);
    print_tally(&metrics.requirements_by_status);
    println!(
        "  Test coverage: {} ({}/{} requirements)",
        metrics.test_coverage.to_string().cyan(),
        metrics.test_coverage.numerator,
        metrics.test_coverage.denominator,
    );

    println!("\n{}", "  Tests".bold());
    println!(
        "  Passed: {}  Failed: {}  Not run: {}",
        metrics.tests_passed.to_string().green(),
        metrics.tests_failed.to_string().red(),
        metrics.tests_not_run,
    );
    println!(
        "  Pass rate: {} ({}/{} executed)",
        metrics.pass_rate.to_string().cyan(),
        metrics.pass_rate.numerator,
        metrics.pass_rate.denominator,
    );

    println!("\n{}", "  Risks".bold());
    println!(
        "  Total: {}  Open: {}",
        metrics.risk_total, metrics.open_risks
    );
    if metrics.open_high_exposure_risks > 0 {
        output::warning(&format!(
            "{} open high-exposure risk(s)",
            metrics.open_high_exposure_risks
        ));
    }

    println!("\n{}", "  Configuration items".bold());
    if metrics.cis_by_type.is_empty() {
        println!("  {}", "none".dimmed());
    }
    print_tally(&metrics.cis_by_type);

    println!("\n{}", "  Process assets".bold());
    println!(
        "  Total: {}  Times applied: {}",
        metrics.asset_total, metrics.asset_usage
    );

    println!("\n{}", "  Audit log".bold());
    print_tally(&metrics.audit_by_actor);

    Ok(())
}

fn print_tally(tally: &BTreeMap<String, usize>) {
    for (label, count) in tally {
        println!("    {:<16} {count}", label.dimmed());
    }
}
