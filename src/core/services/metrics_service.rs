use std::collections::{BTreeMap, HashSet};

use crate::core::models::metrics::{DashboardMetrics, Percentage};
use crate::core::models::project_data::ProjectData;
use crate::core::models::risk::RiskStatus;
use crate::core::models::test_case::TestStatus;

/// Derives dashboard figures from a project snapshot.
pub struct MetricsService;

impl MetricsService {
    pub fn compute(project: &ProjectData) -> DashboardMetrics {
        let requirement_total = project.requirements.len();
        let test_ids: HashSet<&str> = project.test_cases.iter().map(|t| t.id.as_str()).collect();
        let covered = project
            .requirements
            .iter()
            .filter(|r| {
                project.links.get(&r.id).is_some_and(|links| {
                    links.tests.iter().any(|t| test_ids.contains(t.as_str()))
                })
            })
            .count();

        let count_tests =
            |status: TestStatus| project.test_cases.iter().filter(|t| t.status == status).count();
        let tests_passed = count_tests(TestStatus::Passed);
        let tests_failed = count_tests(TestStatus::Failed);
        let tests_not_run = count_tests(TestStatus::NotRun);

        let open: Vec<_> = project
            .risks
            .iter()
            .filter(|r| r.status == RiskStatus::Open)
            .collect();

        DashboardMetrics {
            requirement_total,
            requirements_by_status: tally(project.requirements.iter().map(|r| r.status.to_string())),
            test_coverage: Percentage::new(covered, requirement_total),
            tests_passed,
            tests_failed,
            tests_not_run,
            pass_rate: Percentage::new(tests_passed, tests_passed + tests_failed),
            risk_total: project.risks.len(),
            open_risks: open.len(),
            open_high_exposure_risks: open.iter().filter(|r| r.is_high_exposure()).count(),
            cis_by_type: tally(project.configuration_items.iter().map(|c| c.ci_type.to_string())),
            asset_total: project.process_assets.len(),
            asset_usage: project
                .process_assets
                .iter()
                .map(|a| u64::from(a.usage_count))
                .sum(),
            audit_by_actor: tally(project.audit_log.iter().map(|e| e.actor.to_string())),
        }
    }
}

fn tally(keys: impl Iterator<Item = String>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}
