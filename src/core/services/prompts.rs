//! Prompt templates for the AI service.
//!
//! Each builder interpolates a compact text rendering of project data so
//! the model sees ids it can refer back to.

use crate::core::models::ai::DocumentKind;
use crate::core::models::github::{GitHubPullRequest, PullRequestFile};
use crate::core::models::project_data::ProjectData;

/// Patches longer than this are cut before being sent to the model.
const MAX_PATCH_CHARS: usize = 4_000;

/// Plain-text summary of the project used as shared context.
pub fn project_context(project: &ProjectData) -> String {
    let mut out = format!("Project: {}\n", project.project_name);

    out.push_str("\nRequirements:\n");
    if project.requirements.is_empty() {
        out.push_str("(none)\n");
    }
    for r in &project.requirements {
        out.push_str(&format!(
            "- [{}] ({}, {}) {}\n",
            r.id, r.status, r.priority, r.description
        ));
        if let Some(links) = project.links.get(&r.id) {
            if !links.tests.is_empty() {
                out.push_str(&format!("  tests: {}\n", links.tests.join(", ")));
            }
            if !links.risks.is_empty() {
                out.push_str(&format!("  risks: {}\n", links.risks.join(", ")));
            }
            if !links.issues.is_empty() {
                let issues: Vec<String> = links.issues.iter().map(|n| format!("#{n}")).collect();
                out.push_str(&format!("  issues: {}\n", issues.join(", ")));
            }
        }
    }

    out.push_str("\nTest cases:\n");
    if project.test_cases.is_empty() {
        out.push_str("(none)\n");
    }
    for t in &project.test_cases {
        out.push_str(&format!("- [{}] ({}) {}\n", t.id, t.status, t.description));
    }

    out.push_str("\nRisks:\n");
    if project.risks.is_empty() {
        out.push_str("(none)\n");
    }
    for r in &project.risks {
        out.push_str(&format!(
            "- [{}] ({}, score {}) {}\n",
            r.id,
            r.status,
            r.score(),
            r.description
        ));
        if let Some(m) = &r.mitigation {
            out.push_str(&format!("  mitigation: {m}\n"));
        }
    }

    out.push_str("\nConfiguration items:\n");
    if project.configuration_items.is_empty() {
        out.push_str("(none)\n");
    }
    for c in &project.configuration_items {
        out.push_str(&format!(
            "- [{}] {} {} ({}, {})\n",
            c.id, c.name, c.version, c.ci_type, c.status
        ));
    }
    out
}

pub fn draft_document(kind: DocumentKind, project: &ProjectData) -> String {
    let guidance = match kind {
        DocumentKind::RequirementsSpecification => {
            "Group requirements by priority. For each one give its id, a clear \
             statement, its status and the tests that verify it. Flag requirements \
             with no linked tests."
        }
        DocumentKind::RiskRegister => {
            "Produce a table of risks with id, description, probability x impact \
             score, status and mitigation. Order by score, highest first."
        }
        DocumentKind::TestPlan => {
            "Describe scope, approach and the test cases to run. Map every test \
             case to the requirements it covers and list uncovered requirements."
        }
        DocumentKind::ReleaseNotes => {
            "Summarize implemented and verified requirements, resolved risks and \
             notable configuration item versions, written for end users."
        }
    };

    format!(
        r#"You are a compliance engineer writing a {kind} in Markdown.

{guidance}

Use only the project data below. Refer to entities by their ids.

## Project data
{context}"#,
        context = project_context(project)
    )
}

pub fn analyze_pull_request(
    pr: &GitHubPullRequest,
    files: &[PullRequestFile],
    project: &ProjectData,
) -> String {
    let mut changes = String::new();
    for f in files {
        changes.push_str(&format!(
            "### {} ({}, +{} -{})\n",
            f.filename, f.status, f.additions, f.deletions
        ));
        if let Some(patch) = &f.patch {
            let cut: String = patch.chars().take(MAX_PATCH_CHARS).collect();
            changes.push_str(&format!("```diff\n{cut}\n```\n"));
        }
    }

    format!(
        r#"You are reviewing pull request #{number} "{title}" ({head} -> {base}).

Description:
{body}

## Changed files
{changes}
## Project data
{context}
Respond with a JSON object only, no prose:
{{
  "summary": "two or three sentences",
  "riskLevel": "Low | Medium | High",
  "affectedRequirements": ["requirement ids from the project data"],
  "suggestedTests": ["tests that should be added or re-run"],
  "concerns": ["specific problems worth a reviewer's attention"]
}}"#,
        number = pr.number,
        title = pr.title,
        head = pr.head.ref_name,
        base = pr.base.ref_name,
        body = pr.body.as_deref().unwrap_or("(no description)"),
        context = project_context(project),
    )
}

pub fn scaffold_repository(description: &str) -> String {
    format!(
        r#"Propose the initial files for a new repository described as:

{description}

Include a README.md, a .gitignore and a minimal source layout. Keep each
file short. Respond with a JSON object only, no prose:
{{
  "files": [
    {{ "path": "relative/path", "content": "file contents" }}
  ]
}}"#
    )
}
