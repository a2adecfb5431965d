use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::core::errors::{IgnitionError, Result};
use crate::core::models::ai::{DocumentKind, GenerationConfig, PrAnalysis, ScaffoldFile};
use crate::core::models::github::{GitHubPullRequest, PullRequestFile, is_safe_repo_path};
use crate::core::models::project_data::ProjectData;
use crate::core::services::prompts;
use crate::core::traits::text_generator::TextGenerator;

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*[ \t]*\r?\n(.*?)\r?\n?```\s*$")
        .expect("code fence pattern is valid")
});

#[derive(Deserialize)]
#[serde(untagged)]
enum ScaffoldEnvelope {
    Wrapped { files: Vec<ScaffoldFile> },
    Bare(Vec<ScaffoldFile>),
}

/// Project-aware prompts on top of a `TextGenerator`.
pub struct AiService<G: TextGenerator> {
    generator: G,
    temperature: f32,
}

impl<G: TextGenerator> AiService<G> {
    pub fn new(generator: G, temperature: f32) -> Self {
        Self {
            generator,
            temperature,
        }
    }

    /// Draft a Markdown document of `kind` from the project data.
    pub fn draft_document(&self, kind: DocumentKind, project: &ProjectData) -> Result<String> {
        let prompt = prompts::draft_document(kind, project);
        let text = self
            .generator
            .generate(&prompt, &GenerationConfig::text(self.temperature))?;
        let text = strip_code_fence(&text).trim().to_string();
        if text.is_empty() {
            return Err(IgnitionError::GenerationFailed {
                reason: "the model returned an empty document".into(),
            });
        }
        Ok(text)
    }

    pub fn analyze_pull_request(
        &self,
        pr: &GitHubPullRequest,
        files: &[PullRequestFile],
        project: &ProjectData,
    ) -> Result<PrAnalysis> {
        let prompt = prompts::analyze_pull_request(pr, files, project);
        let text = self
            .generator
            .generate(&prompt, &GenerationConfig::json(self.temperature))?;
        parse_envelope(&text)
    }

    /// Propose files for a new repository. Every path is relative and stays
    /// inside the repository.
    pub fn scaffold_repository(&self, description: &str) -> Result<Vec<ScaffoldFile>> {
        let prompt = prompts::scaffold_repository(description);
        let text = self
            .generator
            .generate(&prompt, &GenerationConfig::json(self.temperature))?;
        let files = match parse_envelope::<ScaffoldEnvelope>(&text)? {
            ScaffoldEnvelope::Wrapped { files } | ScaffoldEnvelope::Bare(files) => files,
        };

        if files.is_empty() {
            return Err(IgnitionError::GenerationFailed {
                reason: "the model proposed no files".into(),
            });
        }
        for file in &files {
            if !is_safe_repo_path(&file.path) {
                return Err(IgnitionError::GenerationFailed {
                    reason: format!("unsafe file path proposed: '{}'", file.path),
                });
            }
        }
        Ok(files)
    }
}

/// Remove one surrounding Markdown code fence, if present.
pub fn strip_code_fence(text: &str) -> &str {
    match CODE_FENCE.captures(text).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => text,
    }
}

fn parse_envelope<T: for<'de> Deserialize<'de>>(text: &str) -> Result<T> {
    let body = strip_code_fence(text);
    serde_json::from_str(body.trim()).map_err(|e| {
        debug!(response = %text, "unparseable model response");
        IgnitionError::GenerationFailed {
            reason: format!("the model response is not the expected JSON: {e}"),
        }
    })
}
