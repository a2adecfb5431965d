use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use crate::adapters::ai::gemini_client::GeminiClient;
use crate::adapters::github::github_client::GitHubClient;
use crate::adapters::http::reqwest_transport::ReqwestTransport;
use crate::config::app_config::AppConfig;
use crate::core::errors::{IgnitionError, Result};
use crate::core::services::ai_service::AiService;

static IGNITION_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Secrets taken from flags or the environment at startup and handed to
/// each command. Never written to the workspace.
#[derive(Default, Clone)]
pub struct Credentials {
    pub github_token: Option<String>,
    pub ai_key: Option<String>,
}

impl Credentials {
    pub fn github_token(&self) -> Result<&str> {
        self.github_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| IgnitionError::MissingCredential {
                name: "GitHub Personal Access Token".into(),
                flag: "--token".into(),
                env_var: "IGNITION_GITHUB_TOKEN".into(),
            })
    }

    pub fn ai_key(&self) -> Result<&str> {
        self.ai_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| IgnitionError::MissingCredential {
                name: "Gemini API key".into(),
                flag: "--ai-key".into(),
                env_var: "GEMINI_API_KEY".into(),
            })
    }
}

/// Initialize the global workspace directory.
/// If `custom` is not provided, defaults to `.ignition`.
pub fn init(custom: Option<&str>) {
    let dir = custom
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".ignition"));
    let _ = IGNITION_DIR.set(dir);
}

/// Get the current workspace directory path.
pub fn ignition_dir() -> &'static Path {
    IGNITION_DIR
        .get()
        .map(|p| p.as_path())
        .unwrap_or(Path::new(".ignition"))
}

/// Build a GitHub client from the `[github]` section and the token.
pub fn github_client(
    config: &AppConfig,
    credentials: &Credentials,
) -> Result<GitHubClient<ReqwestTransport>> {
    let github = config.github()?;
    let repo = github.repo()?;
    let token = credentials.github_token()?;
    let transport = ReqwestTransport::new(github.timeout())?;
    Ok(GitHubClient::new(transport, repo, token)
        .with_api_url(github.api_url.as_str())
        .with_branch(github.branch.clone())
        .with_retry_policy(github.retry_policy())
        .with_rate_limit_warning(github.rate_limit_warning))
}

/// Build the AI service from the `[ai]` section and the API key.
pub fn ai_service(
    config: &AppConfig,
    credentials: &Credentials,
) -> Result<AiService<GeminiClient<ReqwestTransport>>> {
    let key = credentials.ai_key()?;
    let transport = ReqwestTransport::new(Duration::from_secs(config.ai.timeout_secs))?;
    let client = GeminiClient::new(transport, key)
        .with_endpoint(config.ai.endpoint.as_str())
        .with_model(config.ai.model.as_str());
    Ok(AiService::new(client, config.ai.temperature))
}
