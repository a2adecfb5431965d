use std::fmt;
use std::path::PathBuf;

use crate::core::models::http::HttpResponse;

/// All domain errors for Ignition.
///
/// Each variant provides enough context to diagnose the issue
/// without needing a debugger.
#[derive(Debug, thiserror::Error)]
pub enum IgnitionError {
    #[error(
        "Ignition is not initialized in {dir}\n\n  \
         Run 'ignition init' first, or point --dir at an existing workspace."
    )]
    NotInitialized { dir: PathBuf },

    #[error("Ignition is already initialized in this project ({dir} exists)")]
    AlreadyInitialized { dir: PathBuf },

    #[error(
        "No {kind} with id '{id}'\n\n  \
         Ids may be abbreviated to any unique prefix.\n  \
         Use the 'list' subcommands to see existing ids."
    )]
    EntityNotFound { kind: String, id: String },

    #[error(
        "Id prefix '{prefix}' is ambiguous ({count} matches)\n\n  \
         Type more characters of the id."
    )]
    AmbiguousId { prefix: String, count: usize },

    #[error("Invalid link: {detail}")]
    InvalidLink { detail: String },

    #[error("Invalid input: {detail}")]
    InvalidInput { detail: String },

    #[error("Invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    #[error(
        "Parse error in {file}: {detail}\n\n  \
         The file must contain an Ignition project document (JSON)."
    )]
    ParseError { file: PathBuf, detail: String },

    #[error(
        "Missing credential: {name}\n\n  \
         Pass it with {flag} or export {env_var}.\n  \
         Credentials are never written to the workspace."
    )]
    MissingCredential {
        name: String,
        flag: String,
        env_var: String,
    },

    #[error(
        "This project uses format version {project_version}, but your Ignition \
         only supports up to version {supported_version}.\n\n  \
         Update Ignition before editing this project."
    )]
    FormatVersionTooNew {
        project_version: u32,
        supported_version: u32,
    },

    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error(
        "AI generation failed: {reason}\n\n  \
         Check GEMINI_API_KEY and the [ai] section of config.toml, then try again."
    )]
    GenerationFailed { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl IgnitionError {
    /// The GitHub failure category, when this error came from the GitHub API.
    pub fn github_kind(&self) -> Option<GitHubErrorKind> {
        match self {
            IgnitionError::GitHub(e) => Some(e.kind),
            _ => None,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, IgnitionError>;

/// HTTP-status-derived category of a GitHub failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitHubErrorKind {
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    ValidationFailed,
    RateLimited,
    ServerError,
    NetworkError,
}

impl GitHubErrorKind {
    /// Classify a status code. A 403 with an exhausted quota is a rate limit,
    /// not a permission problem.
    pub fn from_status(status: u16, rate_limit_remaining: Option<u64>) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 if rate_limit_remaining == Some(0) => Self::RateLimited,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            409 => Self::Conflict,
            422 => Self::ValidationFailed,
            429 => Self::RateLimited,
            500..=599 => Self::ServerError,
            _ => Self::ValidationFailed,
        }
    }

    /// Whether the request may succeed if sent again unchanged.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::RateLimited | Self::ServerError)
    }

    /// Category-specific guidance shown to the user.
    pub fn remediation(self) -> &'static str {
        match self {
            Self::Unauthorized => {
                "The token was rejected. Check that IGNITION_GITHUB_TOKEN holds a valid, \
                 unexpired Personal Access Token."
            }
            Self::Forbidden => {
                "The token lacks permission. A classic PAT needs the 'repo' scope; a \
                 fine-grained PAT needs 'Contents' and 'Issues' read/write on this repository."
            }
            Self::NotFound => {
                "Repository or file not found. Check [github].repository in config.toml. \
                 Private repositories also answer 404 when the token cannot see them."
            }
            Self::Conflict => {
                "The remote file changed since it was last read. Run 'ignition pull' to \
                 reload it, re-apply your changes, then push again."
            }
            Self::ValidationFailed => "GitHub rejected the request payload.",
            Self::RateLimited => {
                "GitHub rate limit reached. Wait for the quota to reset and try again."
            }
            Self::ServerError => "GitHub is having trouble. Try again in a few minutes.",
            Self::NetworkError => "Could not reach GitHub. Check your network connection.",
        }
    }
}

impl fmt::Display for GitHubErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::ValidationFailed => "validation_failed",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::NetworkError => "network_error",
        };
        f.write_str(tag)
    }
}

/// A failed GitHub call, tagged with its category.
#[derive(Debug, thiserror::Error)]
#[error(
    "GitHub request failed [{kind}{}]: {message}\n\n  {}",
    status_suffix(.status),
    .kind.remediation()
)]
pub struct GitHubError {
    pub kind: GitHubErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl GitHubError {
    /// Build an error from a non-success response, using GitHub's
    /// `{"message": ...}` body when present.
    pub fn from_response(kind: GitHubErrorKind, response: &HttpResponse) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(&response.body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
            .unwrap_or_else(|| truncate(&response.body, 200));
        Self {
            kind,
            status: Some(response.status),
            message,
        }
    }

    /// A transport-level failure (no HTTP status).
    pub fn network(reason: impl Into<String>) -> Self {
        Self {
            kind: GitHubErrorKind::NetworkError,
            status: None,
            message: reason.into(),
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(", HTTP {s}")).unwrap_or_default()
}

fn truncate(s: &str, max: usize) -> String {
    let trimmed = s.trim();
    if trimmed.chars().count() <= max {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(max).collect();
    format!("{cut}…")
}
