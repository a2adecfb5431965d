use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::adapters::ai::gemini_client::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::adapters::github::github_client::DEFAULT_API_URL;
use crate::core::errors::{IgnitionError, Result};
use crate::core::models::github::{RepoRef, is_safe_repo_path};
use crate::core::models::project_data::CURRENT_FORMAT_VERSION;
use crate::core::services::retry_policy::RetryPolicy;

pub const CONFIG_FILE: &str = "config.toml";

/// Top-level configuration read from `.ignition/config.toml`.
///
/// Holds no secrets; tokens and API keys come from flags or the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub ignition: IgnitionSection,
    pub github: Option<GitHubSection>,
    #[serde(default)]
    pub ai: AiSection,
    #[serde(default)]
    pub audit: AuditSection,
}

impl AppConfig {
    /// A fresh configuration for `ignition init`.
    pub fn new(project_name: &str, repository: Option<String>) -> Self {
        Self {
            ignition: IgnitionSection {
                version: env!("CARGO_PKG_VERSION").to_string(),
                format_version: CURRENT_FORMAT_VERSION,
                project_name: project_name.to_string(),
            },
            github: repository.map(GitHubSection::new),
            ai: AiSection::default(),
            audit: AuditSection::default(),
        }
    }

    /// Load the configuration from `{dir}/config.toml`.
    ///
    /// After parsing, validates the repository reference and the repository
    /// file paths so a hand-edited config cannot point writes outside the
    /// repository.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Err(IgnitionError::NotInitialized {
                dir: dir.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = toml::from_str(&content).map_err(|e| IgnitionError::InvalidConfig {
            detail: format!("Failed to parse config.toml: {e}"),
        })?;

        if config.ignition.format_version > CURRENT_FORMAT_VERSION {
            return Err(IgnitionError::FormatVersionTooNew {
                project_version: config.ignition.format_version,
                supported_version: CURRENT_FORMAT_VERSION,
            });
        }

        if let Some(github) = &config.github {
            github.repo()?;
            for (field, path) in [
                ("project_path", &github.project_path),
                ("audit_path", &github.audit_path),
            ] {
                if !is_safe_repo_path(path) {
                    return Err(IgnitionError::InvalidConfig {
                        detail: format!(
                            "github.{field} '{path}' must be a relative path inside the repository"
                        ),
                    });
                }
            }
            if github.max_attempts == 0 {
                return Err(IgnitionError::InvalidConfig {
                    detail: "github.max_attempts must be at least 1".into(),
                });
            }
        }

        Ok(config)
    }

    /// Write the configuration to `{dir}/config.toml`.
    pub fn save(&self, dir: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| IgnitionError::InvalidConfig {
            detail: format!("Failed to serialize config.toml: {e}"),
        })?;
        std::fs::write(dir.join(CONFIG_FILE), content)?;
        Ok(())
    }

    /// The `[github]` section, or an error explaining how to add one.
    pub fn github(&self) -> Result<&GitHubSection> {
        self.github.as_ref().ok_or_else(|| IgnitionError::InvalidConfig {
            detail: "no [github] section in config.toml. Add one with \
                     repository = \"owner/repo\", or re-run 'ignition init --repo owner/repo'."
                .into(),
        })
    }
}

/// The `[ignition]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IgnitionSection {
    pub version: String,
    /// Format version for backward compatibility. Defaults to 1 if missing.
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    pub project_name: String,
}

fn default_format_version() -> u32 {
    1
}

/// The `[github]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubSection {
    /// `owner/repo` or a GitHub URL.
    pub repository: String,
    pub branch: Option<String>,
    #[serde(default = "default_project_path")]
    pub project_path: String,
    #[serde(default = "default_audit_path")]
    pub audit_path: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_rate_limit_warning")]
    pub rate_limit_warning: u64,
}

impl GitHubSection {
    fn new(repository: String) -> Self {
        Self {
            repository,
            branch: None,
            project_path: default_project_path(),
            audit_path: default_audit_path(),
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            rate_limit_warning: default_rate_limit_warning(),
        }
    }

    pub fn repo(&self) -> Result<RepoRef> {
        RepoRef::parse(&self.repository).ok_or_else(|| IgnitionError::InvalidConfig {
            detail: format!(
                "github.repository '{}' is not 'owner/repo' or a GitHub URL",
                self.repository
            ),
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            ..RetryPolicy::default()
        }
    }
}

fn default_project_path() -> String {
    "ignition-project.json".into()
}

fn default_audit_path() -> String {
    "audit-log.json".into()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.into()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    3
}

fn default_rate_limit_warning() -> u64 {
    10
}

/// The `[ai]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiSection {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AiSection {
    fn default() -> Self {
        Self {
            model: default_model(),
            endpoint: default_endpoint(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.into()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.into()
}

fn default_temperature() -> f32 {
    0.4
}

/// The `[audit]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditSection {
    /// Mirror the audit log to the repository after each change.
    #[serde(default = "default_true")]
    pub mirror_to_github: bool,
}

impl Default for AuditSection {
    fn default() -> Self {
        Self {
            mirror_to_github: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &Path, content: &str) {
        std::fs::write(dir.join(CONFIG_FILE), content).unwrap();
    }

    #[test]
    fn minimal_config_fills_defaults() {
        let tmp = TempDir::new().unwrap();
        write_config(
            tmp.path(),
            r#"
[ignition]
version = "0.1.0"
project_name = "Apollo"

[github]
repository = "https://github.com/acme/apollo.git"
"#,
        );
        let config = AppConfig::load(tmp.path()).unwrap();
        let github = config.github().unwrap();
        assert_eq!(config.ignition.format_version, 1);
        assert_eq!(github.repo().unwrap().full_name(), "acme/apollo");
        assert_eq!(github.project_path, "ignition-project.json");
        assert_eq!(github.timeout(), Duration::from_secs(30));
        assert_eq!(github.retry_policy().max_attempts, 3);
        assert_eq!(config.ai.model, DEFAULT_MODEL);
        assert!(config.audit.mirror_to_github);
    }

    #[test]
    fn missing_config_is_not_initialized() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            AppConfig::load(tmp.path()),
            Err(IgnitionError::NotInitialized { .. })
        ));
    }

    #[test]
    fn rejects_newer_format() {
        let tmp = TempDir::new().unwrap();
        write_config(
            tmp.path(),
            "[ignition]\nversion = \"9.0.0\"\nformat_version = 7\nproject_name = \"x\"\n",
        );
        assert!(matches!(
            AppConfig::load(tmp.path()),
            Err(IgnitionError::FormatVersionTooNew { project_version: 7, .. })
        ));
    }

    #[test]
    fn rejects_bad_repository() {
        let tmp = TempDir::new().unwrap();
        write_config(
            tmp.path(),
            "[ignition]\nversion = \"0.1.0\"\nproject_name = \"x\"\n\n[github]\nrepository = \"not a repo\"\n",
        );
        assert!(matches!(
            AppConfig::load(tmp.path()),
            Err(IgnitionError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn rejects_traversal_in_repo_paths() {
        let tmp = TempDir::new().unwrap();
        write_config(
            tmp.path(),
            "[ignition]\nversion = \"0.1.0\"\nproject_name = \"x\"\n\n[github]\nrepository = \"a/b\"\naudit_path = \"../escape.json\"\n",
        );
        let err = AppConfig::load(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("audit_path"));
    }

    #[test]
    fn missing_github_section_explains_fix() {
        let config = AppConfig::new("x", None);
        let err = config.github().unwrap_err();
        assert!(err.to_string().contains("ignition init --repo"));
    }

    #[test]
    fn save_then_load_round_trips() {
        let tmp = TempDir::new().unwrap();
        AppConfig::new("Apollo", Some("acme/apollo".into()))
            .save(tmp.path())
            .unwrap();
        let loaded = AppConfig::load(tmp.path()).unwrap();
        assert_eq!(loaded.ignition.project_name, "Apollo");
        assert_eq!(loaded.github().unwrap().repository, "acme/apollo");
        assert_eq!(loaded.ai.temperature, 0.4);
    }
}
