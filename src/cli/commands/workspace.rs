use std::path::Path;

use crate::adapters::audit::github_audit_mirror::GitHubAuditMirror;
use crate::adapters::github::github_client::GitHubClient;
use crate::adapters::storage::json_project_store::JsonProjectStore;
use crate::adapters::ai::gemini_client::GeminiClient;
use crate::adapters::http::reqwest_transport::ReqwestTransport;
use crate::cli::context::{self, Credentials};
use crate::cli::output;
use crate::config::app_config::AppConfig;
use crate::core::errors::Result;
use crate::core::services::ai_service::AiService;
use crate::core::services::audit_trail::AuditTrail;
use crate::core::services::project_service::ProjectService;
use crate::core::traits::http_transport::HttpTransport;
use crate::core::traits::project_store::ProjectStore;

/// The loaded workspace: configuration, local store, the project and the
/// credentials this invocation was started with.
pub struct Workspace {
    pub config: AppConfig,
    pub store: JsonProjectStore,
    pub service: ProjectService,
    credentials: Credentials,
}

impl Workspace {
    /// Load config and working copy from the workspace directory.
    pub fn open(credentials: &Credentials) -> Result<Self> {
        Self::open_in(context::ignition_dir(), credentials)
    }

    pub fn open_in(dir: &Path, credentials: &Credentials) -> Result<Self> {
        let config = AppConfig::load(dir)?;
        let store = JsonProjectStore::new(dir);
        let service = ProjectService::new(store.load()?);
        Ok(Self {
            config,
            store,
            service,
            credentials: credentials.clone(),
        })
    }

    pub fn github_client(&self) -> Result<GitHubClient<ReqwestTransport>> {
        context::github_client(&self.config, &self.credentials)
    }

    pub fn ai_service(&self) -> Result<AiService<GeminiClient<ReqwestTransport>>> {
        context::ai_service(&self.config, &self.credentials)
    }

    /// Persist the working copy, then try to mirror the audit log.
    pub fn save(&self) -> Result<()> {
        self.store.save(self.service.project())?;
        self.mirror_audit();
        Ok(())
    }

    /// Mirror the audit log to GitHub when configured. Failures are shown
    /// as warnings and never fail the command.
    pub fn mirror_audit(&self) {
        if !self.config.audit.mirror_to_github || self.config.github.is_none() {
            return;
        }
        let client = match self.github_client() {
            Ok(client) => client,
            Err(e) => {
                output::warning(&format!("Audit log not mirrored: {}", first_line(&e.to_string())));
                return;
            }
        };
        self.mirror_audit_with(&client);
        warn_if_rate_limit_low(&client);
    }

    /// Persist the working copy and mirror through a client the command
    /// already holds.
    pub fn save_with<T: HttpTransport>(&self, client: &GitHubClient<T>) -> Result<()> {
        self.store.save(self.service.project())?;
        self.mirror_audit_with(client);
        Ok(())
    }

    /// Mirror through an existing client (used by commands already online).
    pub fn mirror_audit_with<T: HttpTransport>(&self, client: &GitHubClient<T>) {
        if !self.config.audit.mirror_to_github {
            return;
        }
        let Ok(github) = self.config.github() else {
            return;
        };
        let result = (|| -> Result<()> {
            let mut remote = self.store.remote_state()?;
            let mirror = GitHubAuditMirror::new(client, &github.audit_path);
            let bar = output::spinner("Mirroring audit log...");
            let outcome = AuditTrail::mirror(&self.service.project().audit_log, &mirror, &mut remote);
            output::finish_spinner(bar);
            outcome?;
            self.store.save_remote_state(&remote)
        })();

        if let Err(e) = result {
            output::warning(&format!("Audit log not mirrored: {}", first_line(&e.to_string())));
            if let Some(kind) = e.github_kind() {
                output::detail(kind.remediation());
            }
        }
    }
}

/// Print a warning when the GitHub quota is nearly exhausted.
pub fn warn_if_rate_limit_low<T: HttpTransport>(client: &GitHubClient<T>) {
    if !client.rate_limit_is_low() {
        return;
    }
    if let Some(limit) = client.rate_limit() {
        output::warning(&format!(
            "GitHub rate limit low: {} requests remaining",
            limit.remaining
        ));
    }
}

/// First line of a multi-line error message.
pub fn first_line(msg: &str) -> &str {
    msg.lines().next().unwrap_or(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::scripted::ScriptedTransport;
    use crate::core::models::github::RepoRef;
    use crate::core::models::http::{HttpMethod, HttpRequest};
    use crate::core::models::project_data::{ProjectData, RemoteState};
    use crate::core::services::retry_policy::RetryPolicy;
    use crate::core::services::sync_service::SyncService;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use std::sync::Arc;

    const WRITE_OK: &str = r#"{"content":{"sha":"audit-2"},"commit":{"sha":"c1"}}"#;

    fn workspace(dir: &Path, remote: RemoteState) -> Workspace {
        AppConfig::new("Apollo", Some("acme/apollo".into()))
            .save(dir)
            .unwrap();
        let store = JsonProjectStore::new(dir);
        store.save(&ProjectData::new("Apollo")).unwrap();
        store.save_remote_state(&remote).unwrap();
        Workspace::open_in(dir, &Credentials::default()).unwrap()
    }

    fn client(transport: &Arc<ScriptedTransport>) -> GitHubClient<Arc<ScriptedTransport>> {
        GitHubClient::new(
            Arc::clone(transport),
            RepoRef::parse("acme/apollo").unwrap(),
            "ghp_test",
        )
        .with_api_url("https://github.test")
        .with_retry_policy(RetryPolicy::immediate(1))
    }

    fn sha_sent(request: &HttpRequest) -> Option<String> {
        let body: serde_json::Value =
            serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        body["sha"].as_str().map(str::to_string)
    }

    #[test]
    fn first_mirror_creates_the_file_and_remembers_its_sha() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = workspace(tmp.path(), RemoteState::default());
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(404, r#"{"message":"Not Found"}"#)
                .respond(201, WRITE_OK),
        );

        ws.mirror_audit_with(&client(&transport));

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].method, HttpMethod::Put);
        assert!(requests[1].url.ends_with("/contents/audit-log.json"));
        assert_eq!(sha_sent(&requests[1]), None);
        assert_eq!(ws.store.remote_state().unwrap().audit_sha.as_deref(), Some("audit-2"));
    }

    #[test]
    fn rejected_mirror_keeps_state_and_the_save() {
        let tmp = tempfile::tempdir().unwrap();
        let stale = RemoteState {
            audit_sha: Some("audit-1".into()),
            ..Default::default()
        };
        let ws = workspace(tmp.path(), stale.clone());
        let transport = Arc::new(ScriptedTransport::new().respond(409, r#"{"message":"conflict"}"#));

        ws.save_with(&client(&transport)).unwrap();

        assert_eq!(ws.store.remote_state().unwrap(), stale);
        assert_eq!(ws.store.load().unwrap().project_name, "Apollo");
    }

    #[test]
    fn mirror_after_pull_uses_the_current_remote_sha() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = workspace(
            tmp.path(),
            RemoteState {
                audit_sha: Some("audit-1".into()),
                ..Default::default()
            },
        );
        let pulled = serde_json::to_string(&ProjectData::new("Apollo")).unwrap();
        let contents = serde_json::json!({
            "path": "ignition-project.json",
            "sha": "project-3",
            "content": STANDARD.encode(pulled),
            "encoding": "base64",
        });
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(200, &contents.to_string())
                .respond(
                    200,
                    r#"{"path":"audit-log.json","sha":"audit-7","content":"W10=","encoding":"base64"}"#,
                )
                .respond(200, WRITE_OK),
        );
        let client = client(&transport);

        let mut remote = ws.store.remote_state().unwrap();
        SyncService::new(&client, "ignition-project.json")
            .pull(&mut remote)
            .unwrap();
        ws.store.save_remote_state(&remote).unwrap();
        ws.mirror_audit_with(&client);

        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(sha_sent(&requests[2]).as_deref(), Some("audit-7"));
        let remote = ws.store.remote_state().unwrap();
        assert_eq!(remote.project_sha.as_deref(), Some("project-3"));
        assert_eq!(remote.audit_sha.as_deref(), Some("audit-2"));
    }
}
