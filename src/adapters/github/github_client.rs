use std::cell::Cell;
use std::thread;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::adapters::http::reqwest_transport::user_agent;
use crate::core::errors::{GitHubError, GitHubErrorKind, IgnitionError, Result};
use crate::core::models::github::{
    CommitResult, FileContents, GitHubComment, GitHubIssue, GitHubPullRequest, PullRequestFile,
    RateLimit, RepoRef,
};
use crate::core::models::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::core::services::retry_policy::RetryPolicy;
use crate::core::traits::http_transport::HttpTransport;
use crate::core::traits::repository_contents::RepositoryContents;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const ACCEPT: &str = "application/vnd.github.v3+json";
const PER_PAGE: usize = 100;
const MAX_PAGES: u32 = 50;

/// GitHub REST v3 client for one repository.
///
/// Every call goes through the retry loop: rate limits and 5xx answers are
/// retried with backoff, everything else fails on the first response.
pub struct GitHubClient<T: HttpTransport> {
    transport: T,
    repo: RepoRef,
    token: String,
    api_url: String,
    branch: Option<String>,
    retry: RetryPolicy,
    rate_limit_warning: u64,
    rate_limit: Cell<Option<RateLimit>>,
}

#[derive(Deserialize)]
struct ContentsResponse {
    path: String,
    sha: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: String,
}

#[derive(Deserialize)]
struct BlobResponse {
    content: String,
    encoding: String,
}

#[derive(Deserialize)]
struct ShaOnly {
    sha: String,
}

#[derive(Deserialize)]
struct WriteResponse {
    content: ShaOnly,
    commit: ShaOnly,
}

impl<T: HttpTransport> GitHubClient<T> {
    pub fn new(transport: T, repo: RepoRef, token: impl Into<String>) -> Self {
        Self {
            transport,
            repo,
            token: token.into(),
            api_url: DEFAULT_API_URL.to_string(),
            branch: None,
            retry: RetryPolicy::default(),
            rate_limit_warning: 10,
            rate_limit: Cell::new(None),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_branch(mut self, branch: Option<String>) -> Self {
        self.branch = branch.filter(|b| !b.trim().is_empty());
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_rate_limit_warning(mut self, threshold: u64) -> Self {
        self.rate_limit_warning = threshold;
        self
    }

    pub fn repo(&self) -> &RepoRef {
        &self.repo
    }

    /// Quota reported by the most recent response.
    pub fn rate_limit(&self) -> Option<RateLimit> {
        self.rate_limit.get()
    }

    /// Whether the remaining quota has dropped below the warning threshold.
    pub fn rate_limit_is_low(&self) -> bool {
        self.rate_limit
            .get()
            .is_some_and(|r| r.remaining < self.rate_limit_warning)
    }

    /// Read a file and its blob SHA. Files over 1 MB come back from the
    /// contents API without a body and are fetched through the blobs API.
    pub fn fetch_file(&self, path: &str) -> Result<FileContents> {
        let mut url = self.contents_url(path);
        if let Some(branch) = &self.branch {
            url.push_str(&format!("?ref={}", urlencoding::encode(branch)));
        }
        let response = self.execute(HttpMethod::Get, &url, None)?;
        let body: ContentsResponse = parse_body(&response)?;

        let content = if body.encoding == "base64" {
            decode_text(&response, &body.path, &body.content)?
        } else {
            debug!(path = %body.path, encoding = %body.encoding, "contents API omitted the body, fetching blob");
            self.fetch_blob(&body.path, &body.sha)?
        };

        Ok(FileContents {
            path: body.path,
            sha: body.sha,
            content,
        })
    }

    fn fetch_blob(&self, path: &str, sha: &str) -> Result<String> {
        let url = self.repo_url(&format!("git/blobs/{}", urlencoding::encode(sha)));
        let response = self.execute(HttpMethod::Get, &url, None)?;
        let blob: BlobResponse = parse_body(&response)?;
        match blob.encoding.as_str() {
            "base64" => decode_text(&response, path, &blob.content),
            "utf-8" => Ok(blob.content),
            other => Err(unexpected(
                &response,
                format!("{path} came back with unsupported encoding '{other}'"),
            )),
        }
    }

    /// Create or update a file. A stale or missing `sha` for an existing file
    /// is reported as a conflict.
    pub fn write_file(
        &self,
        path: &str,
        content: &str,
        message: &str,
        sha: Option<&str>,
    ) -> Result<CommitResult> {
        let mut payload = serde_json::json!({
            "message": message,
            "content": STANDARD.encode(content.as_bytes()),
        });
        if let Some(sha) = sha {
            payload["sha"] = sha.into();
        }
        if let Some(branch) = &self.branch {
            payload["branch"] = branch.as_str().into();
        }

        let response = self
            .execute(HttpMethod::Put, &self.contents_url(path), Some(payload.to_string()))
            .map_err(sha_mismatch_is_conflict)?;
        let body: WriteResponse = parse_body(&response)?;
        Ok(CommitResult {
            content_sha: body.content.sha,
            commit_sha: body.commit.sha,
        })
    }

    /// Open issues, excluding pull requests.
    pub fn list_open_issues(&self) -> Result<Vec<GitHubIssue>> {
        let issues: Vec<GitHubIssue> = self.paginate(&self.repo_url("issues?state=open"))?;
        Ok(issues
            .into_iter()
            .filter(|i| i.pull_request.is_none())
            .collect())
    }

    pub fn list_open_pull_requests(&self) -> Result<Vec<GitHubPullRequest>> {
        self.paginate(&self.repo_url("pulls?state=open"))
    }

    pub fn get_pull_request(&self, number: u64) -> Result<GitHubPullRequest> {
        let response = self.execute(HttpMethod::Get, &self.repo_url(&format!("pulls/{number}")), None)?;
        parse_body(&response)
    }

    pub fn list_pull_request_files(&self, number: u64) -> Result<Vec<PullRequestFile>> {
        self.paginate(&self.repo_url(&format!("pulls/{number}/files")))
    }

    /// Comment on an issue or pull request.
    pub fn post_comment(&self, number: u64, body: &str) -> Result<GitHubComment> {
        let payload = serde_json::json!({ "body": body }).to_string();
        let response = self.execute(
            HttpMethod::Post,
            &self.repo_url(&format!("issues/{number}/comments")),
            Some(payload),
        )?;
        parse_body(&response)
    }

    fn repo_url(&self, rest: &str) -> String {
        format!(
            "{}/repos/{}/{}/{rest}",
            self.api_url, self.repo.owner, self.repo.name
        )
    }

    fn contents_url(&self, path: &str) -> String {
        let encoded: Vec<String> = path
            .trim_start_matches('/')
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        self.repo_url(&format!("contents/{}", encoded.join("/")))
    }

    fn paginate<R: DeserializeOwned>(&self, url: &str) -> Result<Vec<R>> {
        let separator = if url.contains('?') { '&' } else { '?' };
        let mut all = Vec::new();
        for page in 1..=MAX_PAGES {
            let page_url = format!("{url}{separator}per_page={PER_PAGE}&page={page}");
            let response = self.execute(HttpMethod::Get, &page_url, None)?;
            let items: Vec<R> = parse_body(&response)?;
            let count = items.len();
            all.extend(items);
            if count < PER_PAGE {
                break;
            }
        }
        Ok(all)
    }

    fn execute(&self, method: HttpMethod, url: &str, body: Option<String>) -> Result<HttpResponse> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut request = HttpRequest::new(method, url)
                .header("Authorization", format!("token {}", self.token))
                .header("Accept", ACCEPT)
                .header("User-Agent", user_agent());
            if let Some(body) = &body {
                request = request.json_body(body.clone());
            }

            debug!(?method, url, attempt, "GitHub request");
            let response = self
                .transport
                .send(&request)
                .map_err(|e| GitHubError::network(e.reason))?;
            self.record_rate_limit(&response);

            if response.is_success() {
                return Ok(response);
            }

            let remaining = response
                .header("x-ratelimit-remaining")
                .and_then(|v| v.trim().parse::<u64>().ok());
            let kind = GitHubErrorKind::from_status(response.status, remaining);
            if kind.is_retryable() && attempt < self.retry.max_attempts {
                let delay = self.retry.delay_for(attempt, retry_after(&response));
                warn!(
                    status = response.status,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "GitHub request failed, retrying"
                );
                if !delay.is_zero() {
                    thread::sleep(delay);
                }
                continue;
            }

            return Err(GitHubError::from_response(kind, &response).into());
        }
    }

    fn record_rate_limit(&self, response: &HttpResponse) {
        let Some(remaining) = response
            .header("x-ratelimit-remaining")
            .and_then(|v| v.trim().parse::<u64>().ok())
        else {
            return;
        };
        let limit = RateLimit {
            remaining,
            limit: response
                .header("x-ratelimit-limit")
                .and_then(|v| v.trim().parse().ok()),
            reset: response
                .header("x-ratelimit-reset")
                .and_then(|v| v.trim().parse().ok()),
        };
        if remaining < self.rate_limit_warning {
            warn!(remaining, "GitHub rate limit running low");
        }
        self.rate_limit.set(Some(limit));
    }
}

impl<T: HttpTransport> RepositoryContents for GitHubClient<T> {
    fn fetch_file(&self, path: &str) -> Result<FileContents> {
        GitHubClient::fetch_file(self, path)
    }

    fn write_file(
        &self,
        path: &str,
        content: &str,
        message: &str,
        sha: Option<&str>,
    ) -> Result<CommitResult> {
        GitHubClient::write_file(self, path, content, message, sha)
    }
}

/// GitHub answers 422 "sha wasn't supplied" or "does not match" when the
/// precondition fails; treat those like 409.
fn sha_mismatch_is_conflict(err: IgnitionError) -> IgnitionError {
    match err {
        IgnitionError::GitHub(mut e)
            if e.kind == GitHubErrorKind::ValidationFailed
                && e.message.to_ascii_lowercase().contains("sha") =>
        {
            e.kind = GitHubErrorKind::Conflict;
            IgnitionError::GitHub(e)
        }
        other => other,
    }
}

fn retry_after(response: &HttpResponse) -> Option<Duration> {
    response
        .header("retry-after")
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn parse_body<R: DeserializeOwned>(response: &HttpResponse) -> Result<R> {
    serde_json::from_str(&response.body)
        .map_err(|e| unexpected(response, format!("unexpected response body: {e}")))
}

fn unexpected(response: &HttpResponse, message: String) -> IgnitionError {
    GitHubError {
        kind: GitHubErrorKind::ServerError,
        status: Some(response.status),
        message,
    }
    .into()
}

/// Decode GitHub's line-wrapped base64 into UTF-8 text.
fn decode_text(response: &HttpResponse, path: &str, encoded: &str) -> Result<String> {
    let packed: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(packed.as_bytes())
        .map_err(|e| unexpected(response, format!("content is not valid base64: {e}")))?;
    String::from_utf8(bytes).map_err(|_| unexpected(response, format!("{path} is not UTF-8 text")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::scripted::ScriptedTransport;
    use std::sync::Arc;

    fn client(transport: &Arc<ScriptedTransport>) -> GitHubClient<Arc<ScriptedTransport>> {
        GitHubClient::new(
            Arc::clone(transport),
            RepoRef::parse("acme/apollo").unwrap(),
            "ghp_test",
        )
        .with_api_url("https://github.test/")
        .with_retry_policy(RetryPolicy::immediate(3))
    }

    const WRITE_OK: &str = r#"{"content":{"sha":"blob-2"},"commit":{"sha":"commit-abc"}}"#;

    #[test]
    fn write_retries_once_after_429() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(429, r#"{"message":"rate limited"}"#)
                .respond(200, WRITE_OK),
        );
        let result = client(&transport)
            .write_file("ignition-project.json", "{}", "update", Some("blob-1"))
            .unwrap();

        assert_eq!(result.commit_sha, "commit-abc");
        assert_eq!(result.content_sha, "blob-2");
        assert_eq!(transport.requests().len(), 2);
    }

    #[test]
    fn stale_sha_conflicts_without_retry() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(409, r#"{"message":"is at 1234 but expected 5678"}"#)
                .respond(200, WRITE_OK),
        );
        let err = client(&transport)
            .write_file("p.json", "{}", "m", Some("stale"))
            .unwrap_err();

        assert_eq!(err.github_kind(), Some(GitHubErrorKind::Conflict));
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn unprocessable_sha_message_is_a_conflict() {
        let transport = Arc::new(
            ScriptedTransport::new().respond(422, r#"{"message":"Invalid request.\n\n\"sha\" wasn't supplied."}"#),
        );
        let err = client(&transport)
            .write_file("p.json", "{}", "m", None)
            .unwrap_err();
        assert_eq!(err.github_kind(), Some(GitHubErrorKind::Conflict));
    }

    #[test]
    fn write_sends_base64_content_sha_and_branch() {
        let transport = Arc::new(ScriptedTransport::new().respond(201, WRITE_OK));
        client(&transport)
            .with_branch(Some("trunk".into()))
            .write_file("docs/a b.json", "hello", "msg", Some("s1"))
            .unwrap();

        let req = &transport.requests()[0];
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(
            req.url,
            "https://github.test/repos/acme/apollo/contents/docs/a%20b.json"
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["content"], "aGVsbG8=");
        assert_eq!(body["sha"], "s1");
        assert_eq!(body["branch"], "trunk");
        assert_eq!(body["message"], "msg");
        assert!(req
            .headers
            .contains(&("Authorization".to_string(), "token ghp_test".to_string())));
        assert!(req
            .headers
            .contains(&("Accept".to_string(), ACCEPT.to_string())));
    }

    #[test]
    fn fetch_decodes_wrapped_base64() {
        let transport = Arc::new(ScriptedTransport::new().respond(
            200,
            r#"{"path":"p.json","sha":"abc","content":"eyJh\nIjox\nfQ==\n","encoding":"base64"}"#,
        ));
        let file = client(&transport).fetch_file("p.json").unwrap();
        assert_eq!(file.content, r#"{"a":1}"#);
        assert_eq!(file.sha, "abc");
    }

    #[test]
    fn missing_file_is_not_found() {
        let transport = Arc::new(ScriptedTransport::new().respond(404, r#"{"message":"Not Found"}"#));
        let err = client(&transport).fetch_file("p.json").unwrap_err();
        assert_eq!(err.github_kind(), Some(GitHubErrorKind::NotFound));
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn server_errors_give_up_after_max_attempts() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(500, "boom")
                .respond(502, "boom")
                .respond(503, "boom")
                .respond(200, "{}"),
        );
        let err = client(&transport).fetch_file("p.json").unwrap_err();
        assert_eq!(err.github_kind(), Some(GitHubErrorKind::ServerError));
        assert_eq!(transport.requests().len(), 3);
    }

    #[test]
    fn unauthorized_is_not_retried() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(401, r#"{"message":"Bad credentials"}"#)
                .respond(200, "{}"),
        );
        let err = client(&transport).list_open_issues().unwrap_err();
        assert_eq!(err.github_kind(), Some(GitHubErrorKind::Unauthorized));
        assert!(err.to_string().contains("Bad credentials"));
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn exhausted_quota_403_is_retried() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond_with_headers(
                    403,
                    r#"{"message":"API rate limit exceeded"}"#,
                    &[("X-RateLimit-Remaining", "0"), ("Retry-After", "0")],
                )
                .respond(200, "[]"),
        );
        let issues = client(&transport).list_open_issues().unwrap();
        assert!(issues.is_empty());
        assert_eq!(transport.requests().len(), 2);
    }

    #[test]
    fn permission_403_is_not_retried() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond_with_headers(403, r#"{"message":"nope"}"#, &[("X-RateLimit-Remaining", "4000")])
                .respond(200, "[]"),
        );
        let err = client(&transport).list_open_issues().unwrap_err();
        assert_eq!(err.github_kind(), Some(GitHubErrorKind::Forbidden));
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn transport_failure_is_network_error() {
        let transport = Arc::new(ScriptedTransport::new().fail("connection reset").respond(200, "[]"));
        let err = client(&transport).list_open_pull_requests().unwrap_err();
        assert_eq!(err.github_kind(), Some(GitHubErrorKind::NetworkError));
        assert_eq!(transport.requests().len(), 1);
    }

    fn issue_json(number: usize, is_pr: bool) -> serde_json::Value {
        let mut issue = serde_json::json!({
            "number": number,
            "title": format!("Issue {number}"),
            "state": "open",
            "html_url": format!("https://github.com/acme/apollo/issues/{number}"),
        });
        if is_pr {
            issue["pull_request"] = serde_json::json!({ "url": "x" });
        }
        issue
    }

    #[test]
    fn issues_paginate_and_skip_pull_requests() {
        let first: Vec<_> = (1..=PER_PAGE).map(|n| issue_json(n, n % 10 == 0)).collect();
        let second = vec![issue_json(101, false), issue_json(102, true)];
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(200, &serde_json::Value::from(first).to_string())
                .respond(200, &serde_json::Value::from(second).to_string()),
        );

        let issues = client(&transport).list_open_issues().unwrap();

        assert_eq!(issues.len(), 91);
        assert!(issues.iter().all(|i| i.pull_request.is_none()));
        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].url.ends_with("issues?state=open&per_page=100&page=1"));
        assert!(requests[1].url.ends_with("page=2"));
    }

    #[test]
    fn rate_limit_is_tracked() {
        let transport = Arc::new(ScriptedTransport::new().respond_with_headers(
            200,
            "[]",
            &[
                ("X-RateLimit-Remaining", "3"),
                ("X-RateLimit-Limit", "5000"),
                ("X-RateLimit-Reset", "1767225600"),
            ],
        ));
        let client = client(&transport).with_rate_limit_warning(10);
        client.list_open_pull_requests().unwrap();

        let limit = client.rate_limit().unwrap();
        assert_eq!(limit.remaining, 3);
        assert_eq!(limit.limit, Some(5000));
        assert_eq!(limit.reset, Some(1767225600));
        assert!(client.rate_limit_is_low());
    }

    #[test]
    fn comment_posts_to_issue_endpoint() {
        let transport = Arc::new(ScriptedTransport::new().respond(
            201,
            r#"{"id":99,"html_url":"https://github.com/acme/apollo/pull/4#issuecomment-99"}"#,
        ));
        let comment = client(&transport).post_comment(4, "Looks risky").unwrap();
        assert_eq!(comment.id, 99);

        let req = &transport.requests()[0];
        assert_eq!(req.method, HttpMethod::Post);
        assert!(req.url.ends_with("/repos/acme/apollo/issues/4/comments"));
        assert!(req.body.as_deref().unwrap().contains("Looks risky"));
    }

    #[test]
    fn fetch_encodes_path_and_branch() {
        let transport = Arc::new(ScriptedTransport::new().respond(
            200,
            r#"{"path":"a b.json","sha":"s","content":"e30=","encoding":"base64"}"#,
        ));
        client(&transport)
            .with_branch(Some("feature/x+y".into()))
            .fetch_file("docs/a b.json")
            .unwrap();

        assert_eq!(
            transport.requests()[0].url,
            "https://github.test/repos/acme/apollo/contents/docs/a%20b.json?ref=feature%2Fx%2By"
        );
    }

    #[test]
    fn large_files_are_read_through_the_blob_api() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(
                    200,
                    r#"{"path":"p.json","sha":"big-sha","content":"","encoding":"none"}"#,
                )
                .respond(
                    200,
                    r#"{"sha":"big-sha","content":"eyJh\nIjox\nfQ==","encoding":"base64","size":7}"#,
                ),
        );
        let file = client(&transport).fetch_file("p.json").unwrap();

        assert_eq!(file.content, r#"{"a":1}"#);
        assert_eq!(file.sha, "big-sha");
        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[1].url.ends_with("/repos/acme/apollo/git/blobs/big-sha"));
    }

    #[test]
    fn unknown_blob_encoding_is_an_error() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(200, r#"{"path":"p.json","sha":"s","content":"","encoding":"none"}"#)
                .respond(200, r#"{"sha":"s","content":"","encoding":"binary"}"#),
        );
        let err = client(&transport).fetch_file("p.json").unwrap_err();
        assert!(err.to_string().contains("unsupported encoding"));
    }
}
