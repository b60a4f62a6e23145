//! GitHub REST API client scoped to one pull request

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::env;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Authenticated client for `{api}/repos/{repo}` calls about a single PR
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
    repo: String,
    pr: u64,
}

impl GithubClient {
    pub fn new(api_url: &str, token: &str, repo: &str, pr: u64) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            repo: repo.to_string(),
            pr,
        }
    }

    /// Build a client from the GitHub Actions environment
    ///
    /// The PR number comes from `pr` when given, otherwise from the event
    /// payload at `GITHUB_EVENT_PATH`.
    pub fn from_env(pr: Option<u64>) -> Result<Self> {
        Self::from_lookup(pr, |name| env::var(name).ok())
    }

    pub fn from_lookup(pr: Option<u64>, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let token = lookup("GITHUB_TOKEN")
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::config("GITHUB_TOKEN not set"))?;

        let repo = lookup("GITHUB_REPOSITORY")
            .filter(|r| r.contains('/'))
            .ok_or_else(|| Error::config("GITHUB_REPOSITORY not set (expected owner/name)"))?;

        let pr = match pr {
            Some(number) => number,
            None => {
                let event_path = lookup("GITHUB_EVENT_PATH").ok_or_else(|| {
                    Error::config("no pull request number given and GITHUB_EVENT_PATH not set")
                })?;
                pr_number_from_event(Path::new(&event_path))?
            }
        };

        let api_url = lookup("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

        tracing::debug!(%repo, pr, %api_url, "resolved GitHub pull request");

        Ok(Self::new(&api_url, &token, &repo, pr))
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    pub fn pr(&self) -> u64 {
        self.pr
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/repos/{}{}", self.api_url, self.repo, path);
        tracing::debug!(%method, %url, "GitHub API request");

        self.http
            .request(method, url)
            .header("Authorization", format!("token {}", self.token))
            .header("User-Agent", "prguard")
            .header("Accept", "application/vnd.github.v3+json")
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self.request(Method::GET, path).query(query).send().await?;
        Ok(check_status(response).await?.json().await?)
    }

    pub(crate) async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<()> {
        let response = self.request(method, path).json(body).send().await?;
        check_status(response).await?;
        Ok(())
    }
}

async fn check_status(response: Response) -> Result<Response> {
    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Github { status, body });
    }

    Ok(response)
}

/// Read the PR number from a GitHub Actions event payload
pub fn pr_number_from_event(path: &Path) -> Result<u64> {
    let content = fs::read_to_string(path)?;
    let event: serde_json::Value = serde_json::from_str(&content)?;

    event["pull_request"]["number"]
        .as_u64()
        .or_else(|| event["number"].as_u64())
        .ok_or_else(|| {
            Error::config(format!(
                "event payload {} is not a pull request event",
                path.display()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_pr_number_from_event() {
        let dir = tempdir().unwrap();
        let event = dir.path().join("event.json");

        fs::write(&event, r#"{"action":"opened","pull_request":{"number":42}}"#).unwrap();
        assert_eq!(pr_number_from_event(&event).unwrap(), 42);

        fs::write(&event, r#"{"number":7}"#).unwrap();
        assert_eq!(pr_number_from_event(&event).unwrap(), 7);

        fs::write(&event, r#"{"ref":"refs/heads/main"}"#).unwrap();
        assert!(pr_number_from_event(&event).is_err());
    }

    #[test]
    fn test_client_from_lookup() {
        let dir = tempdir().unwrap();
        let event = dir.path().join("event.json");
        fs::write(&event, r#"{"pull_request":{"number":12}}"#).unwrap();
        let event_path = event.to_string_lossy().to_string();

        let client = GithubClient::from_lookup(
            None,
            lookup_from(&[
                ("GITHUB_TOKEN", "secret"),
                ("GITHUB_REPOSITORY", "acme/api"),
                ("GITHUB_EVENT_PATH", &event_path),
            ]),
        )
        .unwrap();

        assert_eq!(client.repo(), "acme/api");
        assert_eq!(client.pr(), 12);
        assert_eq!(client.api_url, DEFAULT_API_URL);

        let explicit = GithubClient::from_lookup(
            Some(3),
            lookup_from(&[
                ("GITHUB_TOKEN", "secret"),
                ("GITHUB_REPOSITORY", "acme/api"),
                ("GITHUB_API_URL", "https://ghe.example.com/api/v3/"),
            ]),
        )
        .unwrap();
        assert_eq!(explicit.pr(), 3);
        assert_eq!(explicit.api_url, "https://ghe.example.com/api/v3");
    }

    #[test]
    fn test_client_requires_token() {
        let err = GithubClient::from_lookup(Some(1), lookup_from(&[("GITHUB_REPOSITORY", "acme/api")]));
        assert!(matches!(err, Err(Error::Config(_))));
    }
}
