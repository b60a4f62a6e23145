//! Pull request data from the GitHub REST API

use serde::Deserialize;
use tokio::sync::OnceCell;

use crate::error::Result;
use crate::github::GithubClient;

use super::{ChangedFiles, PullRequestSource};

const FILES_PER_PAGE: usize = 100;
/// GitHub stops listing files after 3000
const MAX_FILE_PAGES: usize = 30;

#[derive(Debug, Deserialize)]
struct PullRequest {
    body: Option<String>,
    additions: u64,
    deletions: u64,
}

#[derive(Debug, Deserialize)]
struct PullRequestFile {
    filename: String,
    status: String,
    #[serde(default)]
    previous_filename: Option<String>,
}

pub struct GithubSource {
    client: GithubClient,
    pull_request: OnceCell<PullRequest>,
}

impl GithubSource {
    pub fn new(client: GithubClient) -> Self {
        Self {
            client,
            pull_request: OnceCell::new(),
        }
    }

    /// `GET /pulls/{n}`, fetched once and shared by the size and body lookups
    async fn pull_request(&self) -> Result<&PullRequest> {
        self.pull_request
            .get_or_try_init(|| async {
                self.client
                    .get(&format!("/pulls/{}", self.client.pr()), &[])
                    .await
            })
            .await
    }
}

impl PullRequestSource for GithubSource {
    async fn lines_of_code(&self) -> Result<u64> {
        let pr = self.pull_request().await?;
        Ok(pr.additions + pr.deletions)
    }

    async fn changed_files(&self) -> Result<ChangedFiles> {
        let mut files = ChangedFiles::default();
        let path = format!("/pulls/{}/files", self.client.pr());

        for page in 1..=MAX_FILE_PAGES {
            let batch: Vec<PullRequestFile> = self
                .client
                .get(
                    &path,
                    &[
                        ("per_page", FILES_PER_PAGE.to_string()),
                        ("page", page.to_string()),
                    ],
                )
                .await?;

            let last_page = batch.len() < FILES_PER_PAGE;

            for file in batch {
                match file.status.as_str() {
                    "added" | "copied" => files.created.push(file.filename),
                    "removed" => files.deleted.push(file.filename),
                    "renamed" => {
                        files.created.push(file.filename);
                        if let Some(previous) = file.previous_filename {
                            files.deleted.push(previous);
                        }
                    }
                    _ => files.modified.push(file.filename),
                }
            }

            if last_page {
                break;
            }
        }

        tracing::debug!(files = files.total(), "fetched pull request files");

        Ok(files)
    }

    async fn description(&self) -> Result<Option<String>> {
        Ok(self.pull_request().await?.body.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn source(server: &MockServer) -> GithubSource {
        GithubSource::new(GithubClient::new(&server.base_url(), "secret", "acme/api", 9))
    }

    #[tokio::test]
    async fn test_pull_request_fetched_once() {
        let server = MockServer::start_async().await;
        let pr_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/repos/acme/api/pulls/9")
                    .header("Authorization", "token secret");
                then.status(200).json_body(json!({
                    "number": 9,
                    "body": "Adds retries to the webhook client",
                    "additions": 420,
                    "deletions": 180
                }));
            })
            .await;

        let source = source(&server);
        assert_eq!(source.lines_of_code().await.unwrap(), 600);
        assert_eq!(
            source.description().await.unwrap().as_deref(),
            Some("Adds retries to the webhook client")
        );
        pr_mock.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn test_null_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/repos/acme/api/pulls/9");
                then.status(200)
                    .json_body(json!({ "body": null, "additions": 1, "deletions": 0 }));
            })
            .await;

        assert_eq!(source(&server).description().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_changed_files_statuses() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/repos/acme/api/pulls/9/files")
                    .query_param("page", "1");
                then.status(200).json_body(json!([
                    { "filename": "go.mod", "status": "modified" },
                    { "filename": "cmd/new.go", "status": "added" },
                    { "filename": "legacy.go", "status": "removed" },
                    { "filename": "pkg/b.go", "status": "renamed", "previous_filename": "pkg/a.go" }
                ]));
            })
            .await;

        let files = source(&server).changed_files().await.unwrap();
        assert_eq!(files.created, vec!["cmd/new.go", "pkg/b.go"]);
        assert_eq!(files.modified, vec!["go.mod"]);
        assert_eq!(files.deleted, vec!["legacy.go", "pkg/a.go"]);
    }

    #[tokio::test]
    async fn test_changed_files_pagination() {
        let server = MockServer::start_async().await;
        let full_page: Vec<_> = (0..FILES_PER_PAGE)
            .map(|i| json!({ "filename": format!("src/file{}.go", i), "status": "modified" }))
            .collect();

        let first = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/repos/acme/api/pulls/9/files")
                    .query_param("page", "1");
                then.status(200).json_body(json!(full_page));
            })
            .await;
        let second = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/repos/acme/api/pulls/9/files")
                    .query_param("page", "2");
                then.status(200)
                    .json_body(json!([{ "filename": "go.sum", "status": "modified" }]));
            })
            .await;

        let files = source(&server).changed_files().await.unwrap();
        assert_eq!(files.modified.len(), FILES_PER_PAGE + 1);
        assert!(files.union().contains("go.sum"));
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_api_error_propagates() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/repos/acme/api/pulls/9");
                then.status(404).body("Not Found");
            })
            .await;

        let err = source(&server).lines_of_code().await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Github { status: 404, .. }
        ));
    }
}
