//! Report publishing: markdown file and sticky PR comment

use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::github::GithubClient;
use crate::report::{Report, COMMENT_MARKER};

const COMMENTS_PER_PAGE: usize = 100;

/// Write the rendered comment body to a file
pub fn write_markdown(report: &Report, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, report.to_markdown())?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct IssueComment {
    id: u64,
    #[serde(default)]
    body: Option<String>,
}

/// What `GithubCommenter::publish` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentAction {
    Created,
    Updated(u64),
}

/// Keeps a single review comment per pull request up to date
pub struct GithubCommenter<'a> {
    client: &'a GithubClient,
}

impl<'a> GithubCommenter<'a> {
    pub fn new(client: &'a GithubClient) -> Self {
        Self { client }
    }

    pub async fn publish(&self, report: &Report) -> Result<CommentAction> {
        let body = json!({ "body": report.to_markdown() });

        match self.find_existing().await? {
            Some(id) => {
                self.client
                    .send(Method::PATCH, &format!("/issues/comments/{}", id), &body)
                    .await?;
                tracing::info!(comment = id, "updated review comment");
                Ok(CommentAction::Updated(id))
            }
            None => {
                self.client
                    .send(
                        Method::POST,
                        &format!("/issues/{}/comments", self.client.pr()),
                        &body,
                    )
                    .await?;
                tracing::info!(pr = self.client.pr(), "created review comment");
                Ok(CommentAction::Created)
            }
        }
    }

    /// First comment on the PR that carries our marker
    async fn find_existing(&self) -> Result<Option<u64>> {
        let path = format!("/issues/{}/comments", self.client.pr());
        let mut page = 1;

        loop {
            let comments: Vec<IssueComment> = self
                .client
                .get(
                    &path,
                    &[
                        ("per_page", COMMENTS_PER_PAGE.to_string()),
                        ("page", page.to_string()),
                    ],
                )
                .await?;

            let found = comments.iter().find(|c| {
                c.body
                    .as_deref()
                    .is_some_and(|body| body.starts_with(COMMENT_MARKER))
            });
            if let Some(comment) = found {
                return Ok(Some(comment.id));
            }

            if comments.len() < COMMENTS_PER_PAGE {
                return Ok(None);
            }
            page += 1;
        }
    }
}
