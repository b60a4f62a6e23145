//! Pull request data sources
//!
//! Provides:
//! - GitHub REST API source
//! - Local git repository source

mod git;
mod github;

pub use git::*;
pub use github::*;

use std::collections::BTreeSet;
use std::future::Future;

use crate::error::Result;

/// Read-only access to the pull request under review
pub trait PullRequestSource {
    /// Added plus deleted lines across the whole diff
    fn lines_of_code(&self) -> impl Future<Output = Result<u64>>;

    fn changed_files(&self) -> impl Future<Output = Result<ChangedFiles>>;

    /// PR body, `None` when the PR has no description at all
    fn description(&self) -> impl Future<Output = Result<Option<String>>>;
}

/// Paths touched by a pull request, as they appear in the repository
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangedFiles {
    pub created: Vec<String>,
    pub modified: Vec<String>,
    pub deleted: Vec<String>,
}

impl ChangedFiles {
    /// Created, modified and deleted paths together
    pub fn union(&self) -> BTreeSet<&str> {
        self.created
            .iter()
            .chain(&self.modified)
            .chain(&self.deleted)
            .map(String::as_str)
            .collect()
    }

    pub fn total(&self) -> usize {
        self.created.len() + self.modified.len() + self.deleted.len()
    }
}
