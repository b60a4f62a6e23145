//! Pull request data from a local git checkout

use git2::{Delta, Diff, DiffFindOptions, DiffOptions, Repository};
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;

use crate::error::Result;

use super::{ChangedFiles, PullRequestSource};

pub const DEFAULT_BASE_REF: &str = "origin/main";

#[derive(Debug)]
struct DiffSummary {
    lines: u64,
    files: ChangedFiles,
}

/// Diffs `HEAD` against its merge base with `base`
pub struct GitSource {
    path: PathBuf,
    base: String,
    description: Option<String>,
    summary: OnceCell<DiffSummary>,
}

impl GitSource {
    pub fn new(path: &Path, base: &str, description: Option<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            base: base.to_string(),
            description,
            summary: OnceCell::new(),
        }
    }

    /// Diff computed once on the blocking pool and shared by both lookups
    async fn summary(&self) -> Result<&DiffSummary> {
        self.summary
            .get_or_try_init(|| async {
                let path = self.path.clone();
                let base = self.base.clone();
                tokio::task::spawn_blocking(move || summarize(&path, &base)).await?
            })
            .await
    }
}

fn summarize(path: &Path, base: &str) -> Result<DiffSummary> {
    let repo = Repository::discover(path)?;
    let diff = merge_base_diff(&repo, base)?;

    let stats = diff.stats()?;
    let mut files = ChangedFiles::default();

    for delta in diff.deltas() {
        let new_path = delta
            .new_file()
            .path()
            .map(|p| p.to_string_lossy().to_string());
        let old_path = delta
            .old_file()
            .path()
            .map(|p| p.to_string_lossy().to_string());

        match delta.status() {
            Delta::Added | Delta::Copied => files.created.extend(new_path),
            Delta::Deleted => files.deleted.extend(old_path),
            Delta::Renamed => {
                files.created.extend(new_path);
                files.deleted.extend(old_path);
            }
            _ => files.modified.extend(new_path.or(old_path)),
        }
    }

    Ok(DiffSummary {
        lines: (stats.insertions() + stats.deletions()) as u64,
        files,
    })
}

fn merge_base_diff<'r>(repo: &'r Repository, base_ref: &str) -> Result<Diff<'r>> {
    let base = repo.revparse_single(base_ref)?.peel_to_commit()?;
    let head = repo.head()?.peel_to_commit()?;
    let merge_base = repo.merge_base(base.id(), head.id())?;

    let old_tree = repo.find_commit(merge_base)?.tree()?;
    let new_tree = head.tree()?;

    let mut diff_opts = DiffOptions::new();
    let mut diff =
        repo.diff_tree_to_tree(Some(&old_tree), Some(&new_tree), Some(&mut diff_opts))?;

    let mut find_opts = DiffFindOptions::new();
    find_opts.renames(true);
    diff.find_similar(Some(&mut find_opts))?;

    tracing::debug!(base = base_ref, %merge_base, "diffing against merge base");

    Ok(diff)
}

/// `GITHUB_BASE_REF` as a remote-tracking ref, or `origin/main`
pub fn default_base_ref(lookup: impl Fn(&str) -> Option<String>) -> String {
    lookup("GITHUB_BASE_REF")
        .filter(|r| !r.is_empty())
        .map(|r| format!("origin/{}", r))
        .unwrap_or_else(|| DEFAULT_BASE_REF.to_string())
}

impl PullRequestSource for GitSource {
    async fn lines_of_code(&self) -> Result<u64> {
        Ok(self.summary().await?.lines)
    }

    async fn changed_files(&self) -> Result<ChangedFiles> {
        Ok(self.summary().await?.files.clone())
    }

    async fn description(&self) -> Result<Option<String>> {
        Ok(self.description.clone())
    }
}
