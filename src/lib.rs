//! prguard - pull request review checks for CI
//!
//! Reads a tab-delimited coverage artifact and pull request metadata, then
//! publishes advisories:
//! - Overall coverage summary and functions below the coverage threshold
//! - Oversized diffs
//! - Manifests changed without their lock file
//! - Missing or short PR descriptions

pub mod checks;
pub mod config;
pub mod coverage;
pub mod error;
pub mod evaluator;
pub mod github;
pub mod publish;
pub mod report;
pub mod source;

pub use config::{Config, LockfilePair, Overrides};
pub use coverage::{parse_coverage_file, parse_coverage_str, CoverageEntry, CoverageSummary};
pub use error::{Error, Result};
pub use evaluator::{evaluate, evaluate_coverage};
pub use report::{Advisory, Report, Reporter};
pub use source::{ChangedFiles, GitSource, GithubSource, PullRequestSource};
