//! Review policy checks
//!
//! Each check is a pure function over already-fetched data and returns the
//! advisories it wants published.

use crate::config::LockfilePair;
use crate::coverage::{CoverageEntry, CoverageSummary};
use crate::report::Advisory;
use crate::source::ChangedFiles;

/// Overall coverage note, always published
pub fn coverage_summary(overall: &CoverageEntry, threshold: u32) -> Advisory {
    Advisory::Note(format!(
        "Overall test coverage level is **{}%** and the threshold is {}%.",
        overall.coverage, threshold
    ))
}

/// Warning plus a markdown table of the functions below the threshold
pub fn functions_below_threshold(summary: &CoverageSummary, threshold: u32) -> Vec<Advisory> {
    let flagged = summary.below_threshold();
    if flagged.is_empty() {
        return Vec::new();
    }

    let mut table = String::from("|Coverage|File|Function|\n|:-:|:--|:--|");
    for entry in &flagged {
        table.push_str(&format!(
            "\n|{}%|`{}`|`{}`|",
            entry.coverage, entry.file_name, entry.method
        ));
    }

    vec![
        Advisory::Warning(format!(
            "There are some function(s) below {}% threshold.",
            threshold
        )),
        Advisory::Note(table),
    ]
}

pub fn diff_size(lines: u64, threshold: u64) -> Option<Advisory> {
    (lines > threshold).then(|| Advisory::Warning(format!("Big PR! {} lines of code...", lines)))
}

/// Manifests changed without their lock file in the same directory
///
/// Every changed path whose file name matches a manifest is checked, so
/// nested modules such as `services/api/go.mod` need `services/api/go.sum`.
/// A root `go.mod` behaves as a plain `go.mod`/`go.sum` membership test.
pub fn lockfile_consistency(files: &ChangedFiles, pairs: &[LockfilePair]) -> Vec<Advisory> {
    let changed = files.union();
    let mut advisories = Vec::new();

    for path in &changed {
        let (dir, name) = match path.rsplit_once('/') {
            Some((dir, name)) => (Some(dir), name),
            None => (None, *path),
        };

        for pair in pairs.iter().filter(|p| p.manifest == name) {
            let lock = match dir {
                Some(dir) => format!("{}/{}", dir, pair.lock),
                None => pair.lock.clone(),
            };

            if !changed.contains(lock.as_str()) {
                advisories.push(Advisory::Warning(format!(
                    "`{}` has been updated without a change in `{}`.",
                    path, lock
                )));
            }
        }
    }

    advisories
}

pub fn description_length(description: Option<&str>, minimum: usize) -> Option<Advisory> {
    let body = description.map(str::trim).unwrap_or_default();

    if body.is_empty() {
        Some(Advisory::Warning("The PR description is missing!".to_string()))
    } else if body.chars().count() < minimum {
        Some(Advisory::Warning(format!(
            "The PR description is too short! Please describe a little bit more than {} chars.",
            minimum
        )))
    } else {
        None
    }
}
