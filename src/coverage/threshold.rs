//! Overall coverage row extraction and threshold filtering

use crate::error::{Error, Result};

use super::CoverageEntry;

/// Artifact entries split into the aggregate row and per-function rows
#[derive(Debug, Clone)]
pub struct CoverageSummary {
    pub overall: CoverageEntry,
    pub functions: Vec<CoverageEntry>,
}

impl CoverageSummary {
    /// Per-function entries below the threshold, in artifact order
    pub fn below_threshold(&self) -> Vec<&CoverageEntry> {
        self.functions
            .iter()
            .filter(|entry| entry.is_below_threshold)
            .collect()
    }
}

/// Remove the last entry (the overall coverage row) from the parsed artifact
pub fn split_summary(mut entries: Vec<CoverageEntry>) -> Result<CoverageSummary> {
    let overall = entries.pop().ok_or(Error::EmptyArtifact)?;

    Ok(CoverageSummary {
        overall,
        functions: entries,
    })
}
