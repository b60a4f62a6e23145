//! Coverage module
//!
//! Provides:
//! - Tab-delimited coverage artifact parsing
//! - Overall row extraction and threshold filtering

mod artifact;
mod threshold;

pub use artifact::*;
pub use threshold::*;

/// One row of the coverage artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageEntry {
    pub file_name: String,
    pub method: String,
    /// Whole percentage, 0-100
    pub coverage: u32,
    pub is_below_threshold: bool,
}
