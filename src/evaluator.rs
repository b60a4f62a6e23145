//! Runs every review check and publishes the advisories

use crate::checks;
use crate::config::Config;
use crate::coverage::{split_summary, CoverageEntry};
use crate::error::Result;
use crate::report::Reporter;
use crate::source::PullRequestSource;

/// Publish the coverage summary and below-threshold table
pub fn evaluate_coverage<R: Reporter>(
    entries: Vec<CoverageEntry>,
    threshold: u32,
    reporter: &mut R,
) -> Result<()> {
    // The overall row has to come off before functions are filtered
    let summary = split_summary(entries)?;

    reporter.publish(&checks::coverage_summary(&summary.overall, threshold));
    for advisory in checks::functions_below_threshold(&summary, threshold) {
        reporter.publish(&advisory);
    }

    Ok(())
}

/// Run all checks against a pull request
///
/// The three source lookups run concurrently and are all awaited before
/// this returns, so no warning is lost if the process exits right after.
pub async fn evaluate<S, R>(
    config: &Config,
    entries: Vec<CoverageEntry>,
    source: &S,
    reporter: &mut R,
) -> Result<()>
where
    S: PullRequestSource,
    R: Reporter,
{
    evaluate_coverage(entries, config.coverage.threshold, reporter)?;

    let (lines, files, description) = futures::try_join!(
        source.lines_of_code(),
        source.changed_files(),
        source.description()
    )?;

    tracing::debug!(lines, files = files.total(), "fetched pull request data");

    if let Some(advisory) = checks::diff_size(lines, config.pull_request.lines_of_code_threshold) {
        reporter.publish(&advisory);
    }

    for advisory in checks::lockfile_consistency(&files, &config.lockfiles) {
        reporter.publish(&advisory);
    }

    if let Some(advisory) = checks::description_length(
        description.as_deref(),
        config.pull_request.minimum_description_length,
    ) {
        reporter.publish(&advisory);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::parse_coverage_str;
    use crate::error::Error;
    use crate::report::{Advisory, Report};
    use crate::source::ChangedFiles;

    struct FakeSource {
        lines: u64,
        files: ChangedFiles,
        description: Option<String>,
        fail: bool,
    }

    impl FakeSource {
        fn new(lines: u64, modified: &[&str], description: Option<&str>) -> Self {
            Self {
                lines,
                files: ChangedFiles {
                    modified: modified.iter().map(|p| p.to_string()).collect(),
                    ..Default::default()
                },
                description: description.map(str::to_string),
                fail: false,
            }
        }
    }

    impl PullRequestSource for FakeSource {
        async fn lines_of_code(&self) -> Result<u64> {
            if self.fail {
                return Err(Error::Github {
                    status: 502,
                    body: "Bad Gateway".to_string(),
                });
            }
            Ok(self.lines)
        }

        async fn changed_files(&self) -> Result<ChangedFiles> {
            Ok(self.files.clone())
        }

        async fn description(&self) -> Result<Option<String>> {
            Ok(self.description.clone())
        }
    }

    fn entries() -> Vec<CoverageEntry> {
        parse_coverage_str("a.ts\tfoo\t70%\nb.ts\tbar\t90%\nOVERALL\t\t82%\n", 80).unwrap()
    }

    #[tokio::test]
    async fn test_clean_pull_request() {
        let config = Config::default();
        let source = FakeSource::new(400, &["main.go"], Some("A thorough description. ".repeat(4).as_str()));
        let mut report = Report::new();

        let clean = parse_coverage_str("a.go:\tfoo\t95%\ntotal:\t(statements)\t95%\n", 80).unwrap();
        evaluate(&config, clean, &source, &mut report).await.unwrap();

        assert!(!report.has_warnings());
        assert_eq!(report.notes().len(), 1);
    }

    #[tokio::test]
    async fn test_every_check_fires() {
        let config = Config::default();
        let source = FakeSource::new(600, &["go.mod"], Some("too short"));
        let mut report = Report::new();

        evaluate(&config, entries(), &source, &mut report).await.unwrap();

        assert_eq!(
            report.advisories(),
            &[
                Advisory::Note(
                    "Overall test coverage level is **82%** and the threshold is 80%.".to_string()
                ),
                Advisory::Warning("There are some function(s) below 80% threshold.".to_string()),
                Advisory::Note("|Coverage|File|Function|\n|:-:|:--|:--|\n|70%|`a.ts`|`foo`|".to_string()),
                Advisory::Warning("Big PR! 600 lines of code...".to_string()),
                Advisory::Warning("`go.mod` has been updated without a change in `go.sum`.".to_string()),
                Advisory::Warning(
                    "The PR description is too short! Please describe a little bit more than 50 chars."
                        .to_string()
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_description() {
        let config = Config::default();
        let source = FakeSource::new(10, &["go.mod", "go.sum"], None);
        let mut report = Report::new();

        evaluate(&config, entries(), &source, &mut report).await.unwrap();

        let warnings = report.warnings();
        assert!(warnings.contains(&"The PR description is missing!"));
        assert!(!warnings.iter().any(|w| w.contains("go.sum")));
    }

    #[tokio::test]
    async fn test_source_failure_aborts() {
        let config = Config::default();
        let mut source = FakeSource::new(10, &[], Some("irrelevant"));
        source.fail = true;
        let mut report = Report::new();

        let err = evaluate(&config, entries(), &source, &mut report).await.unwrap_err();
        assert!(matches!(err, Error::Github { status: 502, .. }));
    }

    #[test]
    fn test_empty_artifact_aborts() {
        let mut report = Report::new();
        let err = evaluate_coverage(Vec::new(), 80, &mut report).unwrap_err();
        assert!(matches!(err, Error::EmptyArtifact));
        assert!(report.advisories().is_empty());
    }
}
