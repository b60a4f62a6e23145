use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use prguard::github::GithubClient;
use prguard::publish::{write_markdown, CommentAction, GithubCommenter};
use prguard::source::default_base_ref;
use prguard::{
    evaluate, evaluate_coverage, parse_coverage_file, Config, CoverageEntry, GitSource,
    GithubSource, Overrides, Report,
};

#[derive(Parser)]
#[command(name = "prguard")]
#[command(about = "Pull request review checks: coverage, diff size, lockfiles, description")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file (default: prguard.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every check against a pull request
    Check(CheckArgs),

    /// Only summarize the coverage artifact
    Coverage(CoverageArgs),
}

#[derive(Args)]
struct CoverageArgs {
    /// Coverage artifact path
    #[arg(long, env = "TEST_COVERAGE_ARTIFACT_PATH")]
    artifact: Option<String>,

    /// Per-function coverage threshold (%)
    #[arg(long, env = "TEST_COVERAGE_THRESHOLD")]
    threshold: Option<u32>,
}

#[derive(Clone, Copy, ValueEnum)]
enum SourceKind {
    /// GitHub REST API (GitHub Actions environment)
    Github,
    /// Local git checkout
    Local,
}

#[derive(Args)]
struct CheckArgs {
    #[command(flatten)]
    coverage: CoverageArgs,

    /// Where pull request data comes from
    #[arg(long, value_enum, default_value = "github")]
    source: SourceKind,

    /// Pull request number (default: from GITHUB_EVENT_PATH)
    #[arg(long)]
    pr: Option<u64>,

    /// Repository path for the local source
    #[arg(long)]
    repo: Option<PathBuf>,

    /// Base ref for the local source (default: origin/$GITHUB_BASE_REF or origin/main)
    #[arg(long)]
    base: Option<String>,

    /// PR description for the local source
    #[arg(long, env = "PR_BODY")]
    description: Option<String>,

    /// Read the PR description from a file (wins over --description)
    #[arg(long)]
    description_file: Option<PathBuf>,

    /// Big PR threshold (changed lines)
    #[arg(long, env = "LINES_OF_CODE_THRESHOLD")]
    max_lines: Option<u64>,

    /// Minimum PR description length (chars)
    #[arg(long, env = "MINIMUM_PR_DESCRIPTION_LENGTH")]
    min_description: Option<usize>,

    /// Write the markdown report to this file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Create or update the review comment on the pull request
    #[arg(long)]
    comment: bool,

    /// Exit with status 1 when any warning was published
    #[arg(long)]
    strict: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("prguard=debug")
    } else {
        EnvFilter::try_from_env("PRGUARD_LOG").unwrap_or_else(|_| EnvFilter::new("prguard=warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: Cli) -> Result<()> {
    let base_dir = env::current_dir().context("Could not determine working directory")?;

    let mut config = Config::discover(cli.config.as_deref(), &base_dir)
        .context("Could not load configuration")?;

    match cli.command {
        Commands::Check(args) => {
            config.apply(Overrides {
                artifact_path: args.coverage.artifact.clone(),
                coverage_threshold: args.coverage.threshold,
                lines_of_code_threshold: args.max_lines,
                minimum_description_length: args.min_description,
            })?;

            let passed = cmd_check(&config, &base_dir, &args)?;
            if !passed {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Coverage(args) => {
            config.apply(Overrides {
                artifact_path: args.artifact,
                coverage_threshold: args.threshold,
                ..Default::default()
            })?;

            cmd_coverage(&config, &base_dir)
        }
    }
}

fn load_entries(config: &Config, base_dir: &Path) -> Result<Vec<CoverageEntry>> {
    let artifact = config.artifact_path(base_dir)?;
    let entries = parse_coverage_file(&artifact, config.coverage.threshold)
        .with_context(|| format!("Could not load coverage from {}", artifact.display()))?;
    Ok(entries)
}

#[tokio::main]
async fn cmd_check(config: &Config, base_dir: &Path, args: &CheckArgs) -> Result<bool> {
    let entries = load_entries(config, base_dir)?;
    let mut report = Report::new();

    match args.source {
        SourceKind::Github => {
            let client = GithubClient::from_env(args.pr)?;
            let source = GithubSource::new(client);
            evaluate(config, entries, &source, &mut report).await?;
        }
        SourceKind::Local => {
            let description = match &args.description_file {
                Some(path) => Some(
                    fs::read_to_string(path)
                        .with_context(|| format!("Could not read {}", path.display()))?,
                ),
                None => args.description.clone(),
            };
            let base = args
                .base
                .clone()
                .unwrap_or_else(|| default_base_ref(|name| env::var(name).ok()));
            let repo = args.repo.as_deref().unwrap_or(base_dir);

            let source = GitSource::new(repo, &base, description);
            evaluate(config, entries, &source, &mut report).await?;
        }
    }

    report.print();

    if let Some(ref output) = args.output {
        write_markdown(&report, output)?;
        println!(
            "\n{} Report written: {}",
            "📝".cyan(),
            output.display().to_string().green()
        );
    }

    if args.comment {
        let client = GithubClient::from_env(args.pr)?;
        let action = GithubCommenter::new(&client).publish(&report).await?;
        let verb = match action {
            CommentAction::Created => "Posted",
            CommentAction::Updated(_) => "Updated",
        };
        println!(
            "{} {} review comment on {}#{}",
            "💬".cyan(),
            verb,
            client.repo(),
            client.pr()
        );
    }

    Ok(!(args.strict && report.has_warnings()))
}

fn cmd_coverage(config: &Config, base_dir: &Path) -> Result<()> {
    let entries = load_entries(config, base_dir)?;
    let mut report = Report::new();

    evaluate_coverage(entries, config.coverage.threshold, &mut report)?;
    report.print();

    Ok(())
}
