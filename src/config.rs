use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const CONFIG_FILE: &str = "prguard.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub coverage: CoverageConfig,
    pub pull_request: PullRequestConfig,
    /// Manifest/lock pairs that must change together
    pub lockfiles: Vec<LockfilePair>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            coverage: CoverageConfig::default(),
            pull_request: PullRequestConfig::default(),
            lockfiles: vec![LockfilePair::new("go.mod", "go.sum")],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoverageConfig {
    pub artifact_path: String,
    pub threshold: u32,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            artifact_path: "../artifacts/coverage.out".to_string(),
            threshold: 80,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PullRequestConfig {
    pub lines_of_code_threshold: u64,
    pub minimum_description_length: usize,
}

impl Default for PullRequestConfig {
    fn default() -> Self {
        Self {
            lines_of_code_threshold: 500,
            minimum_description_length: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LockfilePair {
    pub manifest: String,
    pub lock: String,
}

impl LockfilePair {
    pub fn new(manifest: &str, lock: &str) -> Self {
        Self {
            manifest: manifest.to_string(),
            lock: lock.to_string(),
        }
    }
}

/// Values from CLI flags or environment variables, applied over the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub artifact_path: Option<String>,
    pub coverage_threshold: Option<u32>,
    pub lines_of_code_threshold: Option<u64>,
    pub minimum_description_length: Option<usize>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!("failed to read {}: {}", path.display(), e))
        })?;

        let config: Config = toml::from_str(&content)?;
        config.validate()?;

        Ok(config)
    }

    /// Load an explicitly requested file, or `prguard.toml` in `base_dir` if present
    pub fn discover(explicit: Option<&Path>, base_dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidate = base_dir.join(CONFIG_FILE);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "loading config file");
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    pub fn apply(&mut self, overrides: Overrides) -> Result<()> {
        if let Some(path) = overrides.artifact_path {
            self.coverage.artifact_path = path;
        }
        if let Some(threshold) = overrides.coverage_threshold {
            self.coverage.threshold = threshold;
        }
        if let Some(lines) = overrides.lines_of_code_threshold {
            self.pull_request.lines_of_code_threshold = lines;
        }
        if let Some(length) = overrides.minimum_description_length {
            self.pull_request.minimum_description_length = length;
        }

        self.validate()
    }

    fn validate(&self) -> Result<()> {
        if self.coverage.threshold > 100 {
            return Err(Error::config(format!(
                "coverage threshold {} is outside 0-100",
                self.coverage.threshold
            )));
        }

        for pair in &self.lockfiles {
            if pair.manifest.is_empty() || pair.lock.is_empty() {
                return Err(Error::config("lockfile pairs need both `manifest` and `lock`"));
            }
        }

        Ok(())
    }

    /// Expand `~` and `$VAR` in the artifact path and resolve it against `base_dir`
    pub fn artifact_path(&self, base_dir: &Path) -> Result<PathBuf> {
        let expanded = shellexpand::full(&self.coverage.artifact_path).map_err(|e| {
            Error::config(format!(
                "cannot expand artifact path `{}`: {}",
                self.coverage.artifact_path, e
            ))
        })?;

        Ok(base_dir.join(expanded.as_ref()))
    }
}
