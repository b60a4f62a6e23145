//! Advisory collection and rendering

use colored::Colorize;

/// Hidden line that identifies our comment on a pull request
pub const COMMENT_MARKER: &str = "<!-- prguard -->";

/// Outcome of a single check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    /// Markdown block, always shown
    Note(String),
    /// Plain-text warning
    Warning(String),
}

/// Publishing surface for advisories
pub trait Reporter {
    fn note(&mut self, markdown: &str);
    fn warn(&mut self, message: &str);

    fn publish(&mut self, advisory: &Advisory) {
        match advisory {
            Advisory::Note(markdown) => self.note(markdown),
            Advisory::Warning(message) => self.warn(message),
        }
    }
}

/// Collects advisories in publication order
#[derive(Debug, Default)]
pub struct Report {
    advisories: Vec<Advisory>,
}

impl Reporter for Report {
    fn note(&mut self, markdown: &str) {
        self.advisories.push(Advisory::Note(markdown.to_string()));
    }

    fn warn(&mut self, message: &str) {
        tracing::info!(warning = message, "check raised a warning");
        self.advisories.push(Advisory::Warning(message.to_string()));
    }
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advisories(&self) -> &[Advisory] {
        &self.advisories
    }

    pub fn warnings(&self) -> Vec<&str> {
        self.advisories
            .iter()
            .filter_map(|a| match a {
                Advisory::Warning(message) => Some(message.as_str()),
                Advisory::Note(_) => None,
            })
            .collect()
    }

    pub fn notes(&self) -> Vec<&str> {
        self.advisories
            .iter()
            .filter_map(|a| match a {
                Advisory::Note(markdown) => Some(markdown.as_str()),
                Advisory::Warning(_) => None,
            })
            .collect()
    }

    pub fn has_warnings(&self) -> bool {
        self.advisories
            .iter()
            .any(|a| matches!(a, Advisory::Warning(_)))
    }

    /// Render the pull request comment body
    pub fn to_markdown(&self) -> String {
        let mut body = String::from(COMMENT_MARKER);
        body.push('\n');

        let warnings = self.warnings();
        if !warnings.is_empty() {
            body.push_str("\n### ⚠️ Warnings\n\n");
            for warning in &warnings {
                body.push_str(&format!("- {}\n", warning));
            }
        }

        for note in self.notes() {
            body.push('\n');
            body.push_str(note);
            body.push('\n');
        }

        body
    }

    /// Print a console summary
    pub fn print(&self) {
        println!("{}", "━".repeat(50).dimmed());
        println!("  {}", "Pull request review".bold().cyan());
        println!("{}", "━".repeat(50).dimmed());

        for advisory in &self.advisories {
            match advisory {
                Advisory::Note(markdown) => {
                    for line in markdown.lines() {
                        println!("  {}", line);
                    }
                }
                Advisory::Warning(message) => {
                    println!("  {} {}", "⚠".yellow(), message.yellow());
                }
            }
        }

        let count = self.warnings().len();
        let status = if count == 0 {
            "✓ No warnings".green()
        } else {
            format!("✗ {} warning(s)", count).yellow()
        };
        println!("\n  {}", status.bold());
    }
}
