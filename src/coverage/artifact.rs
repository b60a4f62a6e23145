//! Tab-delimited coverage artifact parser (`go tool cover -func` output)

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

use super::CoverageEntry;

/// Parse a coverage artifact from disk
pub fn parse_coverage_file(path: &Path, threshold: u32) -> Result<Vec<CoverageEntry>> {
    let content = fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let entries = parse_coverage_str(&content, threshold)?;
    tracing::debug!(
        path = %path.display(),
        entries = entries.len(),
        "parsed coverage artifact"
    );

    Ok(entries)
}

/// Parse coverage artifact content from a string
pub fn parse_coverage_str(content: &str, threshold: u32) -> Result<Vec<CoverageEntry>> {
    // `\n`, `\r\n` and old Mac `\r` all end a line
    let normalized = content.replace("\r\n", "\n");
    let lines: Vec<(usize, &str)> = normalized
        .split(|c| c == '\n' || c == '\r')
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| (index + 1, line))
        .collect();

    let last = lines.len().saturating_sub(1);
    lines
        .iter()
        .enumerate()
        .map(|(position, (line_number, line))| {
            parse_line(line, *line_number, threshold, position == last)
        })
        .collect()
}

fn parse_line(
    line: &str,
    line_number: usize,
    threshold: u32,
    is_overall: bool,
) -> Result<CoverageEntry> {
    let fields: Vec<&str> = line
        .split('\t')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .collect();

    let (file_token, method, percentage) = match fields.as_slice() {
        [file, method, percentage] => (*file, *method, *percentage),
        // Only the overall row may leave the method column empty
        [file, percentage] if is_overall => (*file, "", *percentage),
        _ => {
            return Err(Error::parse(
                line_number,
                format!("expected 3 tab-separated fields, found {}", fields.len()),
            ))
        }
    };

    let coverage = parse_percentage(percentage, line_number)?;

    Ok(CoverageEntry {
        file_name: strip_separator(file_token).to_string(),
        method: method.to_string(),
        coverage,
        is_below_threshold: coverage < threshold,
    })
}

/// `path/file.go:12:` -> `path/file.go:12`
fn strip_separator(token: &str) -> &str {
    token.strip_suffix(':').unwrap_or(token)
}

fn parse_percentage(token: &str, line_number: usize) -> Result<u32> {
    let number = token
        .strip_suffix('%')
        .ok_or_else(|| Error::parse(line_number, format!("`{}` is not a percentage", token)))?;

    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| Error::parse(line_number, format!("`{}` is not numeric", token)))?;

    if !(0.0..=100.0).contains(&value) {
        return Err(Error::parse(
            line_number,
            format!("coverage {} is outside 0-100", token),
        ));
    }

    Ok(value.trunc() as u32)
}
