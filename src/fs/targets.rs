use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Read target molecules, one identifier per line.
///
/// Lines are trimmed and blank lines skipped; file order is kept.
pub fn read_targets(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read targets file: {}", path.display()))?;

    Ok(parse_targets(&content))
}

pub fn parse_targets(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
