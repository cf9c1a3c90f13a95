//! Enterprise number normalization and the numbers file format.

use std::fs;
use std::path::Path;

use tracing::warn;

use crate::error::ScraperError;

/// Normalize an enterprise number to its ten digit form.
///
/// Belgian enterprise numbers are ten digits with a leading zero that
/// some registries drop. Nine digit input gets the zero restored,
/// anything else is rejected.
pub fn normalize(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.len() {
        10 => Some(digits),
        9 => Some(format!("0{}", digits)),
        _ => None,
    }
}

/// Write enterprise numbers to `path`, one per line.
pub fn write_numbers(path: &Path, numbers: &[String]) -> Result<(), ScraperError> {
    let mut body = numbers.join("\n");
    if !body.is_empty() {
        body.push('\n');
    }
    fs::write(path, body)?;
    Ok(())
}

/// Read enterprise numbers from `path`, one per line.
///
/// Lines that do not normalize to a valid number are skipped with a
/// warning so one bad line does not sink a long run.
pub fn read_numbers(path: &Path) -> Result<Vec<String>, ScraperError> {
    let content = fs::read_to_string(path)?;
    let mut numbers = Vec::new();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match normalize(trimmed) {
            Some(number) => numbers.push(number),
            None => warn!("Skipping invalid enterprise number '{}'", trimmed),
        }
    }
    Ok(numbers)
}
