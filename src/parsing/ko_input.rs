//! Parsers for observed-identifier inputs.
//!
//! Two layouts are accepted:
//!
//! - **Table**: one sample per line, `sample<TAB>K1<TAB>K2...`. A sample name
//!   that appears on several lines collects the identifiers of all of them.
//! - **List**: a single delimiter-separated list of identifiers forming one
//!   implicit sample, named after the file.
//!
//! Identifiers are trimmed; blank tokens and duplicates are dropped.

use std::path::Path;

use tracing::{debug, warn};

use crate::core::sample::SampleSet;
use crate::parsing::{read_text, InputError};
use crate::utils::validation::check_sample_limit;

/// Default separator for list inputs
pub const DEFAULT_LIST_SEPARATOR: &str = ",";

/// Load a per-sample identifier table
///
/// # Errors
///
/// Returns `InputError::Io` if the file cannot be read, or
/// `InputError::TooManySamples` if the sample limit is exceeded.
pub fn load_ko_table(path: &Path) -> Result<SampleSet, InputError> {
    let content = read_text(path)?;
    let samples = parse_ko_table(&content)?;
    debug!(
        "Loaded {} samples ({} distinct identifiers) from {}",
        samples.len(),
        samples.identifier_count(),
        path.display()
    );
    Ok(samples)
}

/// Load a delimiter-separated identifier list as a single sample named
/// after the file
///
/// # Errors
///
/// Returns `InputError::Io` if the file cannot be read.
pub fn load_ko_list(path: &Path, separator: &str) -> Result<SampleSet, InputError> {
    let content = read_text(path)?;
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().to_string());
    let samples = parse_ko_list(&content, separator, &name);

    if samples.samples().iter().all(|s| s.is_empty()) {
        warn!("No identifiers found in {}", path.display());
    }
    Ok(samples)
}

/// Parse a `sample<TAB>id...` table
///
/// # Errors
///
/// Returns `InputError::TooManySamples` if the sample limit is exceeded.
pub fn parse_ko_table(text: &str) -> Result<SampleSet, InputError> {
    let mut samples = SampleSet::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut fields = line.split('\t');
        let Some(name) = fields.next().map(str::trim) else {
            continue;
        };

        if samples.get(name).is_none() && check_sample_limit(samples.len()).is_some() {
            return Err(InputError::TooManySamples(samples.len()));
        }
        samples.add(name, fields);
    }

    Ok(samples)
}

/// Parse a single delimited list into a one-sample set called `name`
#[must_use]
pub fn parse_ko_list(text: &str, separator: &str, name: &str) -> SampleSet {
    let mut samples = SampleSet::new();
    let text = text.trim();
    if separator.is_empty() {
        samples.add(name, text.split_whitespace());
    } else {
        samples.add(name, text.split(separator));
    }
    samples
}
