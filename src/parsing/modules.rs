//! Parser for `id:text` module list files.
//!
//! The same line format carries three kinds of per-module data:
//!
//! | File | Text after the colon |
//! |------|----------------------|
//! | `all_pathways.txt` | definition expression |
//! | `all_pathways_names.txt` | display name |
//! | `all_pathways_class.txt` | classification |
//!
//! Blank lines and `#` comments are skipped. Everything after the first colon
//! is the text, so classes containing colons survive intact.

use std::collections::HashMap;
use std::path::Path;

use tracing::warn;

use crate::core::types::ModuleId;
use crate::parsing::{read_text, InputError};
use crate::utils::validation::is_valid_module_id;

/// One `id:text` record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleLine {
    pub id: ModuleId,
    pub text: String,
}

/// Load an `id:text` file from disk
///
/// # Errors
///
/// Returns `InputError::Io` if the file cannot be read, or
/// `InputError::InvalidFormat` for malformed lines.
pub fn load_module_lines(path: &Path) -> Result<Vec<ModuleLine>, InputError> {
    let content = read_text(path)?;
    parse_module_lines(&content)
}

/// Parse `id:text` records.
///
/// A repeated id keeps its last text, in the position of its first appearance.
///
/// # Errors
///
/// Returns `InputError::InvalidFormat` if a line has no colon or an invalid id.
pub fn parse_module_lines(text: &str) -> Result<Vec<ModuleLine>, InputError> {
    let mut records: Vec<ModuleLine> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Line numbers in errors are 1-based for user friendliness
        let line_num = i + 1;

        let Some((id, rest)) = line.split_once(':') else {
            return Err(InputError::InvalidFormat(format!(
                "Line {line_num} has no ':' separating module id and text"
            )));
        };

        let id = id.trim();
        if !is_valid_module_id(id) {
            return Err(InputError::InvalidFormat(format!(
                "Invalid module id on line {line_num}: '{id}'"
            )));
        }

        let record = ModuleLine {
            id: ModuleId::new(id),
            text: rest.trim().to_string(),
        };

        if let Some(&pos) = positions.get(id) {
            warn!("Module {} listed more than once; keeping line {}", id, line_num);
            records[pos] = record;
        } else {
            positions.insert(id.to_string(), records.len());
            records.push(record);
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_definitions() {
        let text = "M00001:K1 (K2,K3)\n\n# comment\nM00002:K4+K5\n";
        let records = parse_module_lines(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id.as_str(), "M00001");
        assert_eq!(records[0].text, "K1 (K2,K3)");
        assert_eq!(records[1].text, "K4+K5");
    }

    #[test]
    fn test_text_keeps_later_colons() {
        let records = parse_module_lines("M1:Pathway modules; Energy: methane\n").unwrap();
        assert_eq!(records[0].text, "Pathway modules; Energy: methane");
    }

    #[test]
    fn test_duplicate_id_keeps_last_text() {
        let records = parse_module_lines("M1:K1\nM2:K2\nM1:K3\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text, "K3");
        assert_eq!(records[1].id.as_str(), "M2");
    }

    #[test]
    fn test_missing_colon_is_error() {
        let err = parse_module_lines("M1:K1\nM2 K2\n").unwrap_err();
        assert!(err.to_string().contains("Line 2"));
    }

    #[test]
    fn test_empty_id_is_error() {
        assert!(matches!(
            parse_module_lines(":K1\n"),
            Err(InputError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_empty_text_is_allowed() {
        let records = parse_module_lines("M1:\n").unwrap();
        assert_eq!(records[0].text, "");
    }
}
