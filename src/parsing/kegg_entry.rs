//! Parser for KEGG flat-file module entries.
//!
//! Entries are blocks of tagged lines terminated by `///`:
//!
//! ```text
//! ENTRY       M00001            Pathway   Module
//! NAME        Glycolysis (Embden-Meyerhof pathway), glucose => pyruvate
//! DEFINITION  (K00844,K12407,K00845) (K01810,K06859)
//!             K00850
//! CLASS       Pathway modules; Carbohydrate metabolism
//! ///
//! ```
//!
//! Tags start in column 0; continuation lines are indented. Only `ENTRY`,
//! `NAME`, `CLASS`, and `DEFINITION` are kept.

use std::path::Path;

use crate::core::module::ModuleMetadata;
use crate::parsing::{read_text, InputError};

/// Definition lines longer than this are bracketed before joining, so each
/// line stays one step of the overall sequence
const BARE_IDENTIFIER_MAX_LEN: usize = 6;

/// One parsed module entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeggModuleEntry {
    pub id: String,
    pub name: String,
    pub class: String,
    pub definition_lines: Vec<String>,
}

impl KeggModuleEntry {
    /// Single-line definition.
    ///
    /// Multi-line definitions are joined with spaces (sequence); every line
    /// that is more than a bare identifier is wrapped in parentheses first.
    #[must_use]
    pub fn definition(&self) -> String {
        if self.definition_lines.len() <= 1 {
            return self.definition_lines.concat();
        }
        self.definition_lines
            .iter()
            .map(|line| {
                if line.len() > BARE_IDENTIFIER_MAX_LEN {
                    format!("({line})")
                } else {
                    line.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Was the definition spread over several lines?
    #[must_use]
    pub fn is_multiline(&self) -> bool {
        self.definition_lines.len() > 1
    }

    #[must_use]
    pub fn to_metadata(&self) -> ModuleMetadata {
        ModuleMetadata::new(self.id.as_str(), self.name.as_str(), self.class.as_str())
            .with_definition(self.definition())
    }
}

/// Load every entry from a flat file (optionally gzipped)
///
/// # Errors
///
/// Returns `InputError::Io` if the file cannot be read, or
/// `InputError::InvalidFormat` if an entry has no `ENTRY` line.
pub fn load_kegg_entries(path: &Path) -> Result<Vec<KeggModuleEntry>, InputError> {
    let content = read_text(path)?;
    parse_kegg_entries(&content)
}

/// Parse concatenated flat-file entries
///
/// # Errors
///
/// Returns `InputError::InvalidFormat` if an entry has no `ENTRY` line.
pub fn parse_kegg_entries(text: &str) -> Result<Vec<KeggModuleEntry>, InputError> {
    let mut entries = Vec::new();
    let mut current = KeggModuleEntry::default();
    let mut has_content = false;
    let mut in_definition = false;
    let mut entry_start = 1;

    for (i, line) in text.lines().enumerate() {
        let line_num = i + 1;

        if line.trim_end() == "///" {
            if has_content {
                entries.push(finish_entry(current, entry_start)?);
            }
            current = KeggModuleEntry::default();
            has_content = false;
            in_definition = false;
            entry_start = line_num + 1;
            continue;
        }

        if line.trim().is_empty() {
            continue;
        }
        has_content = true;

        if line.starts_with(char::is_whitespace) {
            if in_definition {
                current.definition_lines.push(line.trim().to_string());
            }
            continue;
        }

        let (tag, value) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(t, v)| (t, v.trim()));
        in_definition = false;

        match tag {
            "ENTRY" => {
                current.id = value.split_whitespace().next().unwrap_or_default().to_string();
            }
            "NAME" => current.name = value.to_string(),
            "CLASS" => current.class = value.to_string(),
            "DEFINITION" => {
                current.definition_lines.push(value.to_string());
                in_definition = true;
            }
            _ => {}
        }
    }

    if has_content {
        entries.push(finish_entry(current, entry_start)?);
    }

    Ok(entries)
}

fn finish_entry(entry: KeggModuleEntry, start_line: usize) -> Result<KeggModuleEntry, InputError> {
    if entry.id.is_empty() {
        return Err(InputError::InvalidFormat(format!(
            "Entry starting at line {start_line} has no ENTRY line"
        )));
    }
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_ENTRIES: &str = "\
ENTRY       M00001            Pathway   Module
NAME        Glycolysis (Embden-Meyerhof pathway), glucose => pyruvate
DEFINITION  (K00844,K12407,K00845) (K01810,K06859)
ORTHOLOGY   K00844  hexokinase
            K12407  glucokinase
CLASS       Pathway modules; Carbohydrate metabolism
///
ENTRY       M00002            Pathway   Module
NAME        Split definition
DEFINITION  K00001 K00002
            K00003
            K00004,K00005
CLASS       Pathway modules; Energy metabolism
///
";

    #[test]
    fn test_parse_entries() {
        let entries = parse_kegg_entries(TWO_ENTRIES).unwrap();
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first.id, "M00001");
        assert_eq!(first.name, "Glycolysis (Embden-Meyerhof pathway), glucose => pyruvate");
        assert_eq!(first.class, "Pathway modules; Carbohydrate metabolism");
        assert_eq!(first.definition(), "(K00844,K12407,K00845) (K01810,K06859)");
        assert!(!first.is_multiline());
    }

    #[test]
    fn test_multiline_definition_is_bracketed() {
        let entries = parse_kegg_entries(TWO_ENTRIES).unwrap();
        let second = &entries[1];
        assert!(second.is_multiline());
        assert_eq!(second.definition(), "(K00001 K00002) K00003 (K00004,K00005)");
    }

    #[test]
    fn test_orthology_continuation_is_ignored() {
        let entries = parse_kegg_entries(TWO_ENTRIES).unwrap();
        assert_eq!(entries[0].definition_lines.len(), 1);
    }

    #[test]
    fn test_trailing_entry_without_terminator() {
        let entries = parse_kegg_entries("ENTRY       M9\nDEFINITION  K1\n").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].definition(), "K1");
    }

    #[test]
    fn test_entry_without_id_is_error() {
        let err = parse_kegg_entries("NAME        nothing\n///\n").unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_to_metadata() {
        let entries = parse_kegg_entries(TWO_ENTRIES).unwrap();
        let meta = entries[0].to_metadata();
        assert_eq!(meta.id.as_str(), "M00001");
        assert!(meta.definition.is_some());
    }
}
