//! Tab-separated completeness summaries.
//!
//! ```text
//! module_accession  completeness  pathway_name  pathway_class  matching_ko  missing_ko
//! M00001            50.0          Glycolysis    Pathway ...    K1           K2
//! ```
//!
//! Per-sample tables have a leading `contig` column. With weights enabled,
//! each identifier is written as `K1(0.5)`.

use std::collections::BTreeMap;
use std::io::Write;

use crate::matching::engine::CompletenessRecord;

/// Columns of every summary table
pub const SUMMARY_COLUMNS: [&str; 6] = [
    "module_accession",
    "completeness",
    "pathway_name",
    "pathway_class",
    "matching_ko",
    "missing_ko",
];

/// Leading column of per-sample tables
pub const SAMPLE_COLUMN: &str = "contig";

/// Default output file prefix
pub const DEFAULT_OUTPUT_PREFIX: &str = "summary.kegg";

/// Header line (without newline)
#[must_use]
pub fn header(per_sample: bool) -> String {
    let columns = SUMMARY_COLUMNS.join("\t");
    if per_sample {
        format!("{SAMPLE_COLUMN}\t{columns}")
    } else {
        columns
    }
}

/// Format a two-decimal value: integral values keep one decimal (`100.0`),
/// others use the shortest form (`33.33`, `0.5`)
#[must_use]
pub fn format_decimal(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Comma-join identifiers, optionally annotated with their weights
#[must_use]
pub fn format_labels(labels: &[String], weights: Option<&BTreeMap<String, f64>>) -> String {
    match weights {
        None => labels.join(","),
        Some(weights) => labels
            .iter()
            .map(|label| {
                let weight = weights.get(label).copied().unwrap_or(0.0);
                format!("{label}({})", format_decimal(weight))
            })
            .collect::<Vec<_>>()
            .join(","),
    }
}

/// One summary row (without newline). The sample column is written when the
/// record belongs to a sample.
#[must_use]
pub fn format_row(record: &CompletenessRecord, include_weights: bool) -> String {
    let weights = include_weights.then_some(&record.weights);
    let mut fields = Vec::with_capacity(SUMMARY_COLUMNS.len() + 1);
    if let Some(sample) = &record.sample {
        fields.push(sample.clone());
    }
    fields.push(record.module.to_string());
    fields.push(format_decimal(record.percentage));
    fields.push(record.name.clone());
    fields.push(record.class.clone());
    fields.push(format_labels(&record.matching, weights));
    fields.push(format_labels(&record.missing, weights));
    fields.join("\t")
}

/// Write a header and one row per record
///
/// # Errors
///
/// Returns any I/O error from the writer.
pub fn write_tsv<W: Write>(
    out: &mut W,
    records: &[CompletenessRecord],
    per_sample: bool,
    include_weights: bool,
) -> std::io::Result<()> {
    writeln!(out, "{}", header(per_sample))?;
    for record in records {
        writeln!(out, "{}", format_row(record, include_weights))?;
    }
    Ok(())
}

/// `<prefix>_pathways.tsv`, `<prefix>_contigs.tsv`, or their `.with_weights.tsv` forms
#[must_use]
pub fn output_file_name(prefix: &str, per_sample: bool, include_weights: bool) -> String {
    let kind = if per_sample { "contigs" } else { "pathways" };
    let suffix = if include_weights {
        ".with_weights.tsv"
    } else {
        ".tsv"
    };
    format!("{prefix}_{kind}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ModuleId;

    fn record(sample: Option<&str>) -> CompletenessRecord {
        CompletenessRecord {
            sample: sample.map(str::to_string),
            module: ModuleId::new("M00001"),
            percentage: 50.0,
            name: "Glycolysis".to_string(),
            class: "Pathway modules; Carbohydrate".to_string(),
            matching: vec!["K1".to_string()],
            missing: vec!["K2".to_string(), "K3".to_string()],
            weights: [("K1", 0.5), ("K2", 0.25), ("K3", 0.25)]
                .into_iter()
                .map(|(k, w)| (k.to_string(), w))
                .collect(),
            candidate_count: 1,
            path_count: 2,
        }
    }

    #[test]
    fn test_header() {
        assert_eq!(
            header(false),
            "module_accession\tcompleteness\tpathway_name\tpathway_class\tmatching_ko\tmissing_ko"
        );
        assert!(header(true).starts_with("contig\tmodule_accession\t"));
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(100.0), "100.0");
        assert_eq!(format_decimal(50.0), "50.0");
        assert_eq!(format_decimal(33.33), "33.33");
        assert_eq!(format_decimal(0.5), "0.5");
        assert_eq!(format_decimal(0.0), "0.0");
    }

    #[test]
    fn test_format_row() {
        assert_eq!(
            format_row(&record(None), false),
            "M00001\t50.0\tGlycolysis\tPathway modules; Carbohydrate\tK1\tK2,K3"
        );
        assert_eq!(
            format_row(&record(Some("contig_7")), true),
            "contig_7\tM00001\t50.0\tGlycolysis\tPathway modules; Carbohydrate\tK1(0.5)\tK2(0.25),K3(0.25)"
        );
    }

    #[test]
    fn test_empty_lists_are_empty_fields() {
        let mut r = record(None);
        r.missing.clear();
        assert!(format_row(&r, true).ends_with("K1(0.5)\t"));
    }

    #[test]
    fn test_write_tsv() {
        let mut out = Vec::new();
        write_tsv(&mut out, &[record(Some("c1"))], true, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("contig\t"));
        assert!(lines[1].starts_with("c1\tM00001\t"));
    }

    #[test]
    fn test_output_file_names() {
        assert_eq!(output_file_name("summary.kegg", false, false), "summary.kegg_pathways.tsv");
        assert_eq!(output_file_name("x", true, false), "x_contigs.tsv");
        assert_eq!(output_file_name("x", false, true), "x_pathways.with_weights.tsv");
        assert_eq!(output_file_name("x", true, true), "x_contigs.with_weights.tsv");
    }
}
