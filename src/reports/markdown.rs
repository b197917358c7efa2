//! Markdown report generator.

use super::escape::{escape_markdown_cell, escape_markdown_heading, escape_md_opt, push_escaped};
use super::{ReportError, ReportFormat, ReportGenerator};
use crate::diff::{
    statistics, ComparisonResults, Difference, EcuComparisonResult, EcuDataComparisonResult,
    SnapshotInfo,
};
use crate::model::{Ecu, EcuData, ValueItem};
use indexmap::IndexMap;
use std::fmt::Write;

const PATH_SEPARATOR: &str = " → ";
const INDENT: &str = "&nbsp;&nbsp;";

/// Markdown report generator
pub struct MarkdownReporter {
    /// Render the per-ECU sections (statistics only when false)
    details: bool,
}

impl MarkdownReporter {
    /// Create a new Markdown reporter
    #[must_use]
    pub const fn new() -> Self {
        Self { details: true }
    }

    /// Only render the header and statistics.
    #[must_use]
    pub const fn statistics_only(mut self) -> Self {
        self.details = false;
        self
    }
}

impl Default for MarkdownReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for MarkdownReporter {
    fn generate_report(&self, results: &ComparisonResults) -> Result<String, ReportError> {
        let mut md = String::new();

        writeln!(md, "# ODIS Comparison Report")?;
        writeln!(md)?;
        write_snapshots(&mut md, results)?;
        write_statistics(&mut md, results)?;

        if !self.details {
            return Ok(md);
        }

        let options = &results.options;
        if options.reports_missing_in_first() && !results.ecus_missing_in_first.is_empty() {
            writeln!(md, "## ECUs missing in first snapshot")?;
            writeln!(md)?;
            write_ecu_table(&mut md, &results.ecus_missing_in_first)?;
        }
        if options.reports_missing_in_second() && !results.ecus_missing_in_second.is_empty() {
            writeln!(md, "## ECUs missing in second snapshot")?;
            writeln!(md)?;
            write_ecu_table(&mut md, &results.ecus_missing_in_second)?;
        }

        for ecu_result in results.ecu_results.iter() {
            write_ecu_section(&mut md, results, ecu_result)?;
        }

        Ok(md)
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Markdown
    }
}

fn write_snapshots(md: &mut String, results: &ComparisonResults) -> Result<(), ReportError> {
    writeln!(md, "| | File | VIN | Mileage | Time of issue |")?;
    writeln!(md, "|---|---|---|---|---|")?;
    for (label, snapshot) in [
        ("First", results.first_snapshot.as_ref()),
        ("Second", results.second_snapshot.as_ref()),
    ] {
        let default = SnapshotInfo::default();
        let snapshot = snapshot.unwrap_or(&default);
        let file = snapshot.path.as_ref().map(|p| p.display().to_string());
        writeln!(
            md,
            "| **{label}** | {} | {} | {} | {} |",
            escape_md_opt(file.as_deref()),
            escape_md_opt(snapshot.vin.as_deref()),
            escape_md_opt(snapshot.mileage.as_deref()),
            escape_md_opt(snapshot.time_of_issue.as_deref()),
        )?;
    }
    writeln!(md)?;
    writeln!(
        md,
        "_Generated {}_",
        results.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(md)?;
    Ok(())
}

fn write_statistics(md: &mut String, results: &ComparisonResults) -> Result<(), ReportError> {
    writeln!(md, "## Statistics")?;
    writeln!(md)?;

    let rows = statistics(results);
    if rows.is_empty() {
        writeln!(md, "No differences found.")?;
        writeln!(md)?;
        return Ok(());
    }

    writeln!(md, "| ECU | Record type | Type | Count |")?;
    writeln!(md, "|---|---|---|---:|")?;
    for row in rows {
        let kind = row
            .difference_type
            .map_or_else(|| "Total".to_string(), |t| t.to_string());
        writeln!(
            md,
            "| {} | {} | {kind} | {} |",
            escape_md_opt(row.ecu_id.as_deref()),
            escape_md_opt(row.record_type.as_deref()),
            row.count
        )?;
    }
    writeln!(md)?;
    Ok(())
}

fn write_ecu_table(md: &mut String, ecus: &IndexMap<String, Ecu>) -> Result<(), ReportError> {
    writeln!(md, "| ECU | Name | Logical link | Variant |")?;
    writeln!(md, "|---|---|---|---|")?;
    for ecu in ecus.values() {
        writeln!(
            md,
            "| {} | {} | {} | {} |",
            escape_markdown_cell(&ecu.ecu_id),
            escape_md_opt(ecu.ecu_name.as_deref()),
            escape_md_opt(ecu.logical_link.as_deref()),
            escape_md_opt(ecu.tester_odx_variant.as_deref()),
        )?;
    }
    writeln!(md)?;
    Ok(())
}

fn write_ecu_section(
    md: &mut String,
    results: &ComparisonResults,
    ecu_result: &EcuComparisonResult,
) -> Result<(), ReportError> {
    let options = &results.options;
    writeln!(
        md,
        "## ECU {}",
        escape_markdown_heading(&ecu_result.first_ecu.to_string())
    )?;
    writeln!(md)?;

    if options.reports_missing_in_first() {
        write_missing_records(
            md,
            "Master records missing in first",
            &ecu_result.master_missing_in_first,
        )?;
        write_missing_records(
            md,
            "Subsystem records missing in first",
            &ecu_result.subsystem_missing_in_first,
        )?;
    }
    if options.reports_missing_in_second() {
        write_missing_records(
            md,
            "Master records missing in second",
            &ecu_result.master_missing_in_second,
        )?;
        write_missing_records(
            md,
            "Subsystem records missing in second",
            &ecu_result.subsystem_missing_in_second,
        )?;
    }

    for record in ecu_result.record_results() {
        write_record_section(md, results, record)?;
    }
    Ok(())
}

fn write_missing_records(
    md: &mut String,
    title: &str,
    records: &IndexMap<String, EcuData>,
) -> Result<(), ReportError> {
    if records.is_empty() {
        return Ok(());
    }
    writeln!(md, "### {title}")?;
    writeln!(md)?;
    for (key, record) in records {
        match record.ti_name.as_deref() {
            Some(ti_name) if !ti_name.trim().is_empty() => writeln!(
                md,
                "#### {} ({})",
                escape_markdown_heading(key),
                escape_markdown_heading(ti_name)
            )?,
            _ => writeln!(md, "#### {}", escape_markdown_heading(key))?,
        }
        writeln!(md)?;
        write_value_table(md, record.values.iter())?;
    }
    Ok(())
}

fn write_record_section(
    md: &mut String,
    results: &ComparisonResults,
    record: &EcuDataComparisonResult,
) -> Result<(), ReportError> {
    let options = &results.options;
    let differences: Vec<&Difference> = if options.reports_differences() {
        record
            .differences
            .iter()
            .filter(|d| !options.is_bypassed(d.field_kind))
            .collect()
    } else {
        Vec::new()
    };
    let missing_first =
        options.reports_missing_in_first() && !record.fields_missing_in_first.is_empty();
    let missing_second =
        options.reports_missing_in_second() && !record.fields_missing_in_second.is_empty();
    if differences.is_empty() && !missing_first && !missing_second {
        return Ok(());
    }

    writeln!(
        md,
        "### {}: {}",
        escape_markdown_heading(&record.record_type()),
        escape_markdown_heading(&record.title())
    )?;
    writeln!(md)?;

    if missing_first {
        writeln!(md, "**Fields missing in first**")?;
        writeln!(md)?;
        write_value_table(md, record.fields_missing_in_first.values())?;
    }
    if missing_second {
        writeln!(md, "**Fields missing in second**")?;
        writeln!(md)?;
        write_value_table(md, record.fields_missing_in_second.values())?;
    }
    if !differences.is_empty() {
        writeln!(md, "| Path | First | Second |")?;
        writeln!(md, "|---|---|---|")?;
        for difference in differences {
            let (first, second) = highlight(difference);
            writeln!(
                md,
                "| {} | {first} | {second} |",
                escape_markdown_cell(&difference.display_path(PATH_SEPARATOR)),
            )?;
        }
        writeln!(md)?;
    }
    Ok(())
}

/// Name/value table of value-nodes; nested nodes are indented under their parent.
fn write_value_table<'a>(
    md: &mut String,
    items: impl DoubleEndedIterator<Item = &'a ValueItem>,
) -> Result<(), ReportError> {
    writeln!(md, "| Name | Value |")?;
    writeln!(md, "|---|---|")?;

    let mut stack: Vec<(usize, &ValueItem)> = items.rev().map(|item| (0, item)).collect();
    while let Some((depth, item)) = stack.pop() {
        writeln!(
            md,
            "| {}{} | {} |",
            INDENT.repeat(depth),
            escape_markdown_cell(&item.name()),
            escape_markdown_cell(&item.value())
        )?;
        stack.extend(item.sub_values.iter().rev().map(|child| (depth + 1, child)));
    }
    writeln!(md)?;
    Ok(())
}

/// Render both sides of a difference with the differing parts emphasised.
fn highlight(difference: &Difference) -> (String, String) {
    let first = difference.first_value.as_deref().unwrap_or_default();
    let second = difference.second_value.as_deref().unwrap_or_default();

    if difference.parameters.char_level_highlight() {
        let first_chars: Vec<char> = first.chars().collect();
        let second_chars: Vec<char> = second.chars().collect();
        (
            mark_changed_chars(&first_chars, &second_chars),
            mark_changed_chars(&second_chars, &first_chars),
        )
    } else {
        (emphasise(first), emphasise(second))
    }
}

fn emphasise(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        format!("**{}**", escape_markdown_cell(value))
    }
}

/// Wrap each run of characters that differ from `other` at the same position in `**`.
fn mark_changed_chars(own: &[char], other: &[char]) -> String {
    if own.is_empty() {
        return "-".to_string();
    }
    let mut out = String::with_capacity(own.len() + 8);
    let mut open = false;
    for (i, c) in own.iter().enumerate() {
        let changed = other.get(i) != Some(c);
        if changed != open {
            out.push_str("**");
            open = changed;
        }
        push_escaped(&mut out, *c);
    }
    if open {
        out.push_str("**");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ComparisonConfig, ComparisonOption};
    use crate::model::{FieldKind, FieldParameters};

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn difference(
        kind: FieldKind,
        parameters: FieldParameters,
        first: &str,
        second: &str,
    ) -> Difference {
        Difference::new(
            vec!["0019".into(), "ident".into(), "IDE00001".into()],
            vec!["Software version".into(), "Software version".into()],
            kind,
            parameters,
            Some(first),
            Some(second),
        )
    }

    fn results_with_record(config: ComparisonConfig) -> ComparisonResults {
        let first = Ecu::new("0019");
        let mut ecu_result = EcuComparisonResult::new(&first, &first);
        let mut record = EcuDataComparisonResult::new(
            vec!["0019".into(), "Identification".into(), "IDE00001".into()],
            Some(vec!["Software".into(), "Software".into()]),
        );
        record.differences.push(difference(
            FieldKind::DisplayValue,
            FieldParameters {
                free_text: true,
                numeric: false,
            },
            "0816",
            "0817",
        ));
        record.differences.push(difference(
            FieldKind::HexValue,
            FieldParameters::default(),
            "0A",
            "0B",
        ));
        record.fields_missing_in_second.insert(
            "IDE00002".into(),
            ValueItem {
                ti_name: Some("IDE00002".into()),
                display_value: Some("x|y".into()),
                ..Default::default()
            },
        );
        ecu_result.master_results.push(record);

        let mut results = ComparisonResults::new(config);
        results.ecu_results.push(ecu_result);
        results
    }

    #[test]
    fn test_mark_changed_chars() {
        assert_eq!(mark_changed_chars(&chars("0816"), &chars("0817")), "081**6**");
        assert_eq!(mark_changed_chars(&chars("abc"), &chars("ab")), "ab**c**");
        assert_eq!(mark_changed_chars(&chars("a_c"), &chars("abc")), "a**\\_**c");
        assert_eq!(mark_changed_chars(&chars(""), &chars("abc")), "-");
    }

    #[test]
    fn test_whole_value_emphasis() {
        let d = difference(FieldKind::HexValue, FieldParameters::default(), "0A", "");
        assert_eq!(highlight(&d), ("**0A**".to_string(), "-".to_string()));
    }

    #[test]
    fn test_report_sections() {
        let results = results_with_record(ComparisonConfig::default());
        let md = MarkdownReporter::new().generate_report(&results).unwrap();

        assert!(md.starts_with("# ODIS Comparison Report"));
        assert!(md.contains("## Statistics"));
        assert!(md.contains("## ECU 0019"));
        assert!(md.contains("### Identification: Software"));
        assert!(md.contains("**Fields missing in second**"));
        assert!(md.contains("| IDE00002 | x\\|y |"));
        assert!(md.contains("| 081**6** | 081**7** |"));
        assert!(md.contains("| **0A** | **0B** |"));
    }

    #[test]
    fn test_bypassed_differences_hidden() {
        let config = ComparisonConfig {
            bypass: vec![FieldKind::HexValue],
            ..Default::default()
        };
        let md = MarkdownReporter::new()
            .generate_report(&results_with_record(config))
            .unwrap();
        assert!(md.contains("081**6**"));
        assert!(!md.contains("**0A**"));
    }

    #[test]
    fn test_disabled_options_hide_sections() {
        let config = ComparisonConfig {
            options: vec![ComparisonOption::DataMissingInFirstFile],
            ..Default::default()
        };
        let md = MarkdownReporter::new()
            .generate_report(&results_with_record(config))
            .unwrap();
        assert!(!md.contains("### Identification"));
        assert!(!md.contains("Fields missing in second"));
    }

    #[test]
    fn test_nested_values_indented() {
        let parent = ValueItem {
            ti_name: Some("MAS00001".into()),
            sub_values: crate::model::KeyedSequence::new(vec![ValueItem {
                ti_name: Some("MAS00002".into()),
                display_value: Some("on".into()),
                ..Default::default()
            }]),
            ..Default::default()
        };
        let mut md = String::new();
        write_value_table(&mut md, std::iter::once(&parent)).unwrap();
        assert!(md.contains("| MAS00001 |  |"));
        assert!(md.contains(&format!("| {INDENT}MAS00002 | on |")));
    }

    #[test]
    fn test_statistics_only() {
        let md = MarkdownReporter::new()
            .statistics_only()
            .generate_report(&results_with_record(ComparisonConfig::default()))
            .unwrap();
        assert!(md.contains("| 0019 | - | Total | 3 |"));
        assert!(!md.contains("## ECU"));
    }
}
