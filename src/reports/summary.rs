//! Summary report generator.

use super::{ReportError, ReportFormat, ReportGenerator};
use crate::diff::{statistics, ComparisonResults, DifferenceType, SnapshotInfo, StatisticsRow};
use unicode_width::UnicodeWidthStr;

/// Apply ANSI color formatting if colored output is enabled.
fn ansi_color(text: &str, color: &str, colored: bool) -> String {
    if colored {
        match color {
            "red" => format!("\x1b[31m{text}\x1b[0m"),
            "green" => format!("\x1b[32m{text}\x1b[0m"),
            "yellow" => format!("\x1b[33m{text}\x1b[0m"),
            "cyan" => format!("\x1b[36m{text}\x1b[0m"),
            "bold" => format!("\x1b[1m{text}\x1b[0m"),
            "dim" => format!("\x1b[2m{text}\x1b[0m"),
            _ => text.to_string(),
        }
    } else {
        text.to_string()
    }
}

/// Pad `text` with spaces to `width` terminal columns.
fn pad(text: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(text);
    format!("{text}{}", " ".repeat(width.saturating_sub(used)))
}

/// Compact terminal summary of a comparison.
pub struct SummaryReporter {
    /// Use colored output
    colored: bool,
}

impl SummaryReporter {
    /// Create a new summary reporter
    #[must_use]
    pub const fn new() -> Self {
        Self { colored: true }
    }

    /// Disable colored output
    #[must_use]
    pub const fn no_color(mut self) -> Self {
        self.colored = false;
        self
    }

    fn color(&self, text: &str, color: &str) -> String {
        ansi_color(text, color, self.colored)
    }

    fn snapshot_line(&self, label: &str, snapshot: Option<&SnapshotInfo>) -> Option<String> {
        let snapshot = snapshot?;
        let name = snapshot
            .path
            .as_ref()
            .map_or_else(|| "-".to_string(), |p| p.display().to_string());
        let mut details = Vec::new();
        if let Some(vin) = &snapshot.vin {
            details.push(format!("VIN {vin}"));
        }
        if let Some(mileage) = &snapshot.mileage {
            details.push(mileage.clone());
        }
        let details = if details.is_empty() {
            String::new()
        } else {
            format!("  ({})", details.join(", "))
        };
        Some(format!("{}  {name}{details}", self.color(label, "cyan")))
    }

    fn row_label(row: &StatisticsRow) -> String {
        match (&row.ecu_id, &row.record_type, row.difference_type) {
            (Some(_), Some(record_type), _) => format!("    {record_type}"),
            (Some(ecu_id), None, _) => format!("  ECU {ecu_id}"),
            (None, _, Some(kind)) => format!("  {kind}"),
            (None, _, None) => "  Total".to_string(),
        }
    }

    fn row_color(row: &StatisticsRow) -> &'static str {
        match row.difference_type {
            Some(
                DifferenceType::EcusMissingInFirst
                | DifferenceType::RecordsMissingInFirst
                | DifferenceType::FieldsMissingInFirst,
            ) => "green",
            Some(
                DifferenceType::EcusMissingInSecond
                | DifferenceType::RecordsMissingInSecond
                | DifferenceType::FieldsMissingInSecond,
            ) => "red",
            Some(DifferenceType::Differences) => "yellow",
            None if row.record_type.is_none() => "bold",
            None => "",
        }
    }
}

impl Default for SummaryReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for SummaryReporter {
    fn generate_report(&self, results: &ComparisonResults) -> Result<String, ReportError> {
        let mut lines = Vec::new();

        // Header
        lines.push(self.color("ODIS Comparison Summary", "bold"));
        lines.push(self.color("─".repeat(40).as_str(), "dim"));
        lines.extend(self.snapshot_line("First: ", results.first_snapshot.as_ref()));
        lines.extend(self.snapshot_line("Second:", results.second_snapshot.as_ref()));
        lines.push(format!(
            "{}  {}",
            self.color("Time:  ", "cyan"),
            results.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        lines.push(String::new());

        let rows = statistics(results);
        if rows.is_empty() {
            lines.push(self.color("No differences found.", "green"));
            return Ok(lines.join("\n") + "\n");
        }

        lines.push(self.color("Statistics:", "bold"));
        let labels: Vec<String> = rows.iter().map(Self::row_label).collect();
        let width = labels
            .iter()
            .map(|l| UnicodeWidthStr::width(l.as_str()))
            .max()
            .unwrap_or_default()
            + 2;

        for (row, label) in rows.iter().zip(&labels) {
            let count = row.count.to_string();
            let count = match Self::row_color(row) {
                "" => count,
                color => self.color(&count, color),
            };
            lines.push(format!("{}{count}", pad(label, width)));
        }

        Ok(lines.join("\n") + "\n")
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Summary
    }
}
