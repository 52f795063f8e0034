use super::CleaningReport;
use crate::error::Result;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Writes cleaning reports to disk and renders them for terminals.
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new(PathBuf::from("output"))
    }
}

impl ReportGenerator {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    /// Write the report as pretty JSON to `<output_dir>/<base_name>_report.json`.
    pub fn write_report_to_file(
        &self,
        report: &CleaningReport,
        report_base_name: &str,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let report_path = self
            .output_dir
            .join(format!("{}_report.json", report_base_name));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }

    /// Human-readable summary lines, one fact per line.
    pub fn summary_lines(report: &CleaningReport) -> Vec<String> {
        let mut lines = vec![
            format!("Strategy: {}", report.strategy),
            format!("Duration: {}ms", report.duration_ms),
            format!(
                "Rows: {} -> {} ({} dropped)",
                report.rows_before, report.rows_after, report.rows_dropped
            ),
            format!(
                "Completeness: {:.1}% -> {:.1}%",
                report.completeness_before * 100.0,
                report.completeness_after * 100.0
            ),
        ];

        if report.strategy.is_imputation() {
            lines.push(format!("Cells filled: {}", report.cells_filled()));
            if let Some(normalizer) = &report.normalizer {
                lines.push(format!(
                    "Cells normalized: {} via {} ({} failed)",
                    report.cells_normalized(),
                    normalizer,
                    report.normalization_failures()
                ));
            }
        }

        for column in &report.columns {
            let mut line = format!(
                "  {} [{}]: {} missing -> {}",
                column.name, column.kind, column.missing_before, column.missing_after
            );
            if let Some(fill) = &column.fill_value {
                line.push_str(&format!(", fill {}", fill));
            }
            if column.cells_changed > 0 {
                line.push_str(&format!(", {} values corrected", column.cells_changed));
            }
            if let Some(reason) = &column.skipped_reason {
                line.push_str(&format!(" (skipped: {})", reason));
            }
            lines.push(line);
        }

        lines
    }
}
