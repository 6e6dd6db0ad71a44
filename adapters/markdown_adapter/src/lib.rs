use ninefive_core::domain::GroupReport;
use ninefive_core::ports::{ReportWriter, Result};
use ninefive_core::utils::{format_offset, render_bar};
use std::fs;
use std::path::PathBuf;
use tracing::info;

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const BAR_WIDTH: usize = 40;

/// Markdown report writer adapter implementation
pub struct MarkdownReportWriter {
    output_file: PathBuf,
}

impl MarkdownReportWriter {
    pub fn new(output_file: impl Into<PathBuf>) -> Self {
        Self {
            output_file: output_file.into(),
        }
    }

    /// Escapes characters that would break a table cell or heading line
    fn escape_cell(&self, text: &str) -> String {
        text.chars()
            .map(|c| match c {
                '|' => "\\|".to_string(),
                c if c.is_control() => " ".to_string(),
                c => c.to_string(),
            })
            .collect::<String>()
            .trim()
            .to_string()
    }

    fn format_summary(&self, reports: &[GroupReport]) -> String {
        let mut output = String::new();
        output.push_str("| Group | Best offset | 9–5 match | Posts | Likely regions |\n");
        output.push_str("|---|---|---|---|---|\n");
        for r in reports {
            output.push_str(&format!(
                "| {} | {} | {:.1}% | {} | {} |\n",
                self.escape_cell(&r.group),
                format_offset(r.best_offset),
                r.match_percentage(),
                r.total_posts,
                self.escape_cell(&r.candidate_countries.join(", ")),
            ));
        }
        output
    }

    /// Formats the detail section for a single group
    fn format_group(&self, report: &GroupReport) -> String {
        let mut output = String::new();
        output.push_str(&format!("## {}\n\n", self.escape_cell(&report.group)));
        output.push_str(&format!(
            "- **Best offset:** {}\n- **9–5 match score:** {:.2} (≈ {:.1}% in local 9–5)\n",
            format_offset(report.best_offset),
            report.match_fraction,
            report.match_percentage(),
        ));
        output.push_str(&format!(
            "- **Posts:** {} total, {} on weekdays, {} on weekends\n",
            report.total_posts, report.weekday_posts, report.weekend_posts
        ));
        output.push_str(&format!("- **Weekday pattern:** {}\n\n", report.weekday_pattern));

        output.push_str("Likely locations:\n\n");
        for place in &report.candidate_countries {
            output.push_str(&format!("1. {}\n", place));
        }
        output.push('\n');

        let day_max = report.weekday_counts.iter().copied().max().unwrap_or(0);
        let hour_max = report.local_hour_counts.iter().copied().max().unwrap_or(0);

        output.push_str("```text\n");
        for (day, count) in WEEKDAYS.iter().zip(report.weekday_counts.iter()) {
            output.push_str(&format!(
                "{} {:>5} {}\n",
                day,
                count,
                render_bar(*count, day_max, BAR_WIDTH)
            ));
        }
        output.push('\n');
        for (hour, count) in report.local_hour_counts.iter().enumerate() {
            output.push_str(&format!(
                "{:02}h {:>5} {}\n",
                hour,
                count,
                render_bar(*count, hour_max, BAR_WIDTH)
            ));
        }
        output.push_str("```\n\n");
        output
    }

    /// Formats the full report document
    fn format_markdown(&self, reports: &[GroupReport]) -> String {
        let mut output = String::new();
        output.push_str("# Ransomware 9–5 time-zone analysis\n\n");
        output.push_str(&format!("*{} groups*\n\n", reports.len()));
        output.push_str(&self.format_summary(reports));
        output.push_str("\n---\n\n");
        for report in reports {
            output.push_str(&self.format_group(report));
        }
        output
    }
}

impl ReportWriter for MarkdownReportWriter {
    fn write(&self, reports: &[GroupReport]) -> Result<()> {
        if reports.is_empty() {
            return Ok(());
        }

        // Create output directory if it doesn't exist
        if let Some(parent) = self.output_file.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        fs::write(&self.output_file, self.format_markdown(reports))?;
        info!(path = %self.output_file.display(), "wrote markdown report");
        Ok(())
    }
}
