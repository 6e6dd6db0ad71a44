use std::io::Write;

use ninefive_core::domain::GroupReport;
use ninefive_core::ports::{ReportWriter, Result};
use ninefive_core::utils::{format_offset, render_bar};

const BAR_WIDTH: usize = 30;

/// Prints the report to standard output.
pub struct ConsoleReportWriter {
    plot: bool,
}

impl ConsoleReportWriter {
    pub fn new(plot: bool) -> Self {
        Self { plot }
    }

    pub fn render(&self, reports: &[GroupReport]) -> String {
        if reports.is_empty() {
            return "No data to analyze.\n".to_string();
        }

        let mut out = String::from("\n--- Analysis Results ---\n\n");
        for r in reports {
            out.push_str(&format!("Group: {}\n", r.group));
            out.push_str(&format!("  Best Offset: {}\n", format_offset(r.best_offset)));
            out.push_str(&format!(
                "  9–5 Match Score: {:.2} (≈ {:.1}% in local 9–5)\n",
                r.match_fraction,
                r.match_percentage()
            ));
            out.push_str(&format!(
                "  Weekdays: {}, Weekends: {}, TotalPosts: {}\n",
                r.weekday_posts, r.weekend_posts, r.total_posts
            ));
            out.push_str(&format!("  Weekday Pattern: {}\n", r.weekday_pattern));
            out.push_str(&format!(
                "  Top {} Likely Locations (based on offset):\n",
                r.candidate_countries.len()
            ));
            for place in &r.candidate_countries {
                out.push_str(&format!("    - {}\n", place));
            }
            if self.plot {
                out.push_str("  Local posting hours:\n");
                let max = r.local_hour_counts.iter().copied().max().unwrap_or(0);
                for (hour, count) in r.local_hour_counts.iter().enumerate() {
                    out.push_str(&format!(
                        "    {:02}h {:>4} {}\n",
                        hour,
                        count,
                        render_bar(*count, max, BAR_WIDTH)
                    ));
                }
            }
            out.push('\n');
        }
        out
    }
}

impl ReportWriter for ConsoleReportWriter {
    fn write(&self, reports: &[GroupReport]) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(self.render(reports).as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}
