use tracing::{debug, info, warn};

use crate::domain::{GroupReport, IngestSummary, RawVictim, VictimRecord, YearOutcome};
use crate::ports::{ReportWriter, Result, VictimSource, VictimStore};
use crate::ranking::{build_reports, DEFAULT_TOP_COUNTRIES};
use crate::scoring::build_histograms;
use crate::utils::parse_timestamp;

/// Knobs for the ranking and reporting stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Groups with fewer stored posts are left out of the report.
    pub min_posts: u64,
    pub top_countries: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            min_posts: 1,
            top_countries: DEFAULT_TOP_COUNTRIES,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// `None` when the run did not fetch anything.
    pub ingest: Option<IngestSummary>,
    pub reports: Vec<GroupReport>,
}

/// Turns a fetched entry into a record, or `None` if a required field is
/// missing or the timestamp cannot be read.
pub fn validate_entry(raw: &RawVictim) -> Option<VictimRecord> {
    let group = raw.group.as_deref().map(str::trim).filter(|g| !g.is_empty())?;
    let timestamp = raw.discovered.as_deref().and_then(parse_timestamp)?;
    let victim = raw
        .victim
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);
    Some(VictimRecord::new(group, timestamp, victim))
}

/// Validates a batch, returning the good records and the number skipped.
pub fn validate_entries(raw: &[RawVictim]) -> (Vec<VictimRecord>, usize) {
    let mut records = Vec::with_capacity(raw.len());
    let mut skipped = 0;
    for entry in raw {
        match validate_entry(entry) {
            Some(record) => records.push(record),
            None => {
                debug!(?entry, "skipping malformed entry");
                skipped += 1;
            }
        }
    }
    (records, skipped)
}

/// Application service running fetch, store, score, rank and report.
pub struct AnalysisServiceImpl {
    source: Box<dyn VictimSource>,
    store: Box<dyn VictimStore>,
    report_writers: Vec<Box<dyn ReportWriter>>,
    options: AnalysisOptions,
}

impl AnalysisServiceImpl {
    /// Creates a new AnalysisServiceImpl with the given dependencies
    pub fn new(
        source: Box<dyn VictimSource>,
        store: Box<dyn VictimStore>,
        report_writers: Vec<Box<dyn ReportWriter>>,
        options: AnalysisOptions,
    ) -> Self {
        Self {
            source,
            store,
            report_writers,
            options,
        }
    }

    /// Fetches every year, then stores everything that validated.
    /// A year that fails to fetch is logged and left out; store errors abort.
    pub fn ingest(&self, years: &[i32]) -> Result<IngestSummary> {
        let mut summary = IngestSummary::default();
        let mut fetched = Vec::new();

        for &year in years {
            match self.source.fetch_year(year) {
                Ok(raw) => {
                    let (records, skipped) = validate_entries(&raw);
                    info!(year, accepted = records.len(), skipped, "fetched victims");
                    summary.years.push(YearOutcome::Fetched {
                        year,
                        accepted: records.len(),
                        skipped,
                    });
                    fetched.extend(records);
                }
                Err(e) if e.is_recoverable() => {
                    warn!(year, error = %e, "fetch failed, continuing without this year");
                    summary.years.push(YearOutcome::Failed {
                        year,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        summary.inserted = self.store.upsert(&fetched)?;
        summary.total_stored = self.store.count()?;
        info!(
            inserted = summary.inserted,
            total = summary.total_stored,
            "store updated"
        );
        Ok(summary)
    }

    /// Scores everything in the store and builds the ranked report.
    pub fn analyze(&self) -> Result<Vec<GroupReport>> {
        let records = self.store.all_records()?;
        let histograms = build_histograms(&records);
        debug!(records = records.len(), groups = histograms.len(), "scoring");
        Ok(build_reports(
            &histograms,
            self.options.min_posts,
            self.options.top_countries,
        ))
    }

    pub fn publish(&self, reports: &[GroupReport]) -> Result<()> {
        for writer in &self.report_writers {
            writer.write(reports)?;
        }
        Ok(())
    }

    /// Runs the whole pipeline. An empty `years` slice skips fetching.
    pub fn execute_analysis(&self, years: &[i32]) -> Result<RunSummary> {
        let ingest = if years.is_empty() {
            info!("offline run, analysing stored records only");
            None
        } else {
            Some(self.ingest(years)?)
        };

        let reports = self.analyze()?;
        self.publish(&reports)?;
        Ok(RunSummary { ingest, reports })
    }
}
