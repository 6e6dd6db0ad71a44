use chrono::{DateTime, Utc};

/// A leak-site post as it came off the wire, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawVictim {
    pub group: Option<String>,
    pub discovered: Option<String>,
    pub victim: Option<String>,
}

/// A validated leak-site post. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VictimRecord {
    pub group: String,
    pub timestamp: DateTime<Utc>,
    pub victim: Option<String>,
}

impl VictimRecord {
    pub fn new(group: impl Into<String>, timestamp: DateTime<Utc>, victim: Option<String>) -> Self {
        Self {
            group: group.into(),
            timestamp,
            victim,
        }
    }
}

/// Business-hour alignment of one group under one candidate offset.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupOffsetScore {
    pub group: String,
    pub offset: i32,
    pub matched: u64,
    pub total: u64,
    pub match_fraction: f64,
}

/// One row of the final report.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupReport {
    pub group: String,
    pub best_offset: i32,
    pub match_fraction: f64,
    pub total_posts: u64,
    pub weekday_posts: u64,
    pub weekend_posts: u64,
    /// Monday first, in the group's best-fit local time.
    pub weekday_counts: [u64; 7],
    /// Hour 0 first, in the group's best-fit local time.
    pub local_hour_counts: [u64; 24],
    pub candidate_countries: Vec<String>,
    pub weekday_pattern: String,
}

impl GroupReport {
    pub fn match_percentage(&self) -> f64 {
        self.match_fraction * 100.0
    }
}

/// Outcome of fetching a single year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YearOutcome {
    Fetched { year: i32, accepted: usize, skipped: usize },
    Failed { year: i32, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub years: Vec<YearOutcome>,
    pub inserted: usize,
    pub total_stored: usize,
}

impl IngestSummary {
    pub fn failed_years(&self) -> Vec<i32> {
        self.years
            .iter()
            .filter_map(|o| match o {
                YearOutcome::Failed { year, .. } => Some(*year),
                YearOutcome::Fetched { .. } => None,
            })
            .collect()
    }

    pub fn accepted(&self) -> usize {
        self.years
            .iter()
            .map(|o| match o {
                YearOutcome::Fetched { accepted, .. } => *accepted,
                YearOutcome::Failed { .. } => 0,
            })
            .sum()
    }
}
