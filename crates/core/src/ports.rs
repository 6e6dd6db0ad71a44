use crate::domain::{GroupReport, RawVictim, VictimRecord};
use crate::error::AnalysisError;

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Remote source of leak-site posts, queried one year at a time.
pub trait VictimSource {
    fn fetch_year(&self, year: i32) -> Result<Vec<RawVictim>>;
}

/// Append-only persistence for victim records.
pub trait VictimStore {
    /// Inserts records, ignoring exact duplicates. Returns how many rows were new.
    fn upsert(&self, records: &[VictimRecord]) -> Result<usize>;
    fn all_records(&self) -> Result<Vec<VictimRecord>>;
    fn count(&self) -> Result<usize>;
}

/// Trait for rendering the final report
/// This is a port (interface) that defines how the core communicates with output adapters
pub trait ReportWriter {
    fn write(&self, reports: &[GroupReport]) -> Result<()>;
}
