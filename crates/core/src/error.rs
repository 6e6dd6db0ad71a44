use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Store error: {0}")]
    Store(String),

    #[error("Fetch error for {year}: {message}")]
    Fetch { year: i32, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    pub fn fetch(year: i32, message: impl Into<String>) -> Self {
        AnalysisError::Fetch {
            year,
            message: message.into(),
        }
    }

    /// Whether the run can carry on after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AnalysisError::Fetch { .. })
    }
}
