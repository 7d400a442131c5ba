//! Domain error types.

/// Top-level error type for trendband.
#[derive(Debug, thiserror::Error)]
pub enum TrendbandError {
    #[error("no price data available on or before {target}")]
    NoData { target: String },

    #[error("insufficient price history: have {rows} rows, need {required}")]
    InsufficientHistory { rows: usize, required: usize },

    #[error("no scalar mapped for score {score} of {ticker}")]
    UnmappedScore { ticker: String, score: usize },

    #[error("configuration invariant violated: {reason}")]
    ConfigInvariant { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("price data error: {reason}")]
    PriceData { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TrendbandError {
    /// Failures the signal engine reports back to the caller as a
    /// formatted failure report rather than a fatal error.
    pub fn is_signal_failure(&self) -> bool {
        matches!(
            self,
            TrendbandError::NoData { .. }
                | TrendbandError::InsufficientHistory { .. }
                | TrendbandError::UnmappedScore { .. }
        )
    }
}

impl From<&TrendbandError> for std::process::ExitCode {
    fn from(err: &TrendbandError) -> Self {
        let code: u8 = match err {
            TrendbandError::Io(_) => 1,
            TrendbandError::ConfigInvariant { .. }
            | TrendbandError::ConfigParse { .. }
            | TrendbandError::ConfigMissing { .. }
            | TrendbandError::ConfigInvalid { .. } => 2,
            TrendbandError::PriceData { .. } => 3,
            TrendbandError::NoData { .. } | TrendbandError::InsufficientHistory { .. } => 5,
            TrendbandError::UnmappedScore { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
