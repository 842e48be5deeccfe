//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for stockdash.
#[derive(Debug, thiserror::Error)]
pub enum StockdashError {
    #[error("malformed input at row {row}, column {column}: {reason}")]
    MalformedInput {
        row: usize,
        column: String,
        reason: String,
    },

    #[error("missing required column {column}")]
    MissingColumn { column: String },

    #[error("insufficient data for {ticker}: have {observations} observations, need {minimum}")]
    InsufficientData {
        ticker: String,
        observations: usize,
        minimum: usize,
    },

    #[error("undefined return for {ticker} on {date}: prior close is zero")]
    UndefinedReturn { ticker: String, date: NaiveDate },

    #[error("unknown security {ticker}")]
    UnknownSecurity { ticker: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("failed to read {path}: {reason}")]
    Source { path: String, reason: String },

    #[error("failed to write {path}: {reason}")]
    Export { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&StockdashError> for std::process::ExitCode {
    fn from(err: &StockdashError) -> Self {
        let code: u8 = match err {
            StockdashError::Io(_) | StockdashError::Source { .. } => 1,
            StockdashError::ConfigParse { .. } | StockdashError::ConfigInvalid { .. } => 2,
            StockdashError::MalformedInput { .. } | StockdashError::MissingColumn { .. } => 3,
            StockdashError::UnknownSecurity { .. } => 4,
            StockdashError::InsufficientData { .. } | StockdashError::UndefinedReturn { .. } => 5,
            StockdashError::Export { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
