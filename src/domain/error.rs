//! Domain error types.

/// Top-level error type for mactrader.
#[derive(Debug, thiserror::Error)]
pub enum MactraderError {
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

    #[error("short_window ({short}) must be positive and less than long_window ({long})")]
    InvalidWindows { short: usize, long: usize },

    #[error("decision sequence has {decisions} entries but price series has {prices}")]
    LengthMismatch { decisions: usize, prices: usize },

    #[error("no price data for {symbol}")]
    NoData { symbol: String },

    #[error("trajectory has no periods to summarize")]
    EmptyTrajectory,

    #[error("invalid price data: {reason}")]
    InvalidPriceData { reason: String },

    #[error("data source error: {reason}")]
    Data { reason: String },

    #[error("sentiment source error: {reason}")]
    Sentiment { reason: String },

    #[error("total return is undefined when initial cash is zero")]
    UndefinedReturn,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MactraderError {
    pub(crate) fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        MactraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&MactraderError> for std::process::ExitCode {
    fn from(err: &MactraderError) -> Self {
        let code: u8 = match err {
            MactraderError::Io(_) => 1,
            MactraderError::ConfigParse { .. }
            | MactraderError::ConfigMissing { .. }
            | MactraderError::ConfigInvalid { .. }
            | MactraderError::InvalidWindows { .. }
            | MactraderError::LengthMismatch { .. } => 2,
            MactraderError::NoData { .. }
            | MactraderError::EmptyTrajectory
            | MactraderError::InvalidPriceData { .. }
            | MactraderError::Data { .. } => 3,
            MactraderError::Sentiment { .. } => 4,
            MactraderError::UndefinedReturn => 5,
        };
        std::process::ExitCode::from(code)
    }
}
