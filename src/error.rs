// =============================================================================
// Error taxonomy for the adviser core
// =============================================================================
//
// Two failure classes abort an analysis request: bad caller input and a
// failed market-data fetch. Short history is not an error; indicators simply
// stay undefined through their warm-up rows.
// =============================================================================

use thiserror::Error;

/// Result alias used by the core (series, pipeline, market data, analysis).
pub type Result<T> = std::result::Result<T, AdviserError>;

#[derive(Error, Debug)]
pub enum AdviserError {
    /// Empty or malformed price series, unknown asset, bad parameters.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Transport error, timeout, non-success status or malformed payload.
    #[error("market data fetch failed: {0}")]
    FetchFailure(String),
}

impl AdviserError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn fetch_failure(msg: impl Into<String>) -> Self {
        Self::FetchFailure(msg.into())
    }

    /// Short machine-readable kind, used in API error bodies and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::FetchFailure(_) => "fetch_failure",
        }
    }
}

impl From<reqwest::Error> for AdviserError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::FetchFailure(format!("request timed out: {err}"))
        } else if err.is_decode() {
            Self::FetchFailure(format!("malformed response body: {err}"))
        } else {
            Self::FetchFailure(err.to_string())
        }
    }
}
