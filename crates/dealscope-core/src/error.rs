use thiserror::Error;

/// Failure to parse one of the canonical string forms used by the library.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid date key '{0}' (expected YYYY-MM-DD)")]
    DateKey(String),
    #[error("invalid month key '{0}' (expected YYYY-MM)")]
    MonthKey(String),
    #[error("unknown time filter '{0}' (expected day, week, month, year or all)")]
    TimeFilter(String),
    #[error("unknown period '{0}' (expected week or month)")]
    Period(String),
    #[error("unknown sort order '{0}' (expected newest, price-asc, price-desc or discount)")]
    SortOrder(String),
}

/// Errors returned by [`crate::StoreClient`].
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("authentication required")]
    Unauthorized,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}
