/// Error types for the Ali je vroče toolkit
use thiserror::Error;

/// Main error type for station data and seasonal statistics
#[derive(Error, Debug)]
pub enum VroceError {
    /// Center date is not a valid "MM-DD" string
    #[error("Invalid center date format: expected MM-DD, got {0:?}")]
    InvalidDateFormat(String),

    /// Window size outside 1..=365 days
    #[error("Invalid window_days: must be between 1 and 365, got {0}")]
    InvalidWindow(usize),

    /// Too few usable samples for the requested computation
    #[error("Insufficient data (needed: {needed}, found: {found})")]
    InsufficientData { needed: usize, found: usize },

    /// Breakpoints or samples missing from the data service
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// Payload could not be interpreted
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Failed to parse JSON payload
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to parse CSV data
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// HTTP request failed
    #[cfg(feature = "api")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[cfg(feature = "api")]
    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },
}

impl VroceError {
    /// Whether a failed request may succeed when repeated.
    ///
    /// Malformed input never becomes valid on retry; network failures and
    /// missing upstream data may.
    pub fn is_retryable(&self) -> bool {
        match self {
            VroceError::DataUnavailable(_) => true,
            #[cfg(feature = "api")]
            VroceError::Http(_) => true,
            #[cfg(feature = "api")]
            VroceError::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Inline message shown to site visitors (Slovenian).
    pub fn user_message(&self) -> String {
        match self {
            #[cfg(feature = "api")]
            VroceError::Http(_) | VroceError::HttpStatus { .. } => {
                "Napaka pri povezavi s strežnikom".to_string()
            }
            VroceError::InsufficientData { .. } | VroceError::DataUnavailable(_) => {
                "Ni podatkov za izbrano postajo".to_string()
            }
            other => format!("Napaka: {}", other),
        }
    }
}

/// Type alias for Results using VroceError
pub type Result<T> = std::result::Result<T, VroceError>;
