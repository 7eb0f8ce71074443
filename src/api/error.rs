use std::fmt;

/// Failure to obtain data from the resort API.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Transport failure: connection refused, DNS, timeout
    Unavailable(String),
    /// The server answered with a non-success status
    Status { url: String, status: u16 },
    /// The body was not the JSON shape we expect
    Decode(String),
}

impl FetchError {
    /// Worth another attempt: transport failures and 5xx answers
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Unavailable(_) => true,
            FetchError::Status { status, .. } => *status >= 500,
            FetchError::Decode(_) => false,
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Unavailable(msg) => write!(f, "Resort data unavailable: {}", msg),
            FetchError::Status { url, status } => {
                write!(f, "Resort API returned HTTP {} for {}", status, url)
            }
            FetchError::Decode(msg) => write!(f, "Failed to decode resort API response: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::Decode(e.to_string())
        } else {
            FetchError::Unavailable(e.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Decode(e.to_string())
    }
}
