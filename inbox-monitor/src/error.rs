use serde::Deserialize;

/// Every way a dashboard request can fail.
///
/// The first three variants are transport-level and are retried by
/// [`crate::retry::with_retry`]. `Application` is produced after a body
/// decoded fine but carried `success: false`.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    Network(String),
    Status { status: u16, message: String },
    Parse(String),
    Application(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Network(msg) => write!(f, "Network error: {}", msg),
            FetchError::Status { status, message } => {
                write!(f, "HTTP error! status: {} ({})", status, message)
            }
            FetchError::Parse(msg) => write!(f, "Parse error: {}", msg),
            FetchError::Application(msg) => write!(f, "Application error: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

impl FetchError {
    /// Get a user-friendly error category for display
    pub fn category(&self) -> &'static str {
        match self {
            FetchError::Network(_) => "Offline",
            FetchError::Status { .. } => "Server Error",
            FetchError::Parse(_) => "Parse Error",
            FetchError::Application(_) => "Rejected",
        }
    }

    /// Message the backend attached to an application-level rejection, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            FetchError::Application(msg) if !msg.is_empty() => Some(msg),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Parse(format!("Failed to parse response: {}", e))
    }
}

/// Failure body the backend sends alongside error statuses and `success: false`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorBody {
    /// Prefer the human-readable `message`, then the terse `error` code.
    pub fn describe(&self) -> Option<String> {
        self.message.clone().or_else(|| self.error.clone())
    }
}
