use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to build HTTP client")]
    Client {
        #[source]
        source: reqwest::Error,
    },
    #[error("request failed: {source}")]
    Request {
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: reqwest::StatusCode },
    #[error("invalid JSON payload: {message}")]
    Json { message: String },
    #[error("invalid field {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },
    #[error("Zabbix API error {code}: {message}{}", data_suffix(.data))]
    Api {
        code: i64,
        message: String,
        data: Option<String>,
    },
    #[error("missing field in API response: {field}")]
    MissingField { field: &'static str },
    #[error("expected exactly one result, got {count}")]
    ExpectedOneResult { count: usize },
    #[error("expected {expected} ids in response, got {got}")]
    CountMismatch { expected: usize, got: usize },
}

impl From<reqwest::Error> for Error {
    fn from(source: reqwest::Error) -> Self {
        if source.is_status() {
            if let Some(status) = source.status() {
                return Self::HttpStatus { status };
            }
        }
        Self::Request { source }
    }
}

impl Error {
    /// Advisory classification for callers that implement their own retry
    /// policy; nothing in this crate retries.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(
            self,
            Self::Request { .. } | Self::HttpStatus { .. } | Self::Json { .. }
        )
    }

    /// The remote error code, when the server reported one.
    #[must_use]
    pub const fn api_code(&self) -> Option<i64> {
        match self {
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}

fn data_suffix(data: &Option<String>) -> String {
    data.as_deref()
        .filter(|d| !d.is_empty())
        .map(|d| format!(" ({d})"))
        .unwrap_or_default()
}
