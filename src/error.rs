//! Error types and the status classifier.

use reqwest::StatusCode;
use std::collections::TryReserveError;
use std::fmt;

/// Boxed transport cause carried by [`Error::Network`] and [`Error::Timeout`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by every [`Client`](crate::Client) operation.
///
/// Use [`Error::kind`] to get the coarse [`ErrorKind`] for retry decisions or display.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required argument was missing or empty. No request was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The response buffer could not be grown.
    #[error("out of memory while buffering response")]
    NoMemory(#[from] TryReserveError),

    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Http(#[source] reqwest::Error),

    /// Connection-level failure (DNS, TLS, connect, reset).
    #[error("network error: {0}")]
    Network(#[source] BoxError),

    /// The exchange did not finish within the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(#[source] BoxError),

    /// The server answered with a non-2xx status.
    #[error("{kind} (HTTP {status})")]
    Status {
        /// Classification of `status`.
        kind: ErrorKind,
        /// Status code returned by the server.
        status: StatusCode,
    },

    /// The response body was not the JSON shape the operation expects.
    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The response body exceeded the configured size limit and was cut off.
    #[error("response exceeded {limit} bytes and was truncated")]
    ResponseTruncated {
        /// Configured maximum response size in bytes.
        limit: usize,
    },
}

impl Error {
    /// The taxonomy value for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::NoMemory(_) => ErrorKind::NoMemory,
            Error::Http(_) => ErrorKind::Http,
            Error::Network(_) => ErrorKind::Network,
            Error::Timeout(_) => ErrorKind::Timeout,
            Error::Status { kind, .. } => *kind,
            Error::Parse(_) => ErrorKind::Parse,
            Error::ResponseTruncated { .. } => ErrorKind::Truncated,
        }
    }

    /// HTTP status of the response, when the error came from one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn from_transport(err: BoxError, timed_out: bool) -> Self {
        if timed_out {
            Error::Timeout(err)
        } else {
            Error::Network(err)
        }
    }
}

/// Closed set of error categories shared by all operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller precondition violated; no network call made.
    InvalidArgument,
    /// Allocation failure.
    NoMemory,
    /// HTTP client could not be set up.
    Http,
    /// Connection-level transport failure.
    Network,
    /// Request exceeded the configured timeout.
    Timeout,
    /// 401 or 403.
    Auth,
    /// 404.
    NotFound,
    /// 429.
    RateLimit,
    /// 5xx.
    Server,
    /// Body could not be decoded.
    Parse,
    /// Body exceeded the response size limit.
    Truncated,
    /// Any other status.
    Other,
}

impl ErrorKind {
    /// Stable human-readable description for logs and status displays.
    pub fn description(self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "Invalid argument",
            ErrorKind::NoMemory => "Out of memory",
            ErrorKind::Http => "HTTP client error",
            ErrorKind::Network => "Network error",
            ErrorKind::Timeout => "Request timeout",
            ErrorKind::Auth => "Authentication failed (401/403)",
            ErrorKind::NotFound => "Resource not found (404)",
            ErrorKind::RateLimit => "Rate limit exceeded (429)",
            ErrorKind::Server => "Server error (5xx)",
            ErrorKind::Parse => "JSON parse error",
            ErrorKind::Truncated => "Response too large",
            ErrorKind::Other => "Unknown error",
        }
    }

    /// Whether a caller may reasonably retry with backoff.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorKind::Network | ErrorKind::Timeout | ErrorKind::RateLimit | ErrorKind::Server
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Result of one network exchange before status interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportOutcome {
    /// The server answered with this status.
    Completed(StatusCode),
    /// Connection-level failure.
    NetworkFailure,
    /// The configured timeout elapsed.
    TimedOut,
}

/// Map a transport outcome to success or an [`ErrorKind`].
///
/// Network and timeout outcomes win over any status code.
pub fn classify(outcome: TransportOutcome) -> std::result::Result<(), ErrorKind> {
    match outcome {
        TransportOutcome::NetworkFailure => Err(ErrorKind::Network),
        TransportOutcome::TimedOut => Err(ErrorKind::Timeout),
        TransportOutcome::Completed(status) => classify_status(status),
    }
}

/// Map an HTTP status to success or an [`ErrorKind`].
pub fn classify_status(status: StatusCode) -> std::result::Result<(), ErrorKind> {
    match status.as_u16() {
        200..=299 => Ok(()),
        401 | 403 => Err(ErrorKind::Auth),
        404 => Err(ErrorKind::NotFound),
        429 => Err(ErrorKind::RateLimit),
        500.. => Err(ErrorKind::Server),
        _ => Err(ErrorKind::Other),
    }
}
