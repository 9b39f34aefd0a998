// ABOUTME: Platform API error types with SNAFU pattern.
// ABOUTME: Unifies transport and status failures for programmatic handling.

use snafu::Snafu;

/// Unified error for calls against the platform and cluster APIs.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ApiError {
    #[snafu(display("{operation} failed with status {status}: {message}"))]
    Status {
        operation: &'static str,
        status: u16,
        message: String,
    },

    #[snafu(display("{operation} transport error: {message}"))]
    Transport {
        operation: &'static str,
        message: String,
    },

    #[snafu(display("{operation} returned a malformed response: {message}"))]
    Malformed {
        operation: &'static str,
        message: String,
    },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The named resource already exists (create/update conflict).
    Conflict,
    /// The named resource does not exist.
    NotFound,
    /// Any other definitive remote rejection.
    Remote,
    /// Connection-level failure; the call may never have reached the server.
    Transport,
    /// The server answered, but the payload could not be interpreted.
    Malformed,
}

impl ApiError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            ApiError::Status { status: 409, .. } => ApiErrorKind::Conflict,
            ApiError::Status { status: 404, .. } => ApiErrorKind::NotFound,
            ApiError::Status { .. } => ApiErrorKind::Remote,
            ApiError::Transport { .. } => ApiErrorKind::Transport,
            ApiError::Malformed { .. } => ApiErrorKind::Malformed,
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.kind() == ApiErrorKind::Conflict
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ApiErrorKind::NotFound
    }

    /// Whether a poll loop may sensibly try again. Transport hiccups and
    /// server-side unavailability are transient; everything else is a
    /// definitive answer.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Transport { .. } => true,
            ApiError::Status { status, .. } => matches!(status, 502 | 503 | 504),
            _ => false,
        }
    }
}
