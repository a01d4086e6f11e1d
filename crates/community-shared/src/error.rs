use thiserror::Error;

/// A failed call to the REST API.
///
/// `code` is the HTTP status, or one of the negative pseudo-codes for
/// failures that never produced a response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Remote request failed ({code}): {message}")]
pub struct RemoteFailure {
    pub code: i32,
    pub message: String,
}

impl RemoteFailure {
    pub const BAD_REQUEST: i32 = 400;
    pub const UNAUTHORIZED: i32 = 401;
    pub const FORBIDDEN: i32 = 403;
    pub const NOT_FOUND: i32 = 404;
    pub const REQUEST_TIMEOUT: i32 = 408;
    pub const TOO_MANY_REQUESTS: i32 = 429;
    pub const INTERNAL_SERVER_ERROR: i32 = 500;
    pub const BAD_GATEWAY: i32 = 502;
    pub const SERVICE_UNAVAILABLE: i32 = 503;
    pub const GATEWAY_TIMEOUT: i32 = 504;

    /// No connection could be made.
    pub const NETWORK_UNAVAILABLE: i32 = -1;
    /// A response arrived but could not be understood.
    pub const UNKNOWN_ERROR: i32 = -2;

    /// Build a failure carrying the default message for `code`.
    pub fn new(code: i32) -> Self {
        Self {
            code,
            message: default_message(code).to_string(),
        }
    }

    pub fn with_message(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn network_unavailable(message: impl Into<String>) -> Self {
        Self::with_message(Self::NETWORK_UNAVAILABLE, message)
    }

    pub fn is_authentication_error(&self) -> bool {
        self.code == Self::UNAUTHORIZED || self.code == Self::FORBIDDEN
    }

    pub fn is_client_error(&self) -> bool {
        (400..=499).contains(&self.code)
    }

    pub fn is_server_error(&self) -> bool {
        (500..=599).contains(&self.code)
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self.code,
            Self::REQUEST_TIMEOUT
                | Self::TOO_MANY_REQUESTS
                | Self::INTERNAL_SERVER_ERROR
                | Self::BAD_GATEWAY
                | Self::SERVICE_UNAVAILABLE
                | Self::GATEWAY_TIMEOUT
                | Self::NETWORK_UNAVAILABLE
        )
    }
}

fn default_message(code: i32) -> &'static str {
    match code {
        400 => "Bad request",
        401 => "Unauthorized - Please login again",
        403 => "Forbidden - Access denied",
        404 => "Resource not found",
        408 => "Request timeout",
        429 => "Too many requests - Please try again later",
        500 => "Internal server error",
        502 => "Bad gateway",
        503 => "Service unavailable",
        504 => "Gateway timeout",
        RemoteFailure::NETWORK_UNAVAILABLE => "Network error occurred",
        _ => "Unknown error occurred",
    }
}
