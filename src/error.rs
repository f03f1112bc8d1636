use http::{HeaderMap, Method, StatusCode};
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Flat discriminant for [`Error`], stable across variant payload changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorCode {
    Timeout,
    Transport,
    HttpStatus,
    Decode,
    SerializeJson,
    SerializeQuery,
    InvalidUrl,
    InvalidHeaderName,
    InvalidHeaderValue,
    MissingVerb,
    NoResponse,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Transport => "transport",
            Self::HttpStatus => "http_status",
            Self::Decode => "decode",
            Self::SerializeJson => "serialize_json",
            Self::SerializeQuery => "serialize_query",
            Self::InvalidUrl => "invalid_url",
            Self::InvalidHeaderName => "invalid_header_name",
            Self::InvalidHeaderValue => "invalid_header_value",
            Self::MissingVerb => "missing_verb",
            Self::NoResponse => "no_response",
        }
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Socket timeout surfaced by the transport adapter.
    #[error("Request failed for {method} {url}: ESOCKETTIMEDOUT")]
    Timeout { method: Method, url: String },

    /// Transport-level failure other than a timeout. Carries no status
    /// code and is never retried.
    #[error("Request failed for {method} {url}: {source}")]
    Transport {
        method: Method,
        url: String,
        #[source]
        source: BoxError,
    },

    /// Raised by middleware that convert response statuses into failures.
    /// The retry engine re-attempts it when `status >= 500`.
    #[error("{reason}")]
    HttpStatus {
        status: u16,
        headers: Box<HeaderMap>,
        reason: String,
    },

    /// A plugin post-phase failed to decode the response body.
    #[error("failed to decode response json: {source}; body={body}")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    #[error("failed to serialize request json: {source}")]
    SerializeJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize request query: {source}")]
    SerializeQuery {
        #[source]
        source: serde_urlencoded::ser::Error,
    },

    #[error("invalid request url: {url}")]
    InvalidUrl { url: String },

    #[error("invalid header name {name}: {source}")]
    InvalidHeaderName {
        name: String,
        #[source]
        source: http::header::InvalidHeaderName,
    },

    #[error("invalid header value for {name}: {source}")]
    InvalidHeaderValue {
        name: String,
        #[source]
        source: http::header::InvalidHeaderValue,
    },

    /// A request builder was finalized before any verb method set the
    /// method and URL.
    #[error("request finalized without a method; call a verb method first")]
    MissingVerb,

    /// The pipeline resolved without a populated response. Happens only
    /// when a middleware short-circuits without filling `ctx.res`.
    #[error("call completed without a populated response")]
    NoResponse,
}

impl Error {
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Timeout { .. } => ErrorCode::Timeout,
            Self::Transport { .. } => ErrorCode::Transport,
            Self::HttpStatus { .. } => ErrorCode::HttpStatus,
            Self::Decode { .. } => ErrorCode::Decode,
            Self::SerializeJson { .. } => ErrorCode::SerializeJson,
            Self::SerializeQuery { .. } => ErrorCode::SerializeQuery,
            Self::InvalidUrl { .. } => ErrorCode::InvalidUrl,
            Self::InvalidHeaderName { .. } => ErrorCode::InvalidHeaderName,
            Self::InvalidHeaderValue { .. } => ErrorCode::InvalidHeaderValue,
            Self::MissingVerb => ErrorCode::MissingVerb,
            Self::NoResponse => ErrorCode::NoResponse,
        }
    }

    /// Status code attached to the failure, when one exists.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Convenience constructor for middleware that turn response statuses
    /// into failures. The `reason` becomes the error's display message.
    pub fn http_status(status: StatusCode, headers: HeaderMap, reason: impl Into<String>) -> Self {
        Self::HttpStatus {
            status: status.as_u16(),
            headers: Box::new(headers),
            reason: reason.into(),
        }
    }
}
