//! Error types for the Unfraud client.
//!
//! # Design
//! `UnfraudError` is the single catch point for everything that can go wrong
//! between building a payload and decoding a score. Callers that want to
//! react differently match on the variant: `InvalidInput` never reached the
//! network, `InvalidRequest` is the service rejecting the payload, `Http`
//! covers every other status problem and transport failures (status 0).

use std::fmt;

use thiserror::Error;

/// Errors returned by `WebServiceClient` and the `Unfraud` builder.
#[derive(Debug, Error)]
pub enum UnfraudError {
    /// The payload could not be encoded, or a builder argument was not a
    /// JSON object.
    #[error("{0}")]
    InvalidInput(String),

    /// The service answered 4xx with a well-formed `{code, error}` body.
    #[error("{message}")]
    InvalidRequest {
        message: String,
        code: ErrorCode,
        status: u16,
        url: String,
    },

    /// Unexpected HTTP status, undecodable error body, or transport failure.
    #[error("{message}")]
    Http {
        message: String,
        status: u16,
        url: String,
    },

    /// A 200 response that was empty, not JSON, or carried `error_message`.
    #[error("{0}")]
    WebService(String),
}

impl UnfraudError {
    /// HTTP status attached to the error, if any. Transport failures report 0.
    pub fn status(&self) -> Option<u16> {
        match self {
            UnfraudError::InvalidRequest { status, .. } | UnfraudError::Http { status, .. } => {
                Some(*status)
            }
            UnfraudError::InvalidInput(_) | UnfraudError::WebService(_) => None,
        }
    }

    /// True when the request never got an HTTP response at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, UnfraudError::Http { status: 0, .. })
    }
}

/// Error code reported by the service in a 4xx `{code, error}` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidInput,
    AuthorizationInvalid,
    Other(String),
}

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::AuthorizationInvalid => "AUTHORIZATION_INVALID",
            ErrorCode::Other(code) => code,
        }
    }
}

impl From<&str> for ErrorCode {
    fn from(code: &str) -> Self {
        match code {
            "INVALID_INPUT" => ErrorCode::InvalidInput,
            "AUTHORIZATION_INVALID" => ErrorCode::AuthorizationInvalid,
            other => ErrorCode::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup of a name that `Score` does not declare.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown attribute: {name}")]
pub struct UnknownAttribute {
    pub name: String,
}

/// Failure reported by a `Transport` before any HTTP status was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
