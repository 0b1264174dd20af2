//! Error taxonomy for talking to GitHub.

use thiserror::Error;

/// Failure of a single account's fetch.
///
/// Malformed individual records never reach this type; the parsers skip
/// them and keep going.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// GitHub answered 401. The account needs a new token.
    #[error("GitHub rejected the token: {message}")]
    Authentication { message: String },

    /// Network failure, timeout or a non-2xx status other than 401.
    #[error("GitHub request failed: {message}")]
    Transport { message: String },

    /// The response body was not the JSON shape we expect, or GraphQL
    /// reported errors.
    #[error("failed to decode GitHub response: {message}")]
    Decode { message: String },
}

impl FetchError {
    pub fn is_authentication(&self) -> bool {
        matches!(self, FetchError::Authentication { .. })
    }

    pub(crate) fn transport(message: impl Into<String>) -> Self {
        FetchError::Transport {
            message: message.into(),
        }
    }

    pub(crate) fn decode(message: impl Into<String>) -> Self {
        FetchError::Decode {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::decode(err.to_string())
        } else {
            FetchError::transport(err.to_string())
        }
    }
}
