// Aora - A short-video sharing client
// Copyright (C) 2025 Aora Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Error types for Appwrite access

use serde::Deserialize;
use thiserror::Error;

/// Result type for Appwrite operations
pub type AppwriteResult<T> = Result<T, AppwriteError>;

/// Errors that can occur while talking to the Appwrite backend
#[derive(Debug, Error)]
pub enum AppwriteError {
    /// The service rejected the call
    #[error("{message} ({kind}, HTTP {status})")]
    Api {
        status: u16,
        code: u16,
        kind: String,
        message: String,
    },

    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    /// A call succeeded but did not return something the next step needs
    #[error("Missing result: {0}")]
    MissingResult(&'static str),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error body returned by Appwrite
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    code: u16,
    #[serde(rename = "type", default)]
    kind: String,
}

impl AppwriteError {
    /// Build an API error from an HTTP status and the raw response body
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(err) => Self::Api {
                status,
                code: if err.code == 0 { status } else { err.code },
                kind: if err.kind.is_empty() {
                    "unknown".to_string()
                } else {
                    err.kind
                },
                message: err.message,
            },
            Err(_) => Self::Api {
                status,
                code: status,
                kind: "unknown".to_string(),
                message: if body.is_empty() {
                    format!("HTTP {}", status)
                } else {
                    body.to_string()
                },
            },
        }
    }

    /// HTTP status for API errors
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True when the caller has no valid session
    pub fn is_unauthorized(&self) -> bool {
        self.http_status() == Some(401)
    }

    /// Appwrite error type string (e.g. `user_invalid_credentials`)
    pub fn kind(&self) -> Option<&str> {
        match self {
            Self::Api { kind, .. } => Some(kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_appwrite_error_body() {
        let body = r#"{"message":"Invalid credentials. Please check the email and password.","code":401,"type":"user_invalid_credentials","version":"1.5.7"}"#;
        let err = AppwriteError::from_response(401, body);

        assert!(err.is_unauthorized());
        assert_eq!(err.kind(), Some("user_invalid_credentials"));
        assert!(err.to_string().starts_with("Invalid credentials."));
    }

    #[test]
    fn keeps_raw_body_when_not_json() {
        let err = AppwriteError::from_response(502, "Bad Gateway");

        match err {
            AppwriteError::Api { status, code, ref message, .. } => {
                assert_eq!(status, 502);
                assert_eq!(code, 502);
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn empty_body_uses_status_line() {
        let err = AppwriteError::from_response(500, "");
        assert_eq!(err.to_string(), "HTTP 500 (unknown, HTTP 500)");
    }

    #[test]
    fn non_api_errors_have_no_status() {
        assert_eq!(AppwriteError::InvalidFileType("document".into()).http_status(), None);
        assert_eq!(AppwriteError::MissingResult("account id").kind(), None);
    }
}
