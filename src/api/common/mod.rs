//
//  apigee-cli
//  api/common/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Common API Types for the Apigee Management API
//!
//! This module provides the types shared by every Apigee operation: the
//! unified [`ApiError`], the Apigee error envelope [`ErrorResult`], and the
//! outcome types of revision deletion.
//!
//! # Example
//!
//! ```rust
//! use apigee_cli::api::common::ApiError;
//!
//! fn describe(result: Result<(), ApiError>) -> String {
//!     match result {
//!         Ok(()) => "ok".to_string(),
//!         Err(ApiError::RemoteStatus { status, .. }) => format!("Apigee said {}", status),
//!         Err(e) => e.to_string(),
//!     }
//! }
//! ```

use std::fmt;

use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error code Apigee returns when a revision cannot be deleted because it is
/// still deployed to at least one environment.
pub const APPLICATION_CAN_NOT_BE_DELETED: &str = "distribution.ApplicationCanNotBeDeleted";

/// Unified error type for all Apigee Management API operations.
///
/// # Variants
///
/// | Variant | Description |
/// |---------|-------------|
/// | `Transport` | Connection, DNS, TLS or timeout failure |
/// | `RemoteStatus` | Apigee answered with a non-success status |
/// | `UnexpectedDeleteStatus` | A revision delete failed for a reason other than "still deployed" |
/// | `DeploymentNotConfirmed` | The deploy call succeeded but no environment reports the revision as deployed |
/// | `Decode` | The response body is not the expected JSON |
/// | `Io` | A local file (e.g. the proxy bundle) could not be read |
/// | `InvalidBaseUrl` | The configured base URL does not parse |
/// | `Task` | A concurrent delete task panicked or was aborted |
/// | `Multiple` | Several of the above, from concurrent sub-operations |
///
/// # Notes
///
/// - Nothing in this crate retries; callers own their retry policy.
/// - `Multiple` renders its members joined with `"; "`.
#[derive(Error, Debug)]
pub enum ApiError {
    /// A network-level error occurred during the request.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Apigee returned a non-success status code.
    ///
    /// The response body has already been logged by the client.
    #[error("Apigee returned {status}: {method} {url}")]
    RemoteStatus {
        /// The HTTP status code Apigee answered with.
        status: StatusCode,
        /// The request method.
        method: Method,
        /// The full request URL.
        url: String,
    },

    /// A revision delete failed with a status that does not mean
    /// "the revision is still deployed".
    #[error("Unexpected status {status} for {method} of revision {revision}")]
    UnexpectedDeleteStatus {
        /// The HTTP status code Apigee answered with.
        status: StatusCode,
        /// The request method.
        method: Method,
        /// The revision that could not be deleted.
        revision: String,
    },

    /// The deploy request succeeded but no environment entry confirms
    /// the revision as deployed.
    #[error(
        "Did not find a successful deployment of {proxy} revision {revision} in environment {environment}"
    )]
    DeploymentNotConfirmed {
        /// Proxy name.
        proxy: String,
        /// Revision that was deployed.
        revision: String,
        /// Target environment.
        environment: String,
    },

    /// The response body could not be decoded.
    #[error("Invalid response from Apigee: {0}")]
    Decode(#[from] serde_json::Error),

    /// A local I/O error, typically reading the proxy bundle.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The base URL could not be parsed.
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    /// A spawned delete task did not run to completion.
    #[error("Task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Several independent failures, reported together.
    #[error("{}", join_messages(.0))]
    Multiple(Vec<ApiError>),
}

impl ApiError {
    /// Collapses a list of errors into a single error.
    ///
    /// Returns `None` for an empty list, the error itself for a list of one,
    /// and [`ApiError::Multiple`] otherwise.
    pub fn aggregate(mut errors: Vec<ApiError>) -> Option<ApiError> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(ApiError::Multiple(errors)),
        }
    }

    /// Returns the HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::RemoteStatus { status, .. } | Self::UnexpectedDeleteStatus { status, .. } => {
                Some(*status)
            }
            Self::Transport(e) => e.status(),
            _ => None,
        }
    }
}

fn join_messages(errors: &[ApiError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// The error envelope Apigee returns with most 4xx responses.
///
/// ```json
/// {
///   "code": "distribution.ApplicationCanNotBeDeleted",
///   "message": "Application proxy revision 3 can not be deleted",
///   "contexts": []
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResult {
    /// Machine-readable error code.
    #[serde(default)]
    pub code: String,

    /// Human-readable message.
    #[serde(default)]
    pub message: String,

    /// Additional context entries, usually empty.
    #[serde(default)]
    pub contexts: Vec<serde_json::Value>,
}

impl ErrorResult {
    /// Attempts to decode an Apigee error body.
    ///
    /// Returns `None` when the body is not an Apigee error envelope.
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    /// Whether Apigee refused a delete because the revision is deployed.
    pub fn is_deployed_revision(&self) -> bool {
        self.code == APPLICATION_CAN_NOT_BE_DELETED
    }
}

/// Outcome of a single relaxed revision delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RevisionDeletion {
    /// The revision was deleted.
    Deleted,
    /// Apigee kept the revision because it is deployed.
    Retained,
}

impl fmt::Display for RevisionDeletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deleted => write!(f, "deleted"),
            Self::Retained => write!(f, "retained"),
        }
    }
}

/// Summary of a delete-all-undeployed-revisions run.
///
/// Both lists keep the order in which the proxy listed its revisions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RevisionCleanup {
    /// Proxy name.
    pub proxy: String,
    /// Revisions that were deleted.
    pub deleted: Vec<String>,
    /// Revisions Apigee refused to delete because they are deployed.
    pub retained: Vec<String>,
}

impl RevisionCleanup {
    /// Records the outcome for a revision.
    pub fn record(&mut self, revision: String, outcome: RevisionDeletion) {
        match outcome {
            RevisionDeletion::Deleted => self.deleted.push(revision),
            RevisionDeletion::Retained => self.retained.push(revision),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_status_message_contains_status_method_and_url() {
        let err = ApiError::RemoteStatus {
            status: StatusCode::BAD_REQUEST,
            method: Method::POST,
            url: "https://api.enterprise.apigee.com/v1/organizations/org/apis".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Apigee returned 400 Bad Request: POST https://api.enterprise.apigee.com/v1/organizations/org/apis"
        );
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn test_multiple_joins_messages() {
        let err = ApiError::Multiple(vec![
            ApiError::UnexpectedDeleteStatus {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                method: Method::DELETE,
                revision: "2".to_string(),
            },
            ApiError::UnexpectedDeleteStatus {
                status: StatusCode::FORBIDDEN,
                method: Method::DELETE,
                revision: "5".to_string(),
            },
        ]);
        assert_eq!(
            err.to_string(),
            "Unexpected status 500 Internal Server Error for DELETE of revision 2; \
             Unexpected status 403 Forbidden for DELETE of revision 5"
        );
    }

    #[test]
    fn test_aggregate() {
        assert!(ApiError::aggregate(Vec::new()).is_none());

        let single = ApiError::aggregate(vec![ApiError::DeploymentNotConfirmed {
            proxy: "p".to_string(),
            revision: "1".to_string(),
            environment: "dev".to_string(),
        }]);
        assert!(matches!(single, Some(ApiError::DeploymentNotConfirmed { .. })));

        let many = ApiError::aggregate(vec![
            ApiError::Io(std::io::Error::other("a")),
            ApiError::Io(std::io::Error::other("b")),
        ]);
        assert!(matches!(many, Some(ApiError::Multiple(ref v)) if v.len() == 2));
    }

    #[test]
    fn test_error_result_detects_deployed_revision() {
        let body = r#"{"code":"distribution.ApplicationCanNotBeDeleted","message":"deployed","contexts":[]}"#;
        let parsed = ErrorResult::parse(body).unwrap();
        assert!(parsed.is_deployed_revision());

        let other = ErrorResult::parse(r#"{"code":"messaging.config.beans.ApplicationDoesNotExist"}"#).unwrap();
        assert!(!other.is_deployed_revision());

        assert!(ErrorResult::parse("<html>oops</html>").is_none());
    }

    #[test]
    fn test_cleanup_record_keeps_order() {
        let mut cleanup = RevisionCleanup::default();
        cleanup.record("1".to_string(), RevisionDeletion::Deleted);
        cleanup.record("2".to_string(), RevisionDeletion::Retained);
        cleanup.record("3".to_string(), RevisionDeletion::Deleted);
        assert_eq!(cleanup.deleted, vec!["1", "3"]);
        assert_eq!(cleanup.retained, vec!["2"]);
    }
}
