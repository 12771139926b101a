//! Error types for Cerberus.
//!
//! This module provides the [`AuthError`] type, the standard failure shape of
//! every authorization operation, and [`DenialReason`], the structured
//! sub-reason attached to policy denials.
//!
//! The taxonomy separates four very different situations that callers must
//! not conflate:
//!
//! | Variant | Meaning | Security decision? |
//! |---|---|---|
//! | `TokenInvalid` | token expired or unrecognized | yes |
//! | `Remote` | an upstream service failed or answered garbage | no |
//! | `NotFound` | the resource/group is absent from the catalogue | yes |
//! | `Denied` | well-formed request, policy says no | yes |
//! | `Contract` | malformed grant or request shape | no (programming error) |

use http::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Result type alias using [`AuthError`].
pub type AuthResult<T> = Result<T, AuthError>;

/// Structured reason attached to a policy denial.
///
/// Every denial path in the policy engine maps to exactly one reason, so
/// audit logs can distinguish *why* a well-formed request was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DenialReason {
    /// The anonymous public token was used against a non-open endpoint.
    #[error("public token cannot access requested endpoint")]
    PublicTokenRestricted,

    /// The requested endpoint belongs to no configured access category.
    #[error("requested endpoint is not part of any access category")]
    UnknownEndpoint,

    /// A secure resource was requested outside the granted resource group.
    #[error("secure resource is outside the granted resource group")]
    GroupMismatch {
        /// The grant's public consumer identity, carried for bookkeeping.
        consumer: Option<String>,
    },

    /// The grant's api list does not cover the requested endpoint category.
    #[error("grant does not cover the requested endpoint")]
    EndpointNotGranted,

    /// The grant covers the adapter endpoint but not the requested adapter.
    #[error("grant does not cover the requested adapter")]
    AdapterMismatch,

    /// The grant covers the subscription endpoint but not the requested entity.
    #[error("grant does not cover the requested entity")]
    EntityMismatch,

    /// The caller does not own the subscription it is operating on.
    #[error("caller does not own the requested subscription")]
    OwnerMismatch,

    /// Management access requires the administrative provider identity.
    #[error("management access requires the administrative identity")]
    NotAdmin,
}

/// Standard error type for authorization operations.
///
/// # Example
///
/// ```
/// use cerberus_core::AuthError;
///
/// let err = AuthError::remote("tip", "connection refused");
/// assert_eq!(err.status_code(), http::StatusCode::BAD_GATEWAY);
/// assert!(!err.is_denied());
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AuthError {
    /// The token is expired or unrecognized at the source of truth.
    #[error("token invalid: {message}")]
    TokenInvalid {
        /// Human-readable error message.
        message: String,
    },

    /// An upstream service is unreachable or returned a malformed response.
    #[error("remote call to {service} failed: {message}")]
    Remote {
        /// The upstream service ("tip" or "catalogue").
        service: String,
        /// The upstream error message, verbatim where available.
        message: String,
    },

    /// The resource or resource group is absent from the catalogue.
    #[error("not found: {message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
    },

    /// A well-formed request that policy refuses.
    #[error("access denied: {reason}")]
    Denied {
        /// The structured denial reason.
        reason: DenialReason,
    },

    /// Malformed grant or request shape: a programming error, not a
    /// security decision.
    #[error("contract violation: {message}")]
    Contract {
        /// What was missing or malformed.
        message: String,
    },
}

impl AuthError {
    /// Creates a token-invalid error.
    #[must_use]
    pub fn token_invalid(message: impl Into<String>) -> Self {
        Self::TokenInvalid {
            message: message.into(),
        }
    }

    /// Creates a remote-failure error for the named upstream service.
    #[must_use]
    pub fn remote(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a denial with the given reason.
    #[must_use]
    pub const fn denied(reason: DenialReason) -> Self {
        Self::Denied { reason }
    }

    /// Creates a contract-violation error.
    #[must_use]
    pub fn contract(message: impl Into<String>) -> Self {
        Self::Contract {
            message: message.into(),
        }
    }

    /// Returns `true` for [`AuthError::TokenInvalid`].
    #[must_use]
    pub const fn is_token_invalid(&self) -> bool {
        matches!(self, Self::TokenInvalid { .. })
    }

    /// Returns `true` for [`AuthError::Remote`].
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }

    /// Returns `true` for [`AuthError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` for [`AuthError::Denied`].
    #[must_use]
    pub const fn is_denied(&self) -> bool {
        matches!(self, Self::Denied { .. })
    }

    /// Returns the denial reason, if this error is a denial.
    #[must_use]
    pub const fn denial_reason(&self) -> Option<&DenialReason> {
        match self {
            Self::Denied { reason } => Some(reason),
            _ => None,
        }
    }

    /// Returns the HTTP status code the API layer should answer with.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::TokenInvalid { .. } => StatusCode::UNAUTHORIZED,
            Self::Remote { .. } => StatusCode::BAD_GATEWAY,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Denied { .. } => StatusCode::FORBIDDEN,
            Self::Contract { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::TokenInvalid { .. } => "TOKEN_INVALID",
            Self::Remote { .. } => "REMOTE_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Denied { .. } => "ACCESS_DENIED",
            Self::Contract { .. } => "CONTRACT_VIOLATION",
        }
    }

    /// Converts this error to a serializable envelope for HTTP responses.
    #[must_use]
    pub fn to_envelope(&self) -> ErrorEnvelope {
        let detail = match self {
            Self::Denied {
                reason: DenialReason::GroupMismatch {
                    consumer: Some(consumer),
                },
            } => Some(serde_json::json!({ "consumer": consumer })),
            Self::Remote { service, .. } => Some(serde_json::json!({ "service": service })),
            _ => None,
        };

        ErrorEnvelope {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
                detail,
            },
        }
    }
}

/// Serializable error envelope for HTTP responses.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
}

/// Error detail within an envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional structured detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_invalid() {
        let err = AuthError::token_invalid("token has expired");
        assert!(err.is_token_invalid());
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert!(err.to_string().contains("token has expired"));
    }

    #[test]
    fn test_remote_error_carries_service() {
        let err = AuthError::remote("catalogue", "connection reset");
        assert!(err.is_remote());
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);

        let envelope = err.to_envelope();
        assert_eq!(envelope.error.code, "REMOTE_ERROR");
        assert_eq!(envelope.error.detail.unwrap()["service"], "catalogue");
    }

    #[test]
    fn test_denied_reason_accessor() {
        let err = AuthError::denied(DenialReason::PublicTokenRestricted);
        assert!(err.is_denied());
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            err.denial_reason(),
            Some(&DenialReason::PublicTokenRestricted)
        );
    }

    #[test]
    fn test_group_mismatch_names_public_consumer() {
        let err = AuthError::denied(DenialReason::GroupMismatch {
            consumer: Some("public.consumer@themis.example".to_string()),
        });

        let envelope = err.to_envelope();
        let detail = envelope.error.detail.unwrap();
        assert_eq!(detail["consumer"], "public.consumer@themis.example");
    }

    #[test]
    fn test_envelope_serialization() {
        let err = AuthError::not_found("resource not in catalogue");
        let json = serde_json::to_string(&err.to_envelope()).expect("serializable");
        assert!(json.contains("\"code\":\"NOT_FOUND\""));
        assert!(json.contains("resource not in catalogue"));
    }

    #[test]
    fn test_all_variants_map_to_error_statuses() {
        let errors = [
            AuthError::token_invalid("x"),
            AuthError::remote("tip", "x"),
            AuthError::not_found("x"),
            AuthError::denied(DenialReason::NotAdmin),
            AuthError::contract("x"),
        ];

        for err in errors {
            let status = err.status_code();
            assert!(
                status.is_client_error() || status.is_server_error(),
                "{} should map to an error status, got {}",
                err.error_code(),
                status
            );
        }
    }
}
