//! # Cerberus Core
//!
//! Core types for the Cerberus authorization gate.
//!
//! This crate provides the vocabulary shared by every Cerberus component:
//!
//! - [`BearerToken`] - Presented credential, with the `public` sentinel
//! - [`TipGrant`] - Validated introspection result and its request entries
//! - [`AuthContext`] / [`UserRequest`] - What a call is and what it asks for
//! - [`Authorization`] - Consumer/provider pair returned on success
//! - [`EndpointCatalog`] - Guarded paths partitioned into policy families
//! - [`Classification`] - Catalogue openness verdict per resource id
//! - [`AuthError`] - Standard error taxonomy

#![doc(html_root_url = "https://docs.rs/cerberus-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use std::future::Future;
use std::pin::Pin;

mod classification;
mod endpoints;
mod error;
mod grant;
mod request;
pub mod resource;
mod token;

pub use classification::Classification;
pub use endpoints::{
    EndpointCatalog, EndpointCategory, DEFAULT_ADAPTER_ENDPOINTS, DEFAULT_MANAGEMENT_ENDPOINTS,
    DEFAULT_OPEN_ENDPOINTS, DEFAULT_SUBSCRIPTION_ENDPOINTS,
};
pub use error::{AuthError, AuthResult, DenialReason, ErrorDetail, ErrorEnvelope};
pub use grant::{
    is_public_token, GrantRequest, TipGrant, PUBLIC_CONSUMER, PUBLIC_RESOURCE_PATTERN,
    WILDCARD_API,
};
pub use request::{AuthContext, Authorization, UserRequest};
pub use token::{BearerToken, PUBLIC_TOKEN};

// [`AuthContext`] carries an HTTP method, so the type is part of this
// crate's vocabulary.
pub use http::Method;

use serde::{Deserialize, Serialize};

/// Boxed future type used by the async client traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// How strictly the gate treats callers it cannot authorize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    /// Full enforcement: the public sentinel only reaches open endpoints.
    #[default]
    Production,
    /// Test deployments: the public sentinel is mapped to fixed test
    /// identities instead of being denied on non-open endpoints.
    Permissive,
}

impl DeploymentMode {
    /// Returns `true` in full-enforcement mode.
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}
