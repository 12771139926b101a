//! # Cerberus
//!
//! **Authorization gate for the Themis data exchange**
//!
//! Cerberus decides, per API call, whether a presented bearer token may
//! reach a guarded endpoint and the resources named in the call:
//!
//! - **Cached introspection** - bearer tokens are resolved to grants at the
//!   Token Introspection Provider, with a TTL cache and background sweep
//! - **Catalogue classification** - requested resource ids are classified
//!   open or secure against the platform catalogue, with an open-verdict
//!   cache
//! - **Per-family policy** - open, adapter, subscription and management
//!   endpoints each get their own decision branch
//! - **Deployment modes** - production denies the `public` sentinel outside
//!   open endpoints; permissive deployments map it to fixed test identities
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cerberus::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new()
//!         .with_defaults()
//!         .with_optional_file("cerberus.toml")?
//!         .with_env_prefix("CERBERUS")
//!         .load()?;
//!     init_logging(&config.logging)?;
//!
//!     let gate = Authorizer::from_config(&config)?;
//!     gate.start_sweeper();
//!
//!     let ctx = AuthContext::new(
//!         BearerToken::new("dGhlLXRva2Vu"),
//!         "/ngsi-ld/v1/entities",
//!         Method::GET,
//!     );
//!     let request = UserRequest::for_resources(vec![
//!         "acme.example/9f8e7d/rs.acme.example/sensors/livestream".to_string(),
//!     ]);
//!
//!     let authorization = gate.authorize(&ctx, &request).await?;
//!     println!("consumer: {:?}", authorization.consumer);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The `public` sentinel is settled locally; every other token runs both
//! stages concurrently and the first failure aborts the call. The catalogue
//! is consulted only for endpoints in the open set; the other families
//! carry a skipped classification into the policy decision:
//!
//! ```text
//! AuthContext + UserRequest
//!   |
//!   |-- public sentinel --> settled locally, no remote calls
//!   |
//!   +-- TokenIntrospector --> TipGrant ------+
//!   |     (concurrent)                       +--> PolicyEngine --> Authorization
//!   +-- Classifier --------> Classification -+
//! ```

#![doc(html_root_url = "https://docs.rs/cerberus/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use cerberus_core as core;

// Re-export introspection types
pub use cerberus_tip as tip;

// Re-export catalogue types
pub use cerberus_catalogue as catalogue;

// Re-export policy types
pub use cerberus_policy as policy;

// Re-export configuration types
pub use cerberus_config as config;

// Re-export telemetry types
pub use cerberus_telemetry as telemetry;

// Re-export query translation types
pub use cerberus_query as query;

mod authorizer;

pub use authorizer::{Authorizer, AuthorizerBuilder};

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use cerberus::prelude::*;
/// ```
pub mod prelude {
    pub use cerberus_core::{
        AuthContext, AuthError, AuthResult, Authorization, BearerToken, Classification,
        DenialReason, DeploymentMode, EndpointCatalog, EndpointCategory, Method, TipGrant,
        UserRequest,
    };

    // Re-export configuration types
    pub use cerberus_config::{CerberusConfig, ConfigLoader};

    // Re-export logging setup
    pub use cerberus_telemetry::{init_logging, LogConfig};

    // Re-export query translation types
    pub use cerberus_query::{QueryMapper, QueryParams, SearchQuery};

    // Re-export the gate itself
    pub use crate::{Authorizer, AuthorizerBuilder};
}
