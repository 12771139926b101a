//! # Cerberus Policy
//!
//! Endpoint-category access policy for the Cerberus authorization gate.
//!
//! This crate turns a resolved grant and a catalogue classification into an
//! allow/deny decision, with no I/O of its own:
//!
//! - [`PolicyEngine`] - Per-category decision logic
//! - [`PolicyConfig`] - Endpoint catalog and administrative identity
//! - [`IdentityHasher`] - Consumer-identity hashing for ownership checks
//!
//! Open endpoints check catalogue openness and group containment; adapter
//! and subscription endpoints check entitlement plus a containment rule on
//! the addressed id; management endpoints are reserved for the configured
//! administrative provider identity.

#![doc(html_root_url = "https://docs.rs/cerberus-policy/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod engine;
mod hasher;

pub use config::{PolicyConfig, DEFAULT_ADMIN_IDENTITY, TEST_CONSUMER, TEST_PROVIDER_SHA};
pub use engine::PolicyEngine;
pub use hasher::{IdentityHasher, Sha1IdentityHasher};
