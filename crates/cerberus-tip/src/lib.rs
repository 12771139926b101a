//! # Cerberus TIP
//!
//! Token introspection for the Cerberus authorization gate.
//!
//! This crate resolves bearer tokens to [`cerberus_core::TipGrant`]s:
//!
//! - [`TokenIntrospector`] - Cache-first resolution with remote fallback
//! - [`TokenCache`] - Lock-free grant cache with compare-and-swap updates
//! - [`HttpTipClient`] - JSON client for the introspection provider
//! - [`SweepTask`] - Periodic eviction of expired cache entries
//!
//! The cache enforces two independent deadlines per entry: the token's own
//! expiry as reported by the provider, and a local freshness window that a
//! hit extends. Racing updates are resolved by compare-and-swap; the loser
//! simply re-introspects.

#![doc(html_root_url = "https://docs.rs/cerberus-tip/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cache;
mod client;
mod config;
mod introspector;
mod sweep;

pub use cache::{CacheLookup, CacheStatsSnapshot, TokenCache};
pub use client::{HttpTipClient, TipClient};
pub use config::{IntrospectionConfig, DEFAULT_TIP_BASE_URL, DEFAULT_TIP_PATH};
pub use introspector::TokenIntrospector;
pub use sweep::SweepTask;
