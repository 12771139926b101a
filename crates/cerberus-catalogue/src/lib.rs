//! # Cerberus Catalogue
//!
//! Catalogue-backed resource classification for the Cerberus authorization
//! gate.
//!
//! This crate decides whether resource ids are publicly readable:
//!
//! - [`Classifier`] - Concurrent, fail-fast classification with caching
//! - [`HttpCatalogueClient`] - Search client for the catalogue API
//! - [`AccessPolicy`] - Open or secure, per catalogue group
//!
//! A resource is open when its catalogue group (the first four segments of
//! its id) carries the `OPEN` access policy. Ids that do not exist in the
//! catalogue fail classification outright.

#![doc(html_root_url = "https://docs.rs/cerberus-catalogue/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod classifier;
mod client;
mod config;

pub use classifier::{Classifier, ClassifierStatsSnapshot};
pub use client::{AccessPolicy, CatalogueClient, HttpCatalogueClient};
pub use config::{CatalogueConfig, DEFAULT_CATALOGUE_BASE_URL, DEFAULT_SEARCH_PATH};
