//! # Cerberus Query
//!
//! NGSI-LD query translation for the Themis resource server.
//!
//! This crate turns decoded NGSI-LD query parameters into the search-query
//! JSON consumed by the database tier:
//!
//! - [`QueryParams`] - Typed NGSI-LD parameters as decoded from the request
//! - [`QueryMapper`] - Translation, validation, and `searchType` composition
//! - [`SearchQuery`] - The resulting wire document
//!
//! Temporal queries are always bounded: `during` carries its own window and
//! `before`/`after` get the mapper's default interval. Attribute queries
//! are parsed term by term and rejected with a typed [`QueryError`] when
//! malformed.
//!
//! # Example
//!
//! ```
//! use cerberus_query::{QueryMapper, QueryParams};
//!
//! # fn main() -> Result<(), cerberus_query::QueryError> {
//! let params = QueryParams::for_ids(vec!["urn:entity:1".to_string()])
//!     .with_text_query("temperature>20");
//!
//! let query = QueryMapper::new().to_search_query(&params)?;
//! assert_eq!(query.search_type, "latestSearch_attributeSearch");
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/cerberus-query/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod mapper;
mod params;

pub use error::{QueryError, QueryResult};
pub use mapper::{parse_query_term, AttrQueryTerm, QueryMapper, SearchQuery, DEFAULT_WINDOW_DAYS};
pub use params::QueryParams;
