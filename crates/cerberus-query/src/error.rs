//! Query translation error types.

use thiserror::Error;

/// Result type alias using [`QueryError`].
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors raised while translating NGSI-LD query parameters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QueryError {
    /// The temporal relation is not one of `during`, `before`, `after`.
    #[error("invalid temporal relation: {relation}")]
    InvalidTemporalRelation {
        /// The relation as presented.
        relation: String,
    },

    /// A `during` query arrived without its end time.
    #[error("temporal relation 'during' requires an end time")]
    MissingEndTime,

    /// An attribute-query term does not parse as `<attr><op><value>`.
    #[error("malformed attribute term {term:?}: {reason}")]
    MalformedAttributeTerm {
        /// The term as presented.
        term: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The geo relation does not parse as `<relation>[;maxdistance=<m>]`.
    #[error("malformed geo relation {georel:?}: {reason}")]
    MalformedGeoRelation {
        /// The relation as presented.
        georel: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The coordinate text of a proximity search is not a `[lat,lon]` pair.
    #[error("malformed coordinates {coordinates:?}: {reason}")]
    MalformedCoordinates {
        /// The coordinate text as presented.
        coordinates: String,
        /// What was wrong with it.
        reason: String,
    },
}

impl QueryError {
    /// Creates an invalid-temporal-relation error.
    #[must_use]
    pub fn invalid_temporal_relation(relation: impl Into<String>) -> Self {
        Self::InvalidTemporalRelation {
            relation: relation.into(),
        }
    }

    /// Creates a malformed-attribute-term error.
    #[must_use]
    pub fn malformed_attribute_term(term: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedAttributeTerm {
            term: term.into(),
            reason: reason.into(),
        }
    }

    /// Creates a malformed-geo-relation error.
    #[must_use]
    pub fn malformed_geo_relation(georel: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedGeoRelation {
            georel: georel.into(),
            reason: reason.into(),
        }
    }

    /// Creates a malformed-coordinates error.
    #[must_use]
    pub fn malformed_coordinates(
        coordinates: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedCoordinates {
            coordinates: coordinates.into(),
            reason: reason.into(),
        }
    }
}
