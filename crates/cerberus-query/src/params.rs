//! Typed NGSI-LD query parameters.

use chrono::{DateTime, Utc};

/// NGSI-LD query parameters as decoded from the request line.
///
/// String-valued fields carry the raw NGSI-LD text (`georel` may still
/// embed its `maxdistance` pair, `coordinates` its bracketed array); the
/// [`QueryMapper`](crate::QueryMapper) parses and validates them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    /// Entity ids to select.
    pub ids: Vec<String>,
    /// Attribute names to project into the response.
    pub attrs: Vec<String>,
    /// Geo relation, e.g. `within` or `near;maxdistance=1000`.
    pub georel: Option<String>,
    /// Geometry kind, e.g. `point` or `Polygon`.
    pub geometry: Option<String>,
    /// Coordinate text, e.g. `[21.178,72.834]`.
    pub coordinates: Option<String>,
    /// Property the geo query applies to, when not the default location.
    pub geoproperty: Option<String>,
    /// Temporal relation: `during`, `before`, or `after`.
    pub timerel: Option<String>,
    /// Reference instant of the temporal query.
    pub time: Option<DateTime<Utc>>,
    /// End instant, required for `during`.
    pub endtime: Option<DateTime<Utc>>,
    /// Attribute-query text, terms separated by `;`.
    pub q: Option<String>,
    /// Maximum number of results.
    pub limit: Option<u32>,
    /// Result offset for paging.
    pub offset: Option<u32>,
}

impl QueryParams {
    /// Creates parameters selecting the given entity ids.
    #[must_use]
    pub fn for_ids(ids: Vec<String>) -> Self {
        Self {
            ids,
            ..Self::default()
        }
    }

    /// Projects the response onto the given attributes.
    #[must_use]
    pub fn with_attrs(mut self, attrs: Vec<String>) -> Self {
        self.attrs = attrs;
        self
    }

    /// Attaches a geo query.
    #[must_use]
    pub fn with_geo(
        mut self,
        georel: impl Into<String>,
        geometry: impl Into<String>,
        coordinates: impl Into<String>,
    ) -> Self {
        self.georel = Some(georel.into());
        self.geometry = Some(geometry.into());
        self.coordinates = Some(coordinates.into());
        self
    }

    /// Targets the geo query at a non-default geo property.
    #[must_use]
    pub fn with_geoproperty(mut self, geoproperty: impl Into<String>) -> Self {
        self.geoproperty = Some(geoproperty.into());
        self
    }

    /// Attaches a temporal query.
    #[must_use]
    pub fn with_temporal(mut self, timerel: impl Into<String>, time: DateTime<Utc>) -> Self {
        self.timerel = Some(timerel.into());
        self.time = Some(time);
        self
    }

    /// Attaches the end instant of a `during` query.
    #[must_use]
    pub const fn with_end_time(mut self, endtime: DateTime<Utc>) -> Self {
        self.endtime = Some(endtime);
        self
    }

    /// Attaches an attribute-query expression.
    #[must_use]
    pub fn with_text_query(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    /// Attaches paging bounds.
    #[must_use]
    pub const fn with_paging(mut self, limit: u32, offset: u32) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_composes() {
        let params = QueryParams::for_ids(vec!["urn:entity:1".to_string()])
            .with_attrs(vec!["temperature".to_string()])
            .with_geo("within", "Polygon", "[[72.8,21.1],[72.9,21.2]]")
            .with_text_query("temperature>20")
            .with_paging(100, 0);

        assert_eq!(params.ids.len(), 1);
        assert_eq!(params.georel.as_deref(), Some("within"));
        assert_eq!(params.limit, Some(100));
        assert!(params.timerel.is_none());
    }
}
