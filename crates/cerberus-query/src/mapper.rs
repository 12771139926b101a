//! NGSI-LD to search-query translation.
//!
//! [`QueryMapper`] turns decoded [`QueryParams`] into the [`SearchQuery`]
//! document the database tier consumes. The `searchType` field is composed
//! from fragments: temporal queries replace the `latestSearch_` base, and
//! geo, response-filter, and attribute fragments append to it; the trailing
//! underscore is trimmed once composition is done.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;

use crate::error::{QueryError, QueryResult};
use crate::params::QueryParams;

/// Default interval window applied to `before`/`after` queries, in days.
pub const DEFAULT_WINDOW_DAYS: i64 = 10;

const LATEST_SEARCH: &str = "latestSearch_";
const TEMPORAL_SEARCH: &str = "temporalSearch_";
const GEO_SEARCH: &str = "geoSearch_";
const RESPONSE_FILTER_SEARCH: &str = "responseFilterSearch_";
const ATTRIBUTE_SEARCH: &str = "attributeSearch_";

const GEO_NEAR: &str = "near";
const GEO_POINT: &str = "point";

/// One parsed `<attr><op><value>` term of an attribute query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttrQueryTerm {
    /// Attribute the comparison applies to.
    pub attribute: String,
    /// Comparison operator: `>`, `>=`, `<`, `<=`, `==`, or `!=`.
    pub operator: String,
    /// Right-hand value, verbatim.
    pub value: String,
}

/// The search-query document consumed by the database tier.
///
/// Serialization omits everything the query does not use, so the wire
/// document stays minimal.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchQuery {
    /// Entity ids to select.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub id: Vec<String>,

    /// Attribute names to project into the response.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attrs: Vec<String>,

    /// Latitude of a proximity search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,

    /// Longitude of a proximity search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,

    /// Radius of a proximity search, in metres.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,

    /// Geometry kind of a shape search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<String>,

    /// Coordinate text of a shape search, verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<String>,

    /// Geo relation of a shape search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub georel: Option<String>,

    /// Maximum distance modifier, in metres.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxdistance: Option<f64>,

    /// Minimum distance modifier, in metres.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mindistance: Option<f64>,

    /// Property the geo query applies to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geoproperty: Option<String>,

    /// Start instant of the temporal window, RFC 3339.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,

    /// End instant of the temporal window, RFC 3339.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endtime: Option<DateTime<Utc>>,

    /// Temporal relation as requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timerel: Option<String>,

    /// Parsed attribute-query terms.
    #[serde(rename = "attr-query", skip_serializing_if = "Vec::is_empty")]
    pub attr_query: Vec<AttrQueryTerm>,

    /// Maximum number of results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    /// Result offset for paging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,

    /// Composed search-type discriminator.
    #[serde(rename = "searchType")]
    pub search_type: String,
}

#[derive(Debug, Default)]
struct SearchFlags {
    temporal: bool,
    geo: bool,
    response_filter: bool,
    attribute: bool,
}

impl SearchFlags {
    fn compose(&self) -> String {
        let mut search_type = String::new();
        search_type.push_str(if self.temporal {
            TEMPORAL_SEARCH
        } else {
            LATEST_SEARCH
        });
        if self.geo {
            search_type.push_str(GEO_SEARCH);
        }
        if self.response_filter {
            search_type.push_str(RESPONSE_FILTER_SEARCH);
        }
        if self.attribute {
            search_type.push_str(ATTRIBUTE_SEARCH);
        }
        search_type.trim_end_matches('_').to_string()
    }
}

#[derive(Debug)]
struct GeoRelation {
    relation: String,
    max_distance: Option<f64>,
    min_distance: Option<f64>,
}

/// Translates NGSI-LD query parameters into the internal search query.
#[derive(Debug, Clone)]
pub struct QueryMapper {
    default_window: Duration,
}

impl Default for QueryMapper {
    fn default() -> Self {
        Self {
            default_window: Duration::days(DEFAULT_WINDOW_DAYS),
        }
    }
}

impl QueryMapper {
    /// Creates a mapper with the default interval window.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the interval window applied to `before`/`after` queries.
    #[must_use]
    pub const fn with_default_window(mut self, window: Duration) -> Self {
        self.default_window = window;
        self
    }

    /// Translates the parameters into a search query.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] for an unknown temporal relation, a `during`
    /// query without its end time, a malformed geo relation or coordinate
    /// pair, or an attribute term that does not parse.
    pub fn to_search_query(&self, params: &QueryParams) -> QueryResult<SearchQuery> {
        let mut query = SearchQuery::default();
        let mut flags = SearchFlags::default();

        query.id = params.ids.clone();
        if !params.attrs.is_empty() {
            flags.response_filter = true;
            query.attrs = params.attrs.clone();
        }

        if let Some(georel) = params.georel.as_deref() {
            if params.geometry.is_some() || params.coordinates.is_some() {
                flags.geo = true;
                self.apply_geo(&mut query, georel, params)?;
            }
        }

        if let (Some(timerel), Some(time)) = (params.timerel.as_deref(), params.time) {
            flags.temporal = true;
            self.apply_temporal(&mut query, timerel, time, params.endtime)?;
        }

        if let Some(q) = params.q.as_deref() {
            flags.attribute = true;
            query.attr_query = q
                .split(';')
                .map(parse_query_term)
                .collect::<QueryResult<Vec<_>>>()?;
        }

        query.geoproperty = params.geoproperty.clone();
        query.limit = params.limit;
        query.offset = params.offset;
        query.search_type = flags.compose();

        debug!(search_type = %query.search_type, "Translated query parameters");
        Ok(query)
    }

    /// Point proximity collapses to lat/lon/radius; every other shape
    /// passes geometry and coordinates through.
    fn apply_geo(
        &self,
        query: &mut SearchQuery,
        georel: &str,
        params: &QueryParams,
    ) -> QueryResult<()> {
        let relation = parse_georel(georel)?;
        let is_point = params
            .geometry
            .as_deref()
            .is_some_and(|g| g.eq_ignore_ascii_case(GEO_POINT));

        if is_point && relation.relation == GEO_NEAR {
            let coordinates = params.coordinates.as_deref().ok_or_else(|| {
                QueryError::malformed_coordinates("", "proximity search requires coordinates")
            })?;
            let (lat, lon) = parse_point(coordinates)?;
            query.lat = Some(lat);
            query.lon = Some(lon);
            query.radius = relation.max_distance;
        } else {
            query.geometry = params.geometry.clone();
            query.coordinates = params.coordinates.clone();
            query.georel = Some(relation.relation);
            if relation.max_distance.is_some() {
                query.maxdistance = relation.max_distance;
            } else {
                query.mindistance = relation.min_distance;
            }
        }
        Ok(())
    }

    /// `during` carries its own window; `before` and `after` are bounded
    /// with the configured default window so the database tier never scans
    /// an open-ended interval.
    fn apply_temporal(
        &self,
        query: &mut SearchQuery,
        timerel: &str,
        time: DateTime<Utc>,
        endtime: Option<DateTime<Utc>>,
    ) -> QueryResult<()> {
        match timerel {
            "during" => {
                let endtime = endtime.ok_or(QueryError::MissingEndTime)?;
                query.time = Some(time);
                query.endtime = Some(endtime);
            }
            "before" => {
                let start = time
                    .checked_sub_signed(self.default_window)
                    .unwrap_or(DateTime::<Utc>::MIN_UTC);
                query.time = Some(start);
                query.endtime = Some(time);
            }
            "after" => {
                let end = time
                    .checked_add_signed(self.default_window)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC);
                query.time = Some(time);
                query.endtime = Some(end);
            }
            other => return Err(QueryError::invalid_temporal_relation(other)),
        }
        query.timerel = Some(timerel.to_string());
        Ok(())
    }
}

/// Parses one `<attr><op><value>` term of an attribute query.
///
/// # Errors
///
/// Returns [`QueryError::MalformedAttributeTerm`] when the term has no
/// comparison operator, an unsupported operator, or an empty attribute or
/// value.
pub fn parse_query_term(term: &str) -> QueryResult<AttrQueryTerm> {
    let Some(op_start) = term.find(|c| matches!(c, '>' | '<' | '=' | '!')) else {
        return Err(QueryError::malformed_attribute_term(
            term,
            "no comparison operator",
        ));
    };
    let attribute = &term[..op_start];
    if attribute.is_empty() {
        return Err(QueryError::malformed_attribute_term(term, "empty attribute"));
    }

    let rest = &term[op_start..];
    // Operator characters are all ASCII, so the char count is a byte count.
    let op_len = rest
        .chars()
        .take_while(|c| matches!(c, '>' | '<' | '=' | '!'))
        .count();
    let (operator, value) = rest.split_at(op_len);
    if !matches!(operator, ">" | ">=" | "<" | "<=" | "==" | "!=") {
        return Err(QueryError::malformed_attribute_term(
            term,
            format!("unsupported operator {operator:?}"),
        ));
    }
    if value.is_empty() {
        return Err(QueryError::malformed_attribute_term(term, "empty value"));
    }

    Ok(AttrQueryTerm {
        attribute: attribute.to_string(),
        operator: operator.to_string(),
        value: value.to_string(),
    })
}

fn parse_georel(raw: &str) -> QueryResult<GeoRelation> {
    let mut segments = raw.split(';');
    let relation = segments.next().unwrap_or("").trim();
    if !matches!(relation, "near" | "within" | "intersects") {
        return Err(QueryError::malformed_geo_relation(
            raw,
            format!("unknown relation {relation:?}"),
        ));
    }

    let mut max_distance = None;
    let mut min_distance = None;
    for segment in segments {
        let Some((key, value)) = segment.split_once('=') else {
            return Err(QueryError::malformed_geo_relation(
                raw,
                format!("expected key=value, got {segment:?}"),
            ));
        };
        let parsed: f64 = value.trim().parse().map_err(|_| {
            QueryError::malformed_geo_relation(raw, format!("{value:?} is not a number"))
        })?;
        match key.trim() {
            "maxdistance" => max_distance = Some(parsed),
            "mindistance" => min_distance = Some(parsed),
            other => {
                return Err(QueryError::malformed_geo_relation(
                    raw,
                    format!("unknown modifier {other:?}"),
                ))
            }
        }
    }

    if relation == GEO_NEAR && max_distance.is_none() {
        return Err(QueryError::malformed_geo_relation(
            raw,
            "near requires maxdistance",
        ));
    }

    Ok(GeoRelation {
        relation: relation.to_string(),
        max_distance,
        min_distance,
    })
}

fn parse_point(coordinates: &str) -> QueryResult<(f64, f64)> {
    let stripped: String = coordinates
        .chars()
        .filter(|c| !matches!(c, '[' | ']'))
        .collect();
    let parts: Vec<&str> = stripped.split(',').map(str::trim).collect();
    let [lat, lon] = parts.as_slice() else {
        return Err(QueryError::malformed_coordinates(
            coordinates,
            "expected a [lat,lon] pair",
        ));
    };
    let lat: f64 = lat.parse().map_err(|_| {
        QueryError::malformed_coordinates(coordinates, "latitude is not a number")
    })?;
    let lon: f64 = lon.parse().map_err(|_| {
        QueryError::malformed_coordinates(coordinates, "longitude is not a number")
    })?;
    Ok((lat, lon))
}
