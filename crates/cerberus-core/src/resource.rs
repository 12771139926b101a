//! Resource-id path arithmetic.
//!
//! Resource ids are slash-delimited paths of the form
//! `provider-org/provider-sha/server/group/item`. Three prefix views of an id
//! drive every access decision:
//!
//! - the **catalogue group** (first 4 segments) is the unit the catalogue
//!   tags with an access policy,
//! - the **parent** (everything before the last segment) is the unit of
//!   group-level entitlement comparison,
//! - the **provider prefix** (first 2 segments) identifies the providing
//!   organization.
//!
//! All helpers are total: an id with too few segments yields `None`, never a
//! panic. Segment counting follows plain `/`-splitting, so empty segments
//! count.

/// Number of `/`-delimited segments in an id.
#[must_use]
pub fn segment_count(id: &str) -> usize {
    id.split('/').count()
}

/// First 4 path segments of an id, the catalogue classification unit.
///
/// Returns the id itself when it has exactly 4 segments, the 4-segment
/// prefix when longer, and `None` when shorter.
///
/// # Example
///
/// ```
/// use cerberus_core::resource::catalogue_group;
///
/// assert_eq!(catalogue_group("org/sha/server/grp/item"), Some("org/sha/server/grp"));
/// assert_eq!(catalogue_group("org/sha/server/grp"), Some("org/sha/server/grp"));
/// assert_eq!(catalogue_group("org/sha"), None);
/// ```
#[must_use]
pub fn catalogue_group(id: &str) -> Option<&str> {
    match id.match_indices('/').nth(3) {
        Some((idx, _)) => Some(&id[..idx]),
        None if segment_count(id) == 4 => Some(id),
        None => None,
    }
}

/// The id truncated before its last path segment.
///
/// Returns `None` when the id contains no `/` at all.
#[must_use]
pub fn parent(id: &str) -> Option<&str> {
    id.rfind('/').map(|idx| &id[..idx])
}

/// First 2 path segments of an id, the providing organization.
///
/// Returns `None` when the id has fewer than 2 segments.
#[must_use]
pub fn provider_prefix(id: &str) -> Option<&str> {
    match id.match_indices('/').nth(1) {
        Some((idx, _)) => Some(&id[..idx]),
        None if segment_count(id) == 2 => Some(id),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_catalogue_group_boundaries() {
        assert_eq!(catalogue_group(""), None);
        assert_eq!(catalogue_group("a"), None);
        assert_eq!(catalogue_group("a/b/c"), None);
        assert_eq!(catalogue_group("a/b/c/d"), Some("a/b/c/d"));
        assert_eq!(catalogue_group("a/b/c/d/e"), Some("a/b/c/d"));
        assert_eq!(catalogue_group("a/b/c/d/e/f"), Some("a/b/c/d"));
    }

    #[test]
    fn test_catalogue_group_counts_empty_segments() {
        // Plain splitting: "a//b/c" has 4 segments, one of them empty.
        assert_eq!(catalogue_group("a//b/c"), Some("a//b/c"));
    }

    #[test]
    fn test_parent() {
        assert_eq!(parent("a/b/c"), Some("a/b"));
        assert_eq!(parent("a/b"), Some("a"));
        assert_eq!(parent("a"), None);
        assert_eq!(parent(""), None);
    }

    #[test]
    fn test_provider_prefix() {
        assert_eq!(provider_prefix("org/sha/server/grp/item"), Some("org/sha"));
        assert_eq!(provider_prefix("org/sha"), Some("org/sha"));
        assert_eq!(provider_prefix("org"), None);
    }

    proptest! {
        #[test]
        fn prop_catalogue_group_iff_four_segments(id in "[a-z0-9./-]{0,40}") {
            let group = catalogue_group(&id);
            prop_assert_eq!(group.is_some(), segment_count(&id) >= 4);
            if let Some(group) = group {
                prop_assert!(id.starts_with(group));
                prop_assert_eq!(segment_count(group), 4);
            }
        }

        #[test]
        fn prop_parent_is_strict_prefix(id in "[a-z0-9./-]{0,40}") {
            if let Some(p) = parent(&id) {
                prop_assert!(id.starts_with(p));
                prop_assert_eq!(id.as_bytes()[p.len()], b'/');
                prop_assert_eq!(segment_count(p), segment_count(&id) - 1);
            } else {
                prop_assert_eq!(segment_count(&id), 1);
            }
        }

        #[test]
        fn prop_provider_prefix_two_segments(id in "[a-z0-9./-]{0,40}") {
            if let Some(p) = provider_prefix(&id) {
                prop_assert!(id.starts_with(p));
                prop_assert_eq!(segment_count(p), 2);
            } else {
                prop_assert!(segment_count(&id) < 2);
            }
        }
    }
}
