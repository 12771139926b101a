//! Result of the catalogue open/secure classification.

use std::collections::HashMap;

/// Per-resource openness as resolved against the catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The call never consulted the catalogue: the endpoint is outside the
    /// open set, or no resource ids were named. Policy treats every id as
    /// not open.
    Skipped,
    /// Openness per resource id, `true` meaning publicly readable.
    Resolved(HashMap<String, bool>),
}

impl Classification {
    /// Wraps a resolved openness map.
    #[must_use]
    pub fn resolved(openness: HashMap<String, bool>) -> Self {
        Self::Resolved(openness)
    }

    /// Returns `true` when classification was skipped outright.
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }

    /// Openness of one id: `None` when skipped or the id was never asked.
    #[must_use]
    pub fn is_open(&self, resource_id: &str) -> Option<bool> {
        match self {
            Self::Skipped => None,
            Self::Resolved(openness) => openness.get(resource_id).copied(),
        }
    }
}
