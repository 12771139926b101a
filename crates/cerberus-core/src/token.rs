//! Bearer-token handling.

use std::fmt;

/// Reserved token value denoting anonymous/public access.
///
/// Requests presenting this token never trigger a remote introspection call.
pub const PUBLIC_TOKEN: &str = "public";

/// An opaque bearer token presented by a caller.
///
/// The token value is deliberately hidden from `Debug` output so request
/// logs never leak credentials.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wraps a raw token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the public sentinel token.
    #[must_use]
    pub fn public() -> Self {
        Self(PUBLIC_TOKEN.to_string())
    }

    /// Returns `true` if this is the reserved public sentinel.
    ///
    /// The comparison is case-insensitive: `"Public"` and `"PUBLIC"` denote
    /// the same anonymous caller.
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.0.eq_ignore_ascii_case(PUBLIC_TOKEN)
    }

    /// Returns the raw token value for the introspection wire call.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl From<String> for BearerToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for BearerToken {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_public() {
            f.write_str("BearerToken(public)")
        } else {
            write!(f, "BearerToken(<redacted, {} bytes>)", self.0.len())
        }
    }
}
