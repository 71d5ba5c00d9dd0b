//! Provider API version carried through decoder construction.

use std::fmt;

/// An API version string as configured for a provider (e.g. `"0.8"`, `"1.0"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ApiVersion(String);

impl ApiVersion {
    /// Version assumed when none is configured.
    pub const DEFAULT: &'static str = "1.0";

    /// Create a version from any string.
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    /// Get the version as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the version string mentions the given fragment.
    #[must_use]
    pub fn mentions(&self, fragment: &str) -> bool {
        self.0.contains(fragment)
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ApiVersion {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
