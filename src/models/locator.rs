//! Test locators
//!
//! A locator is the opaque source identifier a test is registered under.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for a test definition, used as the registry key.
///
/// Identical locators always resolve to the same test entity, no matter
/// how many pages reference them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestLocator(String);

impl TestLocator {
    /// Create a locator from a source path.
    pub fn new(src: impl Into<String>) -> Self {
        Self(src.into())
    }

    /// The locator as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the locator is empty (rejected by settings validation).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for TestLocator {
    fn from(src: &str) -> Self {
        Self::new(src)
    }
}

impl From<String> for TestLocator {
    fn from(src: String) -> Self {
        Self(src)
    }
}

impl fmt::Display for TestLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
