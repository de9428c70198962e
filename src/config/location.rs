//! Current-location URL handling
//!
//! Computes the base URL and tests URL from the href the orchestrator is
//! running under, and detects local-filesystem contexts.

use std::fmt;

/// The URL the hosting context is currently at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    href: String,
}

impl Location {
    /// Wrap a fully-qualified href.
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }

    /// The full href.
    pub fn href(&self) -> &str {
        &self.href
    }

    /// Substring match, used by environment-conditional overrides.
    pub fn contains(&self, needle: &str) -> bool {
        self.href.contains(needle)
    }

    /// Whether the href points into a local filesystem (`file` scheme).
    /// Source loading is disabled in that context.
    pub fn is_local_file(&self) -> bool {
        self.href.starts_with("file")
    }

    /// The href up to and including its last `/`.
    ///
    /// Examples:
    ///   `http://domain.com/tests/` -> unchanged
    ///   `file:///path/to/tests/index.html` -> `file:///path/to/tests/`
    pub fn base_url(&self) -> String {
        match self.href.rfind('/') {
            Some(i) => self.href[..=i].to_string(),
            None => self.href.clone(),
        }
    }

    /// Resolve the test-specs directory against the base URL. An empty
    /// dir means the base URL itself; a leading `/` is absolute and not
    /// appended; the result always ends with a `/`.
    pub fn tests_url(&self, tests_dir: &str) -> String {
        let mut url = if tests_dir.is_empty() {
            self.base_url()
        } else if tests_dir.starts_with('/') {
            tests_dir.to_string()
        } else {
            format!("{}{}", self.base_url(), tests_dir)
        };

        if !url.is_empty() && !url.ends_with('/') {
            url.push('/');
        }
        url
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href)
    }
}
