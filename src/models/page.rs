//! Page entities
//!
//! A page is one target URL plus the ordered tests assigned to it
//! (global tests first, then the page's own).

use std::fmt;

use super::TestLocator;

/// One target page and its ordered worklist of assigned tests.
///
/// Constructed once during setup and consumed exactly once by the run
/// scheduler; the assigned list and `total_tests_to_be_run` are fixed
/// after [`seal`](Page::seal).
#[derive(Clone, Debug)]
pub struct Page {
    uri: String,
    url: String,
    tests: Vec<TestLocator>,
    cursor: usize,
    total_tests_to_be_run: usize,
}

impl Page {
    /// Build a page from its declared URL. URLs with a leading `/` pass
    /// through unchanged; anything else is prefixed with the base URL.
    pub(crate) fn new(declared_url: &str, base_url: &str) -> Self {
        let url = if declared_url.starts_with('/') {
            declared_url.to_string()
        } else {
            format!("{base_url}{declared_url}")
        };

        Self {
            uri: declared_url.to_string(),
            url,
            tests: Vec::new(),
            cursor: 0,
            total_tests_to_be_run: 0,
        }
    }

    pub(crate) fn assign(&mut self, locator: TestLocator) {
        self.tests.push(locator);
    }

    /// Freeze the assigned-test count. Called once at the end of setup.
    pub(crate) fn seal(&mut self) {
        self.total_tests_to_be_run = self.tests.len();
    }

    /// The URL exactly as declared in the configuration.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The effective URL after base-URL resolution.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Assigned test locators, in run order.
    pub fn tests(&self) -> &[TestLocator] {
        &self.tests
    }

    /// Count of tests assigned at construction time. Fixed thereafter.
    pub fn total_tests_to_be_run(&self) -> usize {
        self.total_tests_to_be_run
    }

    /// How many of this page's tests have been dispatched so far.
    pub fn tests_run(&self) -> usize {
        self.cursor
    }

    /// Whether any assigned tests remain undispatched.
    pub fn has_more(&self) -> bool {
        self.cursor < self.tests.len()
    }

    /// Take the next not-yet-run test, advancing the cursor. Returns
    /// `None` once the page is exhausted; a page with zero assigned tests
    /// is exhausted on its very first call.
    pub(crate) fn take_next(&mut self) -> Option<TestLocator> {
        let next = self.tests.get(self.cursor).cloned()?;
        self.cursor += 1;
        Some(next)
    }

    /// The most recently dispatched test, if any.
    pub(crate) fn last_dispatched(&self) -> Option<&TestLocator> {
        self.cursor.checked_sub(1).and_then(|i| self.tests.get(i))
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}/{} tests)",
            self.url, self.cursor, self.total_tests_to_be_run
        )
    }
}
