//! Core domain entities
//!
//! Locators, test entities, pages, and run reports.

mod locator;
mod page;
mod report;

pub use locator::TestLocator;
pub use page::Page;
pub use report::{PageReport, RunReport};
pub use test::{LoadState, Test, TestBody, TestContext};
