//! Configuration module
//!
//! Raw settings handling: file loading, environment-conditional override
//! resolution, validation, and the resolved settings the runner holds.

mod location;
pub mod overrides;

pub use location::Location;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::models::TestLocator;

/// Configuration file locations (in order of precedence)
const CONFIG_LOCATIONS: &[&str] = &[
    "./pagedrive.yaml",
    "./pagedrive.yml",
    "./pagedrive.json",
    "./.pagedrive.yaml",
    "~/.config/pagedrive/config.yaml",
    "~/.pagedrive.yaml",
];

/// One page under test and its page-specific test locators.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PageSpec {
    /// Page URL, absolute (leading `/`) or relative to the base URL.
    pub url: String,

    /// Ordered locators specific to this page. Global tests are always
    /// prepended at setup time.
    #[serde(default)]
    pub tests: Vec<TestLocator>,
}

/// Raw orchestrator settings, as declared in a config file or passed by
/// the embedding host.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Pages in execution order. Order is preserved end to end.
    pub pages: Vec<PageSpec>,

    /// Locators applied to every page, ahead of page-specific tests.
    pub global_tests: Vec<TestLocator>,

    /// Test-specs directory, resolved against the base URL.
    pub tests_dir: String,

    /// Whether collaborators should load page sources. Forced off when
    /// running from a local filesystem.
    pub load_sources: bool,

    /// Opaque workspace value passed through to collaborators.
    pub workspace: Option<Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pages: Vec::new(),
            global_tests: Vec::new(),
            tests_dir: "mytests/".to_string(),
            load_sources: true,
            workspace: None,
        }
    }
}

impl Settings {
    /// Build settings from a raw JSON object, resolving environment-
    /// conditional override entries against `location` first, then
    /// merging over defaults. Fails fast on a non-object value.
    pub fn from_value(raw: Value, location: &Location) -> Result<Self> {
        let Value::Object(map) = raw else {
            anyhow::bail!("settings must be a JSON object");
        };

        let resolved = overrides::resolve(map, location);
        let settings: Self = serde_json::from_value(Value::Object(resolved))
            .context("Failed to deserialize settings")?;
        Ok(settings)
    }

    /// Find a configuration file in standard locations.
    pub fn find() -> Option<PathBuf> {
        for candidate in CONFIG_LOCATIONS {
            let path = expand_path(candidate);
            if path.exists() {
                return Some(path);
            }
        }
        None
    }

    /// Load settings from the first discovered standard location, or
    /// defaults if none exists.
    pub fn load_default() -> Result<Self> {
        if let Some(path) = Self::find() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load settings from a YAML or JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        let settings: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML settings: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON settings: {}", path.display()))?
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a YAML or JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize settings")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize settings")?
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings file: {}", path.display()))?;
        Ok(())
    }

    /// Validate settings before any worklist is built.
    pub fn validate(&self) -> Result<()> {
        for (index, page) in self.pages.iter().enumerate() {
            if page.url.is_empty() {
                anyhow::bail!("Page {index} has an empty url");
            }
            for locator in &page.tests {
                if locator.is_empty() {
                    anyhow::bail!("Page '{}' declares an empty test locator", page.url);
                }
            }
        }
        for locator in &self.global_tests {
            if locator.is_empty() {
                anyhow::bail!("Global tests declare an empty locator");
            }
        }
        Ok(())
    }
}

/// Settings after override resolution, the local-filesystem clamp, and
/// base/tests URL computation. This is what the runner holds.
#[derive(Clone, Debug)]
pub struct ResolvedSettings {
    pub pages: Vec<PageSpec>,
    pub global_tests: Vec<TestLocator>,
    pub tests_dir: String,
    pub load_sources: bool,
    pub workspace: Option<Value>,

    /// Fully-qualified base URL derived from the current location.
    pub base_url: String,

    /// Fully-qualified URL of the test-specs directory.
    pub tests_url: String,
}

impl ResolvedSettings {
    /// Resolve raw settings against the current location.
    pub fn resolve(settings: Settings, location: &Location) -> Self {
        let mut load_sources = settings.load_sources;
        if location.is_local_file() {
            info!("Running from local filesystem so disabling loading page sources");
            load_sources = false;
        }

        let base_url = location.base_url();
        let tests_url = location.tests_url(&settings.tests_dir);

        Self {
            pages: settings.pages,
            global_tests: settings.global_tests,
            tests_dir: settings.tests_dir,
            load_sources,
            workspace: settings.workspace,
            base_url,
            tests_url,
        }
    }
}

/// Expand ~ to home directory
fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Check if file is YAML based on extension
fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}
