//! Environment-conditional setting overrides
//!
//! A raw settings entry whose value is an object carrying an `env` key
//! (a list of URL substrings) is an override: when the current location
//! matches one of the substrings, the entry's other properties are merged
//! into the settings. The entry itself is removed either way and never
//! appears in the final settings.

use serde_json::{Map, Value};
use tracing::debug;

use super::Location;

const ENV_KEY: &str = "env";

/// Resolve all override entries in `settings` against `location`.
pub fn resolve(mut settings: Map<String, Value>, location: &Location) -> Map<String, Value> {
    let override_keys: Vec<String> = settings
        .iter()
        .filter(|(_, value)| {
            value
                .as_object()
                .map(|entry| entry.contains_key(ENV_KEY))
                .unwrap_or(false)
        })
        .map(|(key, _)| key.clone())
        .collect();

    for key in override_keys {
        let Some(Value::Object(entry)) = settings.remove(&key) else {
            continue;
        };

        let matched = entry
            .get(ENV_KEY)
            .and_then(Value::as_array)
            .map(|triggers| {
                triggers
                    .iter()
                    .filter_map(Value::as_str)
                    .any(|trigger| location.contains(trigger))
            })
            .unwrap_or(false);

        if matched {
            debug!("Applying override entry '{key}' for {location}");
            for (prop, value) in entry {
                if prop != ENV_KEY {
                    settings.insert(prop, value);
                }
            }
        }
    }

    settings
}
